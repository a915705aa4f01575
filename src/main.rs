//! # kiln CLI Entry Point
//!
//! Parses CLI arguments with clap and routes commands to their handlers.
//!
//! ## Command Structure
//!
//! - **Project**: `init`
//! - **Requirements**: `requires`, `tree`, `lock`
//! - **Build**: `configure`, `build`
//! - **Environment**: `detect`, `doctor`, `completion`

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::fs;
use std::path::Path;

use kiln::commands;
use kiln::commands::build::BuildOptions;
use kiln::config::{MANIFEST_FILE, Manifest, Workspace};
use kiln::tree;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Declarative dependency and build recipes for native projects", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SettingsArgs {
    /// Profile name (in ~/.kiln/profiles) or path to a profile file
    #[arg(short, long)]
    profile: Option<String>,
    /// Settings override, e.g. -s build_type=Debug or -s compiler.version=13
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    settings: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write kiln.toml with the built-in Multor and Compressor recipes
    Init {
        /// Overwrite an existing kiln.toml
        #[arg(long)]
        force: bool,
    },
    /// List declared requirements, disabled ones included
    Requires {
        /// Recipe name (all recipes when omitted)
        recipe: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the requirement tree of every recipe
    Tree,
    /// Resolve requirements and configure the native build
    Configure {
        /// Recipe name
        recipe: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Configure and then compile
    Build {
        /// Recipe name
        #[arg(required_unless_present = "all")]
        recipe: Option<String>,
        /// Build every recipe
        #[arg(long, conflicts_with = "recipe")]
        all: bool,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Parallel compile jobs passed to the build driver
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Print settings detected for this machine
    Detect {
        /// Save as a named profile
        #[arg(long, value_name = "NAME")]
        save: Option<String>,
    },
    /// Verify kiln.lock against the declared requirements
    Lock {
        /// Fail if any active requirement is unlocked or locked at another version
        #[arg(long)]
        check: bool,
    },
    /// Check for conan, cmake, and a usable default profile
    Doctor,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("kiln=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_manifest(root: &Path, force: bool) -> Result<()> {
    let path = root.join(MANIFEST_FILE);
    if path.exists() && !force {
        println!(
            "{} Error: {} already exists (use --force to overwrite).",
            "x".red(),
            MANIFEST_FILE
        );
        anyhow::bail!("{} already exists", MANIFEST_FILE);
    }

    let content = Manifest::builtin().to_toml()?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created {}", "✓".green(), MANIFEST_FILE.bold());
    Ok(())
}

fn build_options(settings: SettingsArgs, jobs: Option<usize>, verbose: bool) -> BuildOptions {
    BuildOptions {
        profile: settings.profile,
        overrides: settings.settings,
        jobs,
        verbose,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = std::env::current_dir().context("Failed to read current directory")?;
    let load = || Workspace::load(&root).context("Failed to load kiln.toml");

    match cli.command {
        Commands::Init { force } => init_manifest(&root, force),
        Commands::Requires { recipe, json } => {
            commands::requires::list_requirements(&load()?, recipe.as_deref(), json)
        }
        Commands::Tree => {
            tree::print_tree(&load()?.recipes()?);
            Ok(())
        }
        Commands::Configure { recipe, settings } => {
            let opts = build_options(settings, None, cli.verbose);
            commands::build::run_recipes(&load()?, &[recipe], &opts, false)
        }
        Commands::Build {
            recipe,
            all,
            settings,
            jobs,
        } => {
            let ws = load()?;
            let names: Vec<String> = if all {
                ws.recipe_names().map(String::from).collect()
            } else {
                recipe.into_iter().collect()
            };
            let opts = build_options(settings, jobs, cli.verbose);
            commands::build::run_recipes(&ws, &names, &opts, true)
        }
        Commands::Detect { save } => commands::doctor::handle_detect(save.as_deref()),
        Commands::Lock { check } => {
            let ws = load()?;
            if check {
                commands::doctor::handle_lock_check(&ws)
            } else {
                let lock = kiln::lock::LockFile::load(&ws.root)?;
                print!("{}", toml::to_string_pretty(&lock)?);
                Ok(())
            }
        }
        Commands::Doctor => commands::doctor::run_doctor(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
