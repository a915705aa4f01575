//! `kiln configure` and `kiln build` handlers.

use anyhow::{Context, Result};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::{Duration, Instant};

use crate::build::{FeedbackAnalyzer, Lifecycle};
use crate::config::Workspace;
use crate::driver::CMakeDriver;
use crate::error::{ConfigError, RecipeError};
use crate::lock::LockFile;
use crate::profile;
use crate::recipe::{Recipe, Settings, SettingsProfile};
use crate::resolve::{ConanResolver, Resolution};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Profile name or path
    pub profile: Option<String>,
    /// `key=value` settings overrides
    pub overrides: Vec<String>,
    pub jobs: Option<usize>,
    pub verbose: bool,
}

impl BuildOptions {
    /// Profile file first, then `-s` overrides on top.
    pub fn settings_profile(&self) -> Result<SettingsProfile> {
        let mut settings = profile::load_profile(self.profile.as_deref())?;
        for assignment in &self.overrides {
            settings.apply_override(assignment)?;
        }
        Ok(settings)
    }
}

/// What one recipe run produced, kept for the lockfile and the summary.
struct RecipeRun {
    name: String,
    elapsed: Duration,
    result: Result<Option<(Settings, Resolution)>, RecipeError>,
}

fn spinner(bars: &MultiProgress, recipe: &str, verb: &str) -> ProgressBar {
    let pb = bars.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", ""]));
    }
    pb.set_message(format!("{} {}...", verb, recipe));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn run_recipe(
    recipe: &Recipe,
    settings: SettingsProfile,
    opts: &BuildOptions,
    with_build: bool,
    bars: &MultiProgress,
) -> RecipeRun {
    let start = Instant::now();
    let resolver = ConanResolver::new();
    let driver = CMakeDriver::new();
    let mut lifecycle = Lifecycle::new(recipe, settings, &resolver, &driver).with_jobs(opts.jobs);

    let pb = spinner(bars, recipe.name(), "Configuring");
    let mut result = lifecycle.configure();
    if result.is_ok() && with_build {
        pb.set_message(format!("Building {}...", recipe.name()));
        result = lifecycle.build();
    }

    match &result {
        Ok(()) => pb.finish_with_message(format!(
            "{} {} {}",
            "✓".green(),
            recipe.name().bold(),
            lifecycle.state()
        )),
        Err(_) => pb.finish_with_message(format!(
            "{} {} {}",
            "x".red(),
            recipe.name().bold(),
            lifecycle.state()
        )),
    }

    if opts.verbose
        && let Some(output) = lifecycle.last_output()
    {
        bars.suspend(|| println!("{}", output.diagnostics));
    }

    let resolved = match (lifecycle.settings(), lifecycle.resolution()) {
        (Some(s), Some(r)) => Some((s.clone(), r.clone())),
        _ => None,
    };
    RecipeRun {
        name: recipe.name().to_string(),
        elapsed: start.elapsed(),
        result: result.map(|()| resolved),
    }
}

fn report(runs: &[RecipeRun]) -> usize {
    let mut failed = 0;
    for run in runs {
        match &run.result {
            Ok(_) => println!(
                "{} {} finished in {:.2?}",
                "✓".green(),
                run.name.bold(),
                run.elapsed
            ),
            Err(e) => {
                failed += 1;
                println!("{} {} failed: {}", "x".red(), run.name.bold(), e);
                if let Some(hint) = e.diagnostics().and_then(FeedbackAnalyzer::analyze) {
                    println!("\n{} {}\n", "💡".yellow(), hint);
                }
            }
        }
    }
    failed
}

fn record_locks(ws: &Workspace, runs: &[RecipeRun]) -> Result<()> {
    let resolved: Vec<_> = runs
        .iter()
        .filter_map(|run| match &run.result {
            Ok(Some((settings, resolution))) => Some((&run.name, settings, resolution)),
            _ => None,
        })
        .collect();
    if resolved.is_empty() {
        return Ok(());
    }

    let mut lock = LockFile::load(&ws.root).context("Failed to read kiln.lock")?;
    for (name, settings, resolution) in resolved {
        lock.record(name, settings, resolution);
    }
    lock.save(&ws.root).context("Failed to write kiln.lock")
}

/// Runs each recipe through its own lifecycle, in parallel. A failure in
/// one recipe, including an invalid declaration, never stops the others.
pub fn run_recipes(ws: &Workspace, names: &[String], opts: &BuildOptions, with_build: bool) -> Result<()> {
    let recipes: Vec<(&String, Result<Recipe, ConfigError>)> =
        names.iter().map(|name| (name, ws.recipe(name))).collect();
    let settings = opts.settings_profile()?;

    if ws.builtin {
        println!(
            "   {} No kiln.toml found, using built-in recipes",
            "ℹ".blue()
        );
    }

    let bars = MultiProgress::new();
    let runs: Vec<RecipeRun> = recipes
        .into_par_iter()
        .map(|(name, recipe)| match recipe {
            Ok(recipe) => run_recipe(&recipe, settings.clone(), opts, with_build, &bars),
            Err(e) => RecipeRun {
                name: name.clone(),
                elapsed: Duration::ZERO,
                result: Err(RecipeError::Config(e)),
            },
        })
        .collect();

    record_locks(ws, &runs)?;

    let failed = report(&runs);
    if failed > 0 {
        anyhow::bail!("{} of {} recipe(s) failed", failed, runs.len());
    }
    Ok(())
}
