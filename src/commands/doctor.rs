//! Doctor command handler
//!
//! Handles `kiln doctor`, `kiln detect`, and `kiln lock`.

use anyhow::Result;
use colored::*;
use std::ffi::OsString;
use std::process::Command;

use crate::config::Workspace;
use crate::lock::LockFile;
use crate::profile;
use crate::toolchain;

fn tool_version(env_var: &str, default: &str) -> Option<String> {
    let program = std::env::var_os(env_var).unwrap_or_else(|| OsString::from(default));
    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Some(text.lines().next().unwrap_or("").trim().to_string())
}

/// Run the `kiln doctor` command to check for the external tools
pub fn run_doctor() -> Result<()> {
    println!("{} Running System Doctor...", "🚑".red());
    println!("-------------------------------");

    print!("Checking OS... ");
    println!(
        "{} ({})",
        std::env::consts::OS.green(),
        std::env::consts::ARCH.cyan()
    );

    let mut missing = 0;
    for (label, env_var, default) in [
        ("Conan", "KILN_CONAN", "conan"),
        ("CMake", "KILN_CMAKE", "cmake"),
    ] {
        print!("Checking {}... ", label);
        match tool_version(env_var, default) {
            Some(version) => println!("{} ({})", "Found".green(), version.dimmed()),
            None => {
                missing += 1;
                println!("{}", format!("Not Found (set {} or install {})", env_var, default).red());
            }
        }
    }

    print!("Checking C++ compiler... ");
    match toolchain::detect_compiler() {
        Some(compiler) => println!("{} ({})", compiler.path.display().to_string().green(), compiler.version),
        None => println!("{}", "Not Found".yellow()),
    }

    print!("Checking default profile... ");
    match profile::load_profile(None).map(|p| p.bind()) {
        Ok(Ok(_)) => println!("{}", "OK".green()),
        Ok(Err(e)) => println!("{} ({})", "Incomplete".yellow(), e),
        Err(e) => println!("{} ({})", "Invalid".red(), e),
    }

    if missing > 0 {
        anyhow::bail!("{} required tool(s) missing", missing);
    }
    Ok(())
}

/// Handle `kiln detect`: print a host profile, optionally saving it
pub fn handle_detect(save: Option<&str>) -> Result<()> {
    let compiler = toolchain::detect_compiler();
    if compiler.is_none() {
        println!(
            "{} No C++ compiler found on PATH; 'compiler' is left unset",
            "!".yellow()
        );
    }
    let detected = toolchain::detect_host_profile(compiler.as_ref());
    print!("{}", profile::to_toml(&detected)?);

    if let Some(name) = save {
        let path = profile::save_profile(name, &detected)?;
        println!("{} Saved profile to {}", "✓".green(), path.display());
    }
    Ok(())
}

/// Handle `kiln lock --check`
pub fn handle_lock_check(ws: &Workspace) -> Result<()> {
    println!("{} Verifying lockfile...", "🔒".blue());
    let lockfile = LockFile::load(&ws.root)?;

    let mut drift = Vec::new();
    for recipe in ws.recipes()? {
        drift.extend(lockfile.check(&recipe));
    }

    if drift.is_empty() {
        println!("{} kiln.lock is in sync", "✓".green());
        return Ok(());
    }
    for d in &drift {
        println!("{} {}", "x".red(), d);
    }
    anyhow::bail!("kiln.lock is out of date ({} problem(s))", drift.len())
}
