//! Host detection for `kiln detect`.
//!
//! Proposes settings values for the current machine. The result is only a
//! starting profile for the caller; recipes never fall back to it on their own.

pub mod types;

pub use types::{CompilerType, HostCompiler};

use crate::recipe::{SettingsAxis, SettingsProfile};
use std::path::PathBuf;
use std::process::Command;

/// `os` axis value for `std::env::consts::OS`.
pub fn os_setting(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "macos" => "Macos".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "android" => "Android".to_string(),
        "ios" => "iOS".to_string(),
        other => other.to_string(),
    }
}

/// `arch` axis value for `std::env::consts::ARCH`.
pub fn arch_setting(arch: &str) -> String {
    match arch {
        "x86_64" => "x86_64".to_string(),
        "x86" => "x86".to_string(),
        "aarch64" => "armv8".to_string(),
        "arm" => "armv7".to_string(),
        "riscv64" => "riscv64".to_string(),
        "wasm32" => "wasm".to_string(),
        other => other.to_string(),
    }
}

fn locate(cmd: &str) -> Option<PathBuf> {
    let finder = if cfg!(windows) { "where" } else { "which" };
    let output = Command::new(finder).arg(cmd).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()?
        .trim()
        .to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

fn version_line(cmd: &str) -> String {
    Command::new(cmd)
        .arg("--version")
        .output()
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .unwrap_or("unknown")
                .to_string()
        })
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Finds the first C++ compiler on `PATH`: clang++ then g++ (cl on Windows).
pub fn detect_compiler() -> Option<HostCompiler> {
    if cfg!(windows)
        && let Some(path) = locate("cl")
    {
        return Some(HostCompiler {
            compiler_type: CompilerType::MSVC,
            path,
            version: "unknown".to_string(),
        });
    }

    for (cmd, compiler_type) in [("clang++", CompilerType::Clang), ("g++", CompilerType::GCC)] {
        if let Some(path) = locate(cmd) {
            let version = version_line(cmd);
            let compiler_type = if compiler_type == CompilerType::Clang && version.contains("Apple") {
                CompilerType::AppleClang
            } else {
                compiler_type
            };
            return Some(HostCompiler {
                compiler_type,
                path,
                version,
            });
        }
    }
    None
}

/// Builds a profile from the host, with `Release` as build type.
pub fn detect_host_profile(compiler: Option<&HostCompiler>) -> SettingsProfile {
    let mut profile = SettingsProfile::new()
        .with(SettingsAxis::Os, os_setting(std::env::consts::OS))
        .with(SettingsAxis::Arch, arch_setting(std::env::consts::ARCH))
        .with(SettingsAxis::BuildType, "Release");

    if let Some(compiler) = compiler {
        profile.set(SettingsAxis::Compiler, compiler.compiler_type.setting());
        if let Some(major) = compiler.major_version() {
            profile
                .sub_settings
                .insert("compiler.version".to_string(), major);
        }
    }
    profile
}
