//! Build driver boundary.
//!
//! A [`BuildDriver`] performs the native configure and compile steps. Both
//! calls block and report success plus the driver's own output, which callers
//! surface unchanged.

mod cmake;

pub use cmake::CMakeDriver;

use crate::error::BuildError;
use crate::recipe::Settings;
use std::path::Path;
use std::process::Output;

#[derive(Debug, Clone)]
pub struct ConfigureRequest<'a> {
    pub source_dir: &'a Path,
    pub build_dir: &'a Path,
    pub toolchain_file: &'a Path,
    pub settings: &'a Settings,
    pub generator: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub build_dir: &'a Path,
    pub settings: &'a Settings,
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome {
    pub success: bool,
    /// Driver output, stdout followed by stderr, as produced.
    pub diagnostics: String,
}

impl DriverOutcome {
    pub fn ok(diagnostics: impl Into<String>) -> Self {
        Self {
            success: true,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn from_output(output: &Output) -> Self {
        let mut diagnostics = String::from_utf8_lossy(&output.stdout).to_string();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        Self {
            success: output.status.success(),
            diagnostics,
        }
    }
}

pub trait BuildDriver {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<DriverOutcome, BuildError>;
    fn build(&self, request: &BuildRequest<'_>) -> Result<DriverOutcome, BuildError>;
}

impl<D: BuildDriver + ?Sized> BuildDriver for &D {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<DriverOutcome, BuildError> {
        (**self).configure(request)
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<DriverOutcome, BuildError> {
        (**self).build(request)
    }
}
