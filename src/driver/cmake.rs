use super::{BuildDriver, BuildRequest, ConfigureRequest, DriverOutcome};
use crate::error::BuildError;
use std::ffi::OsString;
use std::process::Command;
use tracing::debug;

/// Drives `cmake` for configure and `cmake --build` for compile.
#[derive(Debug, Clone)]
pub struct CMakeDriver {
    program: OsString,
}

impl Default for CMakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CMakeDriver {
    /// Uses `$KILN_CMAKE` when set, `cmake` otherwise.
    pub fn new() -> Self {
        let program = std::env::var_os("KILN_CMAKE").unwrap_or_else(|| OsString::from("cmake"));
        Self { program }
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn configure_args(&self, request: &ConfigureRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            request.source_dir.display().to_string(),
            "-B".to_string(),
            request.build_dir.display().to_string(),
        ];
        if let Some(generator) = request.generator {
            args.push("-G".to_string());
            args.push(generator.to_string());
        }
        args.push(format!(
            "-DCMAKE_TOOLCHAIN_FILE={}",
            request.toolchain_file.display()
        ));
        args.push(format!(
            "-DCMAKE_BUILD_TYPE={}",
            request.settings.build_type()
        ));
        // MSVC runtime selection is driven by the toolchain file
        args.push("-DCMAKE_POLICY_DEFAULT_CMP0091=NEW".to_string());
        args
    }

    pub fn build_args(&self, request: &BuildRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            request.build_dir.display().to_string(),
            "--config".to_string(),
            request.settings.build_type().to_string(),
        ];
        if let Some(jobs) = request.jobs {
            args.push("--parallel".to_string());
            args.push(jobs.to_string());
        }
        args
    }

    fn run(&self, args: &[String]) -> Result<DriverOutcome, BuildError> {
        debug!("{} {}", self.program.to_string_lossy(), args.join(" "));
        let output = Command::new(&self.program).args(args).output().map_err(|e| {
            BuildError::DriverUnavailable(format!(
                "failed to run '{}': {}",
                self.program.to_string_lossy(),
                e
            ))
        })?;
        Ok(DriverOutcome::from_output(&output))
    }
}

impl BuildDriver for CMakeDriver {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<DriverOutcome, BuildError> {
        self.run(&self.configure_args(request))
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<DriverOutcome, BuildError> {
        self.run(&self.build_args(request))
    }
}
