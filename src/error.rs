//! Error taxonomy for recipe validation, resolution, and the build lifecycle.
//!
//! Errors fall into four families:
//!
//! - [`ConfigError`] - bad declarations or settings, raised before any external call
//! - [`ResolveError`] - failures reported by (or about) the resolution service
//! - [`BuildError`] - failures reported by the build driver, diagnostics kept verbatim
//! - [`UsageError`] - lifecycle operations called in the wrong state
//!
//! None of them are retried by this crate.

use crate::recipe::{GeneratorKind, SettingsAxis};
use thiserror::Error;

pub type Result<T, E = RecipeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl RecipeError {
    /// Nothing in this layer retries; a failed recipe needs an explicit re-run.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Driver or service output attached to the error, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            RecipeError::Resolution(ResolveError::ResolutionFailed { diagnostics })
            | RecipeError::Resolution(ResolveError::Unresolved { diagnostics, .. })
            | RecipeError::Build(BuildError::ConfigureFailed { diagnostics })
            | RecipeError::Build(BuildError::BuildFailed { diagnostics }) => Some(diagnostics),
            _ => None,
        }
    }
}

/// Declaration or settings problems. Fixing them means editing the declaration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("requirement '{name}' declared twice with conflicting versions ({first} then {second})")]
    ConflictingRequirement {
        name: String,
        first: String,
        second: String,
    },

    #[error("invalid requirement reference '{reference}' (expected name/version)")]
    InvalidReference { reference: String },

    #[error("missing value for settings axis '{axis}'")]
    MissingSetting { axis: SettingsAxis },

    #[error("recipe does not declare settings axis '{axis}'")]
    UndeclaredSetting { axis: SettingsAxis },

    #[error("unknown settings axis '{name}' (expected os, compiler, build_type or arch)")]
    UnknownSettingsAxis { name: String },

    #[error("unsupported generator '{name}'")]
    UnsupportedGenerator { name: String },

    #[error("recipe declares no {kind} generator")]
    MissingGenerator { kind: GeneratorKind },

    #[error("unknown recipe '{name}'")]
    UnknownRecipe { name: String },

    #[error("invalid setting override '{assignment}' (expected key=value)")]
    InvalidOverride { assignment: String },

    /// Profile file read, write, or parse failure
    #[error("{0}")]
    Profile(String),

    /// `kiln.toml` read or parse failure
    #[error("{0}")]
    Manifest(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("requirement '{reference}' could not be resolved\n{diagnostics}")]
    Unresolved {
        reference: String,
        diagnostics: String,
    },

    #[error("dependency resolution failed\n{diagnostics}")]
    ResolutionFailed { diagnostics: String },

    #[error("generator '{generator}' produced no usable output in {dir}")]
    GeneratorOutputMissing { generator: String, dir: String },

    #[error("generator output written to {actual}, expected {expected}")]
    ToolchainLocationMismatch { expected: String, actual: String },

    #[error("resolution service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed dependency graph: {0}")]
    MalformedGraph(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configure step failed\n{diagnostics}")]
    ConfigureFailed { diagnostics: String },

    #[error("build step failed\n{diagnostics}")]
    BuildFailed { diagnostics: String },

    #[error("build driver unavailable: {0}")]
    DriverUnavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("build requested before a successful configure")]
    NotConfigured,

    #[error("recipe has already been built")]
    AlreadyBuilt,

    #[error("recipe is in the failed state; start a new build invocation")]
    AlreadyFailed,
}
