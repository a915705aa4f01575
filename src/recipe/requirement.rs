use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_][a-z0-9_.+\-]*)/([^/\s]+)$").expect("static regex")
});

/// A pinned external dependency. Disabled requirements stay in the
/// declaration so tooling can list them, but never reach the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    pub active: bool,
}

impl Requirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            active: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.active = false;
        self
    }

    /// Parses `name/version`.
    pub fn parse(reference: &str) -> Result<Self, ConfigError> {
        let reference = reference.trim();
        let caps = REFERENCE
            .captures(reference)
            .ok_or_else(|| ConfigError::InvalidReference {
                reference: reference.to_string(),
            })?;
        Ok(Self::new(&caps[1], &caps[2]))
    }

    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// How a requirement is written in `kiln.toml`: a bare reference, or a table
/// when it needs to be switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementDecl {
    Simple(String),
    Detailed {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default = "default_active")]
        active: bool,
    },
}

fn default_active() -> bool {
    true
}

impl RequirementDecl {
    pub fn to_requirement(&self) -> Result<Requirement, ConfigError> {
        match self {
            RequirementDecl::Simple(reference) => Requirement::parse(reference),
            RequirementDecl::Detailed { reference, active } => {
                let mut req = Requirement::parse(reference)?;
                req.active = *active;
                Ok(req)
            }
        }
    }
}

impl From<&Requirement> for RequirementDecl {
    fn from(req: &Requirement) -> Self {
        if req.active {
            RequirementDecl::Simple(req.reference())
        } else {
            RequirementDecl::Detailed {
                reference: req.reference(),
                active: false,
            }
        }
    }
}

/// Checks a declared requirement list for conflicts among active entries.
///
/// Declaration order is kept. An active name repeated with the same version
/// collapses to its first occurrence; with a different version it is a
/// conflict reported against the earlier entry.
pub fn validate_requirements(declared: Vec<Requirement>) -> Result<Vec<Requirement>, ConfigError> {
    let mut out: Vec<Requirement> = Vec::with_capacity(declared.len());
    for req in declared {
        if req.active
            && let Some(prev) = out.iter().find(|r| r.active && r.name == req.name)
        {
            if prev.version != req.version {
                return Err(ConfigError::ConflictingRequirement {
                    name: req.name,
                    first: prev.version.clone(),
                    second: req.version,
                });
            }
            debug!("dropping repeated requirement {}", req);
            continue;
        }
        out.push(req);
    }
    Ok(out)
}
