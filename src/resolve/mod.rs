//! Resolution service boundary.
//!
//! A [`Resolver`] turns the active requirements, bound settings, and generator
//! list of a recipe into concrete packages, writing generator output into the
//! requested folder. [`ConanResolver`] drives the Conan 2 CLI.

mod conan;

pub use conan::ConanResolver;

use crate::error::ResolveError;
use crate::recipe::{Generator, Requirement, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the resolution service is told about one recipe.
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub recipe: &'a str,
    /// Active requirements only, in declaration order.
    pub requirements: Vec<&'a Requirement>,
    pub settings: &'a Settings,
    pub generators: &'a [Generator],
    pub output_dir: &'a Path,
}

impl ResolveRequest<'_> {
    pub fn references(&self) -> Vec<String> {
        self.requirements.iter().map(|r| r.reference()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    /// Recipe revision reported by the service, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved graph nodes, transitive packages included.
    pub packages: Vec<ResolvedPackage>,
    pub generators_dir: PathBuf,
}

impl Resolution {
    pub fn find(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.iter().find(|p| p.name == name)
    }
}

pub trait Resolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Resolution, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Resolution, ResolveError> {
        (**self).resolve(request)
    }
}
