//! The recipe aggregate.
//!
//! A [`Recipe`] binds one project's settings axes, generator list, and
//! requirement set. It is built once from a [`RecipeDecl`] and never mutated;
//! every configuration error is raised during that construction, before any
//! external service is contacted.

mod generator;
mod requirement;
mod settings;

pub use generator::{Generator, GeneratorKind, TOOLCHAIN_FILE, parse_generators};
pub use requirement::{Requirement, RequirementDecl, validate_requirements};
pub use settings::{Settings, SettingsAxis, SettingsProfile};

use crate::config::RecipeDecl;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    name: String,
    source_dir: PathBuf,
    settings: Vec<SettingsAxis>,
    generators: Vec<Generator>,
    requirements: Vec<Requirement>,
    cmake_generator: Option<String>,
}

impl Recipe {
    /// Validates a declaration. `root` anchors a relative `source_dir`.
    pub fn from_declaration(
        name: &str,
        decl: &RecipeDecl,
        root: &Path,
    ) -> Result<Self, ConfigError> {
        let mut settings = Vec::with_capacity(decl.settings.len());
        for axis in &decl.settings {
            let axis: SettingsAxis = axis.parse()?;
            if !settings.contains(&axis) {
                settings.push(axis);
            }
        }
        if let Some(axis) = SettingsAxis::ALL.into_iter().find(|a| !settings.contains(a)) {
            return Err(ConfigError::UndeclaredSetting { axis });
        }

        let generators = parse_generators(decl.generators.as_slice())?;

        let declared = decl
            .requires
            .iter()
            .map(RequirementDecl::to_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        let requirements = validate_requirements(declared)?;

        let source_dir = decl
            .source_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(name));

        Ok(Self {
            name: name.to_string(),
            source_dir: root.join(source_dir),
            settings,
            generators,
            requirements,
            cmake_generator: decl.cmake_generator.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn settings(&self) -> &[SettingsAxis] {
        &self.settings
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn cmake_generator(&self) -> Option<&str> {
        self.cmake_generator.as_deref()
    }

    /// Every declared requirement, disabled ones included.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Requirements that take part in resolution, in declaration order.
    pub fn active_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.active)
    }

    pub fn disabled_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| !r.active)
    }

    pub fn build_dir(&self, settings: &Settings) -> PathBuf {
        self.source_dir
            .join("build")
            .join(settings.build_type().to_lowercase())
    }

    /// Where the resolution service writes generator output.
    pub fn generators_dir(&self, settings: &Settings) -> PathBuf {
        self.build_dir(settings).join("generators")
    }
}
