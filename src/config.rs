//! `kiln.toml` manifest parsing.
//!
//! A manifest holds one `[recipe.<name>]` table per project. Recipe names are
//! kept in a `BTreeMap` so listings come out in a stable order.

use crate::declarations;
use crate::error::ConfigError;
use crate::recipe::{Recipe, RequirementDecl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_FILE: &str = "kiln.toml";

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct Manifest {
    #[serde(default, rename = "recipe")]
    pub recipes: BTreeMap<String, RecipeDecl>,
}

/// One recipe as written by an operator.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct RecipeDecl {
    /// Project source directory, relative to the manifest. Defaults to the recipe name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    pub settings: Vec<String>,
    pub generators: Vec<String>,
    #[serde(default)]
    pub requires: Vec<RequirementDecl>,
    /// CMake generator passed as `-G` (e.g. "Ninja")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_generator: Option<String>,
}

/// A manifest plus the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub manifest: Manifest,
    /// True when no `kiln.toml` was found and the built-in declarations are in use.
    pub builtin: bool,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Manifest(format!("invalid {}: {}", MANIFEST_FILE, e)))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Manifest(e.to_string()))
    }

    /// The Multor and Compressor recipes this tool ships with.
    pub fn builtin() -> Self {
        let mut recipes = BTreeMap::new();
        recipes.insert("compressor".to_string(), declarations::compressor());
        recipes.insert("multor".to_string(), declarations::multor());
        Self { recipes }
    }
}

impl Workspace {
    /// Loads `kiln.toml` from `root`, falling back to the built-in recipes.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            debug!("{} not found in {}, using built-in recipes", MANIFEST_FILE, root.display());
            return Ok(Self {
                root: root.to_path_buf(),
                manifest: Manifest::builtin(),
                builtin: true,
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Manifest(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(Self {
            root: root.to_path_buf(),
            manifest: Manifest::parse(&content)?,
            builtin: false,
        })
    }

    pub fn recipe_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.recipes.keys().map(String::as_str)
    }

    /// Validates one recipe by name.
    pub fn recipe(&self, name: &str) -> Result<Recipe, ConfigError> {
        let decl = self
            .manifest
            .recipes
            .get(name)
            .ok_or_else(|| ConfigError::UnknownRecipe {
                name: name.to_string(),
            })?;
        Recipe::from_declaration(name, decl, &self.root)
    }

    /// Validates every recipe, stopping at the first configuration error.
    pub fn recipes(&self) -> Result<Vec<Recipe>, ConfigError> {
        self.recipe_names().map(|name| self.recipe(name)).collect()
    }
}
