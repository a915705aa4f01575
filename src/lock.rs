use crate::recipe::{Recipe, Settings};
use crate::resolve::{Resolution, ResolvedPackage};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const LOCK_FILE: &str = "kiln.lock";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct LockFile {
    #[serde(default, rename = "recipe")]
    pub recipes: BTreeMap<String, RecipeLock>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeLock {
    /// Settings the packages were resolved for
    pub settings: BTreeMap<String, String>,
    #[serde(default, rename = "package")]
    pub packages: BTreeMap<String, PackageLock>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PackageLock {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// A lockfile entry that no longer matches the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    MissingRecipe { recipe: String },
    MissingPackage { recipe: String, name: String },
    VersionMismatch {
        recipe: String,
        name: String,
        declared: String,
        locked: String,
    },
}

impl std::fmt::Display for Drift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Drift::MissingRecipe { recipe } => write!(f, "recipe '{}' is not locked", recipe),
            Drift::MissingPackage { recipe, name } => {
                write!(f, "{}: '{}' missing from {}", recipe, name, LOCK_FILE)
            }
            Drift::VersionMismatch {
                recipe,
                name,
                declared,
                locked,
            } => write!(
                f,
                "{}: '{}' declared {} but locked {}",
                recipe, name, declared, locked
            ),
        }
    }
}

impl LockFile {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE);
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(root.join(LOCK_FILE), content)?;
        Ok(())
    }

    pub fn get(&self, recipe: &str, package: &str) -> Option<&PackageLock> {
        self.recipes.get(recipe)?.packages.get(package)
    }

    /// Replaces a recipe's entry with a fresh resolution.
    pub fn record(&mut self, recipe: &str, settings: &Settings, resolution: &Resolution) {
        let packages = resolution
            .packages
            .iter()
            .map(|ResolvedPackage { name, version, revision }| {
                (
                    name.clone(),
                    PackageLock {
                        version: version.clone(),
                        revision: revision.clone(),
                    },
                )
            })
            .collect();
        self.recipes.insert(
            recipe.to_string(),
            RecipeLock {
                settings: settings.pairs().into_iter().collect(),
                packages,
            },
        );
    }

    /// Active requirements of `recipe` that are unlocked or locked at another version.
    pub fn check(&self, recipe: &Recipe) -> Vec<Drift> {
        let recipe_name = recipe.name().to_string();
        let Some(locked) = self.recipes.get(recipe.name()) else {
            return vec![Drift::MissingRecipe {
                recipe: recipe_name,
            }];
        };

        recipe
            .active_requirements()
            .filter_map(|req| match locked.packages.get(&req.name) {
                None => Some(Drift::MissingPackage {
                    recipe: recipe_name.clone(),
                    name: req.name.clone(),
                }),
                Some(pkg) if pkg.version != req.version => Some(Drift::VersionMismatch {
                    recipe: recipe_name.clone(),
                    name: req.name.clone(),
                    declared: req.version.clone(),
                    locked: pkg.version.clone(),
                }),
                Some(_) => None,
            })
            .collect()
    }
}
