//! Settings profiles.
//!
//! Profiles are TOML files with a `[settings]` table for the four axes and an
//! optional `[sub_settings]` table passed through to the resolution service.
//! Named profiles live in `~/.kiln/profiles/<name>.toml`.

use crate::error::ConfigError;
use crate::recipe::{SettingsAxis, SettingsProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    settings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    sub_settings: BTreeMap<String, String>,
}

pub fn profiles_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kiln").join("profiles"))
}

pub fn parse_profile(content: &str) -> Result<SettingsProfile, ConfigError> {
    let file: ProfileFile = toml::from_str(content)
        .map_err(|e| ConfigError::Profile(format!("invalid profile: {}", e)))?;

    let mut profile = SettingsProfile::new();
    for (key, value) in file.settings {
        profile.set(key.parse::<SettingsAxis>()?, value);
    }
    profile.sub_settings = file.sub_settings;
    Ok(profile)
}

pub fn to_toml(profile: &SettingsProfile) -> Result<String, ConfigError> {
    let file = ProfileFile {
        settings: profile
            .settings
            .iter()
            .map(|(axis, value)| (axis.to_string(), value.clone()))
            .collect(),
        sub_settings: profile.sub_settings.clone(),
    };
    toml::to_string_pretty(&file).map_err(|e| ConfigError::Profile(e.to_string()))
}

pub fn load_profile_file(path: &Path) -> Result<SettingsProfile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::Profile(format!("failed to read profile {}: {}", path.display(), e))
    })?;
    parse_profile(&content)
}

/// Finds a profile by path or by name.
///
/// `None` means the `default` profile if it exists, otherwise an empty one.
/// An explicitly requested profile that cannot be found is an error.
pub fn load_profile(requested: Option<&str>) -> Result<SettingsProfile, ConfigError> {
    load_profile_in(requested, profiles_dir().as_deref())
}

pub fn load_profile_in(
    requested: Option<&str>,
    dir: Option<&Path>,
) -> Result<SettingsProfile, ConfigError> {
    if let Some(req) = requested {
        let as_path = Path::new(req);
        if as_path.is_file() {
            return load_profile_file(as_path);
        }
    }

    let name = requested.unwrap_or(DEFAULT_PROFILE);
    let candidate = dir.map(|d| d.join(format!("{}.toml", name)));
    match candidate {
        Some(path) if path.is_file() => {
            debug!("using profile {}", path.display());
            load_profile_file(&path)
        }
        _ if requested.is_some() => Err(ConfigError::Profile(format!(
            "profile '{}' not found",
            name
        ))),
        _ => Ok(SettingsProfile::new()),
    }
}

pub fn save_profile(name: &str, profile: &SettingsProfile) -> Result<PathBuf, ConfigError> {
    let dir = profiles_dir()
        .ok_or_else(|| ConfigError::Profile("could not find home directory".to_string()))?;
    save_profile_in(&dir, name, profile)
}

pub fn save_profile_in(
    dir: &Path,
    name: &str,
    profile: &SettingsProfile,
) -> Result<PathBuf, ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::Profile(format!("failed to write profile: {}", e));
    fs::create_dir_all(dir).map_err(io_err)?;
    let path = dir.join(format!("{}.toml", name));
    fs::write(&path, to_toml(profile)?).map_err(io_err)?;
    Ok(path)
}
