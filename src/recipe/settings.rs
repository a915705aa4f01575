use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The four platform classification axes every build is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingsAxis {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingsAxis {
    pub const ALL: [SettingsAxis; 4] = [
        SettingsAxis::Os,
        SettingsAxis::Compiler,
        SettingsAxis::BuildType,
        SettingsAxis::Arch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsAxis::Os => "os",
            SettingsAxis::Compiler => "compiler",
            SettingsAxis::BuildType => "build_type",
            SettingsAxis::Arch => "arch",
        }
    }
}

impl fmt::Display for SettingsAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "os" => Ok(SettingsAxis::Os),
            "compiler" => Ok(SettingsAxis::Compiler),
            "build_type" => Ok(SettingsAxis::BuildType),
            "arch" => Ok(SettingsAxis::Arch),
            other => Err(ConfigError::UnknownSettingsAxis {
                name: other.to_string(),
            }),
        }
    }
}

/// Caller-supplied settings values, not yet validated.
///
/// Values usually come from a profile file with `-s axis=value` overrides
/// layered on top. `sub_settings` carries dotted keys such as
/// `compiler.version` straight through to the resolution service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsProfile {
    pub settings: BTreeMap<SettingsAxis, String>,
    pub sub_settings: BTreeMap<String, String>,
}

impl SettingsProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, axis: SettingsAxis, value: impl Into<String>) -> Self {
        self.settings.insert(axis, value.into());
        self
    }

    pub fn set(&mut self, axis: SettingsAxis, value: impl Into<String>) {
        self.settings.insert(axis, value.into());
    }

    /// Applies a `key=value` override. Axis names go to `settings`, dotted
    /// keys to `sub_settings`; anything else is an unknown axis.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(ConfigError::InvalidOverride {
                assignment: assignment.to_string(),
            });
        };
        let key = key.trim();
        if key.contains('.') {
            self.sub_settings
                .insert(key.to_string(), value.trim().to_string());
        } else {
            self.settings.insert(key.parse()?, value.trim().to_string());
        }
        Ok(())
    }

    /// Overlays `other` on top of `self`.
    pub fn merge(&mut self, other: SettingsProfile) {
        self.settings.extend(other.settings);
        self.sub_settings.extend(other.sub_settings);
    }

    /// Binds the profile for one build. Fails on the first axis (in canonical
    /// order) that is absent or blank.
    pub fn bind(&self) -> Result<Settings, ConfigError> {
        let value = |axis: SettingsAxis| match self.settings.get(&axis).map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ConfigError::MissingSetting { axis }),
        };
        Ok(Settings {
            os: value(SettingsAxis::Os)?,
            compiler: value(SettingsAxis::Compiler)?,
            build_type: value(SettingsAxis::BuildType)?,
            arch: value(SettingsAxis::Arch)?,
            sub_settings: self.sub_settings.clone(),
        })
    }
}

/// Bound settings for one build. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    os: String,
    compiler: String,
    build_type: String,
    arch: String,
    sub_settings: BTreeMap<String, String>,
}

impl Settings {
    pub fn get(&self, axis: SettingsAxis) -> &str {
        match axis {
            SettingsAxis::Os => &self.os,
            SettingsAxis::Compiler => &self.compiler,
            SettingsAxis::BuildType => &self.build_type,
            SettingsAxis::Arch => &self.arch,
        }
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn sub_settings(&self) -> &BTreeMap<String, String> {
        &self.sub_settings
    }

    /// All `key=value` pairs in a stable order, axes first.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = SettingsAxis::ALL
            .iter()
            .map(|axis| (axis.to_string(), self.get(*axis).to_string()))
            .collect();
        pairs.extend(
            self.sub_settings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }
}
