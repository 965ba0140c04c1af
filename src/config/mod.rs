//! rc-file configuration (`~/.phasemap/rc`).
//!
//! ```text
//! # preset name, or path to a phase file
//! phases=legacy
//! policy=exclusive
//! pid.field=PID
//! color.neutral=#808080
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::ingest::{self, LoadError};
use crate::models::{PhaseDefinition, Policy, Rgb, DEFAULT_PID_FIELD};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config line {line}: '{content}' (expected key=value)")]
    InvalidLine { line: usize, content: String },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Where the phase definition comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseSource {
    Preset(String),
    File(PathBuf),
}

impl PhaseSource {
    /// Preset names are taken as-is; anything that looks like a path is a file.
    /// Relative paths resolve against `base` when given.
    pub fn parse(value: &str, base: Option<&Path>) -> Result<Self, String> {
        let value = value.trim();
        if let Some(def) = PhaseDefinition::PRESETS
            .iter()
            .find(|p| p.eq_ignore_ascii_case(value))
        {
            return Ok(PhaseSource::Preset(def.to_string()));
        }

        let looks_like_path = value.ends_with(".json")
            || value.contains('/')
            || value.contains(std::path::MAIN_SEPARATOR);
        if !looks_like_path {
            return Err(format!(
                "unknown phase preset '{}'. Use one of: {}, or a path to a phase file",
                value,
                PhaseDefinition::PRESETS.join(", ")
            ));
        }

        let path = PathBuf::from(value);
        Ok(match base {
            Some(base) if path.is_relative() => PhaseSource::File(base.join(path)),
            _ => PhaseSource::File(path),
        })
    }

    pub fn load(&self) -> Result<PhaseDefinition, LoadError> {
        match self {
            // Names were checked against PRESETS when parsed
            PhaseSource::Preset(name) => {
                Ok(PhaseDefinition::preset(name).unwrap_or_else(PhaseDefinition::production))
            }
            PhaseSource::File(path) => ingest::load_phases(path),
        }
    }
}

impl fmt::Display for PhaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseSource::Preset(name) => write!(f, "{} (preset)", name),
            PhaseSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub phases: PhaseSource,
    pub policy: Policy,
    pub pid_field: String,
    pub neutral: Rgb,
    /// rc file the values were read from, if one existed
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            phases: PhaseSource::Preset("production".to_string()),
            policy: Policy::default(),
            pid_field: DEFAULT_PID_FIELD.to_string(),
            neutral: Rgb::NEUTRAL,
            source: None,
        }
    }
}

impl Config {
    /// `~/.phasemap/rc`
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".phasemap").join("rc"))
    }

    /// Read the rc file if present, otherwise use defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path.parent())?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str, base: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::InvalidLine {
                line: idx + 1,
                content: raw.trim().to_string(),
            })?;
            let key = key.trim();
            let value = value.trim();

            let invalid = |reason: String| ConfigError::InvalidValue {
                key: key.to_string(),
                reason,
            };

            match key {
                "phases" => config.phases = PhaseSource::parse(value, base).map_err(invalid)?,
                "policy" => {
                    config.policy = Policy::from_str(value).ok_or_else(|| {
                        invalid(format!("'{}' (expected cumulative or exclusive)", value))
                    })?
                }
                "pid.field" => {
                    if value.is_empty() {
                        return Err(invalid("PID field cannot be empty".to_string()));
                    }
                    config.pid_field = value.to_string();
                }
                "color.neutral" => config.neutral = Rgb::parse(value).map_err(invalid)?,
                _ => log::warn!("Ignoring unknown config key '{}' on line {}", key, idx + 1),
            }
        }

        Ok(config)
    }

    pub fn phase_definition(&self) -> Result<PhaseDefinition, LoadError> {
        self.phases.load()
    }
}
