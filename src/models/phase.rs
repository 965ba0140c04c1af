use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Rgb;

/// Label shown for units that reached no phase
pub const NOT_STARTED: &str = "Not Started";

/// A named production milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub color: Rgb,
    /// Record field this phase is read from (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl Phase {
    pub fn new(name: &str, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            color,
            column: None,
        }
    }

    pub fn with_column(name: &str, column: &str, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            color,
            column: Some(column.to_string()),
        }
    }

    /// Field name looked up in each record
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseDefinitionError {
    #[error("phase definition has no phases")]
    Empty,

    #[error("phase name cannot be empty")]
    EmptyName,

    #[error("duplicate phase name: '{0}'")]
    DuplicateName(String),

    #[error("duplicate phase column: '{0}'")]
    DuplicateColumn(String),

    #[error("'{0}' is reserved for units without a phase")]
    ReservedName(String),
}

/// Ordered list of phases, least advanced first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseDefinition {
    phases: Vec<Phase>,
}

impl PhaseDefinition {
    pub fn new(phases: Vec<Phase>) -> Result<Self, PhaseDefinitionError> {
        if phases.is_empty() {
            return Err(PhaseDefinitionError::Empty);
        }

        let mut names = HashSet::new();
        let mut columns = HashSet::new();
        for phase in &phases {
            if phase.name.trim().is_empty() {
                return Err(PhaseDefinitionError::EmptyName);
            }
            if phase.name.eq_ignore_ascii_case(NOT_STARTED) {
                return Err(PhaseDefinitionError::ReservedName(phase.name.clone()));
            }
            if !names.insert(phase.name.as_str()) {
                return Err(PhaseDefinitionError::DuplicateName(phase.name.clone()));
            }
            if !columns.insert(phase.column()) {
                return Err(PhaseDefinitionError::DuplicateColumn(phase.column().to_string()));
            }
        }

        Ok(Self { phases })
    }

    /// Panel production phases tracked by the current sheets
    pub fn production() -> Self {
        Self {
            phases: vec![
                Phase::new("Released", Rgb::from_hex(0xFFA500)),
                Phase::new("Milling Complete", Rgb::from_hex(0xE0B0FF)),
                Phase::new("Panel Assembly Started", Rgb::from_hex(0xFF00FF)),
                Phase::new("Panel Assembly Complete", Rgb::from_hex(0x008000)),
                Phase::new("Panel Stored On Site", Rgb::from_hex(0x20B2AA)),
                Phase::new("Panel Installed", Rgb::from_hex(0x00FFFF)),
                Phase::new("Panel Turned Over", Rgb::from_hex(0x0000FF)),
            ],
        }
    }

    /// Older unit tracking sheets with camel-case column headers
    pub fn legacy() -> Self {
        Self {
            phases: vec![
                Phase::new("Released", Rgb::from_hex(0xFFCC00)),
                Phase::with_column(
                    "Assembly Started",
                    "AssemblyStarted",
                    Rgb::from_hex(0xFF9900),
                ),
                Phase::with_column(
                    "Assembly Finished",
                    "AssemblyFinished",
                    Rgb::from_hex(0x33CC33),
                ),
                Phase::new("Crated", Rgb::from_hex(0x3366FF)),
                Phase::with_column("On Site", "OnSite", Rgb::from_hex(0x9900CC)),
                Phase::new("Installed", Rgb::from_hex(0x0099CC)),
            ],
        }
    }

    /// Look up a built-in definition by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "production" => Some(Self::production()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }

    pub const PRESETS: &'static [&'static str] = &["production", "legacy"];

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.phases.iter().any(|p| p.column() == column)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.column()).collect()
    }
}

/// How units are counted toward phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// A unit counts toward every phase it reached
    #[default]
    Cumulative,
    /// A unit counts toward its most advanced phase only
    Exclusive,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Cumulative => "cumulative",
            Policy::Exclusive => "exclusive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cumulative" => Some(Policy::Cumulative),
            "exclusive" => Some(Policy::Exclusive),
            _ => None,
        }
    }

    /// Whether phase counts of one result are mutually exclusive
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Policy::Exclusive)
    }
}
