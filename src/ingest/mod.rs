//! Loaders for the JSON handed over by the spreadsheet and CAD collaborators.

pub mod errors;

pub use errors::LoadError;

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::models::{Phase, PhaseDefinition, Scene, UnitRecord};

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse tracking rows: a JSON array of header -> cell objects
pub fn parse_records(json: &str, pid_field: &str) -> Result<Vec<UnitRecord>, LoadError> {
    let rows: Vec<Value> = serde_json::from_str(json).map_err(|e| LoadError::Parse {
        what: "rows",
        reason: e.to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        match row {
            Value::Object(map) => records.push(UnitRecord::from_row(map, pid_field)),
            _ => return Err(LoadError::RowNotObject { row: idx + 1 }),
        }
    }

    Ok(records)
}

pub fn load_records(path: &Path, pid_field: &str) -> Result<Vec<UnitRecord>, LoadError> {
    let records = parse_records(&read(path)?, pid_field)?;
    log::debug!("loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_scene(json: &str) -> Result<Scene, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Parse {
        what: "scene",
        reason: e.to_string(),
    })
}

pub fn load_scene(path: &Path) -> Result<Scene, LoadError> {
    let scene = parse_scene(&read(path)?)?;
    log::debug!("loaded {} scene objects from {}", scene.objects.len(), path.display());
    Ok(scene)
}

/// Parse a phase file: `{"phases": [...]}` or a bare array of phases
pub fn parse_phases(json: &str) -> Result<PhaseDefinition, LoadError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PhaseFile {
        Wrapped { phases: Vec<Phase> },
        Bare(Vec<Phase>),
    }

    let phases = match serde_json::from_str::<PhaseFile>(json).map_err(|e| LoadError::Parse {
        what: "phase file",
        reason: e.to_string(),
    })? {
        PhaseFile::Wrapped { phases } => phases,
        PhaseFile::Bare(phases) => phases,
    };

    Ok(PhaseDefinition::new(phases)?)
}

pub fn load_phases(path: &Path) -> Result<PhaseDefinition, LoadError> {
    parse_phases(&read(path)?)
}
