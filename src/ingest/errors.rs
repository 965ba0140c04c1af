use std::path::PathBuf;

use crate::models::PhaseDefinitionError;

/// Errors while reading rows, scenes or phase files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("row {row} is not an object")]
    RowNotObject { row: usize },

    #[error("invalid phase definition: {0}")]
    InvalidPhases(#[from] PhaseDefinitionError),
}
