//! phasemap - production phase tracking overlay for CAD models
//!
//! Maps per-part production tracking rows (which phase of completion each
//! part has reached) onto the objects of a loaded CAD scene by color:
//! - Phase definitions with display colors, in progression order
//! - Phase aggregation: per-unit phase, per-phase counts, "not started",
//!   percentage breakdowns (cumulative or exclusive counting)
//! - Scene coloring by part identifier (PID) stored in object user strings
//! - JSON loaders for tracking rows, scenes and phase files
//! - rc-file configuration and the `phasemap` command line
//!
//! # Example
//!
//! ```
//! use phasemap::aggregate::{classify, percentages, ClassifyOptions};
//! use phasemap::models::{PhaseDefinition, UnitRecord};
//! use serde_json::json;
//!
//! let records = vec![
//!     UnitRecord::new(Some("1")).with("Released", json!("2024-08-01")),
//!     UnitRecord::new(Some("2")),
//! ];
//! let result = classify(&records, &PhaseDefinition::production(), ClassifyOptions::default());
//! assert_eq!(result.count("Released"), 1);
//! assert_eq!(result.not_started, 1);
//! assert_eq!(percentages(&result).not_started, 50.0);
//! ```

pub mod aggregate;
pub mod binder;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod utils;
