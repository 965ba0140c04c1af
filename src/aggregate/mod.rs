//! Phase aggregation: per-unit phase determination, per-phase counts,
//! "not started" accounting and percentage breakdowns.
//!
//! Everything here is a pure function of its inputs. [`PhaseTracker`] only
//! keeps the last result around for re-query and replaces it wholesale on
//! every run.

pub mod classify;
pub mod percent;

pub use classify::*;
pub use percent::*;

use crate::models::{PhaseDefinition, Rgb, UnitRecord};

/// Display color of a phase; neutral for "Not Started" and unknown names
pub fn color_for(phase: Option<&str>, definition: &PhaseDefinition) -> Rgb {
    color_for_or(phase, definition, Rgb::NEUTRAL)
}

/// Same as [`color_for`] with a caller-supplied neutral color
pub fn color_for_or(phase: Option<&str>, definition: &PhaseDefinition, neutral: Rgb) -> Rgb {
    phase
        .and_then(|name| definition.get(name))
        .map(|p| p.color)
        .unwrap_or(neutral)
}

/// Holds the result of the most recent classification
#[derive(Debug, Default)]
pub struct PhaseTracker {
    last: Option<AggregationResult>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset, then classify `records` from scratch
    pub fn run(
        &mut self,
        records: &[UnitRecord],
        definition: &PhaseDefinition,
        options: ClassifyOptions,
    ) -> &AggregationResult {
        self.reset();
        self.last.insert(classify(records, definition, options))
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn result(&self) -> Option<&AggregationResult> {
        self.last.as_ref()
    }

    pub fn phase_counts(&self) -> &[PhaseCount] {
        self.last.as_ref().map(|r| r.phase_counts.as_slice()).unwrap_or(&[])
    }

    pub fn total_units(&self) -> usize {
        self.last.as_ref().map(|r| r.total_units).unwrap_or(0)
    }

    pub fn not_started(&self) -> usize {
        self.last.as_ref().map(|r| r.not_started).unwrap_or(0)
    }
}
