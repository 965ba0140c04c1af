use serde::Serialize;

use crate::aggregate::AggregationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasePercentage {
    pub phase: String,
    pub percentage: f64,
}

/// Share of total units per phase and for "not started"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageView {
    pub phases: Vec<PhasePercentage>,
    pub not_started: f64,
}

impl PercentageView {
    pub fn get(&self, phase: &str) -> f64 {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .map(|p| p.percentage)
            .unwrap_or(0.0)
    }
}

/// `count / total * 100`, or 0 when there are no units
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn percentages(result: &AggregationResult) -> PercentageView {
    PercentageView {
        phases: result
            .phase_counts
            .iter()
            .map(|c| PhasePercentage {
                phase: c.phase.clone(),
                percentage: percentage(c.count, result.total_units),
            })
            .collect(),
        not_started: percentage(result.not_started, result.total_units),
    }
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}
