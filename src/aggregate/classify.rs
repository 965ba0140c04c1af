use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{PhaseDefinition, Policy, UnitRecord, NOT_STARTED};

/// Number of units counted toward one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseCount {
    pub phase: String,
    pub count: usize,
}

/// Classification of a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitPhase {
    pub pid: Option<String>,
    /// Every phase the record marks as reached, least advanced first
    pub reached: Vec<String>,
    /// Most advanced phase reached (the phase used for coloring)
    pub phase: Option<String>,
}

impl UnitPhase {
    pub fn label(&self) -> &str {
        self.phase.as_deref().unwrap_or(NOT_STARTED)
    }

    pub fn is_started(&self) -> bool {
        self.phase.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub policy: Policy,
    /// Units tracked overall; may exceed the number of rows
    pub total_units: Option<usize>,
}

/// Phase statistics for one set of records.
///
/// Every record counts as one unit, so rows sharing a PID are counted
/// separately here while scene binding keeps only the last of them.
///
/// Under [`Policy::Cumulative`] a unit is counted once for every phase it
/// reached, so `phase_counts` do not sum to `units_reached`. Under
/// [`Policy::Exclusive`] they do, and `phase counts + not_started == total_units`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub policy: Policy,
    /// In phase order, one entry per defined phase
    pub phase_counts: Vec<PhaseCount>,
    pub total_units: usize,
    pub record_count: usize,
    /// Units that reached at least one phase
    pub units_reached: usize,
    pub not_started: usize,
    pub units: Vec<UnitPhase>,
    /// Record fields that are neither the PID nor a phase column
    pub unrecognized_columns: BTreeSet<String>,
}

impl AggregationResult {
    pub fn count(&self, phase: &str) -> usize {
        self.phase_counts
            .iter()
            .find(|c| c.phase == phase)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Whether a total override smaller than the row count was raised
    pub fn total_was_raised(&self, requested: Option<usize>) -> bool {
        matches!(requested, Some(t) if t < self.record_count)
    }
}

/// Classify records against an ordered phase definition.
///
/// Never fails: rows without recognized phase columns count as not started.
pub fn classify(
    records: &[UnitRecord],
    definition: &PhaseDefinition,
    options: ClassifyOptions,
) -> AggregationResult {
    let phases = definition.phases();
    let mut counts = vec![0usize; phases.len()];
    let mut units = Vec::with_capacity(records.len());
    let mut unrecognized = BTreeSet::new();

    for record in records {
        for field in record.fields.keys() {
            if !definition.has_column(field) {
                unrecognized.insert(field.clone());
            }
        }

        let reached: Vec<usize> = phases
            .iter()
            .enumerate()
            .filter(|(_, phase)| record.has_reached(phase.column()))
            .map(|(idx, _)| idx)
            .collect();

        // Both policies color by the most advanced phase reached
        let current = reached.last().copied();

        match options.policy {
            Policy::Cumulative => {
                for &idx in &reached {
                    counts[idx] += 1;
                }
            }
            Policy::Exclusive => {
                if let Some(idx) = current {
                    counts[idx] += 1;
                }
            }
        }

        units.push(UnitPhase {
            pid: record.pid.clone(),
            reached: reached.iter().map(|&idx| phases[idx].name.clone()).collect(),
            phase: current.map(|idx| phases[idx].name.clone()),
        });
    }

    let record_count = records.len();
    let total_units = options.total_units.unwrap_or(record_count).max(record_count);
    let units_reached = units.iter().filter(|u| u.is_started()).count();

    AggregationResult {
        policy: options.policy,
        phase_counts: phases
            .iter()
            .zip(counts)
            .map(|(phase, count)| PhaseCount {
                phase: phase.name.clone(),
                count,
            })
            .collect(),
        total_units,
        record_count,
        units_reached,
        not_started: total_units - units_reached,
        units,
        unrecognized_columns: unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, Rgb};
    use serde_json::json;

    fn two_phases() -> PhaseDefinition {
        PhaseDefinition::new(vec![
            Phase::new("Released", Rgb::from_hex(0xFFA500)),
            Phase::new("Installed", Rgb::from_hex(0x00FFFF)),
        ])
        .unwrap()
    }

    fn sample_records() -> Vec<UnitRecord> {
        vec![
            UnitRecord::new(Some("1")).with("Released", json!(true)),
            UnitRecord::new(Some("2"))
                .with("Released", json!(true))
                .with("Installed", json!(true)),
            UnitRecord::new(Some("3")),
        ]
    }

    fn options(policy: Policy) -> ClassifyOptions {
        ClassifyOptions { policy, total_units: None }
    }

    fn assert_invariants(result: &AggregationResult) {
        assert_eq!(result.not_started + result.units_reached, result.total_units);
        for count in &result.phase_counts {
            assert!(count.count <= result.total_units, "{} exceeds total", count.phase);
        }
    }

    #[test]
    fn test_exclusive_counts_most_advanced_phase_only() {
        let result = classify(&sample_records(), &two_phases(), options(Policy::Exclusive));
        assert_eq!(result.count("Released"), 1);
        assert_eq!(result.count("Installed"), 1);
        assert_eq!(result.not_started, 1);
        assert_eq!(result.total_units, 3);
        let displayed: usize = result.phase_counts.iter().map(|c| c.count).sum();
        assert_eq!(displayed + result.not_started, result.total_units);
        assert_invariants(&result);
    }

    #[test]
    fn test_cumulative_counts_every_reached_phase() {
        let result = classify(&sample_records(), &two_phases(), options(Policy::Cumulative));
        assert_eq!(result.count("Released"), 2);
        assert_eq!(result.count("Installed"), 1);
        assert_eq!(result.not_started, 1);
        assert_eq!(result.units_reached, 2);
        assert_invariants(&result);
    }

    #[test]
    fn test_unit_phase_is_most_advanced() {
        for policy in [Policy::Cumulative, Policy::Exclusive] {
            let result = classify(&sample_records(), &two_phases(), options(policy));
            assert_eq!(result.units[0].phase.as_deref(), Some("Released"));
            assert_eq!(result.units[1].phase.as_deref(), Some("Installed"));
            assert_eq!(result.units[1].reached, vec!["Released", "Installed"]);
            assert_eq!(result.units[2].phase, None);
            assert_eq!(result.units[2].label(), NOT_STARTED);
        }
    }

    #[test]
    fn test_gap_in_phases_still_uses_most_advanced() {
        let records = vec![UnitRecord::new(Some("9")).with("Installed", json!("2024-09-02"))];
        let result = classify(&records, &two_phases(), options(Policy::Cumulative));
        assert_eq!(result.count("Released"), 0);
        assert_eq!(result.count("Installed"), 1);
        assert_eq!(result.units_reached, 1);
        assert_eq!(result.not_started, 0);
    }

    #[test]
    fn test_unknown_column_counts_as_not_started() {
        let records = vec![UnitRecord::new(Some("4")).with("Foo", json!(true))];
        let result = classify(&records, &two_phases(), options(Policy::Cumulative));
        assert_eq!(result.count("Released"), 0);
        assert_eq!(result.count("Installed"), 0);
        assert!(result.units[0].reached.is_empty());
        assert_eq!(result.not_started, 1);
        assert!(result.unrecognized_columns.contains("Foo"));
        assert_eq!(result.count("Foo"), 0);
    }

    #[test]
    fn test_null_and_empty_cells_not_reached() {
        let records = vec![
            UnitRecord::new(Some("5"))
                .with("Released", json!(""))
                .with("Installed", json!(null)),
        ];
        let result = classify(&records, &two_phases(), options(Policy::Exclusive));
        assert_eq!(result.units_reached, 0);
        assert_eq!(result.not_started, 1);
        assert!(result.unrecognized_columns.is_empty());
    }

    #[test]
    fn test_false_and_blank_cells_are_reached() {
        let records = vec![
            UnitRecord::new(Some("1")).with("Released", json!(false)),
            UnitRecord::new(Some("2")).with("Released", json!("   ")),
        ];
        let result = classify(&records, &two_phases(), ClassifyOptions::default());
        assert_eq!(result.count("Released"), 2);
        assert_eq!(result.not_started, 0);
    }

    #[test]
    fn test_empty_input() {
        let result = classify(&[], &two_phases(), options(Policy::Cumulative));
        assert_eq!(result.total_units, 0);
        assert_eq!(result.not_started, 0);
        assert!(result.phase_counts.iter().all(|c| c.count == 0));
        assert_eq!(result.phase_counts.len(), 2);
    }

    #[test]
    fn test_total_override() {
        let opts = ClassifyOptions { policy: Policy::Cumulative, total_units: Some(10) };
        let result = classify(&sample_records(), &two_phases(), opts);
        assert_eq!(result.total_units, 10);
        assert_eq!(result.record_count, 3);
        assert_eq!(result.not_started, 8);
        assert_invariants(&result);
    }

    #[test]
    fn test_total_override_below_row_count_is_raised() {
        let opts = ClassifyOptions { policy: Policy::Exclusive, total_units: Some(1) };
        let result = classify(&sample_records(), &two_phases(), opts);
        assert_eq!(result.total_units, 3);
        assert!(result.total_was_raised(Some(1)));
        assert!(!result.total_was_raised(Some(3)));
        assert!(!result.total_was_raised(None));
        assert_invariants(&result);
    }

    #[test]
    fn test_rows_sharing_a_pid_count_separately() {
        let records = vec![
            UnitRecord::new(Some("1")).with("Released", json!(true)),
            UnitRecord::new(Some("1")).with("Installed", json!(true)),
        ];
        let result = classify(&records, &two_phases(), options(Policy::Exclusive));
        assert_eq!(result.total_units, 2);
        assert_eq!(result.count("Released"), 1);
        assert_eq!(result.count("Installed"), 1);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let records = sample_records();
        let def = two_phases();
        for policy in [Policy::Cumulative, Policy::Exclusive] {
            let first = classify(&records, &def, options(policy));
            let second = classify(&records, &def, options(policy));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_legacy_columns_are_read() {
        let def = PhaseDefinition::legacy();
        let records = vec![
            UnitRecord::new(Some("A1"))
                .with("Released", json!(true))
                .with("AssemblyStarted", json!(true))
                .with("OnSite", json!(true)),
            UnitRecord::new(Some("A2")).with("Crated", json!(1)),
        ];
        let result = classify(&records, &def, options(Policy::Exclusive));
        assert_eq!(result.count("On Site"), 1);
        assert_eq!(result.count("Crated"), 1);
        assert_eq!(result.count("Released"), 0);
        assert_eq!(result.units[0].phase.as_deref(), Some("On Site"));
    }

    #[test]
    fn test_counts_bounded_by_total_on_full_production_sheet() {
        let def = PhaseDefinition::production();
        let mut records = Vec::new();
        for i in 0..20 {
            let mut record = UnitRecord::new(Some(i.to_string().as_str()));
            for phase in def.phases().iter().take(i % 8) {
                record = record.with(phase.column(), json!("x"));
            }
            records.push(record);
        }
        for policy in [Policy::Cumulative, Policy::Exclusive] {
            let result = classify(&records, &def, options(policy));
            assert_invariants(&result);
        }
    }
}
