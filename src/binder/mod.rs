//! Applies phase colors to scene objects by matching part identifiers.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::aggregate::{color_for_or, AggregationResult, UnitPhase};
use crate::models::{PhaseDefinition, Rgb, Scene, SceneObject, DEFAULT_PID_FIELD};

/// Color assigned to one scene object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectColoring {
    pub id: Uuid,
    pub name: Option<String>,
    pub pid: Option<String>,
    /// Phase label for matched objects ("Not Started" when no phase reached)
    pub phase: Option<String>,
    pub color: Rgb,
    /// Color from the model file, restored when leaving the phase view
    pub model_color: Option<Rgb>,
    pub matched: bool,
}

/// Outcome of coloring a whole scene
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub objects: Vec<ObjectColoring>,
    /// PIDs present in the data but absent from the scene
    pub unmatched_pids: BTreeSet<String>,
    /// PIDs that appear on more than one row; the last row wins
    pub duplicate_pids: BTreeSet<String>,
    pub matched_objects: usize,
    pub unmatched_objects: usize,
}

/// One unit as seen from the object inspector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView<'a> {
    pub pid: String,
    pub phase: String,
    pub reached: Vec<String>,
    pub color: Rgb,
    pub objects: Vec<&'a SceneObject>,
}

pub struct SceneColorBinder<'a> {
    definition: &'a PhaseDefinition,
    pid_field: String,
    neutral: Rgb,
}

impl<'a> SceneColorBinder<'a> {
    pub fn new(definition: &'a PhaseDefinition) -> Self {
        Self {
            definition,
            pid_field: DEFAULT_PID_FIELD.to_string(),
            neutral: Rgb::NEUTRAL,
        }
    }

    pub fn with_pid_field(mut self, field: &str) -> Self {
        self.pid_field = field.to_string();
        self
    }

    pub fn with_neutral(mut self, neutral: Rgb) -> Self {
        self.neutral = neutral;
        self
    }

    /// Display color for a phase label
    pub fn color_for(&self, phase: Option<&str>) -> Rgb {
        color_for_or(phase, self.definition, self.neutral)
    }

    /// Color every object of `scene` from the classified units in `result`
    pub fn bind(&self, scene: &Scene, result: &AggregationResult) -> Binding {
        let (index, duplicate_pids) = index_units(&result.units);

        let mut objects = Vec::with_capacity(scene.objects.len());
        let mut seen = BTreeSet::new();
        for object in &scene.objects {
            let pid = object.pid(&self.pid_field);
            let unit = pid.and_then(|p| index.get(p));

            let coloring = match unit {
                Some(unit) => {
                    seen.insert(pid.unwrap_or_default().to_string());
                    ObjectColoring {
                        id: object.id,
                        name: object.name.clone(),
                        pid: unit.pid.clone(),
                        phase: Some(unit.label().to_string()),
                        color: self.color_for(unit.phase.as_deref()),
                        model_color: object.color,
                        matched: true,
                    }
                }
                None => ObjectColoring {
                    id: object.id,
                    name: object.name.clone(),
                    pid: pid.map(|p| p.to_string()),
                    phase: None,
                    color: self.neutral,
                    model_color: object.color,
                    matched: false,
                },
            };
            objects.push(coloring);
        }

        let unmatched_pids: BTreeSet<String> = index
            .keys()
            .filter(|pid| !seen.contains(**pid))
            .map(|pid| pid.to_string())
            .collect();

        for pid in &duplicate_pids {
            log::warn!("PID {} appears on more than one row; using the last row", pid);
        }
        if !unmatched_pids.is_empty() {
            log::warn!("{} PID(s) in the data have no object in the scene", unmatched_pids.len());
        }

        let matched_objects = objects.iter().filter(|o| o.matched).count();
        log::debug!(
            "colored {} of {} scene objects",
            matched_objects,
            objects.len()
        );

        Binding {
            unmatched_objects: objects.len() - matched_objects,
            matched_objects,
            objects,
            unmatched_pids,
            duplicate_pids,
        }
    }

    /// Inspector view of one unit; `None` when the PID is not in the data
    pub fn lookup<'s>(
        &self,
        pid: &str,
        scene: &'s Scene,
        result: &AggregationResult,
    ) -> Option<UnitView<'s>> {
        let pid = pid.trim();
        let unit = result
            .units
            .iter()
            .rev()
            .find(|u| u.pid.as_deref() == Some(pid))?;

        Some(UnitView {
            pid: pid.to_string(),
            phase: unit.label().to_string(),
            reached: unit.reached.clone(),
            color: self.color_for(unit.phase.as_deref()),
            objects: scene
                .objects
                .iter()
                .filter(|o| o.pid(&self.pid_field) == Some(pid))
                .collect(),
        })
    }
}

/// PID -> unit, last row winning, plus the PIDs seen more than once
fn index_units(units: &[UnitPhase]) -> (HashMap<&str, &UnitPhase>, BTreeSet<String>) {
    let mut index = HashMap::with_capacity(units.len());
    let mut duplicates = BTreeSet::new();
    let mut without_pid = 0usize;

    for unit in units {
        match unit.pid.as_deref() {
            Some(pid) => {
                if index.insert(pid, unit).is_some() {
                    duplicates.insert(pid.to_string());
                }
            }
            None => without_pid += 1,
        }
    }

    if without_pid > 0 {
        log::warn!("{} row(s) have no PID and cannot be matched to the scene", without_pid);
    }

    (index, duplicates)
}
