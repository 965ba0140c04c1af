// Output formatting utilities

use crate::aggregate::{format_percentage, round2, AggregationResult, PercentageView};
use crate::binder::{Binding, UnitView};
use crate::models::{PhaseDefinition, Rgb, NOT_STARTED};
use serde_json::{json, Map, Value};
use std::io::IsTerminal;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_BLACK: &str = "\x1b[30m";
const ANSI_FG_WHITE: &str = "\x1b[37m";

const BAR_FULL: char = '#';
const BAR_EMPTY: char = '.';

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(80)
}

fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Truecolor swatch showing the hex code, with black or white text for contrast
pub fn color_swatch(color: Rgb, use_color: bool) -> String {
    let label = color.to_hex_string();
    if !use_color {
        return label;
    }
    let fg = if color.is_light() { ANSI_FG_BLACK } else { ANSI_FG_WHITE };
    format!(
        "\x1b[48;2;{};{};{}m{} {} {}",
        color.r, color.g, color.b, fg, label, ANSI_RESET
    )
}

/// Width a swatch occupies on screen
fn swatch_width(use_color: bool) -> usize {
    if use_color {
        9
    } else {
        7
    }
}

/// Horizontal bar for a 0..=100 percentage
pub fn percentage_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width);
    bar.extend(std::iter::repeat(BAR_FULL).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    bar
}

fn phase_name_width(definition: &PhaseDefinition) -> usize {
    definition
        .phases()
        .iter()
        .map(|p| p.name.chars().count())
        .chain(std::iter::once(NOT_STARTED.len()))
        .max()
        .unwrap_or(NOT_STARTED.len())
}

/// Legend of the phase definition, least advanced first
pub fn format_phase_legend(definition: &PhaseDefinition, neutral: Rgb, use_color: bool) -> String {
    let name_width = phase_name_width(definition);
    let mut out = String::new();

    let header = format!(
        "{:<3} {:<name_width$} {:<sw$} {}",
        "#",
        "Phase",
        "Color",
        "Column",
        sw = swatch_width(use_color),
    );
    out.push_str(&bold_if_tty(header.trim_end(), use_color));
    out.push('\n');

    for (idx, phase) in definition.phases().iter().enumerate() {
        let column = if phase.column() == phase.name { "" } else { phase.column() };
        let line = format!(
            "{:<3} {:<name_width$} {} {}",
            idx + 1,
            phase.name,
            color_swatch(phase.color, use_color),
            column
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let line = format!(
        "{:<3} {:<name_width$} {}",
        "-",
        NOT_STARTED,
        color_swatch(neutral, use_color)
    );
    out.push_str(&line);
    out.push('\n');
    out
}

/// Legend table with counts, percentages and bars
pub fn format_report(
    result: &AggregationResult,
    view: &PercentageView,
    definition: &PhaseDefinition,
    neutral: Rgb,
    use_color: bool,
    terminal_width: usize,
) -> String {
    let name_width = phase_name_width(definition);
    let count_width = result.total_units.to_string().len().max(5);
    let fixed = swatch_width(use_color) + 1 + name_width + 1 + count_width + 1 + 8 + 1;
    let bar_width = terminal_width.saturating_sub(fixed).clamp(10, 40);

    let mut out = String::new();
    let header = format!(
        "{:<sw$} {:<name_width$} {:>count_width$} {:>8} {}",
        "Color",
        "Phase",
        "Units",
        "Percent",
        "Progress",
        sw = swatch_width(use_color),
    );
    out.push_str(&bold_if_tty(&header, use_color));
    out.push('\n');
    out.push_str(&"-".repeat(fixed + bar_width));
    out.push('\n');

    let mut push_row = |color: Rgb, name: &str, count: usize, percentage: f64| {
        out.push_str(&format!(
            "{} {:<name_width$} {:>count_width$} {:>8} {}\n",
            color_swatch(color, use_color),
            name,
            count,
            format_percentage(percentage),
            percentage_bar(percentage, bar_width),
        ));
    };

    for (phase, count) in definition.phases().iter().zip(&result.phase_counts) {
        push_row(phase.color, &phase.name, count.count, view.get(&phase.name));
    }
    push_row(neutral, NOT_STARTED, result.not_started, view.not_started);

    out.push('\n');
    out.push_str(&format!(
        "Total units: {} ({} rows, {} started)\n",
        result.total_units, result.record_count, result.units_reached
    ));
    if result.policy.is_exclusive() {
        out.push_str("Policy: exclusive (each unit counted once, at its most advanced phase)\n");
    } else {
        out.push_str(
            "Policy: cumulative (units count toward every phase reached; phase counts overlap)\n",
        );
    }
    out
}

/// Ordered phase -> value object (serde_json is built with preserve_order)
fn ordered_map<T: Into<Value>>(entries: impl IntoIterator<Item = (String, T)>) -> Value {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key, value.into());
    }
    Value::Object(map)
}

/// Report payload consumed by the legend and scene collaborators
pub fn report_json(result: &AggregationResult, view: &PercentageView) -> Value {
    json!({
        "phaseCounts": ordered_map(result.phase_counts.iter().map(|c| (c.phase.clone(), c.count))),
        "totalUnits": result.total_units,
        "notStarted": result.not_started,
        "notStartedPercentage": round2(view.not_started),
        "percentages": ordered_map(
            view.phases.iter().map(|p| (p.phase.clone(), round2(p.percentage)))
        ),
        "policy": result.policy.as_str(),
        "unitsReached": result.units_reached,
        "recordCount": result.record_count,
        "generatedAt": chrono::Utc::now().to_rfc3339(),
    })
}

fn short_id(id: &uuid::Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(2)).collect();
        format!("{}..", kept)
    }
}

/// Per-object color table
pub fn format_binding(binding: &Binding, use_color: bool) -> String {
    let mut out = String::new();
    let header = format!(
        "{:<8} {:<24} {:<12} {:<24} {}",
        "ID", "Name", "PID", "Phase", "Color"
    );
    out.push_str(&bold_if_tty(&header, use_color));
    out.push('\n');

    for object in &binding.objects {
        let phase = object.phase.as_deref().unwrap_or("(no data)");
        out.push_str(&format!(
            "{:<8} {:<24} {:<12} {:<24} {}\n",
            short_id(&object.id),
            truncate(object.name.as_deref().unwrap_or(""), 24),
            truncate(object.pid.as_deref().unwrap_or("-"), 12),
            truncate(phase, 24),
            color_swatch(object.color, use_color),
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "{} object(s) matched, {} without data\n",
        binding.matched_objects, binding.unmatched_objects
    ));
    if !binding.unmatched_pids.is_empty() {
        let pids: Vec<&str> = binding.unmatched_pids.iter().map(String::as_str).collect();
        out.push_str(&format!("PIDs not found in scene: {}\n", pids.join(", ")));
    }
    out
}

pub fn binding_json(binding: &Binding) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(binding)?)
}

/// Inspector view for a single unit
pub fn format_unit_view(view: &UnitView<'_>, use_color: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty(&format!("PID {}", view.pid), use_color));
    out.push('\n');
    out.push_str(&format!("  Phase:    {} {}\n", view.phase, color_swatch(view.color, use_color)));
    if view.reached.is_empty() {
        out.push_str("  Reached:  none\n");
    } else {
        out.push_str(&format!("  Reached:  {}\n", view.reached.join(" > ")));
    }

    if view.objects.is_empty() {
        out.push_str("  Objects:  none in scene\n");
    } else {
        out.push_str(&format!("  Objects:  {}\n", view.objects.len()));
        for object in &view.objects {
            let mut line = format!("    {}", object.id);
            if let Some(name) = &object.name {
                line.push_str(&format!("  {}", name));
            }
            if let Some(layer) = &object.layer {
                line.push_str(&format!("  [{}]", layer));
            }
            if let Some(color) = object.color {
                line.push_str(&format!("  model {}", color_swatch(color, use_color)));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{classify, percentages, ClassifyOptions};
    use crate::models::{Policy, UnitRecord};

    fn sample() -> (AggregationResult, PercentageView, PhaseDefinition) {
        let def = PhaseDefinition::production();
        let records = vec![
            UnitRecord::new(Some("1")).with("Released", json!(true)),
            UnitRecord::new(Some("2")).with("Panel Installed", json!(true)),
            UnitRecord::new(Some("3")),
            UnitRecord::new(Some("4")),
        ];
        let options = ClassifyOptions {
            policy: Policy::Exclusive,
            total_units: None,
        };
        let result = classify(&records, &def, options);
        let view = percentages(&result);
        (result, view, def)
    }

    #[test]
    fn test_percentage_bar() {
        assert_eq!(percentage_bar(50.0, 10), "#####.....");
        assert_eq!(percentage_bar(0.0, 4), "....");
        assert_eq!(percentage_bar(100.0, 4), "####");
        assert_eq!(percentage_bar(250.0, 4), "####");
    }

    #[test]
    fn test_color_swatch() {
        assert_eq!(color_swatch(Rgb::from_hex(0xFFA500), false), "#FFA500");
        let colored = color_swatch(Rgb::from_hex(0x0000FF), true);
        assert!(colored.starts_with("\x1b[48;2;0;0;255m"));
        assert!(colored.contains(ANSI_FG_WHITE));
        assert!(colored.ends_with(ANSI_RESET));
    }

    #[test]
    fn test_format_report_plain() {
        let (result, view, def) = sample();
        let text = format_report(&result, &view, &def, Rgb::NEUTRAL, false, 100);
        assert!(text.contains("Released"));
        assert!(text.contains("25.00%"));
        assert!(text.contains("Not Started"));
        assert!(text.contains("50.00%"));
        assert!(text.contains("Total units: 4"));
        assert!(text.contains("Policy: exclusive"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_report_json_keeps_phase_order() {
        let (result, view, _) = sample();
        let value = report_json(&result, &view);
        let keys: Vec<&String> = value["phaseCounts"].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "Released");
        assert_eq!(keys[6], "Panel Turned Over");
        assert_eq!(value["totalUnits"], 4);
        assert_eq!(value["notStarted"], 2);
        assert_eq!(value["notStartedPercentage"], 50.0);
        assert_eq!(value["percentages"]["Released"], 25.0);
    }

    #[test]
    fn test_format_phase_legend() {
        let text = format_phase_legend(&PhaseDefinition::legacy(), Rgb::NEUTRAL, false);
        assert!(text.contains("On Site"));
        assert!(text.contains("OnSite"));
        assert!(text.contains("#808080"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long panel name", 10), "a very l..");
    }
}
