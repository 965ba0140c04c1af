use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default field carrying the part identifier
pub const DEFAULT_PID_FIELD: &str = "PID";

/// One tracking-sheet row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRecord {
    pub pid: Option<String>,
    /// Remaining cells, keyed by column header
    pub fields: BTreeMap<String, Value>,
}

impl UnitRecord {
    pub fn new(pid: Option<&str>) -> Self {
        Self {
            pid: pid.map(|p| p.to_string()),
            fields: BTreeMap::new(),
        }
    }

    /// Builder used by tests and callers assembling rows by hand
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    /// Split a parsed row into PID and phase cells
    pub fn from_row(row: Map<String, Value>, pid_field: &str) -> Self {
        let mut pid = None;
        let mut fields = BTreeMap::new();

        for (key, value) in row {
            let key = key.trim().to_string();
            if key == pid_field {
                pid = pid_to_string(&value);
            } else if !key.is_empty() {
                fields.insert(key, value);
            }
        }

        Self { pid, fields }
    }

    /// Whether the cell for `column` marks the phase as reached
    pub fn has_reached(&self, column: &str) -> bool {
        self.fields.get(column).map(is_reached).unwrap_or(false)
    }
}

/// A cell counts as reached unless it is null or the empty string
pub fn is_reached(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Normalize a PID cell; integral numbers drop their fraction ("12.0" -> "12")
pub fn pid_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_reached() {
        assert!(!is_reached(&json!(null)));
        assert!(!is_reached(&json!("")));
        // Any other cell marks the phase, whatever it holds
        assert!(is_reached(&json!("   ")));
        assert!(is_reached(&json!(false)));
        assert!(is_reached(&json!([])));
        assert!(is_reached(&json!({})));
        assert!(is_reached(&json!(true)));
        assert!(is_reached(&json!("x")));
        assert!(is_reached(&json!(0)));
        assert!(is_reached(&json!(45123.5)));
        assert!(is_reached(&json!({"richText": "done"})));
    }

    #[test]
    fn test_pid_to_string() {
        assert_eq!(pid_to_string(&json!("P-01 ")), Some("P-01".to_string()));
        assert_eq!(pid_to_string(&json!(12)), Some("12".to_string()));
        assert_eq!(pid_to_string(&json!(12.0)), Some("12".to_string()));
        assert_eq!(pid_to_string(&json!(12.5)), Some("12.5".to_string()));
        assert_eq!(pid_to_string(&json!("")), None);
        assert_eq!(pid_to_string(&json!(null)), None);
        assert_eq!(pid_to_string(&json!(true)), None);
    }

    #[test]
    fn test_from_row() {
        let row = json!({"PID": 7, " Released ": "2024-08-01", "Milling Complete": null});
        let record = UnitRecord::from_row(row.as_object().unwrap().clone(), "PID");
        assert_eq!(record.pid.as_deref(), Some("7"));
        assert!(record.has_reached("Released"));
        assert!(!record.has_reached("Milling Complete"));
        assert!(!record.has_reached("Panel Installed"));
        assert!(!record.fields.contains_key("PID"));
    }

    #[test]
    fn test_custom_pid_field() {
        let row = json!({"Panel ID": "W-3", "PID": "ignored"});
        let record = UnitRecord::from_row(row.as_object().unwrap().clone(), "Panel ID");
        assert_eq!(record.pid.as_deref(), Some("W-3"));
        assert!(record.fields.contains_key("PID"));
    }
}
