use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::models::Rgb;

/// A renderable object of the loaded CAD model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
    /// Display color from the model file
    #[serde(default)]
    pub color: Option<Rgb>,
    #[serde(default, deserialize_with = "deserialize_user_strings")]
    pub user_strings: HashMap<String, String>,
}

impl SceneObject {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            layer: None,
            color: None,
            user_strings: HashMap::new(),
        }
    }

    pub fn with_user_string(mut self, key: &str, value: &str) -> Self {
        self.user_strings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Identifier stored under `field`, if any
    pub fn pid(&self, field: &str) -> Option<&str> {
        self.user_strings
            .get(field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// CAD files store user strings as ordered pairs; accept that or a plain map.
/// Repeated keys keep the first value, as a front-to-back lookup would.
fn deserialize_user_strings<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Pairs(Vec<(String, String)>),
        Map(HashMap<String, String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => HashMap::new(),
        Some(Raw::Map(map)) => map,
        Some(Raw::Pairs(pairs)) => {
            let mut map = HashMap::with_capacity(pairs.len());
            for (key, value) in pairs {
                map.entry(key).or_insert(value);
            }
            map
        }
    })
}

/// Flattened object list of a loaded model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    /// Distinct identifiers present in the model
    pub fn pids(&self, field: &str) -> BTreeSet<&str> {
        self.objects.iter().filter_map(|o| o.pid(field)).collect()
    }

    /// Number of tracked units in the model (distinct PIDs)
    pub fn unit_count(&self, field: &str) -> usize {
        self.pids(field).len()
    }
}
