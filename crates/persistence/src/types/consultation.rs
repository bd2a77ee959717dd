//! The consultation record exchanged across the API boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entity name used in alert headers and error payloads.
pub const ENTITY_NAME: &str = "consultationConsultation";

/// A consultation record.
///
/// Only `id` is interpreted by this crate. All other fields are carried as an
/// opaque JSON object and written back exactly as received.
///
/// # Example
///
/// ```
/// use ayoos_persistence::types::ConsultationDto;
/// use serde_json::json;
///
/// let dto: ConsultationDto = serde_json::from_value(json!({
///     "name": "follow-up",
///     "durationMinutes": 15
/// }))
/// .unwrap();
///
/// assert!(dto.id.is_none());
/// assert_eq!(dto.attribute("name"), Some(&json!("follow-up")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationDto {
    /// Identifier assigned by the repository; `None` for unsaved records.
    #[serde(default)]
    pub id: Option<i64>,

    /// All remaining fields of the record.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ConsultationDto {
    /// Creates an unsaved record from a set of attributes.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds or replaces a single attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Serializes the attributes (without `id`) for storage.
    pub fn attributes_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.attributes)
    }

    /// Rebuilds a record from a stored id and attribute JSON.
    pub fn from_stored(id: i64, data: &str) -> serde_json::Result<Self> {
        let mut attributes: Map<String, Value> = serde_json::from_str(data)?;
        attributes.remove("id");
        Ok(Self {
            id: Some(id),
            attributes,
        })
    }

    /// Collects the searchable text of the record.
    ///
    /// Every string, number and boolean value is included, recursing into
    /// nested objects and arrays. Values under an `id` key are skipped.
    pub fn searchable_text(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.attributes {
            if key != "id" {
                collect_text(value, &mut parts);
            }
        }
        parts.join(" ")
    }
}

fn collect_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => parts.push(s.clone()),
        Value::Number(n) => parts.push(n.to_string()),
        Value::Bool(b) => parts.push(b.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_text(item, parts);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                if key != "id" {
                    collect_text(nested, parts);
                }
            }
        }
        _ => {}
    }
}
