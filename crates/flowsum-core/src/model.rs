// ── Domain model ──
//
// Sites and applications collapse into one `Entity` shape: the resolver
// only needs an id, a name to match against and a description to show.

use serde::Serialize;
use serde_json::{Map, Value};

/// What kind of directory object an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Site,
    Application,
}

/// A site or application definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(kind: EntityKind, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: None,
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Anything the resolver can score by name.
pub trait Named {
    fn display_name(&self) -> &str;
}

impl Named for Entity {
    fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// The resolver's pick, with its similarity score (0..=100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match<T> {
    pub entity: T,
    pub score: u8,
}

/// One flow as returned by the flow store. Read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowRecord(Map<String, Value>);

impl FlowRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Numeric value of a counter field.
    ///
    /// Missing, `null` and non-numeric fields yield `None`. Booleans count
    /// as 1 / 0 so success flags average into a rate.
    pub fn metric(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for FlowRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> FlowRecord {
        FlowRecord::new(value.as_object().unwrap().clone())
    }

    #[test]
    fn metric_reads_numbers_and_flags() {
        let flow = record(json!({
            "bytes_c2s": 1500,
            "ooo_pkts_s2c": 2.5,
            "init_success": true,
            "reset_c2s": false
        }));
        assert_eq!(flow.metric("bytes_c2s"), Some(1500.0));
        assert_eq!(flow.metric("ooo_pkts_s2c"), Some(2.5));
        assert_eq!(flow.metric("init_success"), Some(1.0));
        assert_eq!(flow.metric("reset_c2s"), Some(0.0));
    }

    #[test]
    fn metric_skips_missing_null_and_text() {
        let flow = record(json!({ "bytes_c2s": null, "bytes_s2c": "n/a" }));
        assert_eq!(flow.metric("bytes_c2s"), None);
        assert_eq!(flow.metric("bytes_s2c"), None);
        assert_eq!(flow.metric("reset_s2c"), None);
    }

    #[test]
    fn entity_kind_displays_lowercase() {
        assert_eq!(EntityKind::Application.to_string(), "application");
    }
}
