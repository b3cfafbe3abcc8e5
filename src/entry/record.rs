//! The log entry record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::entry::http_request::HttpRequest;
use crate::entry::severity::Severity;

/// A single log entry.
///
/// The payload is opaque to the grouping logic; it only has to be
/// representable as JSON.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    /// Time of the event. Filled in at submission when absent.
    pub timestamp: Option<DateTime<Utc>>,
    pub severity: Severity,
    pub payload: Value,
    pub labels: BTreeMap<String, String>,
    /// Unique identifier used by the backend to deduplicate entries.
    /// Assigned at submission when absent.
    pub insert_id: Option<String>,
    /// Completion statistics; set on outer entries.
    pub http_request: Option<HttpRequest>,
    /// Group (trace) identifier correlating outer and inner entries.
    pub trace: String,
}

impl Entry {
    /// Create an entry with the given severity and payload.
    pub fn new<P: Serialize>(severity: Severity, payload: P) -> Self {
        Self {
            severity,
            payload: payload_value(payload),
            ..Default::default()
        }
    }

    /// Builder-style label insertion.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Convert a caller payload into JSON.
///
/// Payload failures must not reach the logging caller, so a payload that
/// cannot be serialized is replaced by a description of the failure.
pub fn payload_value<P: Serialize>(payload: P) -> Value {
    match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Log payload is not JSON-serializable");
            Value::String(format!("unserializable payload: {}", e))
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(ts) = &self.timestamp {
            map.serialize_entry("timestamp", &ts.to_rfc3339_opts(SecondsFormat::Nanos, true))?;
        }
        map.serialize_entry("severity", &self.severity)?;
        match &self.payload {
            Value::Null => {}
            Value::String(text) => map.serialize_entry("textPayload", text)?,
            Value::Object(_) => map.serialize_entry("jsonPayload", &self.payload)?,
            other => map.serialize_entry("jsonPayload", &serde_json::json!({ "value": other }))?,
        }
        if !self.labels.is_empty() {
            map.serialize_entry("labels", &self.labels)?;
        }
        if let Some(id) = &self.insert_id {
            map.serialize_entry("insertId", id)?;
        }
        if let Some(stats) = &self.http_request {
            map.serialize_entry("httpRequest", stats)?;
        }
        if !self.trace.is_empty() {
            map.serialize_entry("trace", &self.trace)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shapes() {
        let text = serde_json::to_value(Entry::new(Severity::Info, "hello")).unwrap();
        assert_eq!(text["textPayload"], "hello");
        assert_eq!(text["severity"], "INFO");

        let object = serde_json::to_value(Entry::new(Severity::Error, json!({"user": 7}))).unwrap();
        assert_eq!(object["jsonPayload"]["user"], 7);

        let scalar = serde_json::to_value(Entry::new(Severity::Debug, 42)).unwrap();
        assert_eq!(scalar["jsonPayload"]["value"], 42);

        let empty = serde_json::to_value(Entry::default()).unwrap();
        assert_eq!(empty, json!({"severity": "DEFAULT"}));
    }

    #[test]
    fn test_trace_and_labels() {
        let mut entry = Entry::new(Severity::Notice, "x").with_label("hostname", "web-1");
        entry.trace = "abc".into();

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["trace"], "abc");
        assert_eq!(value["labels"]["hostname"], "web-1");
    }

    #[test]
    fn test_unserializable_payload_is_replaced() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid JSON object keys");

        let entry = Entry::new(Severity::Warning, bad);
        let text = entry.payload.as_str().unwrap_or_default();
        assert!(text.starts_with("unserializable payload"));
        assert_eq!(entry.severity, Severity::Warning);
    }
}
