//! Event bus envelope for a parsed record.

use rra2json_core::RraRecord;
use serde_json::{Value, json};

pub const EVENT_CATEGORY: &str = "rra_data";
pub const EVENT_SOURCE: &str = "rra2json";

/// Wrap `record` in the envelope the event bus expects. The record itself
/// travels unchanged under `details`.
pub fn event_envelope(record: &RraRecord) -> Result<Value, serde_json::Error> {
    let mut tags = vec!["rra".to_string(), EVENT_SOURCE.to_string()];
    if let Some(version) = &record.details.metadata.rra_version {
        tags.push(format!("RRA_version:{version}"));
    }
    Ok(json!({
        "category": EVENT_CATEGORY,
        "source": EVENT_SOURCE,
        "severity": "INFO",
        "tags": tags,
        "summary": record.summary,
        "timestamp": record.timestamp,
        "details": serde_json::to_value(record)?,
    }))
}
