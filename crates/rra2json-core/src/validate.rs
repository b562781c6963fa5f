//! Completeness check run on parsed records.
//!
//! A record can parse cleanly and still be missing things a reviewer needs.
//! The list produced here drives the defect-tracker follow-up.

use crate::normalize::UNKNOWN;
use crate::record::RraRecord;

/// Dotted paths of the fields a complete RRA must fill in.
pub fn missing_fields(record: &RraRecord) -> Vec<String> {
    let meta = &record.details.metadata;
    let mut missing: Vec<String> = [
        ("service", &meta.service),
        ("scope", &meta.scope),
        ("owner", &meta.owner),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| format!("metadata.{name}"))
    .collect();

    let default = record.details.data.default.trim();
    if default.is_empty() || default.eq_ignore_ascii_case(UNKNOWN) {
        missing.push("data.default".to_string());
    }

    for (dim, area, entry) in record.details.risk.entries() {
        if entry.impact == UNKNOWN {
            missing.push(format!("risk.{}.{}.impact", dim.as_str(), area.as_str()));
        }
    }
    missing
}
