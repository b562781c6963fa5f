//! Plain-text rendering for batch reports and single records.

use std::fmt::Write;

use rra2json_core::{Area, Dimension, RraRecord, missing_fields};
use rra2json_extract::{BatchReport, Detection, Outcome};

// ── Batch report ──

/// One line per document, then the totals.
pub fn render_batch_report(report: &BatchReport) -> String {
    let mut out = String::new();
    for doc in &report.documents {
        let _ = writeln!(
            out,
            "  {:<26} {:<8} {}",
            doc.id,
            doc.outcome.version().unwrap_or("-"),
            describe_outcome(&doc.outcome)
        );
    }
    let (unrecognized, unsupported, incomplete) = report.skip_counts();
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<26} {}", "documents", report.documents.len());
    let _ = writeln!(out, "  {:<26} {}", "parsed", report.parsed());
    let _ = writeln!(
        out,
        "  {:<26} {} (unrecognized {unrecognized}, unsupported {unsupported}, incomplete {incomplete})",
        "skipped",
        report.skipped()
    );
    let _ = writeln!(out, "  {:<26} {}", "failed", report.failed());
    out
}

pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Parsed { record, .. } => {
            let missing = missing_fields(record).len();
            if missing == 0 {
                format!("parsed: {}", record.service())
            } else {
                format!("parsed: {} ({missing} fields missing)", record.service())
            }
        }
        Outcome::Skipped(reason) => format!("skipped: {reason}"),
        Outcome::Failed { message, .. } => format!("FAILED: {message}"),
    }
}

pub fn describe_detection(detection: &Detection) -> String {
    match detection {
        Detection::Version(v) => v.clone(),
        Detection::Unrecognized(why) => format!("- ({why})"),
    }
}

// ── Record card ──

/// Vertical card for one record, grouped like the canonical JSON.
pub fn render_record_card(record: &RraRecord) -> String {
    let meta = &record.details.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", record.summary);
    let _ = writeln!(out);

    let _ = writeln!(out, "Metadata");
    field(&mut out, "service", &meta.service);
    field(&mut out, "scope", &meta.scope);
    field(&mut out, "owner", &meta.owner);
    field(&mut out, "developer", &meta.developer);
    field(&mut out, "operator", &meta.operator);
    for (name, value) in [
        ("description", &meta.description),
        ("analyst", &meta.analyst),
        ("service_provided", &meta.service_provided),
        ("risk_record", &meta.risk_record),
        ("RRA_version", &meta.rra_version),
    ] {
        if let Some(v) = value {
            field(&mut out, name, v);
        }
    }
    if let Some(contacts) = &meta.contacts {
        field(&mut out, "contacts", &contacts.join(", "));
    }

    let _ = writeln!(out, "Data");
    field(&mut out, "default", &record.details.data.default);
    for (level, types) in &record.details.data.levels {
        field(&mut out, level, &types.join(", "));
    }

    let _ = writeln!(out, "Risk");
    for dim in Dimension::ALL {
        for area in Area::ALL {
            let entry = record.details.risk.get(dim, area);
            let label = format!("{}.{}", dim.as_str(), area.as_str());
            match &entry.probability {
                Some(p) => field(&mut out, &label, &format!("{} (probability {p})", entry.impact)),
                None => field(&mut out, &label, &entry.impact),
            }
        }
    }

    if let Some(recs) = &record.details.recommendations
        && !recs.is_empty()
    {
        let _ = writeln!(out, "Recommendations");
        for (need, items) in recs {
            for item in items {
                field(&mut out, need, item);
            }
        }
    }

    let _ = writeln!(out, "Timestamps");
    field(&mut out, "lastmodified", &record.lastmodified);
    field(&mut out, "timestamp", &record.timestamp);
    out
}

fn field(out: &mut String, name: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "  {name:<26} {value}");
    }
}
