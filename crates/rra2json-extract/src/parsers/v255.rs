//! RRA 2.5.x (stamped `2.5.5`).
//!
//! Adds description, analyst, contacts, service provided and a risk record
//! link to the metadata, a free-text recommendation list, and one
//! probability per security property instead of one per cell.
//!
//! The risk block lists availability before integrity, and within each
//! property orders areas reputation, productivity, finances.

use rra2json_core::{Area, Dimension, RraRecord, Workbook, comma_tokenize, normalize_data_level};

use super::{ParseContext, scan_data_dictionary, scan_recommendations, start_record};

const THREATS_LABEL: &str = "Threats, use-cases, rationales";
const RECOMMENDATIONS_LABEL: &str = "Recommendations (Follow-up in a risk record bug)";

/// Depending on the sheet, the probability column is called either.
const PROBABILITY_LABELS: &[&str] = &["Probability", "Likelihood Indicator"];

/// Rows below `Impact` and below the threats header.
const RISK_ROWS: [(Dimension, Area); 9] = [
    (Dimension::Confidentiality, Area::Reputation),
    (Dimension::Confidentiality, Area::Productivity),
    (Dimension::Confidentiality, Area::Finances),
    (Dimension::Availability, Area::Reputation),
    (Dimension::Availability, Area::Productivity),
    (Dimension::Availability, Area::Finances),
    (Dimension::Integrity, Area::Reputation),
    (Dimension::Integrity, Area::Productivity),
    (Dimension::Integrity, Area::Finances),
];

/// Probability is given once per property, on the property's first row.
const PROBABILITY_ROWS: [(Dimension, isize); 3] = [
    (Dimension::Confidentiality, 1),
    (Dimension::Availability, 4),
    (Dimension::Integrity, 7),
];

pub fn parse(book: &Workbook, ctx: &ParseContext<'_>) -> Option<RraRecord> {
    let sheet = book.grid(None)?;

    let service = sheet.value_right_of("Service name");
    if service.is_empty() {
        return None;
    }

    let mut rec = start_record(book, ctx, service);
    let meta = &mut rec.details.metadata;
    meta.scope = sheet.value_right_of("Scoped for team");
    meta.owner = sheet.value_near("Service Owner", 0, 2);
    meta.description = Some(sheet.value_right_of("Description"));
    meta.analyst = Some(match sheet.find_label("RRA Analyst") {
        Some(at) => sheet.value_at(Some(at), 0, 1),
        None => sheet.value_near("Risk Analyst", 0, 2),
    });
    meta.contacts = Some(comma_tokenize(&sheet.value_right_of("Other Contacts")));
    meta.service_provided = Some(sheet.value_right_of("Service provided"));
    meta.risk_record = Some(sheet.value_right_of("Risk Record"));

    rec.details.data.default =
        normalize_data_level(&sheet.value_near("Service Data classification", 0, 2));
    scan_data_dictionary(
        sheet,
        sheet.find_label("Data Classification"),
        ctx,
        &mut rec.details.data,
    );

    let impact = sheet.find_label("Impact");
    let threats = sheet.find_label(THREATS_LABEL);
    for (i, (dim, area)) in RISK_ROWS.into_iter().enumerate() {
        let row = i as isize + 1;
        let entry = rec.details.risk.get_mut(dim, area);
        entry.impact = ctx.risk(&sheet.value_at(impact, row, 0));
        entry.rationale = Some(sheet.value_at(threats, row, 0));
    }

    let probability = sheet.find_first_of(PROBABILITY_LABELS);
    for (dim, row) in PROBABILITY_ROWS {
        let level = ctx.risk(&sheet.value_at(probability, row, 0));
        for area in Area::ALL {
            rec.details.risk.get_mut(dim, area).probability = Some(level.clone());
        }
    }

    rec.details.recommendations = Some(scan_recommendations(
        sheet,
        sheet.find_label(RECOMMENDATIONS_LABEL),
        ctx,
    ));

    Some(rec)
}
