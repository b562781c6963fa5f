//! RRA 2.3.0.
//!
//! Impacts are a single column under the impact header, nine rows in
//! confidentiality, integrity, availability order. Rationales sit in a
//! parallel column but the template orders its rows differently, so each
//! cell has its own offset.

use rra2json_core::{Area, Dimension, RraRecord, Workbook, fuzzy_team_name, normalize_data_level};

use super::{ParseContext, scan_data_dictionary, start_record};

/// Impact header, current name first.
const IMPACT_LABELS: &[&str] = &["Impact Level", "Impact to Mozilla"];

const DEFAULT_CLASSIFICATION_LABELS: &[&str] =
    &["Data classification", "Data classification of primary service"];

/// Rows below the impact header.
const IMPACT_ROWS: [(Dimension, Area); 9] = [
    (Dimension::Confidentiality, Area::Reputation),
    (Dimension::Confidentiality, Area::Finances),
    (Dimension::Confidentiality, Area::Productivity),
    (Dimension::Integrity, Area::Reputation),
    (Dimension::Integrity, Area::Finances),
    (Dimension::Integrity, Area::Productivity),
    (Dimension::Availability, Area::Reputation),
    (Dimension::Availability, Area::Finances),
    (Dimension::Availability, Area::Productivity),
];

/// Rows below the `Rationale` header.
const RATIONALE_ROWS: [(Dimension, Area, isize); 9] = [
    (Dimension::Confidentiality, Area::Reputation, 1),
    (Dimension::Confidentiality, Area::Finances, 7),
    (Dimension::Confidentiality, Area::Productivity, 4),
    (Dimension::Integrity, Area::Reputation, 3),
    (Dimension::Integrity, Area::Finances, 9),
    (Dimension::Integrity, Area::Productivity, 6),
    (Dimension::Availability, Area::Reputation, 2),
    (Dimension::Availability, Area::Finances, 8),
    (Dimension::Availability, Area::Productivity, 5),
];

pub fn parse(book: &Workbook, ctx: &ParseContext<'_>) -> Option<RraRecord> {
    let sheet = book.grid(None)?;

    let service = sheet.value_right_of("Service name");
    if service.is_empty() {
        return None;
    }

    let mut rec = start_record(book, ctx, service);
    let meta = &mut rec.details.metadata;
    meta.scope = sheet.value_right_of("RRA Scope");
    meta.owner = fuzzy_team_name(&sheet.value_right_of("Service owner"));
    meta.developer = fuzzy_team_name(&sheet.value_right_of("Developer"));
    meta.operator = fuzzy_team_name(&sheet.value_right_of("Operator"));

    let default_anchor = sheet.find_first_of(DEFAULT_CLASSIFICATION_LABELS);
    rec.details.data.default = normalize_data_level(&sheet.value_at(default_anchor, 0, 2));
    scan_data_dictionary(
        sheet,
        sheet.find_label("Classification"),
        ctx,
        &mut rec.details.data,
    );

    let impact = sheet.find_first_of(IMPACT_LABELS);
    for (i, (dim, area)) in IMPACT_ROWS.into_iter().enumerate() {
        let row = i as isize + 1;
        rec.details.risk.get_mut(dim, area).impact = ctx.risk(&sheet.value_at(impact, row, 0));
    }

    let rationale = sheet.find_label("Rationale");
    for (dim, area, row) in RATIONALE_ROWS {
        rec.details.risk.get_mut(dim, area).rationale = Some(sheet.value_at(rationale, row, 0));
    }

    Some(rec)
}
