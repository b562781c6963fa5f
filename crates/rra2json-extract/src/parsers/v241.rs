//! RRA 2.4.0 and 2.4.1 (identical layouts; 2.4.1 adds the version stamp).
//!
//! Impact and probability are parallel columns under `Impact` and
//! `Probability`, nine rows each in confidentiality, integrity, availability
//! order. This template has no rationale column.

use rra2json_core::{Area, Dimension, RraRecord, Workbook, fuzzy_team_name, normalize_data_level};

use super::{ParseContext, scan_data_dictionary, start_record};

const RISK_ROWS: [(Dimension, Area); 9] = [
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

    rec.details.data.default =
        normalize_data_level(&sheet.value_near("Service\nData classification", 0, 2));
    scan_data_dictionary(
        sheet,
        sheet.find_label("Data Classification"),
        ctx,
        &mut rec.details.data,
    );

    let impact = sheet.find_label("Impact");
    let probability = sheet.find_label("Probability");
    for (i, (dim, area)) in RISK_ROWS.into_iter().enumerate() {
        let row = i as isize + 1;
        let entry = rec.details.risk.get_mut(dim, area);
        entry.impact = ctx.risk(&sheet.value_at(impact, row, 0));
        entry.probability = Some(ctx.risk(&sheet.value_at(probability, row, 0)));
    }

    Some(rec)
}
