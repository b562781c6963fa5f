//! RRA 1.x: "Summary" sheet plus a "Questions work sheet".
//!
//! Impacts run along a row to the right of each security property label
//! (reputation, finances, productivity). There is no dedicated integrity
//! row; "Access Control" is the closest match and stands in for it.
//! Rationales live on the questions sheet, in a single column under
//! `RATIONALE`, interleaved per question.

use rra2json_core::{Area, Dimension, Grid, RraRecord, Workbook, fuzzy_team_name};

use super::{ParseContext, join_cells, start_record};

const QUESTIONS_SHEET: &str = "Questions work sheet";

/// Label anchoring each impact row on the summary sheet.
const IMPACT_ROWS: [(Dimension, &str); 3] = [
    (Dimension::Confidentiality, "Confidentiality"),
    (Dimension::Integrity, "Access Control"),
    (Dimension::Availability, "Availability"),
];

/// Rows below `RATIONALE` on the questions sheet. Integrity spans two
/// questions per area.
const RATIONALE_ROWS: [(Dimension, Area, &[isize]); 9] = [
    (Dimension::Confidentiality, Area::Reputation, &[1]),
    (Dimension::Confidentiality, Area::Finances, &[7]),
    (Dimension::Confidentiality, Area::Productivity, &[13]),
    (Dimension::Integrity, Area::Reputation, &[3, 4]),
    (Dimension::Integrity, Area::Finances, &[9, 10]),
    (Dimension::Integrity, Area::Productivity, &[15, 16]),
    (Dimension::Availability, Area::Reputation, &[2]),
    (Dimension::Availability, Area::Finances, &[8]),
    (Dimension::Availability, Area::Productivity, &[14]),
];

/// Owner, developer and operator cells hold a team and a contact in two
/// adjacent cells.
fn team_near(grid: &Grid, labels: &[&str]) -> String {
    let anchor = grid.find_first_of(labels);
    fuzzy_team_name(&join_cells(
        &grid.value_at(anchor, 0, 1),
        &grid.value_at(anchor, 0, 2),
    ))
}

pub fn parse(book: &Workbook, ctx: &ParseContext<'_>) -> Option<RraRecord> {
    let sheet = book.grid(None)?;

    let service = sheet.value_right_of("Project Name");
    if service.is_empty() {
        return None;
    }

    let mut rec = start_record(book, ctx, service);
    let meta = &mut rec.details.metadata;
    meta.scope = sheet.value_right_of("Scope");
    // Pre-1.0 sheets label the owner row just "Owner".
    meta.owner = team_near(sheet, &["Project, Data owner", "Owner"]);
    meta.developer = team_near(sheet, &["Developer"]);
    meta.operator = team_near(sheet, &["Operator"]);

    for (dim, label) in IMPACT_ROWS {
        let anchor = sheet.find_label(label);
        for (i, area) in Area::ALL.into_iter().enumerate() {
            let col = i as isize + 1;
            rec.details.risk.get_mut(dim, area).impact = ctx.risk(&sheet.value_at(anchor, 0, col));
        }
    }

    if let Some(questions) = book.grid(Some(QUESTIONS_SHEET)) {
        let anchor = questions.find_label("RATIONALE");
        for (dim, area, rows) in RATIONALE_ROWS {
            let parts: Vec<String> = rows
                .iter()
                .map(|&row| questions.value_at(anchor, row, 0))
                .filter(|text| !text.is_empty())
                .collect();
            rec.details.risk.get_mut(dim, area).rationale = Some(parts.join(","));
        }
    }

    Some(rec)
}
