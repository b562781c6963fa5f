//! Per-version RRA parsers.
//!
//! Each template revision gets one plain function with the [`ParseFn`]
//! signature. Layout knowledge (which label anchors which field, at what
//! offset) lives in that function and nowhere else, and offsets are
//! reproduced exactly as the template draws them, axis quirks included.
//!
//! Shared rules:
//! - The identifying field (service or project name) must be non-empty,
//!   otherwise the parser returns `None`: the document is not an RRA of this
//!   layout, or not filled in enough to be one.
//! - Impact, probability and control need go through
//!   [`validate_entry`](rra2json_core::validate_entry).
//! - Scans down a column stop at the first empty cell and never walk more
//!   than [`ParseContext::scan_limit`] rows.

pub mod v100;
pub mod v230;
pub mod v241;
pub mod v255;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rra2json_core::config::DEFAULT_SCAN_LIMIT;
use rra2json_core::{
    CellRef, DataDictionary, Grid, Levels, RraRecord, Workbook, isoformat, normalize_data_level,
    validate_entry,
};
use tracing::{debug, warn};

/// Signature every template parser implements.
pub type ParseFn = fn(&Workbook, &ParseContext<'_>) -> Option<RraRecord>;

/// Inputs shared by all parsers for one run.
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    pub levels: &'a Levels,
    /// Row cap for bounded scans.
    pub scan_limit: usize,
    /// Extraction time written to `timestamp`.
    pub now: DateTime<Utc>,
}

impl<'a> ParseContext<'a> {
    pub fn new(levels: &'a Levels, now: DateTime<Utc>) -> Self {
        Self {
            levels,
            scan_limit: DEFAULT_SCAN_LIMIT,
            now,
        }
    }

    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    pub(crate) fn risk(&self, value: &str) -> String {
        validate_entry(value, &self.levels.risk_levels)
    }

    fn is_data_level(&self, level: &str) -> bool {
        self.levels.data_levels.iter().any(|d| d == level)
    }
}

/// Fresh record for `book` with the fields every layout fills the same way.
pub(crate) fn start_record(book: &Workbook, ctx: &ParseContext<'_>, service: String) -> RraRecord {
    let mut rec = RraRecord::new(book.id.clone());
    rec.summary = format!("RRA for {service}");
    rec.timestamp = isoformat(&ctx.now);
    rec.lastmodified = isoformat(&book.last_modified);
    rec.details.metadata.service = service;
    rec
}

/// Join two cells with a space, skipping empty ones.
pub(crate) fn join_cells(first: &str, second: &str) -> String {
    [first.trim(), second.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walk the data dictionary below `header`.
///
/// Each row holds the classification level in the header's column and the
/// data type name two columns to its left. Levels are normalized, then kept
/// only if they are one of the configured data levels. Returns the number of
/// rows read before the list ended.
pub(crate) fn scan_data_dictionary(
    grid: &Grid,
    header: Option<CellRef>,
    ctx: &ParseContext<'_>,
    data: &mut DataDictionary,
) -> usize {
    if header.is_none() {
        debug!("no data dictionary header");
        return 0;
    }
    for i in 1..=ctx.scan_limit {
        let row = i as isize;
        let level = normalize_data_level(grid.cell_at(header, row, 0).unwrap_or_default());
        if level.trim().is_empty() {
            return i - 1;
        }
        let data_type = grid.value_at(header, row, -2);
        if ctx.is_data_level(&level) {
            data.push(&level, data_type);
        } else {
            debug!(level = %level, data_type = %data_type, "dropping unrecognized data level");
        }
    }
    warn!(limit = ctx.scan_limit, "data dictionary scan hit the row limit");
    ctx.scan_limit
}

/// Walk the recommendation list below `header`.
///
/// Recommendation text sits under the header, the control need eight
/// columns right of it. Control needs share the risk level vocabulary.
pub(crate) fn scan_recommendations(
    grid: &Grid,
    header: Option<CellRef>,
    ctx: &ParseContext<'_>,
) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if header.is_none() {
        return out;
    }
    for i in 1..=ctx.scan_limit {
        let row = i as isize;
        let recommendation = grid.value_at(header, row, 0);
        if recommendation.is_empty() {
            return out;
        }
        let control_need = ctx.risk(&grid.value_at(header, row, 8));
        out.entry(control_need).or_default().push(recommendation);
    }
    warn!(limit = ctx.scan_limit, "recommendation scan hit the row limit");
    out
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn data_dictionary_stops_at_empty_level() {
        let grid = SheetBuilder::new()
            .set(0, 2, "Classification")
            .set(1, 0, "CustomerEmails")
            .set(1, 1, "x")
            .set(1, 2, "RESTRICTED")
            .set(2, 0, "Ignored")
            .set(2, 1, "x")
            .set(2, 2, "")
            .set(3, 0, "AfterTheGap")
            .set(3, 2, "PUBLIC")
            .build();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let mut data = DataDictionary::default();
        let read = scan_data_dictionary(&grid, grid.find_label("Classification"), &ctx, &mut data);

        assert_eq!(read, 1);
        assert_eq!(data.types("RESTRICTED"), ["CustomerEmails"]);
        assert!(data.types("PUBLIC").is_empty());
    }

    #[test]
    fn data_dictionary_reads_type_two_columns_left() {
        // Data type is read two columns left of the level, not beside it.
        let grid = rra2json_core::Grid::from_rows([
            vec!["", "", "Classification", ""],
            vec!["x", "x", "RESTRICTED", "CustomerEmails"],
            vec!["x", "x", "", "Ignored"],
        ]);
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let mut data = DataDictionary::default();
        scan_data_dictionary(&grid, grid.find_label("Classification"), &ctx, &mut data);

        assert_eq!(data.types("RESTRICTED"), ["x"]);
    }

    #[test]
    fn data_dictionary_normalizes_and_drops_unknown_levels() {
        let grid = SheetBuilder::new()
            .set(0, 2, "Classification")
            .column(1, 0, &["Logs", "Emails", "Secrets", "Weird"])
            .column(1, 2, &["staff", "Work Group", "Individual", "Sorta private"])
            .build();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let mut data = DataDictionary::default();
        scan_data_dictionary(&grid, grid.find_label("classification"), &ctx, &mut data);

        assert_eq!(data.types("INTERNAL"), ["Logs"]);
        assert_eq!(data.types("RESTRICTED"), ["Emails"]);
        assert_eq!(data.types("SECRET"), ["Secrets"]);
        assert!(!data.levels.contains_key("Sorta private"));
    }

    #[test]
    fn data_dictionary_scan_is_bounded() {
        let levels_col = vec!["PUBLIC"; 30];
        let grid = SheetBuilder::new()
            .set(0, 2, "Classification")
            .column(1, 2, &levels_col)
            .build();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now()).with_scan_limit(10);
        let mut data = DataDictionary::default();
        let read = scan_data_dictionary(&grid, grid.find_label("Classification"), &ctx, &mut data);
        assert_eq!(read, 10);
        assert_eq!(data.types("PUBLIC").len(), 10);
    }

    #[test]
    fn data_dictionary_in_first_columns_reads_empty_types() {
        // Header in column 0: the data type column would be negative.
        let grid = SheetBuilder::new()
            .set(0, 0, "Classification")
            .set(1, 0, "PUBLIC")
            .build();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let mut data = DataDictionary::default();
        scan_data_dictionary(&grid, grid.find_label("Classification"), &ctx, &mut data);
        assert_eq!(data.types("PUBLIC"), [""]);
    }

    #[test]
    fn missing_header_reads_nothing() {
        let grid = Grid::default();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let mut data = DataDictionary::default();
        assert_eq!(scan_data_dictionary(&grid, None, &ctx, &mut data), 0);
        assert!(scan_recommendations(&grid, None, &ctx).is_empty());
    }

    #[test]
    fn recommendations_grouped_by_control_need() {
        let grid = SheetBuilder::new()
            .set(0, 0, "Recommendations")
            .column(1, 0, &["Enable 2FA", "Rotate keys", "Write docs"])
            .column(1, 8, &["HIGH", "HIGH", "whenever"])
            .build();
        let levels = levels();
        let ctx = ParseContext::new(&levels, now());
        let recs = scan_recommendations(&grid, grid.find_label("Recommendations"), &ctx);
        assert_eq!(recs["HIGH"], ["Enable 2FA", "Rotate keys"]);
        assert_eq!(recs["Unknown"], ["Write docs"]);
    }

    #[test]
    fn join_cells_skips_empty() {
        assert_eq!(join_cells("Team", "Bob"), "Team Bob");
        assert_eq!(join_cells("Team", ""), "Team");
        assert_eq!(join_cells("", ""), "");
    }
}
