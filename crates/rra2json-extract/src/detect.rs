//! Template version detection.
//!
//! RRA spreadsheets do not declare a schema. Newer templates stamp their
//! version in a fixed cell; older ones are recognised by header text that
//! only their layout has. Rules are checked in a fixed order and the first
//! hit wins:
//!
//! 1. Primary worksheet title denylisted (cancelled, superseded, ...): stop.
//! 2. `P1` holds a version stamp (2.4.1 and later): `"2.5.5"` → `"255"`.
//! 3. `H1` reads `Estimated\nRisk to Mozilla`: 2.4.0.
//! 4. `H1` reads `Impact to Mozilla`: 2.3.0.
//! 5. `A1` reads `Project Name` on a sheet titled `Summary`: 1.0.0.

use rra2json_core::{CellRef, Workbook};

const DENYLISTED_TITLES: &[&str] = &["cancelled", "superseded", "deprecated", "invalid"];

const VERSION_STAMP: CellRef = CellRef { row: 0, col: 15 };
const HEADER_H1: CellRef = CellRef { row: 0, col: 7 };
const HEADER_A1: CellRef = CellRef { row: 0, col: 0 };

/// Result of inspecting a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Version identifier with dots removed, e.g. `"241"`.
    Version(String),
    Unrecognized(Unrecognized),
}

/// Why no version could be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unrecognized {
    NoWorksheet,
    /// Title marks the document as withdrawn.
    Denylisted(String),
    /// No stamp and no known fingerprint.
    NoFingerprint,
}

impl std::fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoWorksheet => write!(f, "document has no worksheet"),
            Self::Denylisted(title) => write!(f, "worksheet title {title:?} is denylisted"),
            Self::NoFingerprint => write!(f, "no version stamp or known template fingerprint"),
        }
    }
}

/// Strip the dots out of a version string: `"2.4.1"` → `"241"`.
pub fn nodots(version: &str) -> String {
    version.trim().replace('.', "")
}

/// Assign a template version to `book`, looking only at its primary worksheet.
pub fn detect_version(book: &Workbook) -> Detection {
    let Some(sheet) = book.primary() else {
        return Detection::Unrecognized(Unrecognized::NoWorksheet);
    };
    let title = sheet.title.to_lowercase();
    if DENYLISTED_TITLES.iter().any(|word| title.contains(word)) {
        return Detection::Unrecognized(Unrecognized::Denylisted(sheet.title.clone()));
    }

    let grid = &sheet.rows;
    let stamp = nodots(grid.cell(VERSION_STAMP).unwrap_or_default());
    if !stamp.is_empty() {
        return Detection::Version(stamp);
    }

    let h1 = grid.cell(HEADER_H1).unwrap_or_default();
    if h1 == "Estimated\nRisk to Mozilla" {
        return Detection::Version(nodots("2.4.0"));
    }
    if h1 == "Impact to Mozilla" {
        return Detection::Version(nodots("2.3.0"));
    }
    if grid.cell(HEADER_A1) == Some("Project Name") && sheet.title == "Summary" {
        return Detection::Version(nodots("1.0.0"));
    }

    Detection::Unrecognized(Unrecognized::NoFingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rra2json_core::{Grid, Worksheet};

    fn book(title: &str, first_row: Vec<&str>) -> Workbook {
        Workbook::new(
            "id",
            "name",
            DateTime::<Utc>::UNIX_EPOCH,
            vec![Worksheet::new(title, Grid::from_rows([first_row]))],
        )
    }

    fn row_with(col: usize, value: &str) -> Vec<&str> {
        let mut row = vec![""; col + 1];
        row[col] = value;
        row
    }

    #[test]
    fn version_stamp_wins() {
        let b = book("RRA", row_with(15, "2.5.5"));
        assert_eq!(detect_version(&b), Detection::Version("255".into()));
    }

    #[test]
    fn stamp_beats_legacy_fingerprints() {
        let mut row = row_with(15, "2.4.1");
        row[7] = "Impact to Mozilla";
        let b = book("Summary", row);
        assert_eq!(detect_version(&b), Detection::Version("241".into()));
    }

    #[test]
    fn legacy_240_fingerprint() {
        let b = book("RRA", row_with(7, "Estimated\nRisk to Mozilla"));
        assert_eq!(detect_version(&b), Detection::Version("240".into()));
    }

    #[test]
    fn legacy_230_fingerprint() {
        let b = book("RRA", row_with(7, "Impact to Mozilla"));
        assert_eq!(detect_version(&b), Detection::Version("230".into()));
    }

    #[test]
    fn legacy_100_needs_title_and_cell() {
        let b = book("Summary", vec!["Project Name", "Checkout Service"]);
        assert_eq!(detect_version(&b), Detection::Version("100".into()));

        let wrong_title = book("Sheet1", vec!["Project Name", "Checkout Service"]);
        assert_eq!(
            detect_version(&wrong_title),
            Detection::Unrecognized(Unrecognized::NoFingerprint)
        );
    }

    #[test]
    fn denylisted_title_is_a_hard_stop() {
        for title in ["Deprecated", "DEPRECATED", "deprecated", "Cancelled RRA", "superseded", "Invalid"] {
            let b = book(title, row_with(15, "2.5.5"));
            assert!(
                matches!(detect_version(&b), Detection::Unrecognized(Unrecognized::Denylisted(_))),
                "title {title:?}"
            );
        }
    }

    #[test]
    fn whitespace_only_stamp_falls_through() {
        let mut row = row_with(15, " . ");
        row[7] = "Impact to Mozilla";
        let b = book("RRA", row);
        assert_eq!(detect_version(&b), Detection::Version("230".into()));
    }

    #[test]
    fn nothing_matches() {
        let b = book("Budget", vec!["Quarter", "Spend"]);
        assert_eq!(
            detect_version(&b),
            Detection::Unrecognized(Unrecognized::NoFingerprint)
        );
        let empty = Workbook::new("id", "name", DateTime::<Utc>::UNIX_EPOCH, vec![]);
        assert_eq!(
            detect_version(&empty),
            Detection::Unrecognized(Unrecognized::NoWorksheet)
        );
    }

    #[test]
    fn detection_is_deterministic() {
        let b = book("Summary", vec!["Project Name"]);
        assert_eq!(detect_version(&b), detect_version(&b));
    }
}
