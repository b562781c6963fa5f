//! Fetched snapshot of one spreadsheet document.
//!
//! Document sources read every worksheet once and hand out a [`Workbook`];
//! parsers never go back to the source for more cells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub title: String,
    pub rows: Grid,
}

impl Worksheet {
    pub fn new(title: impl Into<String>, rows: Grid) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    /// Source-specific document identifier.
    pub id: String,
    /// Document (file) name, as listed by the source.
    pub name: String,
    pub last_modified: DateTime<Utc>,
    /// Worksheets in tab order. The first one is the primary sheet.
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        last_modified: DateTime<Utc>,
        sheets: Vec<Worksheet>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_modified,
            sheets,
        }
    }

    pub fn primary(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }

    /// Title of the primary worksheet, `""` for a workbook without sheets.
    pub fn title(&self) -> &str {
        self.primary().map(|s| s.title.as_str()).unwrap_or_default()
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Grid of the named worksheet, or of the primary sheet for `None`.
    ///
    /// Worksheet names are matched case-insensitively.
    pub fn grid(&self, worksheet: Option<&str>) -> Option<&Grid> {
        match worksheet {
            None => self.primary().map(|s| &s.rows),
            Some(name) => self
                .sheets
                .iter()
                .find(|s| s.title.trim().eq_ignore_ascii_case(name.trim()))
                .map(|s| &s.rows),
        }
    }
}
