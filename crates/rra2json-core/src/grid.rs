//! Positional search over a worksheet's cell grid.
//!
//! RRA spreadsheets carry no machine-readable schema: every field is located
//! by finding a label cell and reading a value at a fixed offset from it.
//! The primitives here never panic. A missing label or an offset that falls
//! outside the grid reads as an empty string, so a parser fills what it can
//! and leaves the rest empty instead of abandoning the document.
//!
//! ```text
//!    A      | B
//! 1| Name   | Bob
//! 2| Client | Jim
//! ```
//!
//! `grid.value_near("name", 0, 1)` is `"Bob"`, `grid.value_near("Name", 1, 1)`
//! is `"Jim"`.

use serde::{Deserialize, Serialize};

/// Row/column coordinate of a cell, zero-based (`A1` is `(0, 0)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Move by a signed offset. `None` if either coordinate would go negative.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

/// Immutable snapshot of one worksheet: rows of string cells.
///
/// Rows may be ragged; a short row simply has no cell at the missing columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor for literal grids.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(|c| c.is_empty()))
    }

    /// Raw cell content, `None` outside the grid.
    pub fn cell(&self, at: CellRef) -> Option<&str> {
        self.rows
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .map(String::as_str)
    }

    /// First cell (row-major) whose normalized text equals the normalized label.
    ///
    /// Later duplicates of the same label are never considered.
    pub fn find_label(&self, label: &str) -> Option<CellRef> {
        let wanted = normalize_label(label);
        self.rows.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|cell| normalize_label(cell) == wanted)
                .map(|col| CellRef::new(row, col))
        })
    }

    /// Try each label in priority order; the first one present wins.
    ///
    /// Used where a later template revision renamed a label: the current name
    /// goes first, legacy names after it.
    pub fn find_first_of(&self, labels: &[&str]) -> Option<CellRef> {
        labels.iter().find_map(|label| self.find_label(label))
    }

    /// Cell at a signed offset from `anchor`, with surrounding newlines stripped.
    pub fn cell_at(&self, anchor: Option<CellRef>, d_row: isize, d_col: isize) -> Option<&str> {
        let at = anchor?.offset(d_row, d_col)?;
        self.cell(at).map(|v| v.trim_matches('\n'))
    }

    /// Like [`cell_at`](Self::cell_at) but missing cells read as `""`.
    pub fn value_at(&self, anchor: Option<CellRef>, d_row: isize, d_col: isize) -> String {
        self.cell_at(anchor, d_row, d_col)
            .unwrap_or_default()
            .to_string()
    }

    /// Cell at a signed offset from the first cell labelled `label`.
    pub fn cell_near(&self, label: &str, d_row: isize, d_col: isize) -> Option<&str> {
        self.cell_at(self.find_label(label), d_row, d_col)
    }

    /// Value at a signed offset from the first cell labelled `label`, or `""`.
    pub fn value_near(&self, label: &str, d_row: isize, d_col: isize) -> String {
        self.value_at(self.find_label(label), d_row, d_col)
    }

    /// Value directly right of `label`: the common "Label | Value" layout.
    pub fn value_right_of(&self, label: &str) -> String {
        self.value_near(label, 0, 1)
    }
}

/// Lower-case, trim, and collapse newlines to spaces.
pub fn normalize_label(text: &str) -> String {
    text.trim().to_lowercase().replace("\r\n", " ").replace('\n', " ")
}
