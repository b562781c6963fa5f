//! Spreadsheet files on disk (`.xlsx`, `.xlsm`, `.xls`, `.ods`), read with calamine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{DateTime, Utc};
use rra2json_core::{Grid, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::{DocumentSource, StoreError, file_stem, files_with_extension};

const EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Flatten a calamine range into a grid anchored at A1.
///
/// calamine trims leading empty rows and columns; they are put back so that
/// fixed-cell lookups (`H1`, `P1`) keep their coordinates.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (top, left) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or_default();
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); top];
    for row in range.rows() {
        let mut cells = vec![String::new(); left];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    Grid::new(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read every worksheet of one spreadsheet file.
///
/// The document id is the file stem; last-modified is the file's mtime.
pub fn read_workbook(path: &Path) -> Result<Workbook, StoreError> {
    let wb_err = |source| StoreError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut book = open_workbook_auto(path).map_err(wb_err)?;
    let mut sheets = Vec::new();
    for name in book.sheet_names() {
        let range = book.worksheet_range(&name).map_err(wb_err)?;
        sheets.push(Worksheet::new(name, range_to_grid(&range)));
    }

    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let id = file_stem(path);
    debug!(document = %id, sheets = sheets.len(), "read spreadsheet");
    Ok(Workbook::new(
        id.clone(),
        id,
        DateTime::<Utc>::from(modified),
        sheets,
    ))
}

/// Every spreadsheet file in one directory.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    dir: PathBuf,
}

impl WorkbookSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for WorkbookSource {
    fn list_documents(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(files_with_extension(&self.dir, EXTENSIONS)?
            .iter()
            .map(|p| {
                let id = file_stem(p);
                (id.clone(), id)
            })
            .collect())
    }

    fn open_all(&self) -> Result<Vec<Workbook>, StoreError> {
        let mut books = Vec::new();
        for path in files_with_extension(&self.dir, EXTENSIONS)? {
            match read_workbook(&path) {
                Ok(book) => books.push(book),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable spreadsheet"),
            }
        }
        info!(dir = %self.dir.display(), count = books.len(), "opened spreadsheets");
        Ok(books)
    }
}
