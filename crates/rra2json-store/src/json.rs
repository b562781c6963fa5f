//! Directory of JSON workbook exports.
//!
//! One file per document:
//!
//! ```json
//! { "id": "1AbC", "title": "RRA - Checkout", "last_modified": "2016-05-20T08:30:00Z",
//!   "sheets": [{ "title": "Summary", "rows": [["Project Name", "Checkout"]] }] }
//! ```
//!
//! `id` falls back to the file stem when absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rra2json_core::{Workbook, Worksheet, to_utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{DocumentSource, StoreError, file_stem, files_with_extension};

#[derive(Deserialize)]
struct ExportFile {
    #[serde(default)]
    id: Option<String>,
    title: String,
    last_modified: String,
    #[serde(default)]
    sheets: Vec<Worksheet>,
}

/// Read one export file into a workbook snapshot.
pub fn read_export(path: &Path) -> Result<Workbook, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let export: ExportFile = serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let last_modified =
        to_utc(&export.last_modified).ok_or_else(|| StoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: export.last_modified.clone(),
        })?;
    let id = export.id.unwrap_or_else(|| file_stem(path));
    debug!(document = %id, sheets = export.sheets.len(), "read export");
    Ok(Workbook::new(id, export.title, last_modified, export.sheets))
}

/// Every `*.json` file in one directory.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    dir: PathBuf,
}

impl JsonExportSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_each(&self) -> Result<Vec<Workbook>, StoreError> {
        let files = files_with_extension(&self.dir, &["json"])?;
        let mut books = Vec::with_capacity(files.len());
        for path in files {
            match read_export(&path) {
                Ok(book) => books.push(book),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable export"),
            }
        }
        Ok(books)
    }
}

impl DocumentSource for JsonExportSource {
    fn list_documents(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self
            .read_each()?
            .into_iter()
            .map(|book| (book.id, book.name))
            .collect())
    }

    fn open_all(&self) -> Result<Vec<Workbook>, StoreError> {
        let books = self.read_each()?;
        info!(dir = %self.dir.display(), count = books.len(), "opened JSON exports");
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKOUT: &str = r#"{
        "id": "1AbC",
        "title": "RRA - Checkout",
        "last_modified": "2016-05-20T08:30:00.000Z",
        "sheets": [
            { "title": "Summary", "rows": [["Project Name", "Checkout Service"], ["Scope"]] },
            { "title": "Questions work sheet", "rows": [] }
        ]
    }"#;

    #[test]
    fn reads_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout.json");
        std::fs::write(&path, CHECKOUT).unwrap();

        let book = read_export(&path).unwrap();
        assert_eq!(book.id, "1AbC");
        assert_eq!(book.title(), "Summary");
        assert_eq!(book.name, "RRA - Checkout");
        assert_eq!(
            rra2json_core::isoformat(&book.last_modified()),
            "2016-05-20T08:30:00+00:00"
        );
        let grid = book.grid(None).unwrap();
        assert_eq!(grid.value_right_of("Project Name"), "Checkout Service");
        assert!(book.grid(Some("questions work sheet")).is_some());
    }

    #[test]
    fn id_defaults_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc-42.json");
        std::fs::write(
            &path,
            r#"{"title": "t", "last_modified": "2020-01-01 00:00:00", "sheets": []}"#,
        )
        .unwrap();
        assert_eq!(read_export(&path).unwrap().id, "doc-42");
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        std::fs::write(&path, r#"{"title": "t", "last_modified": "yesterday"}"#).unwrap();
        let err = read_export(&path).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTimestamp { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn open_all_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), CHECKOUT).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let source = JsonExportSource::new(dir.path());
        let books = source.open_all().unwrap();
        assert_eq!(books.len(), 1);

        let listed = source.list_documents().unwrap();
        assert_eq!(listed.get("1AbC").map(String::as_str), Some("RRA - Checkout"));
    }
}
