//! Document sources: where workbook snapshots come from.
//!
//! A source hands out fully materialised [`Workbook`]s. Extraction never
//! talks to a source directly, so anything that can produce grids of strings
//! (an export directory, spreadsheet files on disk) can feed it.

mod error;
pub use error::StoreError;

mod json;
pub use json::{JsonExportSource, read_export};

#[cfg(feature = "xlsx")]
mod xlsx;
#[cfg(feature = "xlsx")]
pub use xlsx::{WorkbookSource, read_workbook};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rra2json_core::Workbook;

/// A place RRA documents can be read from.
pub trait DocumentSource {
    /// Document id → title for everything the source holds.
    fn list_documents(&self) -> Result<BTreeMap<String, String>, StoreError>;

    /// Every readable document. Unreadable ones are logged and left out.
    fn open_all(&self) -> Result<Vec<Workbook>, StoreError>;
}

/// Files directly under `dir` whose extension is one of `extensions`
/// (case-insensitive), sorted by path.
pub(crate) fn files_with_extension(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::NotFound(dir.to_path_buf()));
    }
    let io_err = |source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name without extension, used as a document id.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
