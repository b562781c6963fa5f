use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("source directory not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid export {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("unparseable last_modified {value:?} in {path}")]
    InvalidTimestamp {
        path: std::path::PathBuf,
        value: String,
    },

    #[cfg(feature = "xlsx")]
    #[error("spreadsheet error in {path}: {source}")]
    Workbook {
        path: std::path::PathBuf,
        source: calamine::Error,
    },
}
