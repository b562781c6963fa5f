//! The delivery seam, plus a sink that writes records to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rra2json_core::RraRecord;
use tracing::info;

use crate::SyncError;

/// Where a record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// URL or file path the record was sent to.
    pub target: String,
}

/// A downstream consumer of parsed records.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, record: &RraRecord) -> Result<Delivery, SyncError>;
}

/// Writes each record as `<source>.json` into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File a record is written to. Path separators in the source id are
    /// replaced so every record stays inside the directory.
    pub fn path_for(&self, record: &RraRecord) -> PathBuf {
        let stem: String = record
            .source
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> SyncError {
        SyncError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl Sink for DirectorySink {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn deliver(&self, record: &RraRecord) -> Result<Delivery, SyncError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.path_for(record);
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        info!(path = %path.display(), service = %record.service(), "wrote RRA record");
        Ok(Delivery {
            target: path.display().to_string(),
        })
    }
}
