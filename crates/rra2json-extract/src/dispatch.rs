//! Per-document dispatch and the batch report.
//!
//! Every document produces exactly one [`Outcome`]. Nothing a single
//! document contains can stop the batch: skips are typed, and a parser that
//! panics is caught and reported as [`Outcome::Failed`] for that document.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use rra2json_core::config::DEFAULT_SCAN_LIMIT;
use rra2json_core::{Config, Levels, RraRecord, Workbook};
use tracing::{error, info, warn};

use crate::detect::{Detection, Unrecognized, detect_version};
use crate::parsers::ParseContext;
use crate::registry::ParserRegistry;

/// Why a document produced no record without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unrecognized(Unrecognized),
    /// Detected, but no parser is registered for this version.
    UnsupportedVersion(String),
    /// The parser found no identifying field.
    Incomplete { version: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrecognized(why) => write!(f, "unrecognized: {why}"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported version {v}"),
            Self::Incomplete { version } => write!(f, "incomplete {version} document"),
        }
    }
}

/// Result of dispatching one document.
#[derive(Debug, Clone)]
pub enum Outcome {
    Parsed {
        version: String,
        record: Box<RraRecord>,
    },
    Skipped(SkipReason),
    /// The parser panicked; `message` is the panic payload when it was text.
    Failed { version: String, message: String },
}

impl Outcome {
    pub fn record(&self) -> Option<&RraRecord> {
        match self {
            Self::Parsed { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Parsed { version, .. } | Self::Failed { version, .. } => Some(version),
            Self::Skipped(SkipReason::UnsupportedVersion(version))
            | Self::Skipped(SkipReason::Incomplete { version }) => Some(version),
            Self::Skipped(SkipReason::Unrecognized(_)) => None,
        }
    }
}

/// One line of the batch report.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub id: String,
    pub name: String,
    pub outcome: Outcome,
}

/// Outcomes of a whole batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn parsed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Parsed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Skips broken down by reason kind: unrecognized, unsupported, incomplete.
    pub fn skip_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for doc in &self.documents {
            match &doc.outcome {
                Outcome::Skipped(SkipReason::Unrecognized(_)) => counts.0 += 1,
                Outcome::Skipped(SkipReason::UnsupportedVersion(_)) => counts.1 += 1,
                Outcome::Skipped(SkipReason::Incomplete { .. }) => counts.2 += 1,
                _ => {}
            }
        }
        counts
    }

    pub fn records(&self) -> impl Iterator<Item = &RraRecord> {
        self.documents.iter().filter_map(|d| d.outcome.record())
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }
}

/// Detect, parse and stamp documents against a parser registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ParserRegistry,
    levels: Levels,
    scan_limit: usize,
}

impl Dispatcher {
    pub fn new(registry: ParserRegistry, levels: Levels) -> Self {
        Self {
            registry,
            levels,
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }

    /// Default registry with the vocabularies and scan limit from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ParserRegistry::default(), config.levels.clone())
            .with_scan_limit(config.scan_limit)
    }

    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Run one document through detection and its parser.
    pub fn process(&self, book: &Workbook, now: DateTime<Utc>) -> Outcome {
        let version = match detect_version(book) {
            Detection::Version(v) => v,
            Detection::Unrecognized(why) => {
                warn!(document = %book.id, reason = %why, "skipping unrecognized document");
                return Outcome::Skipped(SkipReason::Unrecognized(why));
            }
        };

        let Some(parser) = self.registry.get(&version) else {
            warn!(document = %book.id, version = %version, "no parser for version");
            return Outcome::Skipped(SkipReason::UnsupportedVersion(version));
        };

        let ctx = ParseContext::new(&self.levels, now).with_scan_limit(self.scan_limit);
        match panic::catch_unwind(AssertUnwindSafe(|| parser(book, &ctx))) {
            Ok(Some(mut record)) => {
                record.details.metadata.rra_version = Some(version.clone());
                info!(
                    document = %book.id,
                    version = %version,
                    service = %record.service(),
                    "parsed RRA"
                );
                Outcome::Parsed {
                    version,
                    record: Box::new(record),
                }
            }
            Ok(None) => {
                warn!(document = %book.id, version = %version, "document has no service name, skipping");
                Outcome::Skipped(SkipReason::Incomplete { version })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(document = %book.id, version = %version, error = %message, "parser failed");
                Outcome::Failed { version, message }
            }
        }
    }

    /// Process every document with the same extraction time.
    pub fn run_batch(&self, books: &[Workbook], now: DateTime<Utc>) -> BatchReport {
        let documents: Vec<DocumentReport> = books
            .iter()
            .map(|book| DocumentReport {
                id: book.id.clone(),
                name: book.name.clone(),
                outcome: self.process(book, now),
            })
            .collect();
        let report = BatchReport { documents };
        info!(
            total = report.documents.len(),
            parsed = report.parsed(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch complete"
        );
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "parser panicked".to_string()
    }
}
