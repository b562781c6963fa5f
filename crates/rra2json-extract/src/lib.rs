//! RRA extraction: template version detection, per-version parsers and
//! batch dispatch over workbook snapshots.

pub mod detect;
pub mod dispatch;
pub mod parsers;
pub mod registry;

pub use detect::{Detection, Unrecognized, detect_version, nodots};
pub use dispatch::{BatchReport, Dispatcher, DocumentReport, Outcome, SkipReason};
pub use parsers::{ParseContext, ParseFn};
pub use registry::ParserRegistry;
