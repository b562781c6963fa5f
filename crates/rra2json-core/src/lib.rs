pub mod config;
pub mod grid;
pub mod normalize;
pub mod record;
pub mod time;
pub mod validate;
pub mod workbook;

pub use config::{BugzillaConfig, Config, ConfigError, Levels, SinkConfig, SourceConfig};
pub use grid::{CellRef, Grid};
pub use normalize::{
    UNKNOWN, comma_tokenize, fuzzy_team_name, normalize_data_level, validate_entry,
};
pub use record::{Area, DataDictionary, Dimension, Metadata, RiskEntry, RiskMatrix, RraRecord};
pub use time::{isoformat, to_utc};
pub use validate::missing_fields;
pub use workbook::{Workbook, Worksheet};
