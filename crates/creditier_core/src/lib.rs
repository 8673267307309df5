//! Credit-line tier partitioning engine.
//! This crate owns every classification and segmentation invariant; I/O lives
//! with the callers.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod rules;

pub use config::ExportConfig;
pub use engine::chunk::{chunk, split_rows, ChunkLimit, Segment, DEFAULT_CHUNK_LIMIT};
pub use engine::classify::{classify, classify_with_remainder, Classification, Tier};
pub use engine::naming::{group_label, segment_file_name, DEFAULT_GROUP_LABEL};
pub use engine::prepare::{prepare, PrepareOptions};
pub use engine::project::{project, OutputColumns, OutputSchema, ProjectedTable, Projection};
pub use error::{ConfigError, ConfigResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::record::{
    parse_amount, Record, AVAILABLE_AMOUNT_COLUMN, GROUP_COLUMN, ID_COLUMN, NAME_COLUMN,
    REGISTRATION_NUMBER_COLUMN, REQUIRED_COLUMNS, TOTAL_AMOUNT_COLUMN,
};
pub use model::table::Table;
pub use pipeline::{ExportBundle, ExportPlan, NamedSegment, TierExport};
pub use rules::{
    AmountRange, Bound, Predicate, Rule, RuleFamily, RuleSet, RuleStrategy,
    DEFAULT_REMAINDER_TIER,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
