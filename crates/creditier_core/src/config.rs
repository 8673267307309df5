//! Export run configuration.
//!
//! # Responsibility
//! - Describe one export run as plain serde data (JSON on disk).
//! - Keep every default in one place.
//!
//! # Invariants
//! - Loading never validates; `ExportPlan::from_config` does, before any
//!   classification work starts.

use crate::engine::chunk::DEFAULT_CHUNK_LIMIT;
use crate::engine::naming::DEFAULT_GROUP_LABEL;
use crate::engine::prepare::PrepareOptions;
use crate::engine::project::{OutputColumns, OutputSchema};
use crate::model::record::GROUP_COLUMN;
use crate::rules::{RuleStrategy, DEFAULT_REMAINDER_TIER};
use serde::{Deserialize, Serialize};

/// Caller-supplied export configuration.
///
/// `schema` and `chunk_limit` stay loosely typed so that invalid values are
/// reported as configuration errors naming the parameter, not as parse errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub schema: String,
    pub chunk_limit: i64,
    pub group_column: String,
    pub default_group_label: String,
    pub remainder_tier: String,
    pub prepare: PrepareOptions,
    pub output_columns: OutputColumns,
    pub rules: RuleStrategy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schema: OutputSchema::IdentifierOnly.as_str().to_string(),
            chunk_limit: DEFAULT_CHUNK_LIMIT as i64,
            group_column: GROUP_COLUMN.to_string(),
            default_group_label: DEFAULT_GROUP_LABEL.to_string(),
            remainder_tier: DEFAULT_REMAINDER_TIER.to_string(),
            prepare: PrepareOptions::default(),
            output_columns: OutputColumns::default(),
            rules: RuleStrategy::default(),
        }
    }
}

impl ExportConfig {
    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
