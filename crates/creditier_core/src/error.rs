//! Configuration error taxonomy.
//!
//! # Responsibility
//! - Name every fatal problem that must stop an export run before any
//!   classification work starts.
//!
//! # Invariants
//! - Every variant identifies the offending attribute or parameter.
//! - Data-quality problems (unparseable amounts) and projection gaps are
//!   never represented here; they are absorbed by the engine.

use crate::rules::RuleFamily;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration problem surfaced to the caller once per run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Required canonical attributes absent from the input table.
    MissingAttributes(Vec<String>),
    /// Chunk limit must be strictly positive.
    InvalidChunkLimit(i64),
    /// Output schema string did not match any known schema.
    UnknownOutputSchema(String),
    /// A rule or the remainder tier has a blank name.
    EmptyTierName,
    /// Two tiers in one rule set share a name.
    DuplicateTierName(String),
    /// A rule reuses the remainder tier name.
    ReservedTierName(String),
    /// A tier name contains characters that cannot appear in a file name.
    UnsafeTierName(String),
    /// A tier name equals a split file name of another tier (`x_parte1` next
    /// to `x`).
    TierNameCollision { tier: String, base: String },
    /// A rule's predicate kind is not allowed in its rule set family, or a
    /// rule set was wired into the wrong strategy slot.
    RuleFamilyMismatch { rule: String, family: RuleFamily },
    /// A bound is not finite or a range is empty.
    InvalidBound { rule: String, detail: String },
    /// An output column name is blank.
    EmptyColumnName(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAttributes(names) => {
                write!(f, "missing required attribute(s): {}", names.join(", "))
            }
            Self::InvalidChunkLimit(limit) => {
                write!(f, "chunk limit must be greater than zero, got {limit}")
            }
            Self::UnknownOutputSchema(value) => write!(
                f,
                "unknown output schema `{value}`; expected identifier_only|identifier_and_credential|all_columns"
            ),
            Self::EmptyTierName => write!(f, "tier name cannot be empty"),
            Self::DuplicateTierName(name) => write!(f, "duplicate tier name `{name}`"),
            Self::ReservedTierName(name) => {
                write!(f, "tier name `{name}` is reserved for the remainder tier")
            }
            Self::UnsafeTierName(name) => {
                write!(f, "tier name `{name}` cannot be used in a file name")
            }
            Self::TierNameCollision { tier, base } => write!(
                f,
                "tier name `{tier}` collides with the split files of tier `{base}`"
            ),
            Self::RuleFamilyMismatch { rule, family } => write!(
                f,
                "rule `{rule}` is not allowed in a {} rule set",
                family.as_str()
            ),
            Self::InvalidBound { rule, detail } => {
                write!(f, "invalid bound in rule `{rule}`: {detail}")
            }
            Self::EmptyColumnName(column) => {
                write!(f, "output column name for `{column}` cannot be empty")
            }
        }
    }
}

impl Error for ConfigError {}
