//! Ordered rule sets and per-run family selection.
//!
//! # Responsibility
//! - Group named predicates into an ordered, validated rule set.
//! - Pick exactly one rule set per run from table-level inspection.
//!
//! # Invariants
//! - Rule order is priority order.
//! - Tier names are unique within a rule set and never equal the remainder name.
//! - Every tier name is file safe and none names another tier's split file.
//! - A threshold-family set contains only threshold predicates.

use crate::engine::naming::{is_file_safe, part_suffix_base};
use crate::error::{ConfigError, ConfigResult};
use crate::model::record::Record;
use crate::model::table::Table;
use crate::rules::predicate::{AmountRange, Predicate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default name of the catch-all tier.
pub const DEFAULT_REMAINDER_TIER: &str = "remainder";

/// Rule family chosen once per classification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    /// Single-field case: both amount columns are identical.
    Threshold,
    /// General two-field case.
    Ratio,
}

impl RuleFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Ratio => "ratio",
        }
    }

    fn allows(self, predicate: &Predicate) -> bool {
        match self {
            Self::Threshold => matches!(predicate, Predicate::Threshold { .. }),
            Self::Ratio => true,
        }
    }
}

/// Named predicate producing one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub predicate: Predicate,
}

impl Rule {
    pub fn new(name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicate.matches(record)
    }
}

/// Ordered rule list of one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub family: RuleFamily,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(family: RuleFamily, rules: Vec<Rule>) -> Self {
        Self { family, rules }
    }

    /// Threshold tiers for tables whose two amount columns are identical.
    ///
    /// `negatives < 0`, `below_50 < 50`, `below_300 [50, 300)`,
    /// `below_500 [300, 500)`.
    pub fn default_equal_amounts() -> Self {
        Self::new(
            RuleFamily::Threshold,
            vec![
                Rule::new("negatives", Predicate::threshold(AmountRange::below(0.0))),
                Rule::new("below_50", Predicate::threshold(AmountRange::below(50.0))),
                Rule::new(
                    "below_300",
                    Predicate::threshold(AmountRange::between(50.0, 300.0)),
                ),
                Rule::new(
                    "below_500",
                    Predicate::threshold(AmountRange::between(300.0, 500.0)),
                ),
            ],
        )
    }

    /// Ratio tiers for the general two-field case.
    ///
    /// `negatives < 0`, `below_50 < 50`, `heavy_borrower` ratio `< 0.35` with
    /// available `>= 50`, `borrower` when the amounts differ.
    pub fn default_distinct_amounts() -> Self {
        Self::new(
            RuleFamily::Ratio,
            vec![
                Rule::new("negatives", Predicate::threshold(AmountRange::below(0.0))),
                Rule::new("below_50", Predicate::threshold(AmountRange::below(50.0))),
                Rule::new(
                    "heavy_borrower",
                    Predicate::ratio_below(0.35, AmountRange::at_least(50.0)),
                ),
                Rule::new("borrower", Predicate::AmountsDiffer),
            ],
        )
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Validates names, family membership and bounds.
    pub fn validate(&self, remainder_tier: &str) -> ConfigResult<()> {
        let remainder_tier = remainder_tier.trim();
        if remainder_tier.is_empty() {
            return Err(ConfigError::EmptyTierName);
        }
        if !is_file_safe(remainder_tier) {
            return Err(ConfigError::UnsafeTierName(remainder_tier.to_string()));
        }
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            let name = rule.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyTierName);
            }
            if name == remainder_tier {
                return Err(ConfigError::ReservedTierName(name.to_string()));
            }
            if !is_file_safe(name) {
                return Err(ConfigError::UnsafeTierName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateTierName(name.to_string()));
            }
            if !self.family.allows(&rule.predicate) {
                return Err(ConfigError::RuleFamilyMismatch {
                    rule: rule.name.clone(),
                    family: self.family,
                });
            }
            rule.predicate
                .check()
                .map_err(|detail| ConfigError::InvalidBound {
                    rule: rule.name.clone(),
                    detail,
                })?;
        }

        seen.insert(remainder_tier);
        for name in &seen {
            if let Some(base) = part_suffix_base(name).filter(|base| seen.contains(base)) {
                return Err(ConfigError::TierNameCollision {
                    tier: name.to_string(),
                    base: base.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Pair of rule sets from which one is selected per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStrategy {
    /// Used when both amount columns are identical on every row.
    pub equal_amounts: RuleSet,
    /// Used otherwise.
    pub distinct_amounts: RuleSet,
}

impl Default for RuleStrategy {
    fn default() -> Self {
        Self {
            equal_amounts: RuleSet::default_equal_amounts(),
            distinct_amounts: RuleSet::default_distinct_amounts(),
        }
    }
}

impl RuleStrategy {
    /// Selects the rule set for this table. Never mixes families per row.
    pub fn select(&self, table: &Table) -> &RuleSet {
        if table.amounts_identical() {
            &self.equal_amounts
        } else {
            &self.distinct_amounts
        }
    }

    /// Validates both sets and that each sits in the slot of its family.
    pub fn validate(&self, remainder_tier: &str) -> ConfigResult<()> {
        for (set, expected) in [
            (&self.equal_amounts, RuleFamily::Threshold),
            (&self.distinct_amounts, RuleFamily::Ratio),
        ] {
            if set.family != expected {
                return Err(ConfigError::RuleFamilyMismatch {
                    rule: set.tier_names().next().unwrap_or("<empty>").to_string(),
                    family: set.family,
                });
            }
            set.validate(remainder_tier)?;
        }
        Ok(())
    }
}
