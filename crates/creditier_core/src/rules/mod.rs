//! Classification rules.
//!
//! # Responsibility
//! - Describe tier predicates as data so rule sets are caller configuration.
//! - Select one rule family per run.

pub mod predicate;
pub mod ruleset;

pub use predicate::{AmountRange, Bound, Predicate};
pub use ruleset::{Rule, RuleFamily, RuleSet, RuleStrategy, DEFAULT_REMAINDER_TIER};
