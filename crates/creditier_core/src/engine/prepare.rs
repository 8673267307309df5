//! Optional table preparation before classification.
//!
//! # Responsibility
//! - Stable-sort records by available amount (nulls last).
//! - Keep the first record per identifier.
//!
//! # Invariants
//! - The input table is never modified; a new table is returned.
//! - Blank identifiers are never deduplicated against each other.

use crate::model::record::Record;
use crate::model::table::Table;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Preparation switches. Both are off by default so table order is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    pub sort_by_available: bool,
    pub dedup_by_id: bool,
}

impl PrepareOptions {
    pub fn is_noop(&self) -> bool {
        !self.sort_by_available && !self.dedup_by_id
    }
}

/// Returns the prepared copy of `table`.
pub fn prepare(table: &Table, options: PrepareOptions) -> Table {
    let mut records: Vec<Record> = table.records().to_vec();
    if options.sort_by_available {
        records.sort_by(|left, right| {
            compare_available(left.available_amount(), right.available_amount())
        });
    }
    if options.dedup_by_id {
        let mut seen = HashSet::new();
        records.retain(|record| record.has_blank_id() || seen.insert(record.id().to_string()));
    }
    table.with_records(records)
}

fn compare_available(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
