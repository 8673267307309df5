//! Tier classifier.
//!
//! # Responsibility
//! - Partition a table into one tier per rule plus a remainder tier.
//!
//! # Invariants
//! - Every record lands in exactly one tier; none is dropped.
//! - Records sharing a non-blank `id` always land in the same tier: the tier
//!   of the first rule (in priority order) that any of them satisfies.
//! - Records with a blank `id` are classified on their own.
//! - Within a tier, records keep table order.
//! - The result is a pure function of the table and the rule set.

use crate::model::record::Record;
use crate::model::table::Table;
use crate::rules::{RuleFamily, RuleSet, DEFAULT_REMAINDER_TIER};
use log::{debug, warn};
use std::collections::HashMap;

/// Named subset of a classified table.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier<'t> {
    name: String,
    records: Vec<&'t Record>,
}

impl<'t> Tier<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[&'t Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers in tier order, duplicates included.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.id())
    }
}

/// Result of one classification run: rule tiers in priority order, then the
/// remainder tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'t> {
    family: RuleFamily,
    tiers: Vec<Tier<'t>>,
    data_quality_warnings: usize,
}

impl<'t> Classification<'t> {
    pub fn family(&self) -> RuleFamily {
        self.family
    }

    pub fn tiers(&self) -> &[Tier<'t>] {
        &self.tiers
    }

    pub fn tier(&self, name: &str) -> Option<&Tier<'t>> {
        self.tiers.iter().find(|tier| tier.name == name)
    }

    /// The catch-all tier, always last.
    pub fn remainder(&self) -> &Tier<'t> {
        &self.tiers[self.tiers.len() - 1]
    }

    /// Records with a null amount. They are routed to the remainder unless a
    /// record sharing their `id` was claimed by a rule.
    pub fn data_quality_warnings(&self) -> usize {
        self.data_quality_warnings
    }

    pub fn total_records(&self) -> usize {
        self.tiers.iter().map(Tier::len).sum()
    }

    pub fn into_tiers(self) -> Vec<Tier<'t>> {
        self.tiers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ClaimKey<'t> {
    Id(&'t str),
    Row(usize),
}

fn claim_key(row: usize, record: &Record) -> ClaimKey<'_> {
    if record.has_blank_id() {
        ClaimKey::Row(row)
    } else {
        ClaimKey::Id(record.id())
    }
}

/// Classifies with the default remainder tier name.
pub fn classify<'t>(table: &'t Table, ruleset: &RuleSet) -> Classification<'t> {
    classify_with_remainder(table, ruleset, DEFAULT_REMAINDER_TIER)
}

/// Classifies `table` with `ruleset`, naming the catch-all tier `remainder`.
///
/// The rule set is expected to be validated by the caller; duplicate tier
/// names are tolerated here and simply produce separately ordered tiers.
pub fn classify_with_remainder<'t>(
    table: &'t Table,
    ruleset: &RuleSet,
    remainder: &str,
) -> Classification<'t> {
    let remainder_index = ruleset.rules.len();

    // First matching rule per claim key, by ordered short-circuit evaluation.
    let mut claims: HashMap<ClaimKey<'t>, usize> = HashMap::new();
    for (row, record) in table.records().iter().enumerate() {
        let Some(rule_index) = ruleset.rules.iter().position(|rule| rule.matches(record)) else {
            continue;
        };
        claims
            .entry(claim_key(row, record))
            .and_modify(|claimed| *claimed = (*claimed).min(rule_index))
            .or_insert(rule_index);
    }

    let mut tiers: Vec<Tier<'t>> = ruleset
        .rules
        .iter()
        .map(|rule| rule.name.as_str())
        .chain(std::iter::once(remainder))
        .map(|name| Tier {
            name: name.to_string(),
            records: Vec::new(),
        })
        .collect();

    let mut data_quality_warnings = 0usize;
    for (row, record) in table.records().iter().enumerate() {
        if record.has_missing_amount() {
            data_quality_warnings += 1;
        }
        let index = claims
            .get(&claim_key(row, record))
            .copied()
            .unwrap_or(remainder_index);
        tiers[index].records.push(record);
    }

    if data_quality_warnings > 0 {
        warn!(
            "event=classify module=engine status=warn missing_amount_records={}",
            data_quality_warnings
        );
    }
    debug!(
        "event=classify module=engine status=ok family={} records={} tiers={} remainder={}",
        ruleset.family.as_str(),
        table.len(),
        tiers.len(),
        tiers[remainder_index].len()
    );

    Classification {
        family: ruleset.family,
        tiers,
        data_quality_warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::classify;
    use crate::model::record::Record;
    use crate::model::table::Table;
    use crate::rules::{AmountRange, Predicate, Rule, RuleFamily, RuleSet};

    fn two_thresholds() -> RuleSet {
        RuleSet::new(
            RuleFamily::Threshold,
            vec![
                Rule::new("negatives", Predicate::threshold(AmountRange::below(0.0))),
                Rule::new("below_50", Predicate::threshold(AmountRange::below(50.0))),
            ],
        )
    }

    #[test]
    fn earlier_rule_wins_over_overlapping_later_rule() {
        let table = Table::from_records(vec![Record::new("1", Some(-5.0), Some(-5.0))]);
        let result = classify(&table, &two_thresholds());
        assert_eq!(result.tier("negatives").map(|t| t.len()), Some(1));
        assert_eq!(result.tier("below_50").map(|t| t.len()), Some(0));
    }

    #[test]
    fn shared_id_follows_first_claiming_rule() {
        let table = Table::from_records(vec![
            Record::new("A", Some(80.0), Some(80.0)),
            Record::new("A", Some(20.0), Some(20.0)),
            Record::new("B", Some(90.0), Some(90.0)),
        ]);
        let result = classify(&table, &two_thresholds());
        let below: Vec<&str> = result.tier("below_50").expect("tier").ids().collect();
        assert_eq!(below, vec!["A", "A"]);
        let rest: Vec<&str> = result.remainder().ids().collect();
        assert_eq!(rest, vec!["B"]);
    }

    #[test]
    fn blank_ids_are_not_merged() {
        let table = Table::from_records(vec![
            Record::new("", Some(-1.0), Some(-1.0)),
            Record::new(" ", Some(100.0), Some(100.0)),
        ]);
        let result = classify(&table, &two_thresholds());
        assert_eq!(result.tier("negatives").map(|t| t.len()), Some(1));
        assert_eq!(result.remainder().len(), 1);
    }

    #[test]
    fn null_amounts_fall_to_remainder_and_are_counted() {
        let table = Table::from_records(vec![
            Record::new("1", None, None),
            Record::new("2", Some(10.0), Some(10.0)),
        ]);
        let result = classify(&table, &two_thresholds());
        assert_eq!(result.remainder().ids().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(result.data_quality_warnings(), 1);
        assert_eq!(result.total_records(), 2);
    }

    #[test]
    fn empty_rule_set_puts_everything_in_remainder() {
        let table = Table::from_records(vec![Record::new("1", Some(1.0), Some(2.0))]);
        let result = classify(&table, &RuleSet::new(RuleFamily::Ratio, Vec::new()));
        assert_eq!(result.tiers().len(), 1);
        assert_eq!(result.remainder().name(), "remainder");
        assert_eq!(result.remainder().len(), 1);
    }
}
