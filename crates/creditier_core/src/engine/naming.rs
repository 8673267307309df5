//! Export file naming.
//!
//! # Invariants
//! - Single-segment tiers are named `<group> - <tier>.csv`.
//! - Multi-segment tiers are named `<group> - <tier>_parteN.csv`, N 1-based.
//! - Group labels never contain path separators or control characters.
//! - Tier names are used verbatim; configuration rejects names that are not
//!   file safe or that would collide with another tier's split files.

use crate::model::table::Table;
use once_cell::sync::Lazy;
use regex::Regex;

/// Group label used when the grouping column is absent or blank everywhere.
pub const DEFAULT_GROUP_LABEL: &str = "GROUP";

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[/\\:*?"<>|\x00-\x1F]"#).expect("valid unsafe file char regex")
});

static PART_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_parte[0-9]+$").expect("valid part suffix regex"));

/// First non-blank value of `column`, or `default` when none exists.
pub fn group_label(table: &Table, column: &str, default: &str) -> String {
    let label = table
        .records()
        .iter()
        .filter_map(|record| record.attribute(column))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(default);
    sanitize_label(label)
}

/// Replaces characters that cannot appear in a file name with `_`.
pub fn sanitize_label(label: &str) -> String {
    UNSAFE_FILE_CHARS_RE
        .replace_all(label.trim(), "_")
        .into_owned()
}

/// Whether `name` can appear verbatim inside a file name.
pub fn is_file_safe(name: &str) -> bool {
    !UNSAFE_FILE_CHARS_RE.is_match(name) && !matches!(name.trim(), "." | "..")
}

/// Tier name whose split files would share a name with tier `name`.
///
/// `below_50_parte2` yields `below_50`; names without a part suffix yield `None`.
pub fn part_suffix_base(name: &str) -> Option<&str> {
    PART_SUFFIX_RE
        .captures(name)
        .and_then(|captures| captures.get(1))
        .map(|base| base.as_str())
}

/// File name for segment `index` of `segment_count` in tier `tier`.
pub fn segment_file_name(group: &str, tier: &str, index: usize, segment_count: usize) -> String {
    if segment_count <= 1 {
        format!("{group} - {tier}.csv")
    } else {
        format!("{group} - {tier}_parte{index}.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        group_label, is_file_safe, part_suffix_base, sanitize_label, segment_file_name,
        DEFAULT_GROUP_LABEL,
    };
    use crate::model::record::Record;
    use crate::model::table::Table;

    #[test]
    fn single_and_multi_segment_names() {
        assert_eq!(segment_file_name("ACME", "below_50", 1, 1), "ACME - below_50.csv");
        assert_eq!(
            segment_file_name("ACME", "remainder", 2, 3),
            "ACME - remainder_parte2.csv"
        );
    }

    #[test]
    fn group_label_takes_first_non_blank_value() {
        let table = Table::from_records(vec![
            Record::new("1", None, None).with_attribute("group", "  "),
            Record::new("2", None, None).with_attribute("group", "gov/sp"),
            Record::new("3", None, None).with_attribute("group", "other"),
        ]);
        assert_eq!(group_label(&table, "group", DEFAULT_GROUP_LABEL), "gov_sp");
    }

    #[test]
    fn group_label_falls_back_to_default() {
        let table = Table::from_records(vec![Record::new("1", None, None)]);
        assert_eq!(group_label(&table, "group", DEFAULT_GROUP_LABEL), "GROUP");
    }

    #[test]
    fn sanitize_replaces_control_characters() {
        assert_eq!(sanitize_label("a\tb:c"), "a_b_c");
    }

    #[test]
    fn file_safety_rejects_separators_and_dot_names() {
        assert!(is_file_safe("below_50"));
        assert!(is_file_safe("heavy borrower"));
        assert!(!is_file_safe("low/50"));
        assert!(!is_file_safe("low\\50"));
        assert!(!is_file_safe(".."));
        assert!(!is_file_safe("."));
    }

    #[test]
    fn part_suffix_base_strips_numbered_suffix() {
        assert_eq!(part_suffix_base("x_parte1"), Some("x"));
        assert_eq!(part_suffix_base("below_50_parte12"), Some("below_50"));
        assert_eq!(part_suffix_base("x_parte"), None);
        assert_eq!(part_suffix_base("_parte1"), None);
        assert_eq!(part_suffix_base("remainder"), None);
    }
}
