//! Normalized credit-line record.
//!
//! # Responsibility
//! - Hold one row handed over by the normalizer with typed amount fields.
//! - Render any attribute back to text for passthrough projection.
//!
//! # Invariants
//! - `id` is opaque text and is never parsed as a number.
//! - Amounts are either finite `f64` values or `None`.
//! - Source text of an amount cell, when known, is what projection renders;
//!   the parsed value never overwrites it.
//! - Records are immutable once built; only builder-style constructors exist.

use std::collections::BTreeMap;

/// Canonical identifier attribute.
pub const ID_COLUMN: &str = "id";
/// Canonical available credit-line amount attribute.
pub const AVAILABLE_AMOUNT_COLUMN: &str = "available_amount";
/// Canonical total credit-line amount attribute.
pub const TOTAL_AMOUNT_COLUMN: &str = "total_amount";
/// Secondary registration number used by the credential schema.
pub const REGISTRATION_NUMBER_COLUMN: &str = "registration_number";
/// Person name passthrough attribute.
pub const NAME_COLUMN: &str = "name";
/// Grouping category passthrough attribute.
pub const GROUP_COLUMN: &str = "group";

/// Attributes every input table must carry before classification.
pub const REQUIRED_COLUMNS: [&str; 3] = [ID_COLUMN, AVAILABLE_AMOUNT_COLUMN, TOTAL_AMOUNT_COLUMN];

/// One normalized input row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    available_amount: Option<f64>,
    total_amount: Option<f64>,
    available_text: Option<String>,
    total_text: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl Record {
    /// Creates a record with no passthrough attributes.
    ///
    /// Non-finite amounts are stored as `None`.
    pub fn new(
        id: impl Into<String>,
        available_amount: Option<f64>,
        total_amount: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            available_amount: available_amount.filter(|value| value.is_finite()),
            total_amount: total_amount.filter(|value| value.is_finite()),
            available_text: None,
            total_text: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns this record carrying the raw source text of both amount cells.
    ///
    /// The typed amounts are unchanged; only rendering uses the text.
    pub fn with_amount_text(
        mut self,
        available: Option<impl Into<String>>,
        total: Option<impl Into<String>>,
    ) -> Self {
        self.available_text = available.map(Into::into);
        self.total_text = total.map(Into::into);
        self
    }

    /// Returns this record with one passthrough attribute set.
    ///
    /// Canonical attribute names are ignored here; use the typed fields.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !is_typed_column(name.as_str()) {
            self.attributes.insert(name, value.into());
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether `id` is empty after trimming whitespace.
    pub fn has_blank_id(&self) -> bool {
        self.id.trim().is_empty()
    }

    pub fn available_amount(&self) -> Option<f64> {
        self.available_amount
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }

    /// Whether either amount is null.
    pub fn has_missing_amount(&self) -> bool {
        self.available_amount.is_none() || self.total_amount.is_none()
    }

    /// Whether both amounts hold the same value, treating two nulls as equal.
    pub fn amounts_identical(&self) -> bool {
        self.available_amount == self.total_amount
    }

    /// Passthrough attribute value, `None` when null.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Passthrough attribute names in sorted order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Renders any attribute, typed or passthrough, as output text.
    ///
    /// Amount cells render their source text when it is known, so unparseable
    /// values survive. Returns `None` for null cells.
    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            ID_COLUMN => Some(self.id.clone()),
            AVAILABLE_AMOUNT_COLUMN => self
                .available_text
                .clone()
                .or_else(|| self.available_amount.map(format_amount)),
            TOTAL_AMOUNT_COLUMN => self
                .total_text
                .clone()
                .or_else(|| self.total_amount.map(format_amount)),
            other => self.attribute(other).map(str::to_string),
        }
    }
}

/// Coerces raw cell text into an amount.
///
/// Blank, unparseable and non-finite values become `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Shortest round-trippable text for an amount (`80`, `-10`, `0.35`).
pub fn format_amount(value: f64) -> String {
    format!("{value}")
}

pub(crate) fn is_typed_column(name: &str) -> bool {
    matches!(
        name,
        ID_COLUMN | AVAILABLE_AMOUNT_COLUMN | TOTAL_AMOUNT_COLUMN
    )
}
