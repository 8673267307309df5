//! Ordered record table handed to the engine.
//!
//! # Responsibility
//! - Keep the union schema (column order) next to the ordered records.
//! - Coerce raw text rows from the normalizer into typed records.
//! - Answer table-level shape questions (required columns, identical amounts).
//!
//! # Invariants
//! - Record order is ingestion order and is never changed by the table itself.
//! - `columns` has no duplicates.

use crate::error::{ConfigError, ConfigResult};
use crate::model::record::{
    is_typed_column, parse_amount, Record, AVAILABLE_AMOUNT_COLUMN, ID_COLUMN, REQUIRED_COLUMNS,
    TOTAL_AMOUNT_COLUMN,
};
use log::warn;

/// Normalized input table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Creates a table from an explicit schema and records.
    ///
    /// Duplicate column names keep their first position.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Self {
            columns: unique,
            records,
        }
    }

    /// Creates a table whose schema is the canonical columns followed by every
    /// passthrough attribute in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for record in &records {
            for name in record.attribute_names() {
                if !columns.iter().any(|column| column == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Self { columns, records }
    }

    /// Builds a table from raw text rows aligned to `columns`.
    ///
    /// Short rows are padded with nulls. Amount cells that are present but
    /// cannot be parsed become null and are logged as one aggregated warning;
    /// their source text is kept for passthrough rendering.
    pub fn from_text_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let position = |name: &str| columns.iter().position(|column| column == name);
        let id_at = position(ID_COLUMN);
        let available_at = position(AVAILABLE_AMOUNT_COLUMN);
        let total_at = position(TOTAL_AMOUNT_COLUMN);

        let mut unparseable_cells = 0usize;
        let mut coerce = |row: &[Option<String>], at: Option<usize>| -> Option<f64> {
            let raw = at.and_then(|index| row.get(index)).and_then(Option::as_deref)?;
            let parsed = parse_amount(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                unparseable_cells += 1;
            }
            parsed
        };

        let raw_cell = |row: &[Option<String>], at: Option<usize>| -> Option<String> {
            at.and_then(|index| row.get(index)).cloned().flatten()
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = id_at
                .and_then(|index| row.get(index))
                .and_then(Option::as_deref)
                .unwrap_or_default();
            let available = coerce(row.as_slice(), available_at);
            let total = coerce(row.as_slice(), total_at);
            let mut record = Record::new(id, available, total).with_amount_text(
                raw_cell(row.as_slice(), available_at),
                raw_cell(row.as_slice(), total_at),
            );
            for (index, column) in columns.iter().enumerate() {
                if is_typed_column(column) {
                    continue;
                }
                if let Some(Some(value)) = row.get(index) {
                    record = record.with_attribute(column.as_str(), value.as_str());
                }
            }
            records.push(record);
        }

        if unparseable_cells > 0 {
            warn!(
                "event=amount_coercion module=model status=warn unparseable_cells={} rows={}",
                unparseable_cells,
                records.len()
            );
        }

        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Required canonical attributes absent from the schema, in canonical order.
    pub fn missing_required_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Fails with [`ConfigError::MissingAttributes`] naming every absent
    /// required attribute.
    pub fn ensure_required_columns(&self) -> ConfigResult<()> {
        let missing = self.missing_required_columns();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingAttributes(missing))
        }
    }

    /// Whether `available_amount` equals `total_amount` on every row.
    ///
    /// Two nulls compare equal; an empty table is trivially identical.
    pub fn amounts_identical(&self) -> bool {
        self.records.iter().all(Record::amounts_identical)
    }

    /// Returns a table with the same schema and the given records.
    pub(crate) fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }
}
