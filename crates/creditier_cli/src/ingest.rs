//! CSV ingestion into a normalized table.
//!
//! # Responsibility
//! - Read one or more delimited text files, sniffing each file's delimiter.
//! - Union columns across files (outer join, missing cells null).
//! - Rename mapped source columns to canonical attribute names.
//!
//! # Invariants
//! - Row order is file order, then line order.
//! - Cell text is handed to the core untouched except for empty cells, which
//!   become null.

use crate::settings::ColumnMapping;
use anyhow::Context;
use creditier_core::Table;
use csv::ReaderBuilder;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Reads and concatenates `paths` into one table.
pub fn read_table(paths: &[impl AsRef<Path>], mapping: &ColumnMapping) -> anyhow::Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        let delimiter = sniff_delimiter(content.lines().next().unwrap_or_default());

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .with_context(|| format!("failed to read header of `{}`", path.display()))?
            .clone();
        let positions: Vec<usize> = headers
            .iter()
            .map(|header| {
                let name = canonical_name(header, mapping);
                match columns.iter().position(|column| *column == name) {
                    Some(position) => position,
                    None => {
                        columns.push(name);
                        columns.len() - 1
                    }
                }
            })
            .collect();

        let before = rows.len();
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("failed to read row {} of `{}`", line + 2, path.display())
            })?;
            let mut row = vec![None; columns.len()];
            for (cell, position) in record.iter().zip(&positions) {
                if !cell.is_empty() {
                    row[*position] = Some(cell.to_string());
                }
            }
            rows.push(row);
        }

        info!(
            "event=ingest_file module=ingest status=ok rows={} columns={} delimiter={:?}",
            rows.len() - before,
            headers.len(),
            char::from(delimiter)
        );
    }

    for row in &mut rows {
        row.resize(columns.len(), None);
    }
    Ok(Table::from_text_rows(columns, rows))
}

/// Picks the candidate delimiter occurring most often in the header line.
///
/// Ties resolve in candidate order; a line with no candidate yields `,`.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0usize);
    for candidate in DELIMITER_CANDIDATES {
        let count = header_line.bytes().filter(|byte| *byte == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Lowercases and collapses whitespace for header comparison.
pub fn normalize_header(raw: &str) -> String {
    WHITESPACE_RE
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

fn canonical_name(header: &str, mapping: &ColumnMapping) -> String {
    let normalized = normalize_header(header);
    mapping
        .pairs()
        .iter()
        .find(|(source, _)| normalize_header(source) == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| header.trim().to_string())
}
