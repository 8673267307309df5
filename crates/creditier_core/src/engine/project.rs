//! Output projection of classified tiers.
//!
//! # Responsibility
//! - Map a tier's records onto one of the output column schemas.
//! - Deduplicate projected rows, keeping first-occurrence order.
//!
//! # Invariants
//! - Projection never fails; a missing required attribute yields an empty,
//!   correctly-shaped table and a recorded gap.
//! - Identifier-bearing schemas never emit a row with a blank identifier.

use crate::error::{ConfigError, ConfigResult};
use crate::model::record::{Record, ID_COLUMN, REGISTRATION_NUMBER_COLUMN};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Column layout of projected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    /// Identifier only, deduplicated by value.
    IdentifierOnly,
    /// `[id, credential, registration_number, name]` with synthesized blanks.
    IdentifierAndCredential,
    /// Every attribute as-is.
    AllColumns,
}

impl OutputSchema {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentifierOnly => "identifier_only",
            Self::IdentifierAndCredential => "identifier_and_credential",
            Self::AllColumns => "all_columns",
        }
    }

    fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::IdentifierOnly => &[ID_COLUMN],
            Self::IdentifierAndCredential => &[ID_COLUMN, REGISTRATION_NUMBER_COLUMN],
            Self::AllColumns => &[],
        }
    }
}

impl FromStr for OutputSchema {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "identifier_only" => Ok(Self::IdentifierOnly),
            "identifier_and_credential" => Ok(Self::IdentifierAndCredential),
            "all_columns" => Ok(Self::AllColumns),
            _ => Err(ConfigError::UnknownOutputSchema(value.to_string())),
        }
    }
}

/// Output header names for the identifier-bearing schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputColumns {
    pub id: String,
    pub credential: String,
    pub registration_number: String,
    pub name: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            id: "cpf".to_string(),
            credential: "senha".to_string(),
            registration_number: "matricula".to_string(),
            name: "nome".to_string(),
        }
    }
}

impl OutputColumns {
    pub fn validate(&self) -> ConfigResult<()> {
        for (value, column) in [
            (&self.id, "id"),
            (&self.credential, "credential"),
            (&self.registration_number, "registration_number"),
            (&self.name, "name"),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyColumnName(column));
            }
        }
        Ok(())
    }

    fn header(&self, schema: OutputSchema, source_columns: &[String]) -> Vec<String> {
        match schema {
            OutputSchema::IdentifierOnly => vec![self.id.clone()],
            OutputSchema::IdentifierAndCredential => vec![
                self.id.clone(),
                self.credential.clone(),
                self.registration_number.clone(),
                self.name.clone(),
            ],
            OutputSchema::AllColumns => source_columns.to_vec(),
        }
    }
}

/// Rows of text cells ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ProjectedTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Projected tier plus the attribute whose absence emptied it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub table: ProjectedTable,
    pub gap: Option<String>,
}

/// Projects `records` (one tier) whose source schema is `source_columns`.
pub fn project(
    records: &[&Record],
    source_columns: &[String],
    schema: OutputSchema,
    names: &OutputColumns,
) -> Projection {
    let header = names.header(schema, source_columns);

    let missing = schema
        .required_columns()
        .iter()
        .find(|required| !source_columns.iter().any(|column| column == *required));
    if let Some(missing) = missing {
        warn!(
            "event=projection_gap module=engine status=warn schema={} missing={} rows={}",
            schema.as_str(),
            missing,
            records.len()
        );
        return Projection {
            table: ProjectedTable::new(header, Vec::new()),
            gap: Some(missing.to_string()),
        };
    }

    let rows = match schema {
        OutputSchema::IdentifierOnly => dedup_rows(
            records
                .iter()
                .filter(|record| !record.has_blank_id())
                .map(|record| vec![record.id().to_string()]),
        ),
        OutputSchema::IdentifierAndCredential => dedup_rows(
            records
                .iter()
                .filter(|record| !record.has_blank_id())
                .map(|record| {
                    vec![
                        record.id().to_string(),
                        String::new(),
                        record
                            .attribute(REGISTRATION_NUMBER_COLUMN)
                            .unwrap_or_default()
                            .to_string(),
                        String::new(),
                    ]
                }),
        ),
        OutputSchema::AllColumns => dedup_rows(records.iter().map(|record| {
            source_columns
                .iter()
                .map(|column| record.cell(column).unwrap_or_default())
                .collect()
        })),
    };

    Projection {
        table: ProjectedTable::new(header, rows),
        gap: None,
    }
}

fn dedup_rows(rows: impl Iterator<Item = Vec<String>>) -> Vec<Vec<String>> {
    let mut seen = HashSet::new();
    rows.filter(|row| seen.insert(row.clone())).collect()
}
