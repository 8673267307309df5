//! CLI configuration file.
//!
//! # Responsibility
//! - Extend the core export configuration with the source column mapping the
//!   normalizer needs.
//!
//! # Invariants
//! - Every field is optional in JSON; absent fields take their defaults.

use anyhow::Context;
use creditier_core::ExportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source column names mapped onto canonical attributes.
///
/// Matching is case-insensitive and ignores repeated or surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: String,
    pub available_amount: String,
    pub total_amount: String,
    pub registration_number: String,
    pub name: String,
    pub group: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "CPF".to_string(),
            available_amount: "MG_Emprestimo_Disponivel".to_string(),
            total_amount: "MG_Emprestimo_Total".to_string(),
            registration_number: "Matricula".to_string(),
            name: "Nome".to_string(),
            group: "Convenio".to_string(),
        }
    }
}

impl ColumnMapping {
    /// `(source name, canonical name)` pairs.
    pub fn pairs(&self) -> [(&str, &'static str); 6] {
        [
            (self.id.as_str(), creditier_core::ID_COLUMN),
            (
                self.available_amount.as_str(),
                creditier_core::AVAILABLE_AMOUNT_COLUMN,
            ),
            (self.total_amount.as_str(), creditier_core::TOTAL_AMOUNT_COLUMN),
            (
                self.registration_number.as_str(),
                creditier_core::REGISTRATION_NUMBER_COLUMN,
            ),
            (self.name.as_str(), creditier_core::NAME_COLUMN),
            (self.group.as_str(), creditier_core::GROUP_COLUMN),
        ]
    }
}

/// Whole configuration file: core export settings plus column mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(flatten)]
    pub export: ExportConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
}

impl CliSettings {
    /// Loads settings from `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config `{}`", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::CliSettings;
    use std::io::Write;

    #[test]
    fn load_without_path_returns_defaults() {
        let settings = CliSettings::load(None).expect("defaults");
        assert_eq!(settings.columns.id, "CPF");
        assert_eq!(settings.export.chunk_limit, 50_000);
    }

    #[test]
    fn load_merges_flattened_export_fields_and_mapping() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "schema": "all_columns", "columns": {{ "id": "documento" }} }}"#
        )
        .expect("write config");

        let settings = CliSettings::load(Some(file.path())).expect("settings");
        assert_eq!(settings.export.schema, "all_columns");
        assert_eq!(settings.columns.id, "documento");
        assert_eq!(settings.columns.total_amount, "MG_Emprestimo_Total");
    }

    #[test]
    fn load_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write config");
        let err = CliSettings::load(Some(file.path())).expect_err("malformed config");
        assert!(err.to_string().contains("failed to parse config"));
    }
}
