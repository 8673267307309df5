//! End-to-end export run: prepare, classify, project, chunk, name.
//!
//! # Responsibility
//! - Validate configuration once, before any record is touched.
//! - Produce the per-tier, per-segment export contract for the assembler.
//!
//! # Invariants
//! - Configuration errors abort the run; data-quality problems and projection
//!   gaps are absorbed and reported through counts and `gap` fields.
//! - Identical table and plan produce identical bundles.
//! - Tiers appear in rule priority order followed by the remainder tier.

use crate::config::ExportConfig;
use crate::engine::chunk::{chunk, ChunkLimit, Segment};
use crate::engine::classify::classify_with_remainder;
use crate::engine::naming::{group_label, sanitize_label, segment_file_name};
use crate::engine::prepare::{prepare, PrepareOptions};
use crate::engine::project::{project, OutputColumns, OutputSchema, ProjectedTable};
use crate::error::{ConfigError, ConfigResult};
use crate::logging::enter_run;
use crate::model::table::Table;
use crate::rules::{RuleFamily, RuleStrategy};
use log::{info, warn};
use uuid::Uuid;

/// Validated export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    schema: OutputSchema,
    limit: ChunkLimit,
    output_columns: OutputColumns,
    strategy: RuleStrategy,
    group_column: String,
    default_group_label: String,
    remainder_tier: String,
    prepare: PrepareOptions,
}

/// Segment paired with its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSegment {
    pub file_name: String,
    pub segment: Segment,
}

impl NamedSegment {
    pub fn index(&self) -> usize {
        self.segment.index
    }

    pub fn table(&self) -> &ProjectedTable {
        &self.segment.table
    }
}

/// Export result for one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierExport {
    pub name: String,
    /// Records assigned to the tier by the classifier.
    pub classified_rows: usize,
    /// Rows left after projection and deduplication.
    pub projected_rows: usize,
    /// Attribute whose absence emptied this tier's projection.
    pub gap: Option<String>,
    pub segments: Vec<NamedSegment>,
}

/// Everything the assembler needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub group_label: String,
    pub family: RuleFamily,
    pub schema: OutputSchema,
    pub data_quality_warnings: usize,
    pub tiers: Vec<TierExport>,
}

impl ExportBundle {
    pub fn tier(&self, name: &str) -> Option<&TierExport> {
        self.tiers.iter().find(|tier| tier.name == name)
    }

    /// All segments in tier order, then segment order.
    pub fn segments(&self) -> impl Iterator<Item = &NamedSegment> {
        self.tiers.iter().flat_map(|tier| tier.segments.iter())
    }

    pub fn segment_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.segments.len()).sum()
    }
}

impl ExportPlan {
    /// Validates `config`, reporting the first offending parameter.
    pub fn from_config(config: &ExportConfig) -> ConfigResult<Self> {
        let limit = ChunkLimit::new(config.chunk_limit)?;
        let schema: OutputSchema = config.schema.parse()?;
        config.output_columns.validate()?;
        let remainder_tier = config.remainder_tier.trim().to_string();
        config.rules.validate(&remainder_tier)?;

        Ok(Self {
            schema,
            limit,
            output_columns: config.output_columns.clone(),
            strategy: config.rules.clone(),
            group_column: config.group_column.clone(),
            default_group_label: sanitize_label(&config.default_group_label),
            remainder_tier,
            prepare: config.prepare,
        })
    }

    pub fn schema(&self) -> OutputSchema {
        self.schema
    }

    pub fn limit(&self) -> ChunkLimit {
        self.limit
    }

    pub fn strategy(&self) -> &RuleStrategy {
        &self.strategy
    }

    /// Runs the whole pipeline over `table`.
    ///
    /// # Errors
    /// - `ConfigError::MissingAttributes` when `id`, `available_amount` or
    ///   `total_amount` is absent from the table schema.
    pub fn run(&self, table: &Table) -> ConfigResult<ExportBundle> {
        if let Err(err) = table.ensure_required_columns() {
            if let ConfigError::MissingAttributes(missing) = &err {
                warn!(
                    "event=export_run module=pipeline status=error missing_attributes={}",
                    missing.join(",")
                );
            }
            return Err(err);
        }

        let run_id = Uuid::new_v4();
        let _run_scope = enter_run(&run_id.to_string());
        info!(
            "event=export_run module=pipeline status=start run_id={} records={} schema={} limit={}",
            run_id,
            table.len(),
            self.schema.as_str(),
            self.limit.get()
        );

        let prepared = if self.prepare.is_noop() {
            None
        } else {
            Some(prepare(table, self.prepare))
        };
        let table = prepared.as_ref().unwrap_or(table);

        let ruleset = self.strategy.select(table);
        let classification = classify_with_remainder(table, ruleset, &self.remainder_tier);
        let label = group_label(table, &self.group_column, &self.default_group_label);

        let tiers: Vec<TierExport> = classification
            .tiers()
            .iter()
            .map(|tier| {
                let projection = project(
                    tier.records(),
                    table.columns(),
                    self.schema,
                    &self.output_columns,
                );
                let segments = chunk(&projection.table, self.limit);
                let count = segments.len();
                TierExport {
                    name: tier.name().to_string(),
                    classified_rows: tier.len(),
                    projected_rows: projection.table.len(),
                    gap: projection.gap,
                    segments: segments
                        .into_iter()
                        .map(|segment| NamedSegment {
                            file_name: segment_file_name(&label, tier.name(), segment.index, count),
                            segment,
                        })
                        .collect(),
                }
            })
            .collect();

        let bundle = ExportBundle {
            group_label: label,
            family: classification.family(),
            schema: self.schema,
            data_quality_warnings: classification.data_quality_warnings(),
            tiers,
        };

        info!(
            "event=export_run module=pipeline status=ok run_id={} family={} tiers={} segments={} data_quality_warnings={}",
            run_id,
            bundle.family.as_str(),
            bundle.tiers.len(),
            bundle.segment_count(),
            bundle.data_quality_warnings
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::ExportPlan;
    use crate::config::ExportConfig;
    use crate::error::ConfigError;
    use crate::model::record::Record;
    use crate::model::table::Table;

    #[test]
    fn from_config_reports_invalid_limit_before_schema() {
        let config = ExportConfig {
            chunk_limit: 0,
            schema: "bogus".to_string(),
            ..ExportConfig::default()
        };
        assert_eq!(
            ExportPlan::from_config(&config).unwrap_err(),
            ConfigError::InvalidChunkLimit(0)
        );
    }

    #[test]
    fn run_rejects_table_missing_required_attributes() {
        let plan = ExportPlan::from_config(&ExportConfig::default()).expect("default plan");
        let table = Table::new(vec!["id".to_string(), "total_amount".to_string()], Vec::new());
        assert_eq!(
            plan.run(&table).unwrap_err(),
            ConfigError::MissingAttributes(vec!["available_amount".to_string()])
        );
    }

    #[test]
    fn empty_tiers_produce_no_segments() {
        let plan = ExportPlan::from_config(&ExportConfig::default()).expect("default plan");
        let table = Table::from_records(vec![Record::new("1", Some(1_000.0), Some(1_000.0))]);
        let bundle = plan.run(&table).expect("run");
        assert_eq!(bundle.segment_count(), 1);
        let negatives = bundle.tier("negatives").expect("negatives tier");
        assert_eq!(negatives.classified_rows, 0);
        assert!(negatives.segments.is_empty());
        assert_eq!(
            bundle.tier("remainder").expect("remainder tier").segments[0].file_name,
            "GROUP - remainder.csv"
        );
    }
}
