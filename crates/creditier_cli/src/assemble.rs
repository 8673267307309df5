//! Writes export segments as CSV files.
//!
//! # Responsibility
//! - Serialize every named segment of a bundle as comma-delimited text with a
//!   header row.
//!
//! # Invariants
//! - A file is either fully written or absent: rows go to a temporary file in
//!   the output directory that is persisted under its final name at the end.

use anyhow::{anyhow, Context};
use creditier_core::{ExportBundle, ProjectedTable};
use csv::Writer;
use log::info;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One file produced by [`write_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub tier: String,
    pub rows: usize,
}

/// Writes every segment of `bundle` into `out_dir`, creating it if needed.
pub fn write_bundle(bundle: &ExportBundle, out_dir: &Path) -> anyhow::Result<Vec<WrittenFile>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory `{}`", out_dir.display()))?;

    let mut written = Vec::with_capacity(bundle.segment_count());
    for tier in &bundle.tiers {
        for segment in &tier.segments {
            let path = out_dir.join(&segment.file_name);
            write_segment(&path, segment.table())?;
            written.push(WrittenFile {
                path,
                tier: tier.name.clone(),
                rows: segment.table().len(),
            });
        }
    }

    info!(
        "event=assemble module=assemble status=ok files={} tiers={}",
        written.len(),
        bundle.tiers.len()
    );
    Ok(written)
}

/// Writes one projected table to `path` atomically.
pub fn write_segment(path: &Path, table: &ProjectedTable) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("cannot determine parent directory of `{}`", path.display()))?;
    let temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in `{}`", parent.display()))?;

    let mut writer = Writer::from_writer(temp);
    writer
        .write_record(table.columns())
        .with_context(|| format!("failed to write header of `{}`", path.display()))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .with_context(|| format!("failed to write row of `{}`", path.display()))?;
    }
    let temp = writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush `{}`: {}", path.display(), err.error()))?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist `{}`: {}", path.display(), err.error))?;
    Ok(())
}
