//! Bounded-size segmentation of projected tiers.
//!
//! # Invariants
//! - An empty table yields no segments.
//! - Segments are contiguous, numbered from 1, and concatenate back to the
//!   input exactly.
//! - Every segment except the last holds exactly `limit` rows.

use crate::engine::project::ProjectedTable;
use crate::error::{ConfigError, ConfigResult};
use std::num::NonZeroUsize;

/// Default maximum rows per segment.
pub const DEFAULT_CHUNK_LIMIT: usize = 50_000;

/// Validated, strictly positive row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimit(NonZeroUsize);

impl ChunkLimit {
    /// Rejects zero and negative limits.
    pub fn new(limit: i64) -> ConfigResult<Self> {
        usize::try_from(limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(ConfigError::InvalidChunkLimit(limit))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for ChunkLimit {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_CHUNK_LIMIT).unwrap_or(NonZeroUsize::MIN))
    }
}

/// One bounded slice of a projected tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position within the tier.
    pub index: usize,
    pub table: ProjectedTable,
}

/// Splits `rows` into contiguous slices of at most `limit` elements.
pub fn split_rows<T>(rows: &[T], limit: ChunkLimit) -> Vec<&[T]> {
    rows.chunks(limit.get()).collect()
}

/// Splits a projected table into numbered segments sharing its header.
pub fn chunk(table: &ProjectedTable, limit: ChunkLimit) -> Vec<Segment> {
    split_rows(table.rows(), limit)
        .into_iter()
        .enumerate()
        .map(|(position, rows)| Segment {
            index: position + 1,
            table: ProjectedTable::new(table.columns().to_vec(), rows.to_vec()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{chunk, split_rows, ChunkLimit, DEFAULT_CHUNK_LIMIT};
    use crate::engine::project::ProjectedTable;
    use crate::error::ConfigError;

    fn table_of(len: usize) -> ProjectedTable {
        ProjectedTable::new(
            vec!["cpf".to_string()],
            (0..len).map(|value| vec![value.to_string()]).collect(),
        )
    }

    #[test]
    fn limit_rejects_zero_and_negative() {
        assert_eq!(ChunkLimit::new(0), Err(ConfigError::InvalidChunkLimit(0)));
        assert_eq!(ChunkLimit::new(-5), Err(ConfigError::InvalidChunkLimit(-5)));
        assert_eq!(ChunkLimit::default().get(), DEFAULT_CHUNK_LIMIT);
    }

    #[test]
    fn empty_table_has_no_segments() {
        let limit = ChunkLimit::new(10).expect("limit");
        assert!(chunk(&table_of(0), limit).is_empty());
    }

    #[test]
    fn small_table_is_one_segment() {
        let limit = ChunkLimit::new(10).expect("limit");
        let segments = chunk(&table_of(10), limit);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[0].table.len(), 10);
    }

    #[test]
    fn even_division_fills_last_segment() {
        let limit = ChunkLimit::new(5).expect("limit");
        let sizes: Vec<usize> = split_rows(&[0u8; 15], limit).iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5]);
    }
}
