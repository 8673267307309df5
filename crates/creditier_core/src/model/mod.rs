//! Normalized data model shared by every engine stage.
//!
//! # Responsibility
//! - Define the record/table contract the normalizer hands to the engine.
//!
//! # Invariants
//! - Records are immutable once built.
//! - A table's row order is ingestion order unless a preparation step
//!   explicitly produces a reordered copy.

pub mod record;
pub mod table;
