//! Classification, projection and segmentation stages.
//!
//! # Responsibility
//! - Turn a normalized table into named, bounded-size output segments.
//!
//! # Invariants
//! - Every stage is a pure function of its inputs; no state survives a call.
//! - No stage performs I/O.

pub mod chunk;
pub mod classify;
pub mod naming;
pub mod prepare;
pub mod project;
