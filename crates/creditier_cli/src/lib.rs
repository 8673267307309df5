//! File-facing collaborators around `creditier_core`: CSV ingestion, CSV
//! export and the command-line surface.

pub mod assemble;
pub mod cli;
pub mod ingest;
pub mod settings;
