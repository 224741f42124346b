//! Marketfolio Core - report ingestion domain: parsing, validation,
//! deduplication, import, history and reconciliation.
//!
//! This crate is database-agnostic and defines repository traits that are
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod history;
pub mod ingest;
pub mod reconciliation;
pub mod reports;

pub use errors::Error;
pub use errors::Result;
