//! SQLite storage implementation for the import-history ledger.

mod model;
mod repository;

pub use model::ImportHistoryDB;
pub use repository::ImportHistoryRepository;
