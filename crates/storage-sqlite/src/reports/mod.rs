//! SQLite storage implementation for reports and report rows.

mod model;
mod repository;

pub use model::{ReportDB, ReportRowDB};
pub use repository::{ReportRepository, ReportRowRepository};
