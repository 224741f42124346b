use chrono::NaiveDate;

use super::reports_model::*;
use crate::Result;

/// Trait defining the contract for Report repository operations.
pub trait ReportRepositoryTrait: Send + Sync {
    /// Inserts a report. A unique-constraint violation on the
    /// (date_of_report, reported_days) pair surfaces as
    /// `DatabaseError::UniqueViolation` and is the authoritative
    /// "already exists" signal.
    fn create_report(&self, report: Report) -> Result<Report>;
    fn get_report(&self, report_id: &str) -> Result<Report>;
    fn list_reports(&self) -> Result<Vec<Report>>;
    fn update_report(&self, update: ReportUpdate) -> Result<Report>;
    /// Deletes the report; rows cascade at the storage layer.
    fn delete_report(&self, report_id: &str) -> Result<usize>;
    /// Deletes every report (and, via cascade, every row).
    fn delete_all_reports(&self) -> Result<usize>;
    fn find_by_period(
        &self,
        date_of_report: NaiveDate,
        reported_days: i32,
    ) -> Result<Option<Report>>;
    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>>;
    fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>>;
    /// Looks up a persisted report matching the semantic duplicate triple
    /// (date_of_report, reported_days, category), returning its creation
    /// date and row count for duplicate reporting.
    fn find_semantic_duplicate(
        &self,
        date_of_report: NaiveDate,
        reported_days: i32,
        category: Option<&str>,
    ) -> Result<Option<SemanticMatch>>;
}

/// Trait defining the contract for report row persistence.
pub trait ReportRowRepositoryTrait: Send + Sync {
    /// Inserts all rows in one transaction. All-or-nothing: on any failure
    /// no row is persisted and the error is returned.
    fn bulk_insert_rows(&self, rows: &[ReportRow]) -> Result<usize>;
    /// Inserts a single row. Unique-constraint violations surface as
    /// `DatabaseError::UniqueViolation` so the row-by-row fallback can
    /// classify duplicates.
    fn insert_row(&self, row: &ReportRow) -> Result<()>;
    fn count_rows(&self) -> Result<i64>;
    fn count_rows_for_report(&self, report_id: &str) -> Result<i64>;
    /// Counts rows whose own record date falls within [start, end].
    fn count_rows_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64>;
    fn report_stats(&self, report_id: &str) -> Result<ReportStats>;
}

/// Trait defining the contract for Report service operations.
pub trait ReportServiceTrait: Send + Sync {
    fn create_report(&self, new_report: NewReport) -> Result<Report>;
    fn get_report(&self, report_id: &str) -> Result<Report>;
    fn list_reports(&self) -> Result<Vec<Report>>;
    fn update_report(&self, update: ReportUpdate) -> Result<Report>;
    fn delete_report(&self, report_id: &str) -> Result<usize>;
    fn get_report_stats(&self, report_id: &str) -> Result<ReportStats>;
    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>>;
    fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>>;
    /// Deletes all reports (rows cascade) and stamps surviving history
    /// records as purged so reconciliation skips them.
    fn purge_all_report_data(&self) -> Result<usize>;
}
