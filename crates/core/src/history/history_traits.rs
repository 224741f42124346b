use chrono::NaiveDateTime;

use super::history_model::ImportHistoryRecord;
use crate::Result;

/// Trait defining the contract for import-history persistence.
pub trait ImportHistoryRepositoryTrait: Send + Sync {
    fn insert_record(&self, record: ImportHistoryRecord) -> Result<ImportHistoryRecord>;
    fn get_record(&self, id: &str) -> Result<ImportHistoryRecord>;
    /// Lists records newest first, optionally limited.
    fn list_records(&self, limit: Option<i64>) -> Result<Vec<ImportHistoryRecord>>;
    /// Finds a prior *successful* attempt with the given content hash.
    fn find_successful_by_hash(&self, file_hash: &str) -> Result<Option<ImportHistoryRecord>>;
    /// All success/partial records whose data has not been purged.
    fn completed_unpurged_records(&self) -> Result<Vec<ImportHistoryRecord>>;
    /// Reconciliation's count correction.
    fn update_actual_imported(&self, id: &str, actual_records_imported: i32) -> Result<()>;
    /// Stamps every non-purged record; returns how many were stamped.
    fn mark_all_purged(&self, purged_at: NaiveDateTime) -> Result<usize>;
    fn delete_record(&self, id: &str) -> Result<usize>;
}

/// Trait defining the contract for import-history service operations.
pub trait ImportHistoryServiceTrait: Send + Sync {
    /// Writes the audit record for one file attempt. Called exactly once per
    /// file per attempt, whatever the outcome.
    fn record_attempt(&self, record: ImportHistoryRecord) -> Result<ImportHistoryRecord>;
    fn get_history(&self, id: &str) -> Result<ImportHistoryRecord>;
    fn list_history(&self, limit: Option<i64>) -> Result<Vec<ImportHistoryRecord>>;
    fn delete_history(&self, id: &str) -> Result<usize>;
}
