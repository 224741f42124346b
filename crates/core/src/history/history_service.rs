use log::{debug, warn};
use std::sync::Arc;

use super::history_model::ImportHistoryRecord;
use super::history_traits::{ImportHistoryRepositoryTrait, ImportHistoryServiceTrait};
use crate::Result;

/// Service recording one audit record per file per import attempt.
pub struct ImportHistoryService {
    history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
}

impl ImportHistoryService {
    pub fn new(history_repository: Arc<dyn ImportHistoryRepositoryTrait>) -> Self {
        Self { history_repository }
    }
}

impl ImportHistoryServiceTrait for ImportHistoryService {
    fn record_attempt(&self, record: ImportHistoryRecord) -> Result<ImportHistoryRecord> {
        if !record.accounting_is_consistent() {
            // Never expected under correct importer behavior; keep the record
            // anyway so reconciliation can flag it.
            warn!(
                "history record for '{}' violates accounting: {} < {} + {} + {}",
                record.filename,
                record.records_count,
                record.actual_records_imported,
                record.records_skipped_duplicates,
                record.records_failed
            );
        }
        debug!(
            "recording import attempt for '{}': status={}, imported={}",
            record.filename,
            record.import_status.as_str(),
            record.actual_records_imported
        );
        self.history_repository.insert_record(record)
    }

    fn get_history(&self, id: &str) -> Result<ImportHistoryRecord> {
        self.history_repository.get_record(id)
    }

    fn list_history(&self, limit: Option<i64>) -> Result<Vec<ImportHistoryRecord>> {
        self.history_repository.list_records(limit)
    }

    fn delete_history(&self, id: &str) -> Result<usize> {
        self.history_repository.delete_record(id)
    }
}
