//! Database model for the import-history ledger.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use marketfolio_core::history::{ImportHistoryRecord, ImportStatus, ValidationStatus};

/// Database model for import history records
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::import_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ImportHistoryDB {
    pub id: String,
    pub filename: String,
    pub file_hash: String,
    pub file_size: i64,

    pub records_count: i32,
    pub actual_records_imported: i32,
    pub records_skipped_duplicates: i32,
    pub records_failed: i32,

    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,

    pub validation_status: String,
    /// JSON array of row-level diagnostic strings.
    pub validation_errors: Option<String>,

    pub import_status: String,
    pub error_message: Option<String>,
    pub import_duration_ms: i64,

    pub data_purged_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<ImportHistoryDB> for ImportHistoryRecord {
    fn from(db: ImportHistoryDB) -> Self {
        let validation_errors = db
            .validation_errors
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();

        ImportHistoryRecord {
            id: db.id,
            filename: db.filename,
            file_hash: db.file_hash,
            file_size: db.file_size,
            records_count: db.records_count,
            actual_records_imported: db.actual_records_imported,
            records_skipped_duplicates: db.records_skipped_duplicates,
            records_failed: db.records_failed,
            date_range_start: db.date_range_start,
            date_range_end: db.date_range_end,
            validation_status: ValidationStatus::parse(&db.validation_status),
            validation_errors,
            import_status: ImportStatus::parse(&db.import_status),
            error_message: db.error_message,
            import_duration_ms: db.import_duration_ms,
            data_purged_at: db.data_purged_at,
            created_at: db.created_at,
        }
    }
}

impl From<ImportHistoryRecord> for ImportHistoryDB {
    fn from(record: ImportHistoryRecord) -> Self {
        let validation_errors = if record.validation_errors.is_empty() {
            None
        } else {
            serde_json::to_string(&record.validation_errors).ok()
        };

        ImportHistoryDB {
            id: record.id,
            filename: record.filename,
            file_hash: record.file_hash,
            file_size: record.file_size,
            records_count: record.records_count,
            actual_records_imported: record.actual_records_imported,
            records_skipped_duplicates: record.records_skipped_duplicates,
            records_failed: record.records_failed,
            date_range_start: record.date_range_start,
            date_range_end: record.date_range_end,
            validation_status: record.validation_status.as_str().to_string(),
            validation_errors,
            import_status: record.import_status.as_str().to_string(),
            error_message: record.error_message,
            import_duration_ms: record.import_duration_ms,
            data_purged_at: record.data_purged_at,
            created_at: record.created_at,
        }
    }
}
