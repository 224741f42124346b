//! Import history ledger models.
//!
//! One record is written per file per import attempt, regardless of outcome.
//! The ledger is the system of record for "what was imported when" and the
//! input to reconciliation.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation outcome of a file's parse/validation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Valid,
    Invalid,
    Warning,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Warning => "warning",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "invalid" => ValidationStatus::Invalid,
            "warning" => ValidationStatus::Warning,
            _ => ValidationStatus::Valid,
        }
    }
}

/// Import outcome of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    #[default]
    Pending,
    Success,
    Partial,
    Error,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Success => "success",
            ImportStatus::Partial => "partial",
            ImportStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "success" => ImportStatus::Success,
            "partial" => ImportStatus::Partial,
            "error" => ImportStatus::Error,
            _ => ImportStatus::Pending,
        }
    }

    /// Completed attempts are the ones reconciliation accounts for.
    pub fn is_completed(&self) -> bool {
        matches!(self, ImportStatus::Success | ImportStatus::Partial)
    }
}

/// One audit record per file per import attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistoryRecord {
    pub id: String,
    pub filename: String,
    pub file_hash: String,
    pub file_size: i64,

    /// Rows that parsed validly from the file.
    pub records_count: i32,
    pub actual_records_imported: i32,
    pub records_skipped_duplicates: i32,
    pub records_failed: i32,

    /// Date range derived from the parsed rows' own date field.
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,

    pub validation_status: ValidationStatus,
    pub validation_errors: Vec<String>,

    pub import_status: ImportStatus,
    pub error_message: Option<String>,
    pub import_duration_ms: i64,

    /// Set when the underlying rows are later bulk-deleted; purged records
    /// are excluded from reconciliation.
    pub data_purged_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl ImportHistoryRecord {
    /// Starts a fresh record for one file attempt.
    pub fn new(filename: String, file_hash: String, file_size: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            file_hash,
            file_size,
            records_count: 0,
            actual_records_imported: 0,
            records_skipped_duplicates: 0,
            records_failed: 0,
            date_range_start: None,
            date_range_end: None,
            validation_status: ValidationStatus::Valid,
            validation_errors: Vec::new(),
            import_status: ImportStatus::Pending,
            error_message: None,
            import_duration_ms: 0,
            data_purged_at: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// The accounting invariant: parsed rows must cover everything that was
    /// imported, skipped as duplicate or failed. Violation indicates an
    /// upstream counting bug.
    pub fn accounting_is_consistent(&self) -> bool {
        self.records_count
            >= self.actual_records_imported + self.records_skipped_duplicates + self.records_failed
    }
}
