//! Domain models for the file ingestion pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::header::HeaderValidationResult;
use crate::reports::ReportRow;

/// One uploaded file: name plus raw container bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Metadata extracted once per file; immutable after extraction apart from
/// the date range, which is derived from the parsed rows' own date field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    pub file_size: i64,
    pub date_of_report: Option<NaiveDate>,
    pub reported_days: Option<i32>,
    pub category_level3: Option<String>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
}

impl FileMetadata {
    pub fn new(file_name: String, file_size: i64) -> Self {
        Self {
            file_name,
            file_size,
            date_of_report: None,
            reported_days: None,
            category_level3: None,
            date_range_start: None,
            date_range_end: None,
        }
    }
}

/// One transformed data row, not yet attached to a report.
///
/// Mirrors [`ReportRow`] minus identity; numeric fields hold the scaled
/// integer encodings described by the column vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRow {
    pub product_name: String,
    pub article: Option<String>,
    pub vendor_code: Option<String>,
    pub barcode: Option<String>,

    pub brand: Option<String>,
    pub seller: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,

    pub ordered_sum: Option<i64>,
    pub purchased_sum: Option<i64>,
    pub average_price: Option<i64>,
    pub average_discount: Option<i64>,
    pub buyout_percent: Option<i64>,

    pub ordered_count: Option<i64>,
    pub purchased_count: Option<i64>,
    pub cancelled_count: Option<i64>,
    pub returned_count: Option<i64>,
    pub stock_warehouse: Option<i64>,
    pub stock_marketplace: Option<i64>,
    pub delivery_hours: Option<i64>,
    pub turnover_days: Option<i64>,
    pub availability_percent: Option<i64>,

    pub card_views: Option<i64>,
    pub added_to_cart: Option<i64>,
    pub cart_conversion: Option<i64>,
    pub order_conversion: Option<i64>,

    pub promo_views: Option<i64>,
    pub promo_clicks: Option<i64>,
    pub promo_spend: Option<i64>,
    pub promo_ctr: Option<i64>,

    pub record_date: Option<NaiveDate>,
}

impl ParsedRow {
    /// Attaches the row to a report, generating its row id.
    pub fn into_report_row(self, report_id: &str) -> ReportRow {
        ReportRow {
            id: Uuid::new_v4().to_string(),
            report_id: report_id.to_string(),
            product_name: self.product_name,
            article: self.article,
            vendor_code: self.vendor_code,
            barcode: self.barcode,
            brand: self.brand,
            seller: self.seller,
            category: self.category,
            subject: self.subject,
            ordered_sum: self.ordered_sum,
            purchased_sum: self.purchased_sum,
            average_price: self.average_price,
            average_discount: self.average_discount,
            buyout_percent: self.buyout_percent,
            ordered_count: self.ordered_count,
            purchased_count: self.purchased_count,
            cancelled_count: self.cancelled_count,
            returned_count: self.returned_count,
            stock_warehouse: self.stock_warehouse,
            stock_marketplace: self.stock_marketplace,
            delivery_hours: self.delivery_hours,
            turnover_days: self.turnover_days,
            availability_percent: self.availability_percent,
            card_views: self.card_views,
            added_to_cart: self.added_to_cart,
            cart_conversion: self.cart_conversion,
            order_conversion: self.order_conversion,
            promo_views: self.promo_views,
            promo_clicks: self.promo_clicks,
            promo_spend: self.promo_spend,
            promo_ctr: self.promo_ctr,
            record_date: self.record_date,
        }
    }
}

/// Full parse product of one file: metadata, header mapping outcome, the
/// surviving rows and the accumulated row-level diagnostics.
#[derive(Debug, Clone)]
pub struct ParsedReportFile {
    pub metadata: FileMetadata,
    pub header: HeaderValidationResult,
    pub rows: Vec<ParsedRow>,
    /// Rows dropped for a missing product name. Not errors, but surfaced so
    /// the drop is visible rather than literally silent.
    pub invalid_rows: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Per-file lifecycle: pending → validating → {valid|invalid|duplicate} →
/// processing → {success|error}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    #[default]
    Pending,
    Validating,
    Valid,
    Invalid,
    Duplicate,
    Processing,
    Success,
    Error,
}

/// Row-level accounting of one file's import step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub duplicate_count: usize,
    pub report_id: Option<String>,
}

/// Everything the upload UI needs to explain one file's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileImportOutcome {
    pub file_name: String,
    pub state: FileState,
    /// Human-readable explanation; always present, nothing fails silently.
    pub message: String,
    pub header: Option<HeaderValidationResult>,
    pub duplicate: Option<super::duplicates::DuplicateCheckResult>,
    pub import: Option<ImportResult>,
    /// Rows that parsed validly.
    pub records_count: usize,
    pub invalid_rows: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub duration_ms: i64,
}

/// Batch-level summary consumed by the batch-upload UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub total_records_imported: usize,
    pub total_duration_ms: i64,
    pub outcomes: Vec<FileImportOutcome>,
}

/// Progress callback interface.
///
/// Invoked synchronously at fixed checkpoints of a file's import; consumers
/// must not block the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, file_name: &str, percent: u8);
}

/// Reporter that ignores all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn on_progress(&self, _file_name: &str, _percent: u8) {}
}
