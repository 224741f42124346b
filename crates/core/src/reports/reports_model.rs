//! Report grouping entities and their derived aggregates.
//!
//! A `Report` identifies one marketplace export by its reporting date and
//! period length. Every imported row references exactly one report; deleting
//! a report cascades to its rows at the storage layer.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted report grouping record.
///
/// The pair (date_of_report, reported_days) is unique: two exports covering
/// the same date and period length are the same logical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub date_of_report: NaiveDate,
    pub reported_days: i32,
    pub created_at: NaiveDateTime,
}

/// Payload for creating a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub date_of_report: NaiveDate,
    pub reported_days: i32,
}

impl NewReport {
    /// Materializes the report with a generated id and creation timestamp.
    pub fn into_report(self) -> Report {
        Report {
            id: Uuid::new_v4().to_string(),
            date_of_report: self.date_of_report,
            reported_days: self.reported_days,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Payload for updating a report's identifying pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    pub id: String,
    pub date_of_report: NaiveDate,
    pub reported_days: i32,
}

/// On-demand aggregates over the rows belonging to one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    /// Number of rows referencing the report.
    pub row_count: i64,
    /// Sum of the monetary "ordered sum" field across the rows.
    pub total_ordered_sum: i64,
    /// Average of the "average price" field, None when no row carries one.
    pub average_price: Option<f64>,
}

/// A persisted report with the row count used by duplicate reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticMatch {
    pub report: Report,
    pub row_count: i64,
}

/// One typed data row of a marketplace funnel report.
///
/// All fields except `product_name` are optional: the source format leaves
/// cells blank or filled with sentinel markers, and columns themselves may be
/// absent. Numeric fields are stored as scaled integers (see the column
/// vocabulary in `ingest::header`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub report_id: String,

    // Product identity
    pub product_name: String,
    pub article: Option<String>,
    pub vendor_code: Option<String>,
    pub barcode: Option<String>,

    // Seller / brand / category
    pub brand: Option<String>,
    pub seller: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,

    // Monetary figures
    pub ordered_sum: Option<i64>,
    pub purchased_sum: Option<i64>,
    pub average_price: Option<i64>,
    pub average_discount: Option<i64>,
    pub buyout_percent: Option<i64>,

    // Inventory / logistics counters
    pub ordered_count: Option<i64>,
    pub purchased_count: Option<i64>,
    pub cancelled_count: Option<i64>,
    pub returned_count: Option<i64>,
    pub stock_warehouse: Option<i64>,
    pub stock_marketplace: Option<i64>,
    pub delivery_hours: Option<i64>,
    pub turnover_days: Option<i64>,
    pub availability_percent: Option<i64>,

    // Marketing funnel counters
    pub card_views: Option<i64>,
    pub added_to_cart: Option<i64>,
    pub cart_conversion: Option<i64>,
    pub order_conversion: Option<i64>,

    // Promotion counters
    pub promo_views: Option<i64>,
    pub promo_clicks: Option<i64>,
    pub promo_spend: Option<i64>,
    pub promo_ctr: Option<i64>,

    pub record_date: Option<NaiveDate>,
}
