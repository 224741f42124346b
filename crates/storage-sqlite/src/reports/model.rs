//! Database models for reports and report rows.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use marketfolio_core::reports::{Report, ReportRow};

/// Database model for report grouping records
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
#[diesel(table_name = crate::schema::reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportDB {
    pub id: String,
    pub date_of_report: NaiveDate,
    pub reported_days: i32,
    pub created_at: NaiveDateTime,
}

impl From<ReportDB> for Report {
    fn from(db: ReportDB) -> Self {
        Report {
            id: db.id,
            date_of_report: db.date_of_report,
            reported_days: db.reported_days,
            created_at: db.created_at,
        }
    }
}

impl From<Report> for ReportDB {
    fn from(report: Report) -> Self {
        ReportDB {
            id: report.id,
            date_of_report: report.date_of_report,
            reported_days: report.reported_days,
            created_at: report.created_at,
        }
    }
}

/// Database model for report rows
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::report_rows)]
#[diesel(belongs_to(ReportDB, foreign_key = report_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportRowDB {
    pub id: String,
    pub report_id: String,

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
    pub created_at: NaiveDateTime,
}

impl From<ReportRowDB> for ReportRow {
    fn from(db: ReportRowDB) -> Self {
        ReportRow {
            id: db.id,
            report_id: db.report_id,
            product_name: db.product_name,
            article: db.article,
            vendor_code: db.vendor_code,
            barcode: db.barcode,
            brand: db.brand,
            seller: db.seller,
            category: db.category,
            subject: db.subject,
            ordered_sum: db.ordered_sum,
            purchased_sum: db.purchased_sum,
            average_price: db.average_price,
            average_discount: db.average_discount,
            buyout_percent: db.buyout_percent,
            ordered_count: db.ordered_count,
            purchased_count: db.purchased_count,
            cancelled_count: db.cancelled_count,
            returned_count: db.returned_count,
            stock_warehouse: db.stock_warehouse,
            stock_marketplace: db.stock_marketplace,
            delivery_hours: db.delivery_hours,
            turnover_days: db.turnover_days,
            availability_percent: db.availability_percent,
            card_views: db.card_views,
            added_to_cart: db.added_to_cart,
            cart_conversion: db.cart_conversion,
            order_conversion: db.order_conversion,
            promo_views: db.promo_views,
            promo_clicks: db.promo_clicks,
            promo_spend: db.promo_spend,
            promo_ctr: db.promo_ctr,
            record_date: db.record_date,
        }
    }
}

impl ReportRowDB {
    /// Builds the storage row, stamping the creation time.
    pub fn from_row(row: &ReportRow) -> Self {
        ReportRowDB {
            id: row.id.clone(),
            report_id: row.report_id.clone(),
            product_name: row.product_name.clone(),
            article: row.article.clone(),
            vendor_code: row.vendor_code.clone(),
            barcode: row.barcode.clone(),
            brand: row.brand.clone(),
            seller: row.seller.clone(),
            category: row.category.clone(),
            subject: row.subject.clone(),
            ordered_sum: row.ordered_sum,
            purchased_sum: row.purchased_sum,
            average_price: row.average_price,
            average_discount: row.average_discount,
            buyout_percent: row.buyout_percent,
            ordered_count: row.ordered_count,
            purchased_count: row.purchased_count,
            cancelled_count: row.cancelled_count,
            returned_count: row.returned_count,
            stock_warehouse: row.stock_warehouse,
            stock_marketplace: row.stock_marketplace,
            delivery_hours: row.delivery_hours,
            turnover_days: row.turnover_days,
            availability_percent: row.availability_percent,
            card_views: row.card_views,
            added_to_cart: row.added_to_cart,
            cart_conversion: row.cart_conversion,
            order_conversion: row.order_conversion,
            promo_views: row.promo_views,
            promo_clicks: row.promo_clicks,
            promo_spend: row.promo_spend,
            promo_ctr: row.promo_ctr,
            record_date: row.record_date,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
