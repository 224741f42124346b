//! Storage-bound validation of transformed rows.
//!
//! Every numeric field belongs to one of two bound classes; values outside
//! their class produce a validation error naming the field, the value and
//! the violated bound. Values close to the small-range ceiling additionally
//! produce a warning so near-overflow columns are visible before they break.

use super::header::ReportField;
use super::ingest_model::ParsedRow;
use crate::constants::{SMALL_FIELD_MAX, SMALL_FIELD_MIN, SMALL_FIELD_WARN_RATIO};

/// Storage range class of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundClass {
    /// −32768..=32767 (percent, ratio and day-count style fields).
    Small,
    /// Full 32-bit signed range.
    Standard,
}

impl BoundClass {
    pub fn min(&self) -> i64 {
        match self {
            BoundClass::Small => SMALL_FIELD_MIN as i64,
            BoundClass::Standard => i32::MIN as i64,
        }
    }

    pub fn max(&self) -> i64 {
        match self {
            BoundClass::Small => SMALL_FIELD_MAX as i64,
            BoundClass::Standard => i32::MAX as i64,
        }
    }
}

/// The numeric fields of a row with their bound class.
const NUMERIC_BOUNDS: [(ReportField, BoundClass); 22] = [
    (ReportField::OrderedSum, BoundClass::Standard),
    (ReportField::PurchasedSum, BoundClass::Standard),
    (ReportField::AveragePrice, BoundClass::Standard),
    (ReportField::AverageDiscount, BoundClass::Small),
    (ReportField::BuyoutPercent, BoundClass::Small),
    (ReportField::OrderedCount, BoundClass::Standard),
    (ReportField::PurchasedCount, BoundClass::Standard),
    (ReportField::CancelledCount, BoundClass::Standard),
    (ReportField::ReturnedCount, BoundClass::Small),
    (ReportField::StockWarehouse, BoundClass::Standard),
    (ReportField::StockMarketplace, BoundClass::Standard),
    (ReportField::DeliveryHours, BoundClass::Small),
    (ReportField::TurnoverDays, BoundClass::Small),
    (ReportField::AvailabilityPercent, BoundClass::Small),
    (ReportField::CardViews, BoundClass::Standard),
    (ReportField::AddedToCart, BoundClass::Standard),
    (ReportField::CartConversion, BoundClass::Small),
    (ReportField::OrderConversion, BoundClass::Small),
    (ReportField::PromoViews, BoundClass::Standard),
    (ReportField::PromoClicks, BoundClass::Standard),
    (ReportField::PromoSpend, BoundClass::Standard),
    (ReportField::PromoCtr, BoundClass::Small),
];

/// Outcome of validating one row: hard errors plus near-bound warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RowValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn numeric_value(row: &ParsedRow, field: ReportField) -> Option<i64> {
    match field {
        ReportField::OrderedSum => row.ordered_sum,
        ReportField::PurchasedSum => row.purchased_sum,
        ReportField::AveragePrice => row.average_price,
        ReportField::AverageDiscount => row.average_discount,
        ReportField::BuyoutPercent => row.buyout_percent,
        ReportField::OrderedCount => row.ordered_count,
        ReportField::PurchasedCount => row.purchased_count,
        ReportField::CancelledCount => row.cancelled_count,
        ReportField::ReturnedCount => row.returned_count,
        ReportField::StockWarehouse => row.stock_warehouse,
        ReportField::StockMarketplace => row.stock_marketplace,
        ReportField::DeliveryHours => row.delivery_hours,
        ReportField::TurnoverDays => row.turnover_days,
        ReportField::AvailabilityPercent => row.availability_percent,
        ReportField::CardViews => row.card_views,
        ReportField::AddedToCart => row.added_to_cart,
        ReportField::CartConversion => row.cart_conversion,
        ReportField::OrderConversion => row.order_conversion,
        ReportField::PromoViews => row.promo_views,
        ReportField::PromoClicks => row.promo_clicks,
        ReportField::PromoSpend => row.promo_spend,
        ReportField::PromoCtr => row.promo_ctr,
        _ => None,
    }
}

/// Validates one row against the bounds table. NULL fields always pass.
pub fn validate_row(row: &ParsedRow) -> RowValidation {
    let mut validation = RowValidation::default();
    let warn_threshold = (SMALL_FIELD_MAX as f64 * SMALL_FIELD_WARN_RATIO) as i64;

    for (field, class) in NUMERIC_BOUNDS.iter() {
        let value = match numeric_value(row, *field) {
            Some(v) => v,
            None => continue,
        };

        if value < class.min() || value > class.max() {
            validation.errors.push(format!(
                "{}: value {} outside allowed range {}..{}",
                field.name(),
                value,
                class.min(),
                class.max()
            ));
        } else if *class == BoundClass::Small && value >= warn_threshold {
            validation.warnings.push(format!(
                "{}: value {} is within 10% of the maximum {}",
                field.name(),
                value,
                class.max()
            ));
        }
    }

    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ParsedRow {
        ParsedRow {
            product_name: "Товар".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_numeric_fields_pass() {
        assert!(validate_row(&row()).is_valid());
    }

    #[test]
    fn test_small_field_boundary() {
        let mut r = row();
        r.turnover_days = Some(32767);
        let v = validate_row(&r);
        assert!(v.is_valid());

        r.turnover_days = Some(32768);
        let v = validate_row(&r);
        assert!(!v.is_valid());
        assert!(v.errors[0].contains("turnover_days"));
        assert!(v.errors[0].contains("32768"));
        assert!(v.errors[0].contains("32767"));
    }

    #[test]
    fn test_small_field_negative_bound() {
        let mut r = row();
        r.average_discount = Some(-32769);
        let v = validate_row(&r);
        assert!(!v.is_valid());
        assert!(v.errors[0].contains("average_discount"));
    }

    #[test]
    fn test_standard_field_accepts_large_values() {
        let mut r = row();
        r.ordered_sum = Some(5_000_000);
        assert!(validate_row(&r).is_valid());

        r.ordered_sum = Some(i32::MAX as i64 + 1);
        let v = validate_row(&r);
        assert!(!v.is_valid());
        assert!(v.errors[0].contains("ordered_sum"));
    }

    #[test]
    fn test_near_ceiling_warning() {
        let mut r = row();
        // 90% of 32767 is 29490; anything at or above warns.
        r.delivery_hours = Some(30000);
        let v = validate_row(&r);
        assert!(v.is_valid());
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].contains("delivery_hours"));

        r.delivery_hours = Some(100);
        assert!(validate_row(&r).warnings.is_empty());
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let mut r = row();
        r.turnover_days = Some(40000);
        r.promo_ctr = Some(-40000);
        let v = validate_row(&r);
        assert_eq!(v.errors.len(), 2);
    }
}
