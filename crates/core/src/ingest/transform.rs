//! Per-field cell transformation.
//!
//! Each mapped column carries one [`FieldInstruction`]; the instruction set
//! is a closed enum so adding a column kind forces every match site to be
//! revisited. Sentinel markers ("-", "нет данных") always transform to NULL
//! regardless of instruction.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use super::grid::{first_cell_lower, Cell};
use super::header::{ColumnMapping, ReportField};
use super::ingest_model::ParsedRow;
use super::metadata::parse_day_month_year;
use crate::constants::{AGGREGATE_ROW_MARKERS, SENTINEL_VALUES};

/// Transformation applied to a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldInstruction {
    /// Trim to string; empty becomes NULL.
    Text,
    /// Parse numeric (comma as decimal separator, non-numeric symbols
    /// stripped), round to nearest integer.
    Int,
    /// Parse numeric, scale by 10, round. Preserves one decimal digit in
    /// integer storage.
    IntX10,
    /// Parse numeric, scale by 100, round.
    IntX100,
    /// "X из Y" → round(100·X/Y); Y = 0 or unmatched → NULL.
    SpecialRatio,
    /// "Nч" or any leading integer → N; unmatched → NULL.
    SpecialHours,
    /// Native date cell, otherwise `DD.MM.YY[YY]` text.
    Date,
}

/// A transformed cell value, typed per instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Number(Option<i64>),
    Date(Option<NaiveDate>),
}

fn ratio_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*из\s*(\d+)$").unwrap())
}

fn hours_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*ч").unwrap())
}

fn leading_int_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)").unwrap())
}

fn is_sentinel(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    SENTINEL_VALUES.iter().any(|s| lower == *s)
}

/// Applies one instruction to one cell.
pub fn apply_instruction(instruction: FieldInstruction, cell: &Cell) -> FieldValue {
    let text = cell.as_text();
    if is_sentinel(&text) {
        return match instruction {
            FieldInstruction::Text => FieldValue::Text(None),
            FieldInstruction::Date => FieldValue::Date(None),
            _ => FieldValue::Number(None),
        };
    }

    match instruction {
        FieldInstruction::Text => {
            let trimmed = text.trim().to_string();
            FieldValue::Text(if trimmed.is_empty() { None } else { Some(trimmed) })
        }
        FieldInstruction::Int => FieldValue::Number(parse_scaled(cell, 1)),
        FieldInstruction::IntX10 => FieldValue::Number(parse_scaled(cell, 10)),
        FieldInstruction::IntX100 => FieldValue::Number(parse_scaled(cell, 100)),
        FieldInstruction::SpecialRatio => FieldValue::Number(parse_ratio(&text)),
        FieldInstruction::SpecialHours => FieldValue::Number(parse_hours(&text)),
        FieldInstruction::Date => FieldValue::Date(parse_date(cell)),
    }
}

/// Parses a numeric cell, scales it and rounds half away from zero.
fn parse_scaled(cell: &Cell, scale: i64) -> Option<i64> {
    let value = match cell {
        Cell::Number(n) => Decimal::from_f64_retain(*n)?,
        Cell::Text(s) => parse_decimal_text(s)?,
        _ => return None,
    };

    (value * Decimal::from(scale))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Locale-tolerant numeric text parsing: comma becomes the decimal dot and
/// anything that is not a digit, dot or leading minus is stripped
/// (currency signs, percent marks, thousands spaces).
fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let normalized = text.trim().replace(',', ".");
    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// "X из Y" → round(100·X/Y). Y = 0 or any other shape → None.
fn parse_ratio(text: &str) -> Option<i64> {
    let caps = ratio_regex().captures(text.trim())?;
    let x: i64 = caps[1].parse().ok()?;
    let y: i64 = caps[2].parse().ok()?;
    if y == 0 {
        return None;
    }
    (Decimal::from(x) * Decimal::from(100) / Decimal::from(y))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// "Nч" (N hours) or a bare leading integer → N.
fn parse_hours(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Some(caps) = hours_regex().captures(trimmed) {
        return caps[1].parse().ok();
    }
    leading_int_regex()
        .captures(trimmed)
        .and_then(|caps| caps[1].parse().ok())
}

fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_day_month_year(s),
        _ => None,
    }
}

/// True for aggregate summary rows ("среднее значение"/"итого" in the first
/// column) which carry no product data.
pub fn is_aggregate_row(row: &[Cell]) -> bool {
    let first = first_cell_lower(row);
    AGGREGATE_ROW_MARKERS.iter().any(|m| first.contains(m))
}

/// Converts one raw data row into a typed record using the column mappings.
///
/// Returns None when the product-name field is empty after transformation;
/// such rows are excluded, not errored.
pub fn transform_row(
    row: &[Cell],
    mappings: &[ColumnMapping],
    category_backfill: Option<&str>,
) -> Option<ParsedRow> {
    let mut parsed = ParsedRow::default();

    for mapping in mappings {
        let cell = row.get(mapping.column_index).cloned().unwrap_or(Cell::Empty);
        let value = apply_instruction(mapping.instruction, &cell);
        assign_field(&mut parsed, mapping.field, value);
    }

    if parsed.product_name.is_empty() {
        return None;
    }

    // Backfill the row category from file metadata when the row's own
    // category cell was empty.
    if parsed.category.is_none() {
        parsed.category = category_backfill.map(|c| c.to_string());
    }

    Some(parsed)
}

fn assign_field(row: &mut ParsedRow, field: ReportField, value: FieldValue) {
    let text = |v: FieldValue| match v {
        FieldValue::Text(t) => t,
        _ => None,
    };
    let number = |v: FieldValue| match v {
        FieldValue::Number(n) => n,
        _ => None,
    };

    match field {
        ReportField::ProductName => row.product_name = text(value).unwrap_or_default(),
        ReportField::Article => row.article = text(value),
        ReportField::VendorCode => row.vendor_code = text(value),
        ReportField::Barcode => row.barcode = text(value),
        ReportField::Brand => row.brand = text(value),
        ReportField::Seller => row.seller = text(value),
        ReportField::Category => row.category = text(value),
        ReportField::Subject => row.subject = text(value),
        ReportField::OrderedSum => row.ordered_sum = number(value),
        ReportField::PurchasedSum => row.purchased_sum = number(value),
        ReportField::AveragePrice => row.average_price = number(value),
        ReportField::AverageDiscount => row.average_discount = number(value),
        ReportField::BuyoutPercent => row.buyout_percent = number(value),
        ReportField::OrderedCount => row.ordered_count = number(value),
        ReportField::PurchasedCount => row.purchased_count = number(value),
        ReportField::CancelledCount => row.cancelled_count = number(value),
        ReportField::ReturnedCount => row.returned_count = number(value),
        ReportField::StockWarehouse => row.stock_warehouse = number(value),
        ReportField::StockMarketplace => row.stock_marketplace = number(value),
        ReportField::DeliveryHours => row.delivery_hours = number(value),
        ReportField::TurnoverDays => row.turnover_days = number(value),
        ReportField::AvailabilityPercent => row.availability_percent = number(value),
        ReportField::CardViews => row.card_views = number(value),
        ReportField::AddedToCart => row.added_to_cart = number(value),
        ReportField::CartConversion => row.cart_conversion = number(value),
        ReportField::OrderConversion => row.order_conversion = number(value),
        ReportField::PromoViews => row.promo_views = number(value),
        ReportField::PromoClicks => row.promo_clicks = number(value),
        ReportField::PromoSpend => row.promo_spend = number(value),
        ReportField::PromoCtr => row.promo_ctr = number(value),
        ReportField::RecordDate => {
            row.record_date = match value {
                FieldValue::Date(d) => d,
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(instruction: FieldInstruction, cell: Cell) -> Option<i64> {
        match apply_instruction(instruction, &cell) {
            FieldValue::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_text_trims_and_nulls_empty() {
        assert_eq!(
            apply_instruction(FieldInstruction::Text, &Cell::text("  Платье  ")),
            FieldValue::Text(Some("Платье".to_string()))
        );
        assert_eq!(
            apply_instruction(FieldInstruction::Text, &Cell::text("   ")),
            FieldValue::Text(None)
        );
    }

    #[test]
    fn test_sentinels_always_null() {
        assert_eq!(num(FieldInstruction::Int, Cell::text("-")), None);
        assert_eq!(num(FieldInstruction::IntX100, Cell::text("нет данных")), None);
        assert_eq!(
            apply_instruction(FieldInstruction::Text, &Cell::text("Нет данных")),
            FieldValue::Text(None)
        );
        assert_eq!(
            apply_instruction(FieldInstruction::Date, &Cell::text("-")),
            FieldValue::Date(None)
        );
    }

    #[test]
    fn test_int_comma_decimal_and_symbols() {
        assert_eq!(num(FieldInstruction::Int, Cell::text("5 309,40 ₽")), Some(5309));
        assert_eq!(num(FieldInstruction::Int, Cell::text("12,5")), Some(13));
        assert_eq!(num(FieldInstruction::Int, Cell::Number(7.49)), Some(7));
    }

    #[test]
    fn test_intx10_and_intx100_scaling() {
        assert_eq!(num(FieldInstruction::IntX10, Cell::text("45,7")), Some(457));
        assert_eq!(num(FieldInstruction::IntX100, Cell::text("12,34")), Some(1234));
        assert_eq!(num(FieldInstruction::IntX100, Cell::Number(0.555)), Some(56));
    }

    #[test]
    fn test_scaled_idempotent_over_own_output() {
        // Re-parsing the stringified scaled-down output stays within
        // rounding tolerance of the original.
        let scaled = num(FieldInstruction::IntX10, Cell::text("45,7")).unwrap();
        let round_trip = num(
            FieldInstruction::IntX10,
            Cell::text(format!("{},{}", scaled / 10, (scaled % 10).abs())),
        );
        assert_eq!(round_trip, Some(scaled));
    }

    #[test]
    fn test_special_ratio() {
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text("12 из 14")), Some(86));
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text("7 из 7")), Some(100));
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text("1 из 3")), Some(33));
        // Y = 0 and unmatched shapes are null.
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text("5 из 0")), None);
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text("когда-нибудь")), None);
    }

    #[test]
    fn test_special_ratio_huge_numerator() {
        // X near i64::MAX must not overflow while scaling by 100.
        let text = format!("{} из {}", i64::MAX, i64::MAX);
        assert_eq!(num(FieldInstruction::SpecialRatio, Cell::text(text)), Some(100));
    }

    #[test]
    fn test_special_hours() {
        assert_eq!(num(FieldInstruction::SpecialHours, Cell::text("36ч")), Some(36));
        assert_eq!(num(FieldInstruction::SpecialHours, Cell::text("48 ч")), Some(48));
        assert_eq!(num(FieldInstruction::SpecialHours, Cell::text("72")), Some(72));
        assert_eq!(num(FieldInstruction::SpecialHours, Cell::text("скоро")), None);
    }

    #[test]
    fn test_date_instruction() {
        assert_eq!(
            apply_instruction(FieldInstruction::Date, &Cell::text("05.04.2024")),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 4, 5))
        );
        let native = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            apply_instruction(FieldInstruction::Date, &Cell::Date(native)),
            FieldValue::Date(Some(native))
        );
    }

    #[test]
    fn test_aggregate_rows_detected() {
        assert!(is_aggregate_row(&[Cell::text("Итого")]));
        assert!(is_aggregate_row(&[Cell::text("Среднее значение за период")]));
        assert!(!is_aggregate_row(&[Cell::text("Платье летнее")]));
    }

    #[test]
    fn test_row_without_product_name_dropped() {
        let mappings = vec![ColumnMapping {
            column_index: 0,
            field: ReportField::ProductName,
            instruction: FieldInstruction::Text,
        }];
        assert!(transform_row(&[Cell::Empty], &mappings, None).is_none());
        assert!(transform_row(&[Cell::text("Товар")], &mappings, None).is_some());
    }

    #[test]
    fn test_category_backfill_from_metadata() {
        let mappings = vec![
            ColumnMapping {
                column_index: 0,
                field: ReportField::ProductName,
                instruction: FieldInstruction::Text,
            },
            ColumnMapping {
                column_index: 1,
                field: ReportField::Category,
                instruction: FieldInstruction::Text,
            },
        ];

        let backfilled =
            transform_row(&[Cell::text("Товар"), Cell::Empty], &mappings, Some("Платья")).unwrap();
        assert_eq!(backfilled.category.as_deref(), Some("Платья"));

        let own = transform_row(
            &[Cell::text("Товар"), Cell::text("Юбки")],
            &mappings,
            Some("Платья"),
        )
        .unwrap();
        assert_eq!(own.category.as_deref(), Some("Юбки"));
    }

    #[test]
    fn test_monotonic_scaling() {
        let small = num(FieldInstruction::IntX10, Cell::text("10,1")).unwrap();
        let large = num(FieldInstruction::IntX10, Cell::text("10,2")).unwrap();
        assert!(small < large);
    }
}
