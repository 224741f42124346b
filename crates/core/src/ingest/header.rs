//! Header row location and column mapping.
//!
//! The header row is the first row (within the scan window) whose first
//! cell contains the product-name column label. Each header cell is then
//! looked up in the fixed label→(field, instruction) vocabulary; headers
//! with no mapping are ignored in this format (they are still listed in
//! `extra_fields` for visibility, unlike the stricter pricelist parser
//! which rejects on extras).

use serde::{Deserialize, Serialize};

use super::grid::{Cell, CellGrid};
use super::transform::FieldInstruction;
use crate::constants::{HEADER_SCAN_ROWS, PRODUCT_NAME_HEADER};

/// Canonical fields of a funnel report row. The closed set doubles as the
/// key space of the column vocabulary and of the bounds table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    ProductName,
    Article,
    VendorCode,
    Barcode,
    Brand,
    Seller,
    Category,
    Subject,
    OrderedSum,
    PurchasedSum,
    AveragePrice,
    AverageDiscount,
    BuyoutPercent,
    OrderedCount,
    PurchasedCount,
    CancelledCount,
    ReturnedCount,
    StockWarehouse,
    StockMarketplace,
    DeliveryHours,
    TurnoverDays,
    AvailabilityPercent,
    CardViews,
    AddedToCart,
    CartConversion,
    OrderConversion,
    PromoViews,
    PromoClicks,
    PromoSpend,
    PromoCtr,
    RecordDate,
}

impl ReportField {
    /// Storage column name, used in validation error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ReportField::ProductName => "product_name",
            ReportField::Article => "article",
            ReportField::VendorCode => "vendor_code",
            ReportField::Barcode => "barcode",
            ReportField::Brand => "brand",
            ReportField::Seller => "seller",
            ReportField::Category => "category",
            ReportField::Subject => "subject",
            ReportField::OrderedSum => "ordered_sum",
            ReportField::PurchasedSum => "purchased_sum",
            ReportField::AveragePrice => "average_price",
            ReportField::AverageDiscount => "average_discount",
            ReportField::BuyoutPercent => "buyout_percent",
            ReportField::OrderedCount => "ordered_count",
            ReportField::PurchasedCount => "purchased_count",
            ReportField::CancelledCount => "cancelled_count",
            ReportField::ReturnedCount => "returned_count",
            ReportField::StockWarehouse => "stock_warehouse",
            ReportField::StockMarketplace => "stock_marketplace",
            ReportField::DeliveryHours => "delivery_hours",
            ReportField::TurnoverDays => "turnover_days",
            ReportField::AvailabilityPercent => "availability_percent",
            ReportField::CardViews => "card_views",
            ReportField::AddedToCart => "added_to_cart",
            ReportField::CartConversion => "cart_conversion",
            ReportField::OrderConversion => "order_conversion",
            ReportField::PromoViews => "promo_views",
            ReportField::PromoClicks => "promo_clicks",
            ReportField::PromoSpend => "promo_spend",
            ReportField::PromoCtr => "promo_ctr",
            ReportField::RecordDate => "record_date",
        }
    }
}

/// One vocabulary entry: source column label, canonical field and the
/// transformation instruction applied to its cells.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub field: ReportField,
    pub instruction: FieldInstruction,
}

const fn spec(
    label: &'static str,
    field: ReportField,
    instruction: FieldInstruction,
) -> ColumnSpec {
    ColumnSpec {
        label,
        field,
        instruction,
    }
}

/// The bit-exact compatibility surface of the source format: every known
/// column label with its transformation. Labels are matched
/// case-insensitively on trimmed header text.
pub const COLUMN_VOCABULARY: [ColumnSpec; 31] = [
    spec("Название товара", ReportField::ProductName, FieldInstruction::Text),
    spec("Артикул", ReportField::Article, FieldInstruction::Text),
    spec("Артикул продавца", ReportField::VendorCode, FieldInstruction::Text),
    spec("Баркод", ReportField::Barcode, FieldInstruction::Text),
    spec("Бренд", ReportField::Brand, FieldInstruction::Text),
    spec("Продавец", ReportField::Seller, FieldInstruction::Text),
    spec("Категория", ReportField::Category, FieldInstruction::Text),
    spec("Предмет", ReportField::Subject, FieldInstruction::Text),
    spec("Заказали на сумму, ₽", ReportField::OrderedSum, FieldInstruction::Int),
    spec("Выкупили на сумму, ₽", ReportField::PurchasedSum, FieldInstruction::Int),
    spec("Средняя цена, ₽", ReportField::AveragePrice, FieldInstruction::IntX100),
    spec("Средняя скидка, %", ReportField::AverageDiscount, FieldInstruction::IntX10),
    spec("Процент выкупа, %", ReportField::BuyoutPercent, FieldInstruction::IntX10),
    spec("Заказали, шт", ReportField::OrderedCount, FieldInstruction::Int),
    spec("Выкупили, шт", ReportField::PurchasedCount, FieldInstruction::Int),
    spec("Отменили, шт", ReportField::CancelledCount, FieldInstruction::Int),
    spec("Возвраты, шт", ReportField::ReturnedCount, FieldInstruction::Int),
    spec("Остатки склад, шт", ReportField::StockWarehouse, FieldInstruction::Int),
    spec("Остатки МП, шт", ReportField::StockMarketplace, FieldInstruction::Int),
    spec("Время доставки", ReportField::DeliveryHours, FieldInstruction::SpecialHours),
    spec("Оборачиваемость, дн", ReportField::TurnoverDays, FieldInstruction::Int),
    spec("Дней в наличии", ReportField::AvailabilityPercent, FieldInstruction::SpecialRatio),
    spec("Переходы в карточку", ReportField::CardViews, FieldInstruction::Int),
    spec("Положили в корзину", ReportField::AddedToCart, FieldInstruction::Int),
    spec("Конверсия в корзину, %", ReportField::CartConversion, FieldInstruction::IntX10),
    spec("Конверсия в заказ, %", ReportField::OrderConversion, FieldInstruction::IntX10),
    spec("Показы в продвижении", ReportField::PromoViews, FieldInstruction::Int),
    spec("Клики в продвижении", ReportField::PromoClicks, FieldInstruction::Int),
    spec("Расходы на продвижение, ₽", ReportField::PromoSpend, FieldInstruction::IntX100),
    spec("CTR, %", ReportField::PromoCtr, FieldInstruction::IntX10),
    spec("Дата", ReportField::RecordDate, FieldInstruction::Date),
];

/// Column labels that must be present for the file to be importable.
pub const REQUIRED_COLUMNS: [ReportField; 1] = [ReportField::ProductName];

/// One resolved logical column: grid index plus its vocabulary entry.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub column_index: usize,
    pub field: ReportField,
    pub instruction: FieldInstruction,
}

/// Outcome of header validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderValidationResult {
    pub is_valid: bool,
    /// Required column labels not found in the header row.
    pub missing_fields: Vec<String>,
    /// Header cells with no vocabulary mapping. Informational only in this
    /// format.
    pub extra_fields: Vec<String>,
}

/// Finds the header row: the first row within the scan window whose first
/// cell contains the product-name label.
pub fn locate_header_row(grid: &CellGrid) -> Option<usize> {
    grid.iter().take(HEADER_SCAN_ROWS).position(|row| {
        row.first()
            .map(|cell| cell.as_text().to_lowercase().contains(PRODUCT_NAME_HEADER))
            .unwrap_or(false)
    })
}

fn lookup(label: &str) -> Option<&'static ColumnSpec> {
    let needle = label.trim().to_lowercase();
    COLUMN_VOCABULARY
        .iter()
        .find(|s| s.label.to_lowercase() == needle)
}

/// Maps every non-empty header cell through the vocabulary.
///
/// Resilient to column order, missing optional columns and duplicate or
/// blank header cells (first occurrence of a duplicate label wins).
pub fn map_columns(header_row: &[Cell]) -> (Vec<ColumnMapping>, HeaderValidationResult) {
    let mut mappings: Vec<ColumnMapping> = Vec::new();
    let mut extra_fields = Vec::new();

    for (index, cell) in header_row.iter().enumerate() {
        if cell.is_empty() {
            continue;
        }
        let label = cell.as_text();
        match lookup(&label) {
            Some(spec) => {
                if mappings.iter().any(|m| m.field == spec.field) {
                    continue; // duplicate header cell
                }
                mappings.push(ColumnMapping {
                    column_index: index,
                    field: spec.field,
                    instruction: spec.instruction,
                });
            }
            None => extra_fields.push(label),
        }
    }

    let missing_fields: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !mappings.iter().any(|m| m.field == **required))
        .filter_map(|required| {
            COLUMN_VOCABULARY
                .iter()
                .find(|s| s.field == *required)
                .map(|s| s.label.to_string())
        })
        .collect();

    let result = HeaderValidationResult {
        is_valid: missing_fields.is_empty(),
        missing_fields,
        extra_fields,
    };

    (mappings, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: Vec<&str>) -> Vec<Cell> {
        cells.into_iter().map(Cell::text).collect()
    }

    #[test]
    fn test_locate_header_row_skips_metadata() {
        let grid: CellGrid = vec![
            vec![Cell::text("Дата формирования"), Cell::text("01.01.2024")],
            vec![Cell::text("Отчетный период"), Cell::text("7 дней")],
            vec![Cell::text("Название товара"), Cell::text("Артикул")],
        ];
        assert_eq!(locate_header_row(&grid), Some(2));
    }

    #[test]
    fn test_header_absent_within_window() {
        let grid: CellGrid = (0..12)
            .map(|i| vec![Cell::text(format!("строка {}", i))])
            .collect();
        assert_eq!(locate_header_row(&grid), None);
    }

    #[test]
    fn test_maps_known_columns_any_order() {
        let (mappings, result) = map_columns(&header(vec![
            "Бренд",
            "Название товара",
            "Заказали, шт",
        ]));

        assert!(result.is_valid);
        assert_eq!(mappings.len(), 3);
        let product = mappings
            .iter()
            .find(|m| m.field == ReportField::ProductName)
            .unwrap();
        assert_eq!(product.column_index, 1);
    }

    #[test]
    fn test_unknown_headers_listed_as_extra() {
        let (mappings, result) = map_columns(&header(vec![
            "Название товара",
            "Неизвестная колонка",
        ]));

        assert!(result.is_valid);
        assert_eq!(mappings.len(), 1);
        assert_eq!(result.extra_fields, vec!["Неизвестная колонка"]);
    }

    #[test]
    fn test_missing_product_name_invalidates_header() {
        let (_, result) = map_columns(&header(vec!["Бренд", "Заказали, шт"]));

        assert!(!result.is_valid);
        assert_eq!(result.missing_fields, vec!["Название товара"]);
    }

    #[test]
    fn test_duplicate_and_blank_headers_tolerated() {
        let (mappings, result) = map_columns(&header(vec![
            "Название товара",
            "",
            "Бренд",
            "Бренд",
        ]));

        assert!(result.is_valid);
        assert_eq!(mappings.len(), 2);
        let brand = mappings
            .iter()
            .find(|m| m.field == ReportField::Brand)
            .unwrap();
        assert_eq!(brand.column_index, 2); // first occurrence wins
    }

    #[test]
    fn test_case_insensitive_labels() {
        let (mappings, result) = map_columns(&header(vec!["НАЗВАНИЕ ТОВАРА"]));
        assert!(result.is_valid);
        assert_eq!(mappings[0].field, ReportField::ProductName);
    }

    #[test]
    fn test_vocabulary_covers_every_field_once() {
        for spec in COLUMN_VOCABULARY.iter() {
            let same_field = COLUMN_VOCABULARY
                .iter()
                .filter(|s| s.field == spec.field)
                .count();
            assert_eq!(same_field, 1, "field {:?} mapped twice", spec.field);
        }
    }
}
