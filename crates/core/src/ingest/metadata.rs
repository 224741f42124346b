//! Leading-row metadata extraction.
//!
//! The report format carries free-form label/value pairs in the rows before
//! the header: formation date, reporting period length and a level-3
//! category. Labels are matched by substring; missing labels simply leave
//! the corresponding field unset. Extraction never fails.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use super::grid::{Cell, CellGrid};
use super::ingest_model::FileMetadata;
use crate::constants::{
    METADATA_CATEGORY_LABEL, METADATA_DATE_LABEL, METADATA_PERIOD_LABEL, METADATA_SCAN_ROWS,
    TWO_DIGIT_YEAR_CUTOFF,
};

fn dmy_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{2,4})").unwrap())
}

fn period_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Integer immediately preceding the "days" unit marker.
    RE.get_or_init(|| Regex::new(r"(\d+)\s*(?:дн|дней|дня|день)").unwrap())
}

/// Parses a `DD.MM.YY[YY]` pattern anywhere in the text.
///
/// Two-digit years at or above [`TWO_DIGIT_YEAR_CUTOFF`] resolve to 19xx,
/// below it to 20xx.
pub fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let caps = dmy_regex().captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let raw_year: u32 = caps[3].parse().ok()?;

    let year = if caps[3].len() <= 2 {
        if raw_year >= TWO_DIGIT_YEAR_CUTOFF {
            1900 + raw_year
        } else {
            2000 + raw_year
        }
    } else {
        raw_year
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Extracts file metadata from the leading rows of the grid.
///
/// Column 0 is treated as the label and column 1 as the value. Date cells
/// in the value position are honored directly; text values go through the
/// `DD.MM.YY[YY]` parser.
pub fn extract_file_metadata(file_name: &str, file_size: i64, grid: &CellGrid) -> FileMetadata {
    let mut metadata = FileMetadata::new(file_name.to_string(), file_size);

    for row in grid.iter().take(METADATA_SCAN_ROWS) {
        let label = match row.first() {
            Some(cell) => cell.as_text().to_lowercase(),
            None => continue,
        };
        let value = row.get(1).cloned().unwrap_or(Cell::Empty);

        if label.contains(METADATA_DATE_LABEL) {
            metadata.date_of_report = match &value {
                Cell::Date(d) => Some(*d),
                other => parse_day_month_year(&other.as_text()),
            };
        } else if label.contains(METADATA_PERIOD_LABEL) {
            metadata.reported_days = extract_period_days(&value.as_text());
        } else if label.contains(METADATA_CATEGORY_LABEL) {
            let category = value.as_text();
            if !category.is_empty() {
                metadata.category_level3 = Some(category);
            }
        }
    }

    metadata
}

fn extract_period_days(text: &str) -> Option<i32> {
    let lowered = text.to_lowercase();
    let caps = period_regex().captures(&lowered)?;
    caps[1].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<&str>>) -> CellGrid {
        rows.into_iter()
            .map(|r| r.into_iter().map(Cell::text).collect())
            .collect()
    }

    #[test]
    fn test_extracts_all_labels() {
        let g = grid(vec![
            vec!["Дата формирования", "15.03.2024"],
            vec!["Отчетный период", "14 дней"],
            vec!["Категория 3 уровня", "Платья"],
        ]);
        let meta = extract_file_metadata("report.xlsx", 1024, &g);

        assert_eq!(
            meta.date_of_report,
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(meta.reported_days, Some(14));
        assert_eq!(meta.category_level3.as_deref(), Some("Платья"));
    }

    #[test]
    fn test_missing_labels_leave_fields_unset() {
        let g = grid(vec![vec!["Что-то другое", "значение"]]);
        let meta = extract_file_metadata("report.xlsx", 10, &g);

        assert_eq!(meta.date_of_report, None);
        assert_eq!(meta.reported_days, None);
        assert_eq!(meta.category_level3, None);
    }

    #[test]
    fn test_two_digit_year_heuristic() {
        assert_eq!(
            parse_day_month_year("01.02.99"),
            NaiveDate::from_ymd_opt(1999, 2, 1)
        );
        assert_eq!(
            parse_day_month_year("01.02.24"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        // The documented cutoff boundary.
        assert_eq!(
            parse_day_month_year("01.02.50"),
            NaiveDate::from_ymd_opt(1950, 2, 1)
        );
        assert_eq!(
            parse_day_month_year("01.02.49"),
            NaiveDate::from_ymd_opt(2049, 2, 1)
        );
    }

    #[test]
    fn test_four_digit_year() {
        assert_eq!(
            parse_day_month_year("31.12.2023"),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert_eq!(parse_day_month_year("32.13.2023"), None);
        assert_eq!(parse_day_month_year("no date here"), None);
    }

    #[test]
    fn test_period_variants() {
        assert_eq!(extract_period_days("за 7 дней"), Some(7));
        assert_eq!(extract_period_days("1 день"), Some(1));
        assert_eq!(extract_period_days("30 дн."), Some(30));
        assert_eq!(extract_period_days("14 Дней"), Some(14));
        assert_eq!(extract_period_days("без периода"), None);
    }

    #[test]
    fn test_native_date_cell_honored() {
        let g: CellGrid = vec![vec![
            Cell::text("Дата формирования отчета"),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
        ]];
        let meta = extract_file_metadata("r.xlsx", 5, &g);
        assert_eq!(meta.date_of_report, NaiveDate::from_ymd_opt(2024, 6, 1));
    }
}
