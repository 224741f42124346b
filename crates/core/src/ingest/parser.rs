//! Whole-file parsing: metadata, header mapping and row transformation.

use super::grid::CellGrid;
use super::header::{locate_header_row, map_columns};
use super::ingest_errors::ImportError;
use super::ingest_model::ParsedReportFile;
use super::metadata::extract_file_metadata;
use super::transform::{is_aggregate_row, transform_row};
use crate::Result;

/// Parses one report grid end to end.
///
/// Fatal conditions (no header row within the scan window, required columns
/// missing) surface as [`ImportError`]; everything row-level degrades to
/// dropped rows or warning strings and the parse continues.
pub fn parse_report_grid(
    file_name: &str,
    file_size: i64,
    grid: &CellGrid,
) -> Result<ParsedReportFile> {
    let mut metadata = extract_file_metadata(file_name, file_size, grid);

    let header_index = locate_header_row(grid).ok_or(ImportError::HeaderNotFound)?;
    let (mappings, header) = map_columns(&grid[header_index]);
    if !header.is_valid {
        return Err(ImportError::InvalidStructure {
            missing_fields: header.missing_fields.clone(),
        }
        .into());
    }

    let category_backfill = metadata.category_level3.clone();
    let mut rows = Vec::new();
    let mut invalid_rows = 0usize;
    let mut warnings = Vec::new();

    for (offset, raw_row) in grid.iter().skip(header_index + 1).enumerate() {
        if raw_row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if is_aggregate_row(raw_row) {
            continue;
        }

        match transform_row(raw_row, &mappings, category_backfill.as_deref()) {
            Some(parsed) => rows.push(parsed),
            None => {
                invalid_rows += 1;
                warnings.push(format!(
                    "row {}: missing product name, row skipped",
                    header_index + 2 + offset
                ));
            }
        }
    }

    // The file's date range comes from the rows' own date field, not the
    // formation date.
    metadata.date_range_start = rows.iter().filter_map(|r| r.record_date).min();
    metadata.date_range_end = rows.iter().filter_map(|r| r.record_date).max();

    Ok(ParsedReportFile {
        metadata,
        header,
        rows,
        invalid_rows,
        warnings,
        errors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::grid::Cell;
    use crate::Error;
    use chrono::NaiveDate;

    fn grid(rows: Vec<Vec<&str>>) -> CellGrid {
        rows.into_iter()
            .map(|r| r.into_iter().map(Cell::text).collect())
            .collect()
    }

    fn sample_grid() -> CellGrid {
        grid(vec![
            vec!["Дата формирования", "15.03.2024"],
            vec!["Отчетный период", "7 дней"],
            vec!["Категория 3 уровня", "Платья"],
            vec!["Название товара", "Категория", "Заказали, шт", "Дата"],
            vec!["Платье летнее", "", "12", "01.03.2024"],
            vec!["Платье зимнее", "Юбки", "5", "05.03.2024"],
            vec!["", "", "", ""],
            vec!["Итого", "", "17", ""],
        ])
    }

    #[test]
    fn test_full_parse() {
        let parsed = parse_report_grid("report.xlsx", 2048, &sample_grid()).unwrap();

        assert!(parsed.header.is_valid);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.invalid_rows, 0);
        assert_eq!(parsed.metadata.reported_days, Some(7));
        assert_eq!(parsed.rows[0].ordered_count, Some(12));
        // category backfilled from metadata on the first row only
        assert_eq!(parsed.rows[0].category.as_deref(), Some("Платья"));
        assert_eq!(parsed.rows[1].category.as_deref(), Some("Юбки"));
    }

    #[test]
    fn test_date_range_from_rows() {
        let parsed = parse_report_grid("report.xlsx", 1, &sample_grid()).unwrap();
        assert_eq!(
            parsed.metadata.date_range_start,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parsed.metadata.date_range_end,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_aggregate_and_empty_rows_skipped() {
        let parsed = parse_report_grid("report.xlsx", 1, &sample_grid()).unwrap();
        // the "Итого" row and the blank row do not appear anywhere
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.invalid_rows, 0);
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let g = grid(vec![vec!["Дата формирования", "01.01.2024"]]);
        let err = parse_report_grid("report.xlsx", 1, &g).unwrap_err();
        assert!(matches!(
            err,
            Error::Import(ImportError::HeaderNotFound)
        ));
    }

    #[test]
    fn test_row_without_product_name_counted() {
        let g = grid(vec![
            vec!["Название товара", "Заказали, шт"],
            vec!["", "5"],
            vec!["Товар", "7"],
        ]);
        let parsed = parse_report_grid("report.xlsx", 1, &g).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.invalid_rows, 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("row 2"));
    }
}
