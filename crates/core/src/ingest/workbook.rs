//! First-sheet reader for the binary spreadsheet container.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::grid::{Cell, CellGrid};
use super::ingest_errors::ImportError;
use crate::Result;

/// Reads the first sheet of an xlsx container into a cell grid.
///
/// An unreadable container or a workbook without sheets is a file-fatal
/// parse error.
pub fn read_first_sheet(bytes: &[u8]) -> Result<CellGrid> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Unreadable("workbook contains no sheets".to_string()))?
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| Cell::Date(ndt.date()))
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        // Formula error cells carry no importable value.
        Data::Error(_) => Cell::Empty,
    }
}
