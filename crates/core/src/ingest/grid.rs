//! The cell grid every pipeline stage operates on.
//!
//! Keeping the grid independent of the spreadsheet container means unit
//! tests can build grids directly instead of shipping xlsx fixtures.

use chrono::NaiveDate;

/// One spreadsheet cell, already narrowed to the value kinds the report
/// format actually uses.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Trimmed text content; numbers and dates render to their canonical
    /// string form so substring matching works on any cell kind.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Date(d) => d.format("%d.%m.%Y").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Rows-by-columns grid of the first sheet.
pub type CellGrid = Vec<Vec<Cell>>;

/// Trimmed, lowercased text of the first cell of a row. Used for aggregate
/// row markers and metadata labels.
pub fn first_cell_lower(row: &[Cell]) -> String {
    row.first().map(|c| c.as_text().to_lowercase()).unwrap_or_default()
}
