use thiserror::Error;

/// Custom error type for file import operations.
///
/// These are file-fatal conditions. Row-level problems are accumulated as
/// warning strings and never surface through this type.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read spreadsheet container: {0}")]
    Unreadable(String),
    #[error("Could not find header row")]
    HeaderNotFound,
    #[error("Invalid file structure, missing columns: {}", missing_fields.join(", "))]
    InvalidStructure { missing_fields: Vec<String> },
    #[error("File contains no valid data rows")]
    NoValidRows,
}

impl From<ImportError> for String {
    fn from(error: ImportError) -> Self {
        error.to_string()
    }
}
