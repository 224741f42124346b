use chrono::NaiveDate;
use thiserror::Error;

/// Custom error type for report-related operations
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report for {date_of_report} over {reported_days} days already exists")]
    AlreadyExists {
        date_of_report: NaiveDate,
        reported_days: i32,
    },
    #[error("Report not found: {0}")]
    NotFound(String),
    #[error("Invalid report data: {0}")]
    InvalidData(String),
}

impl From<ReportError> for String {
    fn from(error: ReportError) -> Self {
        error.to_string()
    }
}
