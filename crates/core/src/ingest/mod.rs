pub mod constraints;
pub mod duplicates;
pub mod grid;
pub mod hashing;
pub mod header;
mod import_service;
mod ingest_errors;
mod ingest_model;
pub mod metadata;
pub mod parser;
pub mod transform;
pub mod workbook;


pub use duplicates::{DuplicateCheckResult, DuplicateDetector, DuplicateMatchType, SemanticKey};
pub use grid::{Cell, CellGrid};
pub use header::{ColumnMapping, HeaderValidationResult, ReportField, COLUMN_VOCABULARY};
pub use import_service::ImportService;
pub use ingest_errors::ImportError;
pub use ingest_model::{
    BatchSummary, FileImportOutcome, FileMetadata, FileState, ImportResult, NoopProgress,
    ParsedReportFile, ParsedRow, ProgressReporter, UploadFile,
};
pub use transform::FieldInstruction;
