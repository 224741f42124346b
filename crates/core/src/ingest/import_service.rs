//! The import pipeline: per-file state machine and batch runner.
//!
//! Files move pending → validating → {valid|invalid|duplicate} →
//! processing → {success|error}. A file never fails silently: every outcome
//! carries a message and exactly one history record is written per attempt.

use chrono::NaiveDate;
use log::{debug, error, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use super::duplicates::{DuplicateDetector, SemanticKey};
use super::grid::CellGrid;
use super::hashing::hash_file_bytes;
use super::ingest_model::{
    BatchSummary, FileImportOutcome, FileState, ImportResult, ParsedReportFile, ParsedRow,
    ProgressReporter, UploadFile,
};
use super::workbook::read_first_sheet;
use super::{constraints, parser};
use crate::constants::PROGRESS_CHECKPOINTS;
use crate::history::{
    ImportHistoryRecord, ImportHistoryRepositoryTrait, ImportHistoryService,
    ImportHistoryServiceTrait, ImportStatus, ValidationStatus,
};
use crate::reports::{
    NewReport, Report, ReportError, ReportRepositoryTrait, ReportRowRepositoryTrait,
};
use crate::Result;

pub struct ImportService {
    report_repository: Arc<dyn ReportRepositoryTrait>,
    row_repository: Arc<dyn ReportRowRepositoryTrait>,
    recorder: ImportHistoryService,
    detector: DuplicateDetector,
}

impl ImportService {
    pub fn new(
        report_repository: Arc<dyn ReportRepositoryTrait>,
        row_repository: Arc<dyn ReportRowRepositoryTrait>,
        history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
    ) -> Self {
        let detector = DuplicateDetector::new(
            Arc::clone(&report_repository),
            Arc::clone(&history_repository),
        );
        Self {
            report_repository,
            row_repository,
            recorder: ImportHistoryService::new(history_repository),
            detector,
        }
    }

    /// Imports a single file outside of a batch.
    pub fn import_file(
        &self,
        file: &UploadFile,
        progress: &dyn ProgressReporter,
    ) -> FileImportOutcome {
        self.import_file_inner(file, &HashSet::new(), progress).0
    }

    /// Imports a batch of files sequentially, in the given order.
    ///
    /// Later files sharing a semantic key with an earlier successfully
    /// imported file are flagged as cross-file duplicates. A failing file
    /// never aborts the remainder of the batch.
    pub fn import_batch(
        &self,
        files: &[UploadFile],
        progress: &dyn ProgressReporter,
    ) -> BatchSummary {
        let started = Instant::now();
        let mut seen: HashSet<SemanticKey> = HashSet::new();
        let mut summary = BatchSummary::default();

        for file in files {
            let (outcome, imported_key) = self.import_file_inner(file, &seen, progress);
            if let Some(key) = imported_key {
                seen.insert(key);
            }

            match outcome.state {
                FileState::Success => {
                    summary.files_processed += 1;
                    if let Some(import) = &outcome.import {
                        summary.total_records_imported += import.success_count;
                    }
                }
                FileState::Duplicate => summary.files_skipped += 1,
                _ => summary.files_failed += 1,
            }
            summary.outcomes.push(outcome);
        }

        summary.total_duration_ms = started.elapsed().as_millis() as i64;
        debug!(
            "batch finished: {} imported, {} skipped, {} failed",
            summary.files_processed, summary.files_skipped, summary.files_failed
        );
        summary
    }

    /// Dry-run validation of one file: hashing, parsing, constraint checks
    /// and duplicate detection without touching report storage or history.
    pub fn check_file(&self, file: &UploadFile) -> Result<FileImportOutcome> {
        let started = Instant::now();
        let file_hash = hash_file_bytes(&file.bytes);
        let grid = match read_first_sheet(&file.bytes) {
            Ok(grid) => grid,
            Err(e) => {
                return Ok(outcome(
                    &file.file_name,
                    FileState::Invalid,
                    e.to_string(),
                    started,
                ))
            }
        };
        self.check_grid(&file.file_name, file.bytes.len() as i64, &file_hash, &grid)
    }

    pub(crate) fn check_grid(
        &self,
        file_name: &str,
        file_size: i64,
        file_hash: &str,
        grid: &CellGrid,
    ) -> Result<FileImportOutcome> {
        let started = Instant::now();

        if let Some(prior) = self.detector.check_exact(file_hash)? {
            return Ok(outcome(
                file_name,
                FileState::Duplicate,
                exact_duplicate_message(&prior),
                started,
            ));
        }

        let parsed = match parser::parse_report_grid(file_name, file_size, grid) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(outcome(file_name, FileState::Invalid, e.to_string(), started)),
        };

        let (valid_rows, row_errors, row_warnings) = validate_rows(&parsed);

        let db_check = self.detector.check_database(&parsed.metadata)?;
        let state = if db_check.is_duplicate {
            FileState::Duplicate
        } else if valid_rows.is_empty() {
            FileState::Invalid
        } else {
            FileState::Valid
        };
        let message = match (&db_check.message, state) {
            (Some(m), _) => m.clone(),
            (None, FileState::Invalid) => "file contains no valid data rows".to_string(),
            _ => format!("{} rows ready for import", valid_rows.len()),
        };

        let mut result = outcome(file_name, state, message, started);
        result.header = Some(parsed.header.clone());
        result.duplicate = db_check.is_duplicate.then_some(db_check);
        result.records_count = parsed.rows.len();
        result.invalid_rows = parsed.invalid_rows;
        result.errors = row_errors;
        result.warnings = [parsed.warnings, row_warnings].concat();
        Ok(result)
    }

    fn import_file_inner(
        &self,
        file: &UploadFile,
        seen: &HashSet<SemanticKey>,
        progress: &dyn ProgressReporter,
    ) -> (FileImportOutcome, Option<SemanticKey>) {
        let started = Instant::now();
        let file_hash = hash_file_bytes(&file.bytes);

        match read_first_sheet(&file.bytes) {
            Ok(grid) => self.import_grid(
                &file.file_name,
                file.bytes.len() as i64,
                &file_hash,
                &grid,
                seen,
                progress,
            ),
            Err(e) => {
                let message = e.to_string();
                let mut record = ImportHistoryRecord::new(
                    file.file_name.clone(),
                    file_hash,
                    file.bytes.len() as i64,
                );
                record.validation_status = ValidationStatus::Invalid;
                record.validation_errors = vec![message.clone()];
                record.import_status = ImportStatus::Error;
                record.error_message = Some(message.clone());
                let out = outcome(&file.file_name, FileState::Invalid, message, started);
                (self.finish(record, out), None)
            }
        }
    }

    /// The per-file state machine over an already-read grid.
    pub(crate) fn import_grid(
        &self,
        file_name: &str,
        file_size: i64,
        file_hash: &str,
        grid: &CellGrid,
        seen: &HashSet<SemanticKey>,
        progress: &dyn ProgressReporter,
    ) -> (FileImportOutcome, Option<SemanticKey>) {
        let started = Instant::now();
        let mut record =
            ImportHistoryRecord::new(file_name.to_string(), file_hash.to_string(), file_size);

        progress.on_progress(file_name, PROGRESS_CHECKPOINTS[0]);

        // Tier 1: exact content duplicate.
        match self.detector.check_exact(file_hash) {
            Ok(Some(prior)) => {
                let message = exact_duplicate_message(&prior);
                record.import_status = ImportStatus::Error;
                record.error_message = Some(message.clone());
                let out = outcome(file_name, FileState::Duplicate, message, started);
                return (self.finish(record, out), None);
            }
            Ok(None) => {}
            Err(e) => return (self.unexpected(record, file_name, e, started), None),
        }

        let parsed = match parser::parse_report_grid(file_name, file_size, grid) {
            Ok(parsed) => parsed,
            Err(e) => {
                let message = e.to_string();
                record.validation_status = ValidationStatus::Invalid;
                record.validation_errors = vec![message.clone()];
                record.import_status = ImportStatus::Error;
                record.error_message = Some(message.clone());
                let out = outcome(file_name, FileState::Invalid, message, started);
                return (self.finish(record, out), None);
            }
        };

        progress.on_progress(file_name, PROGRESS_CHECKPOINTS[1]);

        record.records_count = parsed.rows.len() as i32;
        record.date_range_start = parsed.metadata.date_range_start;
        record.date_range_end = parsed.metadata.date_range_end;

        if parsed.rows.is_empty() {
            let message = "file contains no valid data rows".to_string();
            record.validation_status = ValidationStatus::Invalid;
            record.validation_errors = vec![message.clone()];
            record.import_status = ImportStatus::Error;
            record.error_message = Some(message.clone());
            let mut out = outcome(file_name, FileState::Invalid, message, started);
            out.header = Some(parsed.header);
            out.invalid_rows = parsed.invalid_rows;
            out.warnings = parsed.warnings;
            return (self.finish(record, out), None);
        }

        // Storage-bound validation. Out-of-range rows are excluded and
        // accounted as failures, the file continues.
        let (valid_rows, row_errors, row_warnings) = validate_rows(&parsed);
        let constraint_failures = parsed.rows.len() - valid_rows.len();

        // Tiers 2 and 3: semantic duplicates, database first.
        let db_check = match self.detector.check_database(&parsed.metadata) {
            Ok(check) => check,
            Err(e) => return (self.unexpected(record, file_name, e, started), None),
        };
        let dup = if db_check.is_duplicate {
            db_check
        } else {
            self.detector.check_cross_file(&parsed.metadata, seen)
        };
        if dup.is_duplicate {
            let message = dup
                .message
                .clone()
                .unwrap_or_else(|| "duplicate report".to_string());
            record.import_status = ImportStatus::Error;
            record.error_message = Some(message.clone());
            let mut out = outcome(file_name, FileState::Duplicate, message, started);
            out.header = Some(parsed.header);
            out.duplicate = Some(dup);
            out.records_count = parsed.rows.len();
            out.invalid_rows = parsed.invalid_rows;
            return (self.finish(record, out), None);
        }

        progress.on_progress(file_name, PROGRESS_CHECKPOINTS[2]);

        // The grouping record requires the (date, period) pair.
        let (date_of_report, reported_days) = match (
            parsed.metadata.date_of_report,
            parsed.metadata.reported_days,
        ) {
            (Some(date), Some(days)) => (date, days),
            _ => {
                let message =
                    "file metadata is missing the formation date or reporting period".to_string();
                record.validation_status = ValidationStatus::Invalid;
                record.validation_errors = vec![message.clone()];
                record.import_status = ImportStatus::Error;
                record.error_message = Some(message.clone());
                let mut out = outcome(file_name, FileState::Invalid, message, started);
                out.header = Some(parsed.header);
                out.records_count = parsed.rows.len();
                return (self.finish(record, out), None);
            }
        };

        let report = match self.create_report_checked(date_of_report, reported_days) {
            Ok(report) => report,
            Err(e) => return (self.unexpected(record, file_name, e, started), None),
        };

        // Bulk insert, row-by-row fallback on failure.
        let rows: Vec<_> = valid_rows
            .into_iter()
            .map(|r| r.into_report_row(&report.id))
            .collect();
        let mut import = ImportResult {
            report_id: Some(report.id.clone()),
            failure_count: constraint_failures,
            ..Default::default()
        };
        let mut insert_errors: Vec<String> = Vec::new();

        match self.row_repository.bulk_insert_rows(&rows) {
            Ok(inserted) => import.success_count = inserted,
            Err(bulk_err) => {
                warn!(
                    "bulk insert failed for '{}', falling back to row-by-row: {}",
                    file_name, bulk_err
                );
                for (index, row) in rows.iter().enumerate() {
                    match self.row_repository.insert_row(row) {
                        Ok(()) => import.success_count += 1,
                        Err(e) if e.is_unique_violation() => {
                            import.duplicate_count += 1;
                            insert_errors.push(format!(
                                "row {}: duplicate article '{}'",
                                index + 1,
                                row.article.as_deref().unwrap_or("")
                            ));
                        }
                        Err(e) => {
                            import.failure_count += 1;
                            insert_errors.push(format!("row {}: {}", index + 1, e));
                        }
                    }
                }
            }
        }

        progress.on_progress(file_name, PROGRESS_CHECKPOINTS[3]);

        record.actual_records_imported = import.success_count as i32;
        record.records_skipped_duplicates = import.duplicate_count as i32;
        record.records_failed = import.failure_count as i32;
        record.import_status = if import.failure_count == 0 {
            ImportStatus::Success
        } else {
            ImportStatus::Partial
        };

        let mut all_errors = row_errors;
        all_errors.extend(insert_errors);
        record.validation_status = if all_errors.is_empty() && row_warnings.is_empty() {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Warning
        };
        record.validation_errors = all_errors.clone();

        let message = match record.import_status {
            ImportStatus::Success => format!(
                "imported {} rows ({} duplicates skipped)",
                import.success_count, import.duplicate_count
            ),
            _ => format!(
                "imported {} rows, {} failed, {} duplicates skipped",
                import.success_count, import.failure_count, import.duplicate_count
            ),
        };

        let key = SemanticKey::from_metadata(&parsed.metadata);
        let mut out = outcome(file_name, FileState::Success, message, started);
        out.header = Some(parsed.header);
        out.import = Some(import);
        out.records_count = parsed.rows.len();
        out.invalid_rows = parsed.invalid_rows;
        out.errors = all_errors;
        out.warnings = [parsed.warnings, row_warnings].concat();

        progress.on_progress(file_name, PROGRESS_CHECKPOINTS[4]);
        (self.finish(record, out), key.is_complete().then_some(key))
    }

    /// Insert-or-conflict on the grouping pair: the pre-check is the
    /// friendly fast path, the storage UNIQUE constraint is authoritative.
    fn create_report_checked(&self, date_of_report: NaiveDate, reported_days: i32) -> Result<Report> {
        if self
            .report_repository
            .find_by_period(date_of_report, reported_days)?
            .is_some()
        {
            return Err(ReportError::AlreadyExists {
                date_of_report,
                reported_days,
            }
            .into());
        }

        let report = NewReport {
            date_of_report,
            reported_days,
        }
        .into_report();
        match self.report_repository.create_report(report) {
            Ok(created) => Ok(created),
            Err(e) if e.is_unique_violation() => Err(ReportError::AlreadyExists {
                date_of_report,
                reported_days,
            }
            .into()),
            Err(e) => Err(e),
        }
    }

    fn unexpected(
        &self,
        mut record: ImportHistoryRecord,
        file_name: &str,
        err: crate::Error,
        started: Instant,
    ) -> FileImportOutcome {
        error!("import of '{}' aborted: {}", file_name, err);
        let message = err.to_string();
        record.import_status = ImportStatus::Error;
        record.error_message = Some(message.clone());
        self.finish(record, outcome(file_name, FileState::Error, message, started))
    }

    /// Stamps the duration, writes the history record and seals the outcome.
    /// Recording goes through the recorder service so its accounting check
    /// covers the real import path.
    fn finish(&self, mut record: ImportHistoryRecord, out: FileImportOutcome) -> FileImportOutcome {
        record.import_duration_ms = out.duration_ms;
        if let Err(e) = self.recorder.record_attempt(record) {
            error!(
                "failed to write import history for '{}': {}",
                out.file_name, e
            );
        }
        out
    }
}

fn exact_duplicate_message(prior: &ImportHistoryRecord) -> String {
    format!(
        "identical file already imported on {} as '{}'",
        prior.created_at.date(),
        prior.filename
    )
}

fn outcome(file_name: &str, state: FileState, message: String, started: Instant) -> FileImportOutcome {
    FileImportOutcome {
        file_name: file_name.to_string(),
        state,
        message,
        header: None,
        duplicate: None,
        import: None,
        records_count: 0,
        invalid_rows: 0,
        errors: Vec::new(),
        warnings: Vec::new(),
        duration_ms: started.elapsed().as_millis() as i64,
    }
}

/// Splits parsed rows into storage-safe rows and per-row diagnostics.
fn validate_rows(parsed: &ParsedReportFile) -> (Vec<ParsedRow>, Vec<String>, Vec<String>) {
    let mut valid = Vec::with_capacity(parsed.rows.len());
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, row) in parsed.rows.iter().enumerate() {
        let validation = constraints::validate_row(row);
        for w in validation.warnings {
            warnings.push(format!("row {}: {}", index + 1, w));
        }
        if validation.errors.is_empty() {
            valid.push(row.clone());
        } else {
            for e in validation.errors {
                errors.push(format!("row {}: {}", index + 1, e));
            }
        }
    }

    (valid, errors, warnings)
}
