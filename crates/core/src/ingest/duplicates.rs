//! Duplicate submission detection.
//!
//! Three granularities, checked in precedence order by the import pipeline:
//! exact content hash against prior successful imports, semantic match
//! against persisted reports, and semantic match against earlier files in
//! the same batch. A duplicate is excluded from import but fully reported.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::ingest_model::FileMetadata;
use crate::history::{ImportHistoryRecord, ImportHistoryRepositoryTrait};
use crate::reports::ReportRepositoryTrait;
use crate::Result;

/// Which tier matched, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMatchType {
    #[default]
    None,
    Database,
    CrossFile,
}

/// Full result of a semantic duplicate check, suitable for surfacing to the
/// upload UI as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckResult {
    pub is_duplicate: bool,
    pub match_type: DuplicateMatchType,
    pub message: Option<String>,
    pub existing_import_date: Option<NaiveDate>,
    pub existing_record_count: Option<i64>,
}

impl DuplicateCheckResult {
    pub fn not_duplicate() -> Self {
        Self::default()
    }
}

/// The semantic identity of a report file. Two files with equal keys
/// describe the same reporting snapshot regardless of byte content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticKey {
    pub date_of_report: Option<NaiveDate>,
    pub reported_days: Option<i32>,
    pub category_level3: Option<String>,
}

impl SemanticKey {
    pub fn from_metadata(metadata: &FileMetadata) -> Self {
        Self {
            date_of_report: metadata.date_of_report,
            reported_days: metadata.reported_days,
            category_level3: metadata.category_level3.clone(),
        }
    }

    /// Keys missing the core pair are never comparable; files without a
    /// formation date or period cannot collide semantically.
    pub fn is_complete(&self) -> bool {
        self.date_of_report.is_some() && self.reported_days.is_some()
    }
}

/// Repository-backed duplicate checks.
pub struct DuplicateDetector {
    report_repository: Arc<dyn ReportRepositoryTrait>,
    history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
}

impl DuplicateDetector {
    pub fn new(
        report_repository: Arc<dyn ReportRepositoryTrait>,
        history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
    ) -> Self {
        Self {
            report_repository,
            history_repository,
        }
    }

    /// Tier 1: byte-identical to a previously *successful* import.
    pub fn check_exact(&self, file_hash: &str) -> Result<Option<ImportHistoryRecord>> {
        self.history_repository.find_successful_by_hash(file_hash)
    }

    /// Tier 2: the semantic key already exists among persisted reports.
    pub fn check_database(&self, metadata: &FileMetadata) -> Result<DuplicateCheckResult> {
        let key = SemanticKey::from_metadata(metadata);
        if !key.is_complete() {
            return Ok(DuplicateCheckResult::not_duplicate());
        }
        let (date, days) = match (key.date_of_report, key.reported_days) {
            (Some(date), Some(days)) => (date, days),
            _ => return Ok(DuplicateCheckResult::not_duplicate()),
        };

        let existing = self.report_repository.find_semantic_duplicate(
            date,
            days,
            key.category_level3.as_deref(),
        )?;

        Ok(match existing {
            Some(found) => DuplicateCheckResult {
                is_duplicate: true,
                match_type: DuplicateMatchType::Database,
                message: Some(format!(
                    "a report for {} over {} days already exists with {} records",
                    date, days, found.row_count
                )),
                existing_import_date: Some(found.report.created_at.date()),
                existing_record_count: Some(found.row_count),
            },
            None => DuplicateCheckResult::not_duplicate(),
        })
    }

    /// Tier 3: an earlier file in the current batch carried the same key.
    /// The caller owns the seen-set so "earlier" follows batch order.
    pub fn check_cross_file(
        &self,
        metadata: &FileMetadata,
        seen: &HashSet<SemanticKey>,
    ) -> DuplicateCheckResult {
        let key = SemanticKey::from_metadata(metadata);
        if key.is_complete() && seen.contains(&key) {
            DuplicateCheckResult {
                is_duplicate: true,
                match_type: DuplicateMatchType::CrossFile,
                message: Some(format!(
                    "an earlier file in this batch covers the same report ({} over {} days)",
                    key.date_of_report.map(|d| d.to_string()).unwrap_or_default(),
                    key.reported_days.unwrap_or_default()
                )),
                existing_import_date: None,
                existing_record_count: None,
            }
        } else {
            DuplicateCheckResult::not_duplicate()
        }
    }
}
