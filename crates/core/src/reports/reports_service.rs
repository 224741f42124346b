use chrono::{NaiveDate, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::reports_errors::ReportError;
use super::reports_model::*;
use super::reports_traits::{
    ReportRepositoryTrait, ReportRowRepositoryTrait, ReportServiceTrait,
};
use crate::history::ImportHistoryRepositoryTrait;
use crate::{Error, Result};

/// Service managing report grouping records and their derived aggregates.
pub struct ReportService {
    report_repository: Arc<dyn ReportRepositoryTrait>,
    row_repository: Arc<dyn ReportRowRepositoryTrait>,
    history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
}

impl ReportService {
    pub fn new(
        report_repository: Arc<dyn ReportRepositoryTrait>,
        row_repository: Arc<dyn ReportRowRepositoryTrait>,
        history_repository: Arc<dyn ImportHistoryRepositoryTrait>,
    ) -> Self {
        Self {
            report_repository,
            row_repository,
            history_repository,
        }
    }

    /// Ensures no report exists for the pair, then inserts.
    ///
    /// The pre-check is a fast, friendly path only; the storage layer's
    /// UNIQUE constraint is the authoritative guard, so a unique violation
    /// on insert maps to the same "already exists" error.
    fn insert_unique(&self, report: Report) -> Result<Report> {
        let date_of_report = report.date_of_report;
        let reported_days = report.reported_days;

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

        match self.report_repository.create_report(report) {
            Ok(created) => Ok(created),
            Err(err) if err.is_unique_violation() => Err(ReportError::AlreadyExists {
                date_of_report,
                reported_days,
            }
            .into()),
            Err(err) => Err(err),
        }
    }
}

impl ReportServiceTrait for ReportService {
    fn create_report(&self, new_report: NewReport) -> Result<Report> {
        if new_report.reported_days <= 0 {
            return Err(ReportError::InvalidData(format!(
                "reported_days must be positive, got {}",
                new_report.reported_days
            ))
            .into());
        }
        let created = self.insert_unique(new_report.into_report())?;
        debug!(
            "created report {} for {} over {} days",
            created.id, created.date_of_report, created.reported_days
        );
        Ok(created)
    }

    fn get_report(&self, report_id: &str) -> Result<Report> {
        self.report_repository.get_report(report_id)
    }

    fn list_reports(&self) -> Result<Vec<Report>> {
        self.report_repository.list_reports()
    }

    fn update_report(&self, update: ReportUpdate) -> Result<Report> {
        let existing = self.report_repository.get_report(&update.id)?;

        // Only re-check uniqueness when the identifying pair changes.
        if (existing.date_of_report, existing.reported_days)
            != (update.date_of_report, update.reported_days)
        {
            if let Some(other) = self
                .report_repository
                .find_by_period(update.date_of_report, update.reported_days)?
            {
                if other.id != update.id {
                    return Err(ReportError::AlreadyExists {
                        date_of_report: update.date_of_report,
                        reported_days: update.reported_days,
                    }
                    .into());
                }
            }
        }

        // Same insert-or-conflict stance as create: the pre-check can race,
        // the storage UNIQUE constraint cannot.
        let (date_of_report, reported_days) = (update.date_of_report, update.reported_days);
        match self.report_repository.update_report(update) {
            Ok(updated) => Ok(updated),
            Err(err) if err.is_unique_violation() => Err(ReportError::AlreadyExists {
                date_of_report,
                reported_days,
            }
            .into()),
            Err(err) => Err(err),
        }
    }

    fn delete_report(&self, report_id: &str) -> Result<usize> {
        // Rows cascade via the storage layer's referential design.
        let deleted = self.report_repository.delete_report(report_id)?;
        if deleted == 0 {
            return Err(ReportError::NotFound(report_id.to_string()).into());
        }
        info!("deleted report {} (rows cascaded)", report_id);
        Ok(deleted)
    }

    fn get_report_stats(&self, report_id: &str) -> Result<ReportStats> {
        // Existence check so a bad id is NotFound rather than empty stats.
        self.report_repository.get_report(report_id)?;
        self.row_repository.report_stats(report_id)
    }

    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>> {
        if end < start {
            return Err(Error::Validation(crate::errors::ValidationError::InvalidInput(
                format!("invalid date range: {} is after {}", start, end),
            )));
        }
        self.report_repository.find_by_date_range(start, end)
    }

    fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>> {
        self.report_repository.find_by_reported_days(reported_days)
    }

    fn purge_all_report_data(&self) -> Result<usize> {
        let deleted = self.report_repository.delete_all_reports()?;
        let stamped = self
            .history_repository
            .mark_all_purged(Utc::now().naive_utc())?;
        info!(
            "purged {} reports, stamped {} history records as purged",
            deleted, stamped
        );
        Ok(deleted)
    }
}
