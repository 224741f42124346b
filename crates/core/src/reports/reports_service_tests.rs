#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result};
    use crate::history::{ImportHistoryRecord, ImportHistoryRepositoryTrait};
    use crate::reports::{
        NewReport, Report, ReportError, ReportRepositoryTrait, ReportRow,
        ReportRowRepositoryTrait, ReportService, ReportServiceTrait, ReportStats, ReportUpdate,
        SemanticMatch,
    };
    use chrono::{NaiveDate, NaiveDateTime, Utc};
    use std::sync::{Arc, Mutex};

    // --- Mock ReportRepository ---
    #[derive(Clone)]
    struct MockReportRepository {
        reports: Arc<Mutex<Vec<Report>>>,
    }

    impl MockReportRepository {
        fn new() -> Self {
            Self {
                reports: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ReportRepositoryTrait for MockReportRepository {
        fn create_report(&self, report: Report) -> Result<Report> {
            let mut reports = self.reports.lock().unwrap();
            if reports.iter().any(|r| {
                r.date_of_report == report.date_of_report && r.reported_days == report.reported_days
            }) {
                return Err(Error::Database(DatabaseError::UniqueViolation(
                    "reports.date_of_report, reports.reported_days".to_string(),
                )));
            }
            reports.push(report.clone());
            Ok(report)
        }

        fn get_report(&self, report_id: &str) -> Result<Report> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == report_id)
                .cloned()
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(report_id.to_string()))
                })
        }

        fn list_reports(&self) -> Result<Vec<Report>> {
            Ok(self.reports.lock().unwrap().clone())
        }

        fn update_report(&self, update: ReportUpdate) -> Result<Report> {
            let mut reports = self.reports.lock().unwrap();
            let report = reports
                .iter_mut()
                .find(|r| r.id == update.id)
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(update.id.clone())))?;
            report.date_of_report = update.date_of_report;
            report.reported_days = update.reported_days;
            Ok(report.clone())
        }

        fn delete_report(&self, report_id: &str) -> Result<usize> {
            let mut reports = self.reports.lock().unwrap();
            let before = reports.len();
            reports.retain(|r| r.id != report_id);
            Ok(before - reports.len())
        }

        fn delete_all_reports(&self) -> Result<usize> {
            let mut reports = self.reports.lock().unwrap();
            let deleted = reports.len();
            reports.clear();
            Ok(deleted)
        }

        fn find_by_period(
            &self,
            date_of_report: NaiveDate,
            reported_days: i32,
        ) -> Result<Option<Report>> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.date_of_report == date_of_report && r.reported_days == reported_days)
                .cloned())
        }

        fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.date_of_report >= start && r.date_of_report <= end)
                .cloned()
                .collect())
        }

        fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.reported_days == reported_days)
                .cloned()
                .collect())
        }

        fn find_semantic_duplicate(
            &self,
            _date_of_report: NaiveDate,
            _reported_days: i32,
            _category: Option<&str>,
        ) -> Result<Option<SemanticMatch>> {
            unimplemented!()
        }
    }

    // --- Mock ReportRowRepository ---
    #[derive(Clone)]
    struct MockRowRepository {
        rows: Arc<Mutex<Vec<ReportRow>>>,
    }

    impl MockRowRepository {
        fn new() -> Self {
            Self {
                rows: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn add_row(&self, row: ReportRow) {
            self.rows.lock().unwrap().push(row);
        }
    }

    impl ReportRowRepositoryTrait for MockRowRepository {
        fn bulk_insert_rows(&self, rows: &[ReportRow]) -> Result<usize> {
            self.rows.lock().unwrap().extend_from_slice(rows);
            Ok(rows.len())
        }

        fn insert_row(&self, row: &ReportRow) -> Result<()> {
            self.add_row(row.clone());
            Ok(())
        }

        fn count_rows(&self) -> Result<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        fn count_rows_for_report(&self, report_id: &str) -> Result<i64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.report_id == report_id)
                .count() as i64)
        }

        fn count_rows_in_date_range(&self, _start: NaiveDate, _end: NaiveDate) -> Result<i64> {
            unimplemented!()
        }

        fn report_stats(&self, report_id: &str) -> Result<ReportStats> {
            let rows = self.rows.lock().unwrap();
            let report_rows: Vec<_> = rows.iter().filter(|r| r.report_id == report_id).collect();
            let prices: Vec<i64> = report_rows.iter().filter_map(|r| r.average_price).collect();
            Ok(ReportStats {
                row_count: report_rows.len() as i64,
                total_ordered_sum: report_rows.iter().filter_map(|r| r.ordered_sum).sum(),
                average_price: if prices.is_empty() {
                    None
                } else {
                    Some(prices.iter().sum::<i64>() as f64 / prices.len() as f64)
                },
            })
        }
    }

    // --- Mock ImportHistoryRepository ---
    #[derive(Clone)]
    struct MockHistoryRepository {
        records: Arc<Mutex<Vec<ImportHistoryRecord>>>,
    }

    impl MockHistoryRepository {
        fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn add(&self, record: ImportHistoryRecord) {
            self.records.lock().unwrap().push(record);
        }

        fn purged_count(&self) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.data_purged_at.is_some())
                .count()
        }
    }

    impl ImportHistoryRepositoryTrait for MockHistoryRepository {
        fn insert_record(&self, record: ImportHistoryRecord) -> Result<ImportHistoryRecord> {
            self.add(record.clone());
            Ok(record)
        }

        fn get_record(&self, _id: &str) -> Result<ImportHistoryRecord> {
            unimplemented!()
        }

        fn list_records(&self, _limit: Option<i64>) -> Result<Vec<ImportHistoryRecord>> {
            Ok(self.records.lock().unwrap().clone())
        }

        fn find_successful_by_hash(&self, _hash: &str) -> Result<Option<ImportHistoryRecord>> {
            unimplemented!()
        }

        fn completed_unpurged_records(&self) -> Result<Vec<ImportHistoryRecord>> {
            unimplemented!()
        }

        fn update_actual_imported(&self, _id: &str, _actual: i32) -> Result<()> {
            unimplemented!()
        }

        fn mark_all_purged(&self, purged_at: NaiveDateTime) -> Result<usize> {
            let mut records = self.records.lock().unwrap();
            let mut stamped = 0;
            for record in records.iter_mut().filter(|r| r.data_purged_at.is_none()) {
                record.data_purged_at = Some(purged_at);
                stamped += 1;
            }
            Ok(stamped)
        }

        fn delete_record(&self, _id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    struct Fixture {
        service: ReportService,
        row_repo: MockRowRepository,
        history_repo: MockHistoryRepository,
    }

    fn fixture() -> Fixture {
        let row_repo = MockRowRepository::new();
        let history_repo = MockHistoryRepository::new();
        let service = ReportService::new(
            Arc::new(MockReportRepository::new()),
            Arc::new(row_repo.clone()),
            Arc::new(history_repo.clone()),
        );
        Fixture {
            service,
            row_repo,
            history_repo,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_create_report_enforces_unique_pair() {
        let f = fixture();
        let created = f
            .service
            .create_report(NewReport {
                date_of_report: date(15),
                reported_days: 7,
            })
            .unwrap();
        assert!(!created.id.is_empty());

        let err = f
            .service
            .create_report(NewReport {
                date_of_report: date(15),
                reported_days: 7,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Report(ReportError::AlreadyExists { .. })
        ));

        // same date, different period is a different report
        f.service
            .create_report(NewReport {
                date_of_report: date(15),
                reported_days: 14,
            })
            .unwrap();
        assert_eq!(f.service.list_reports().unwrap().len(), 2);
    }

    #[test]
    fn test_create_report_rejects_nonpositive_period() {
        let f = fixture();
        let err = f
            .service
            .create_report(NewReport {
                date_of_report: date(1),
                reported_days: 0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Report(ReportError::InvalidData(_))
        ));
    }

    #[test]
    fn test_update_report_pair_collision() {
        let f = fixture();
        let a = f
            .service
            .create_report(NewReport {
                date_of_report: date(1),
                reported_days: 7,
            })
            .unwrap();
        f.service
            .create_report(NewReport {
                date_of_report: date(2),
                reported_days: 7,
            })
            .unwrap();

        // moving A onto B's pair must be rejected
        let err = f
            .service
            .update_report(ReportUpdate {
                id: a.id.clone(),
                date_of_report: date(2),
                reported_days: 7,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Report(ReportError::AlreadyExists { .. })
        ));

        // updating A onto a free pair works
        let updated = f
            .service
            .update_report(ReportUpdate {
                id: a.id,
                date_of_report: date(3),
                reported_days: 7,
            })
            .unwrap();
        assert_eq!(updated.date_of_report, date(3));
    }

    // Repository simulating a lost pre-check race: the pair looks free but
    // the storage UNIQUE constraint fires on the actual update.
    struct RacingReportRepository {
        inner: MockReportRepository,
    }

    impl ReportRepositoryTrait for RacingReportRepository {
        fn create_report(&self, report: Report) -> Result<Report> {
            self.inner.create_report(report)
        }

        fn get_report(&self, report_id: &str) -> Result<Report> {
            self.inner.get_report(report_id)
        }

        fn list_reports(&self) -> Result<Vec<Report>> {
            self.inner.list_reports()
        }

        fn update_report(&self, _update: ReportUpdate) -> Result<Report> {
            Err(Error::Database(DatabaseError::UniqueViolation(
                "reports.date_of_report, reports.reported_days".to_string(),
            )))
        }

        fn delete_report(&self, report_id: &str) -> Result<usize> {
            self.inner.delete_report(report_id)
        }

        fn delete_all_reports(&self) -> Result<usize> {
            self.inner.delete_all_reports()
        }

        fn find_by_period(
            &self,
            _date_of_report: NaiveDate,
            _reported_days: i32,
        ) -> Result<Option<Report>> {
            Ok(None)
        }

        fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>> {
            self.inner.find_by_date_range(start, end)
        }

        fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>> {
            self.inner.find_by_reported_days(reported_days)
        }

        fn find_semantic_duplicate(
            &self,
            _date_of_report: NaiveDate,
            _reported_days: i32,
            _category: Option<&str>,
        ) -> Result<Option<SemanticMatch>> {
            unimplemented!()
        }
    }

    #[test]
    fn test_update_report_maps_unique_violation_to_already_exists() {
        let inner = MockReportRepository::new();
        let existing = inner
            .create_report(
                NewReport {
                    date_of_report: date(1),
                    reported_days: 7,
                }
                .into_report(),
            )
            .unwrap();
        let service = ReportService::new(
            Arc::new(RacingReportRepository { inner }),
            Arc::new(MockRowRepository::new()),
            Arc::new(MockHistoryRepository::new()),
        );

        let err = service
            .update_report(ReportUpdate {
                id: existing.id,
                date_of_report: date(2),
                reported_days: 7,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Report(ReportError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_delete_missing_report_is_not_found() {
        let f = fixture();
        let err = f.service.delete_report("missing").unwrap_err();
        assert!(matches!(err, Error::Report(ReportError::NotFound(_))));
    }

    #[test]
    fn test_report_stats_aggregates_rows() {
        let f = fixture();
        let report = f
            .service
            .create_report(NewReport {
                date_of_report: date(15),
                reported_days: 7,
            })
            .unwrap();

        for (i, (sum, price)) in [(1000, Some(25000)), (2000, Some(35000)), (500, None)]
            .iter()
            .enumerate()
        {
            f.row_repo.add_row(ReportRow {
                id: format!("row-{}", i),
                report_id: report.id.clone(),
                product_name: format!("Товар {}", i),
                ordered_sum: Some(*sum),
                average_price: *price,
                ..Default::default()
            });
        }

        let stats = f.service.get_report_stats(&report.id).unwrap();
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.total_ordered_sum, 3500);
        assert_eq!(stats.average_price, Some(30000.0));
    }

    #[test]
    fn test_report_stats_unknown_id_is_not_found() {
        let f = fixture();
        let err = f.service.get_report_stats("missing").unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_by_date_range_validates_order() {
        let f = fixture();
        let err = f.service.find_by_date_range(date(10), date(1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_purge_all_stamps_history() {
        let f = fixture();
        f.service
            .create_report(NewReport {
                date_of_report: date(1),
                reported_days: 7,
            })
            .unwrap();
        f.service
            .create_report(NewReport {
                date_of_report: date(2),
                reported_days: 7,
            })
            .unwrap();
        f.history_repo.add(ImportHistoryRecord::new(
            "a.xlsx".to_string(),
            "hash-a".to_string(),
            10,
        ));
        f.history_repo.add(ImportHistoryRecord::new(
            "b.xlsx".to_string(),
            "hash-b".to_string(),
            10,
        ));

        let deleted = f.service.purge_all_report_data().unwrap();

        assert_eq!(deleted, 2);
        assert!(f.service.list_reports().unwrap().is_empty());
        assert_eq!(f.history_repo.purged_count(), 2);
    }
}
