use chrono::NaiveDate;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use marketfolio_core::reports::{
    Report, ReportRepositoryTrait, ReportRow, ReportRowRepositoryTrait, ReportStats,
    ReportUpdate, SemanticMatch,
};
use marketfolio_core::Result;

use super::model::{ReportDB, ReportRowDB};
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::{report_rows, reports};

/// SQLite has a parameter-count ceiling; a row carries ~30 bound values, so
/// bulk inserts go in chunks inside one transaction.
const BULK_INSERT_CHUNK: usize = 25;

/// Repository for report grouping records
pub struct ReportRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl ReportRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl ReportRepositoryTrait for ReportRepository {
    fn create_report(&self, report: Report) -> Result<Report> {
        let mut conn = get_connection(&self.pool)?;
        let db: ReportDB = report.into();
        diesel::insert_into(reports::table)
            .values(&db)
            .execute(&mut conn)
            .into_core()?;
        Ok(db.into())
    }

    fn get_report(&self, report_id: &str) -> Result<Report> {
        let mut conn = get_connection(&self.pool)?;
        reports::table
            .find(report_id)
            .select(ReportDB::as_select())
            .first::<ReportDB>(&mut conn)
            .into_core()
            .map(Report::from)
    }

    fn list_reports(&self) -> Result<Vec<Report>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = reports::table
            .select(ReportDB::as_select())
            .order(reports::date_of_report.desc())
            .load::<ReportDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Report::from).collect())
    }

    fn update_report(&self, update: ReportUpdate) -> Result<Report> {
        let mut conn = get_connection(&self.pool)?;
        let updated = diesel::update(reports::table.find(&update.id))
            .set((
                reports::date_of_report.eq(update.date_of_report),
                reports::reported_days.eq(update.reported_days),
            ))
            .returning(ReportDB::as_returning())
            .get_result::<ReportDB>(&mut conn)
            .into_core()?;
        Ok(updated.into())
    }

    fn delete_report(&self, report_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(reports::table.find(report_id))
            .execute(&mut conn)
            .into_core()
    }

    fn delete_all_reports(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(reports::table).execute(&mut conn).into_core()
    }

    fn find_by_period(
        &self,
        date_of_report: NaiveDate,
        reported_days: i32,
    ) -> Result<Option<Report>> {
        let mut conn = get_connection(&self.pool)?;
        reports::table
            .filter(reports::date_of_report.eq(date_of_report))
            .filter(reports::reported_days.eq(reported_days))
            .select(ReportDB::as_select())
            .first::<ReportDB>(&mut conn)
            .optional()
            .into_core()
            .map(|opt| opt.map(Report::from))
    }

    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Report>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = reports::table
            .filter(reports::date_of_report.ge(start))
            .filter(reports::date_of_report.le(end))
            .select(ReportDB::as_select())
            .order(reports::date_of_report.asc())
            .load::<ReportDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Report::from).collect())
    }

    fn find_by_reported_days(&self, reported_days: i32) -> Result<Vec<Report>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = reports::table
            .filter(reports::reported_days.eq(reported_days))
            .select(ReportDB::as_select())
            .order(reports::date_of_report.desc())
            .load::<ReportDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Report::from).collect())
    }

    fn find_semantic_duplicate(
        &self,
        date_of_report: NaiveDate,
        reported_days: i32,
        category: Option<&str>,
    ) -> Result<Option<SemanticMatch>> {
        let mut conn = get_connection(&self.pool)?;

        let report = match reports::table
            .filter(reports::date_of_report.eq(date_of_report))
            .filter(reports::reported_days.eq(reported_days))
            .select(ReportDB::as_select())
            .first::<ReportDB>(&mut conn)
            .optional()
            .into_core()?
        {
            Some(report) => report,
            None => return Ok(None),
        };

        // The triple includes the category: a persisted report over the same
        // period but a different category slice is not a semantic match.
        if let Some(category) = category {
            let carries_category: bool = diesel::select(exists(
                report_rows::table
                    .filter(report_rows::report_id.eq(&report.id))
                    .filter(report_rows::category.eq(category)),
            ))
            .get_result(&mut conn)
            .into_core()?;
            if !carries_category {
                return Ok(None);
            }
        }

        let row_count: i64 = report_rows::table
            .filter(report_rows::report_id.eq(&report.id))
            .count()
            .get_result(&mut conn)
            .into_core()?;

        Ok(Some(SemanticMatch {
            report: report.into(),
            row_count,
        }))
    }
}

/// Repository for report row persistence
pub struct ReportRowRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl ReportRowRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl ReportRowRepositoryTrait for ReportRowRepository {
    fn bulk_insert_rows(&self, rows: &[ReportRow]) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let db_rows: Vec<ReportRowDB> = rows.iter().map(ReportRowDB::from_row).collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let mut inserted = 0;
            for chunk in db_rows.chunks(BULK_INSERT_CHUNK) {
                inserted += diesel::insert_into(report_rows::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
        .into_core()
    }

    fn insert_row(&self, row: &ReportRow) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(report_rows::table)
            .values(ReportRowDB::from_row(row))
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }

    fn count_rows(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        report_rows::table.count().get_result(&mut conn).into_core()
    }

    fn count_rows_for_report(&self, report_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        report_rows::table
            .filter(report_rows::report_id.eq(report_id))
            .count()
            .get_result(&mut conn)
            .into_core()
    }

    fn count_rows_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        report_rows::table
            .filter(report_rows::record_date.ge(start))
            .filter(report_rows::record_date.le(end))
            .count()
            .get_result(&mut conn)
            .into_core()
    }

    fn report_stats(&self, report_id: &str) -> Result<ReportStats> {
        let mut conn = get_connection(&self.pool)?;
        let stats = diesel::sql_query(
            "SELECT COUNT(*) AS row_count, \
             SUM(ordered_sum) AS total_ordered_sum, \
             AVG(average_price) AS average_price \
             FROM report_rows WHERE report_id = ?",
        )
        .bind::<diesel::sql_types::Text, _>(report_id)
        .get_result::<ReportStatsRow>(&mut conn)
        .into_core()?;

        Ok(ReportStats {
            row_count: stats.row_count,
            total_ordered_sum: stats.total_ordered_sum.unwrap_or(0),
            average_price: stats.average_price,
        })
    }
}

#[derive(QueryableByName)]
struct ReportStatsRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    row_count: i64,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    total_ordered_sum: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)]
    average_price: Option<f64>,
}
