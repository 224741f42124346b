use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use marketfolio_core::history::{
    ImportHistoryRecord, ImportHistoryRepositoryTrait, ImportStatus,
};
use marketfolio_core::Result;

use super::model::ImportHistoryDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::import_history;

/// Repository for the import-history ledger
pub struct ImportHistoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl ImportHistoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl ImportHistoryRepositoryTrait for ImportHistoryRepository {
    fn insert_record(&self, record: ImportHistoryRecord) -> Result<ImportHistoryRecord> {
        let mut conn = get_connection(&self.pool)?;
        let db: ImportHistoryDB = record.into();
        diesel::insert_into(import_history::table)
            .values(&db)
            .execute(&mut conn)
            .into_core()?;
        Ok(db.into())
    }

    fn get_record(&self, id: &str) -> Result<ImportHistoryRecord> {
        let mut conn = get_connection(&self.pool)?;
        import_history::table
            .find(id)
            .select(ImportHistoryDB::as_select())
            .first::<ImportHistoryDB>(&mut conn)
            .into_core()
            .map(ImportHistoryRecord::from)
    }

    fn list_records(&self, limit: Option<i64>) -> Result<Vec<ImportHistoryRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = import_history::table
            .select(ImportHistoryDB::as_select())
            .order(import_history::created_at.desc())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = query.load::<ImportHistoryDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(ImportHistoryRecord::from).collect())
    }

    fn find_successful_by_hash(&self, file_hash: &str) -> Result<Option<ImportHistoryRecord>> {
        let mut conn = get_connection(&self.pool)?;
        import_history::table
            .filter(import_history::file_hash.eq(file_hash))
            .filter(import_history::import_status.eq(ImportStatus::Success.as_str()))
            .order(import_history::created_at.desc())
            .select(ImportHistoryDB::as_select())
            .first::<ImportHistoryDB>(&mut conn)
            .optional()
            .into_core()
            .map(|opt| opt.map(ImportHistoryRecord::from))
    }

    fn completed_unpurged_records(&self) -> Result<Vec<ImportHistoryRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let completed = [
            ImportStatus::Success.as_str(),
            ImportStatus::Partial.as_str(),
        ];
        let rows = import_history::table
            .filter(import_history::import_status.eq_any(completed))
            .filter(import_history::data_purged_at.is_null())
            .select(ImportHistoryDB::as_select())
            .load::<ImportHistoryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(ImportHistoryRecord::from).collect())
    }

    fn update_actual_imported(&self, id: &str, actual_records_imported: i32) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(import_history::table.find(id))
            .set(import_history::actual_records_imported.eq(actual_records_imported))
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }

    fn mark_all_purged(&self, purged_at: NaiveDateTime) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(
            import_history::table.filter(import_history::data_purged_at.is_null()),
        )
        .set(import_history::data_purged_at.eq(purged_at))
        .execute(&mut conn)
        .into_core()
    }

    fn delete_record(&self, id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(import_history::table.find(id))
            .execute(&mut conn)
            .into_core()
    }
}
