//! PostgreSQL-backed `LoadRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{LoadPersistenceError, LoadRepository};
use crate::domain::{ClientName, ClientNumber, EmployeeCount, Load, LoadId, LoadStatus, UserId};

use super::error_mapping::{load_diesel_error, load_pool_error};
use super::models::{LoadRecordRow, LoadRow};
use super::pool::DbPool;
use super::schema::loads;

#[derive(Clone)]
pub struct DieselLoadRepository {
    pool: DbPool,
}

impl DieselLoadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_load(row: LoadRow) -> Result<Load, LoadPersistenceError> {
    let invalid = |err: crate::domain::LoadValidationError| {
        warn!(load_id = %row.id, %err, "stored load failed validation");
        LoadPersistenceError::query("stored load is invalid")
    };
    Ok(Load {
        id: LoadId::from_uuid(row.id),
        client_name: ClientName::new(&row.client_name).map_err(invalid)?,
        client_number: ClientNumber::new(&row.client_number).map_err(invalid)?,
        status: row.status.parse::<LoadStatus>().map_err(invalid)?,
        employee_count: EmployeeCount::new(i64::from(row.employee_count)).map_err(invalid)?,
        assigned_to: row.assigned_to.map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_loads(rows: Vec<LoadRow>) -> Result<Vec<Load>, LoadPersistenceError> {
    rows.into_iter().map(row_to_load).collect()
}

fn record_row(load: &Load) -> LoadRecordRow<'_> {
    LoadRecordRow {
        id: *load.id.as_uuid(),
        client_name: load.client_name.as_ref(),
        client_number: load.client_number.as_ref(),
        status: load.status.as_str(),
        employee_count: i32::try_from(load.employee_count.get()).unwrap_or(i32::MAX),
        assigned_to: load.assigned_to.map(|id| *id.as_uuid()),
        created_by: *load.created_by.as_uuid(),
        created_at: load.created_at,
        updated_at: load.updated_at,
    }
}

#[async_trait]
impl LoadRepository for DieselLoadRepository {
    async fn list_all(&self) -> Result<Vec<Load>, LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let rows: Vec<LoadRow> = loads::table
            .order((loads::created_at.desc(), loads::id.asc()))
            .select(LoadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        rows_to_loads(rows)
    }

    async fn list_assigned_to(&self, user: &UserId) -> Result<Vec<Load>, LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let rows: Vec<LoadRow> = loads::table
            .filter(loads::assigned_to.eq(user.as_uuid()))
            .order((loads::created_at.desc(), loads::id.asc()))
            .select(LoadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        rows_to_loads(rows)
    }

    async fn find(&self, id: &LoadId) -> Result<Option<Load>, LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let row: Option<LoadRow> = loads::table
            .find(id.as_uuid())
            .select(LoadRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(load_diesel_error)?;
        row.map(row_to_load).transpose()
    }

    async fn insert(&self, load: &Load) -> Result<(), LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        diesel::insert_into(loads::table)
            .values(&record_row(load))
            .execute(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        Ok(())
    }

    async fn update(&self, load: &Load) -> Result<(), LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let updated = diesel::update(loads::table.find(load.id.as_uuid()))
            .set(&record_row(load))
            .execute(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        if updated == 0 {
            return Err(LoadPersistenceError::query("record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &LoadId) -> Result<bool, LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let deleted = diesel::delete(loads::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count_created_by(&self, user: &UserId) -> Result<u64, LoadPersistenceError> {
        let mut conn = self.pool.get().await.map_err(load_pool_error)?;
        let count: i64 = loads::table
            .filter(loads::created_by.eq(user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(load_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
