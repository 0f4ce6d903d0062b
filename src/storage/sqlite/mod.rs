//! SQLite implementations of storage interfaces.
//!
//! Entities are stored as JSON payloads next to an integer `version` column.
//! A versioned write is a single `UPDATE ... WHERE id = ? AND version = ?`,
//! so the compare-and-swap is atomic without an explicit transaction.

use sea_query::{Expr, Iden, OnConflict, Order, Query, SqliteQueryBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::helpers::{next_version, not_found, Versioned};
use super::{Result, StorageError};

mod event_log;
mod lead_store;
mod student_store;

pub use event_log::{SqliteRecordStore, SqliteRenewalStore};
pub use lead_store::SqliteLeadStore;
pub use student_store::SqliteStudentStore;

/// Column identifiers of a versioned entity table.
#[derive(Clone, Copy)]
struct VersionedTable<I> {
    table: I,
    id: I,
    version: I,
    data: I,
}

impl<I: Iden + Copy + 'static> VersionedTable<I> {
    async fn get<T>(&self, pool: &SqlitePool, id: &str) -> Result<T>
    where
        T: Versioned + DeserializeOwned,
    {
        let query = Query::select()
            .columns([self.version, self.data])
            .from(self.table)
            .and_where(Expr::col(self.id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(pool).await?;
        match row {
            Some(row) => decode_versioned(&row),
            None => Err(not_found::<T>(id)),
        }
    }

    async fn current_version(&self, pool: &SqlitePool, id: &str) -> Result<Option<u64>> {
        let query = Query::select()
            .column(self.version)
            .from(self.table)
            .and_where(Expr::col(self.id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(pool).await?;
        Ok(row.map(|row| row.get::<i64, _>(0) as u64))
    }

    async fn put<T>(&self, pool: &SqlitePool, entity: &T, expected: Option<u64>) -> Result<T>
    where
        T: Versioned + Serialize,
    {
        let id = entity.id();
        let target = expected.map(|v| v + 1).unwrap_or(1);

        let mut stored = entity.clone();
        stored.set_version(target);
        let data = serde_json::to_string(&stored)?;

        let query = match expected {
            None => Query::insert()
                .into_table(self.table)
                .columns([self.id, self.version, self.data])
                .values_panic([id.into(), (target as i64).into(), data.into()])
                .on_conflict(OnConflict::column(self.id).do_nothing().to_owned())
                .to_string(SqliteQueryBuilder),
            Some(expected) => Query::update()
                .table(self.table)
                .values([(self.version, (target as i64).into()), (self.data, data.into())])
                .and_where(Expr::col(self.id).eq(id))
                .and_where(Expr::col(self.version).eq(expected as i64))
                .to_string(SqliteQueryBuilder),
        };

        let result = sqlx::query(&query).execute(pool).await?;
        if result.rows_affected() == 1 {
            return Ok(stored);
        }

        // Nothing written: report why from the row as it stands now.
        let current = self.current_version(pool, id).await?;
        match next_version::<T>(id, current, expected) {
            Err(err) => Err(err),
            Ok(_) => Err(StorageError::VersionConflict {
                expected: expected.unwrap_or(0),
                actual: current.unwrap_or(0),
            }),
        }
    }

    async fn list<T>(&self, pool: &SqlitePool) -> Result<Vec<T>>
    where
        T: Versioned + DeserializeOwned,
    {
        let query = Query::select()
            .columns([self.version, self.data])
            .from(self.table)
            .order_by(self.id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(pool).await?;
        rows.iter().map(decode_versioned).collect()
    }
}

/// Decode `(version, data)`; the column is authoritative over the payload.
fn decode_versioned<T>(row: &sqlx::sqlite::SqliteRow) -> Result<T>
where
    T: Versioned + DeserializeOwned,
{
    let version: i64 = row.get(0);
    let data: String = row.get(1);
    let mut entity: T = serde_json::from_str(&data)?;
    entity.set_version(version as u64);
    Ok(entity)
}

/// Column identifiers of an append-only event table.
#[derive(Clone, Copy)]
struct EventTable<I> {
    entity: &'static str,
    table: I,
    seq: I,
    id: I,
    student_id: I,
    recorded_at: I,
    data: I,
}

impl<I: Iden + Copy + 'static> EventTable<I> {
    async fn append<E: Serialize>(
        &self,
        pool: &SqlitePool,
        id: Uuid,
        student_id: &str,
        recorded_at: &str,
        event: &E,
    ) -> Result<()> {
        let data = serde_json::to_string(event)?;

        let query = Query::insert()
            .into_table(self.table)
            .columns([self.id, self.student_id, self.recorded_at, self.data])
            .values_panic([
                id.to_string().into(),
                student_id.into(),
                recorded_at.into(),
                data.into(),
            ])
            .to_string(SqliteQueryBuilder);

        match sqlx::query(&query).execute(pool).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::AlreadyExists {
                    entity: self.entity,
                    id: id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, pool: &SqlitePool, id: Uuid) -> Result<bool> {
        let query = Query::select()
            .column(self.id)
            .from(self.table)
            .and_where(Expr::col(self.id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(pool).await?;
        Ok(row.is_some())
    }

    async fn list_for_student<E: DeserializeOwned>(
        &self,
        pool: &SqlitePool,
        student_id: &str,
    ) -> Result<Vec<E>> {
        let query = Query::select()
            .column(self.data)
            .from(self.table)
            .and_where(Expr::col(self.student_id).eq(student_id))
            .order_by(self.seq, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let data: String = row.get(0);
            events.push(serde_json::from_str(&data)?);
        }
        Ok(events)
    }
}
