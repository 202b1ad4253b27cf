use async_trait::async_trait;
use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::query::{order_and_page, FilterClause, RecordQuery};
use crate::database::DatabasePool;
use crate::models::heart_rate::{HeartRateReading, NewHeartRateReading};

const COLUMNS: &str = "id, user_id, bpm, context, notes, timestamp, device_id, source";

/// Repository trait for heart rate readings
#[async_trait]
pub trait HeartRateRepositoryTrait {
    async fn create(&self, reading: NewHeartRateReading) -> Result<HeartRateReading, RepositoryError>;

    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<HeartRateReading>, usize), RepositoryError>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Whether a reading from `source` already exists at exactly `timestamp`
    async fn exists_at(&self, user_id: &str, timestamp: &str, source: &str) -> Result<bool, RepositoryError>;
}

/// SQLite-backed heart rate repository
#[derive(Debug, Clone)]
pub struct SqliteHeartRateRepository {
    pool: DatabasePool,
}

impl SqliteHeartRateRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_reading(row: &Row<'_>) -> rusqlite::Result<HeartRateReading> {
    Ok(HeartRateReading {
        id: row.get(0)?,
        user_id: row.get(1)?,
        bpm: row.get(2)?,
        context: row.get(3)?,
        notes: row.get(4)?,
        timestamp: row.get(5)?,
        device_id: row.get(6)?,
        source: row.get(7)?,
    })
}

#[async_trait]
impl HeartRateRepositoryTrait for SqliteHeartRateRepository {
    async fn create(&self, reading: NewHeartRateReading) -> Result<HeartRateReading, RepositoryError> {
        let reading = HeartRateReading {
            id: Uuid::new_v4().to_string(),
            user_id: reading.user_id,
            bpm: reading.bpm,
            context: reading.context,
            notes: reading.notes,
            timestamp: reading.timestamp,
            device_id: reading.device_id,
            source: reading.source,
        };

        debug!("Storing heart rate reading in database: id={}", reading.id);

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO heart_rate_readings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                COLUMNS
            ),
            params![
                reading.id,
                reading.user_id,
                reading.bpm,
                reading.context,
                reading.notes,
                reading.timestamp,
                reading.device_id,
                reading.source,
            ],
        )?;

        Ok(reading)
    }

    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<HeartRateReading>, usize), RepositoryError> {
        let filter = FilterClause::new(user_id, "timestamp", query);
        let conn = self.pool.get()?;

        let sql = format!(
            "SELECT {} FROM heart_rate_readings{}{}",
            COLUMNS,
            filter.sql,
            order_and_page("timestamp", query)
        );
        let mut stmt = conn.prepare(&sql)?;
        let readings = stmt
            .query_map(rusqlite::params_from_iter(filter.params.iter()), map_reading)?
            .collect::<Result<Vec<_>, _>>()?;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM heart_rate_readings{}", filter.sql),
            rusqlite::params_from_iter(filter.params.iter()),
            |row| row.get(0),
        )?;

        Ok((readings, total as usize))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM heart_rate_readings WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }

    async fn exists_at(&self, user_id: &str, timestamp: &str, source: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM heart_rate_readings WHERE user_id = ?1 AND source = ?2 AND timestamp = ?3)",
            params![user_id, source, timestamp],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
