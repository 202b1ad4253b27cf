use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::query::{order_and_page, FilterClause, RecordQuery};
use crate::database::DatabasePool;
use crate::models::blood_pressure::{BloodPressureReading, NewBloodPressureReading};

const COLUMNS: &str =
    "id, user_id, systolic, diastolic, pulse, notes, timestamp, position, arm, device_id, source";

/// Repository trait for blood pressure readings
#[async_trait]
pub trait BloodPressureRepositoryTrait {
    /// Store a new reading
    async fn create(&self, reading: NewBloodPressureReading) -> Result<BloodPressureReading, RepositoryError>;

    /// Get one of the user's readings by ID
    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<BloodPressureReading>, RepositoryError>;

    /// Get the user's most recent reading
    async fn get_latest(&self, user_id: &str) -> Result<Option<BloodPressureReading>, RepositoryError>;

    /// Get a page of readings and the total count matching the window
    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<BloodPressureReading>, usize), RepositoryError>;

    /// Delete one of the user's readings. Returns false when nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Whether a reading from `source` already exists at exactly `timestamp`
    async fn exists_at(&self, user_id: &str, timestamp: &str, source: &str) -> Result<bool, RepositoryError>;
}

/// SQLite-backed blood pressure repository
#[derive(Debug, Clone)]
pub struct SqliteBloodPressureRepository {
    pool: DatabasePool,
}

impl SqliteBloodPressureRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_reading(row: &Row<'_>) -> rusqlite::Result<BloodPressureReading> {
    Ok(BloodPressureReading {
        id: row.get(0)?,
        user_id: row.get(1)?,
        systolic: row.get(2)?,
        diastolic: row.get(3)?,
        pulse: row.get(4)?,
        notes: row.get(5)?,
        timestamp: row.get(6)?,
        position: row.get(7)?,
        arm: row.get(8)?,
        device_id: row.get(9)?,
        source: row.get(10)?,
    })
}

#[async_trait]
impl BloodPressureRepositoryTrait for SqliteBloodPressureRepository {
    async fn create(&self, reading: NewBloodPressureReading) -> Result<BloodPressureReading, RepositoryError> {
        let reading = BloodPressureReading {
            id: Uuid::new_v4().to_string(),
            user_id: reading.user_id,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse,
            notes: reading.notes,
            timestamp: reading.timestamp,
            position: reading.position,
            arm: reading.arm,
            device_id: reading.device_id,
            source: reading.source,
        };

        debug!("Storing blood pressure reading in database: id={}", reading.id);

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO blood_pressure_readings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                COLUMNS
            ),
            params![
                reading.id,
                reading.user_id,
                reading.systolic,
                reading.diastolic,
                reading.pulse,
                reading.notes,
                reading.timestamp,
                reading.position,
                reading.arm,
                reading.device_id,
                reading.source,
            ],
        )?;

        Ok(reading)
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<BloodPressureReading>, RepositoryError> {
        let conn = self.pool.get()?;
        let reading = conn
            .query_row(
                &format!(
                    "SELECT {} FROM blood_pressure_readings WHERE user_id = ?1 AND id = ?2",
                    COLUMNS
                ),
                params![user_id, id],
                map_reading,
            )
            .optional()?;
        Ok(reading)
    }

    async fn get_latest(&self, user_id: &str) -> Result<Option<BloodPressureReading>, RepositoryError> {
        let conn = self.pool.get()?;
        let reading = conn
            .query_row(
                &format!(
                    "SELECT {} FROM blood_pressure_readings WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT 1",
                    COLUMNS
                ),
                [user_id],
                map_reading,
            )
            .optional()?;
        Ok(reading)
    }

    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<BloodPressureReading>, usize), RepositoryError> {
        debug!("Getting filtered blood pressure readings from database");

        let filter = FilterClause::new(user_id, "timestamp", query);
        let conn = self.pool.get()?;

        let sql = format!(
            "SELECT {} FROM blood_pressure_readings{}{}",
            COLUMNS,
            filter.sql,
            order_and_page("timestamp", query)
        );
        let mut stmt = conn.prepare(&sql)?;
        let readings = stmt
            .query_map(rusqlite::params_from_iter(filter.params.iter()), map_reading)?
            .collect::<Result<Vec<_>, _>>()?;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM blood_pressure_readings{}", filter.sql),
            rusqlite::params_from_iter(filter.params.iter()),
            |row| row.get(0),
        )?;

        Ok((readings, total as usize))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM blood_pressure_readings WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }

    async fn exists_at(&self, user_id: &str, timestamp: &str, source: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM blood_pressure_readings WHERE user_id = ?1 AND source = ?2 AND timestamp = ?3)",
            params![user_id, source, timestamp],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
