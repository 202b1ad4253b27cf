use async_trait::async_trait;
use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::query::{order_and_page, FilterClause, RecordQuery};
use crate::database::DatabasePool;
use crate::models::diet::{DailyDietTotals, DietRecord, NewDietRecord};

const COLUMNS: &str =
    "id, user_id, meal_type, food_name, calories, protein_g, carbs_g, fat_g, notes, recorded_at";

/// Repository trait for diet records
#[async_trait]
pub trait DietRepositoryTrait {
    async fn create(&self, record: NewDietRecord) -> Result<DietRecord, RepositoryError>;

    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<DietRecord>, usize), RepositoryError>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Per-day totals for records at or after `start`, oldest day first.
    /// Days without records are absent.
    async fn daily_totals(&self, user_id: &str, start: &str) -> Result<Vec<DailyDietTotals>, RepositoryError>;
}

/// SQLite-backed diet repository
#[derive(Debug, Clone)]
pub struct SqliteDietRepository {
    pool: DatabasePool,
}

impl SqliteDietRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<DietRecord> {
    Ok(DietRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        meal_type: row.get(2)?,
        food_name: row.get(3)?,
        calories: row.get(4)?,
        protein_g: row.get(5)?,
        carbs_g: row.get(6)?,
        fat_g: row.get(7)?,
        notes: row.get(8)?,
        recorded_at: row.get(9)?,
    })
}

#[async_trait]
impl DietRepositoryTrait for SqliteDietRepository {
    async fn create(&self, record: NewDietRecord) -> Result<DietRecord, RepositoryError> {
        let record = DietRecord {
            id: Uuid::new_v4().to_string(),
            user_id: record.user_id,
            meal_type: record.meal_type,
            food_name: record.food_name,
            calories: record.calories,
            protein_g: record.protein_g,
            carbs_g: record.carbs_g,
            fat_g: record.fat_g,
            notes: record.notes,
            recorded_at: record.recorded_at,
        };

        debug!("Storing diet record in database: id={}", record.id);

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO diet_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                COLUMNS
            ),
            params![
                record.id,
                record.user_id,
                record.meal_type,
                record.food_name,
                record.calories,
                record.protein_g,
                record.carbs_g,
                record.fat_g,
                record.notes,
                record.recorded_at,
            ],
        )?;

        Ok(record)
    }

    async fn get_filtered(
        &self,
        user_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<DietRecord>, usize), RepositoryError> {
        let filter = FilterClause::new(user_id, "recorded_at", query);
        let conn = self.pool.get()?;

        let sql = format!(
            "SELECT {} FROM diet_records{}{}",
            COLUMNS,
            filter.sql,
            order_and_page("recorded_at", query)
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(filter.params.iter()), map_record)?
            .collect::<Result<Vec<_>, _>>()?;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM diet_records{}", filter.sql),
            rusqlite::params_from_iter(filter.params.iter()),
            |row| row.get(0),
        )?;

        Ok((records, total as usize))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM diet_records WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }

    async fn daily_totals(&self, user_id: &str, start: &str) -> Result<Vec<DailyDietTotals>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT substr(recorded_at, 1, 10) AS day,
                    SUM(calories),
                    COALESCE(SUM(protein_g), 0),
                    COALESCE(SUM(carbs_g), 0),
                    COALESCE(SUM(fat_g), 0),
                    COUNT(*)
             FROM diet_records
             WHERE user_id = ?1 AND recorded_at >= ?2
             GROUP BY day
             ORDER BY day ASC",
        )?;

        let totals = stmt
            .query_map(params![user_id, start], |row| {
                Ok(DailyDietTotals {
                    date: row.get(0)?,
                    calories: row.get(1)?,
                    protein_g: row.get(2)?,
                    carbs_g: row.get(3)?,
                    fat_g: row.get(4)?,
                    meal_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::pool_with_user;

    fn meal(user_id: &str, recorded_at: &str, calories: f64, protein: Option<f64>) -> NewDietRecord {
        NewDietRecord {
            user_id: user_id.to_string(),
            meal_type: "lunch".to_string(),
            food_name: "rice bowl".to_string(),
            calories,
            protein_g: protein,
            carbs_g: Some(50.0),
            fat_g: None,
            notes: None,
            recorded_at: recorded_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_daily_totals_group_by_day() {
        let (pool, user_id) = pool_with_user().await;
        let repo = SqliteDietRepository::new(pool);

        repo.create(meal(&user_id, "2024-06-01T08:00:00Z", 400.0, Some(20.0))).await.unwrap();
        repo.create(meal(&user_id, "2024-06-01T12:30:00Z", 650.0, None)).await.unwrap();
        repo.create(meal(&user_id, "2024-06-03T19:00:00Z", 700.0, Some(35.0))).await.unwrap();
        repo.create(meal(&user_id, "2024-05-20T19:00:00Z", 900.0, None)).await.unwrap();

        let totals = repo.daily_totals(&user_id, "2024-06-01T00:00:00Z").await.unwrap();
        assert_eq!(totals.len(), 2);

        assert_eq!(totals[0].date, "2024-06-01");
        assert_eq!(totals[0].calories, 1050.0);
        assert_eq!(totals[0].protein_g, 20.0);
        assert_eq!(totals[0].carbs_g, 100.0);
        assert_eq!(totals[0].fat_g, 0.0);
        assert_eq!(totals[0].meal_count, 2);

        assert_eq!(totals[1].date, "2024-06-03");
        assert_eq!(totals[1].meal_count, 1);
    }

    #[tokio::test]
    async fn test_filtered_and_delete() {
        let (pool, user_id) = pool_with_user().await;
        let repo = SqliteDietRepository::new(pool);
        let record = repo.create(meal(&user_id, "2024-06-01T08:00:00Z", 400.0, None)).await.unwrap();

        let (records, total) = repo.get_filtered(&user_id, &RecordQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].food_name, "rice bowl");

        assert!(repo.delete(&user_id, &record.id).await.unwrap());
        assert!(!repo.delete(&user_id, &record.id).await.unwrap());
    }
}
