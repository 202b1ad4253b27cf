use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::now_timestamp;
use crate::database::DatabasePool;
use crate::models::habit::{Habit, HabitCheckin, NewHabit};

const HABIT_COLUMNS: &str = "id, user_id, name, description, archived, created_at";
const CHECKIN_COLUMNS: &str = "habit_id, checkin_date, completed, note, created_at";

/// Repository trait for habits and their daily check-ins
#[async_trait]
pub trait HabitRepositoryTrait {
    async fn create(&self, habit: NewHabit) -> Result<Habit, RepositoryError>;

    async fn list(&self, user_id: &str, include_archived: bool) -> Result<Vec<Habit>, RepositoryError>;

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Habit>, RepositoryError>;

    async fn set_archived(&self, user_id: &str, id: &str, archived: bool) -> Result<Option<Habit>, RepositoryError>;

    /// Delete a habit together with its check-ins
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Insert or replace the check-in for `checkin.habit_id` on `checkin.checkin_date`
    async fn upsert_checkin(&self, checkin: HabitCheckin) -> Result<HabitCheckin, RepositoryError>;

    /// Check-ins between two dates (inclusive, YYYY-MM-DD), oldest first
    async fn list_checkins(
        &self,
        habit_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<HabitCheckin>, RepositoryError>;
}

/// SQLite-backed habit repository
#[derive(Debug, Clone)]
pub struct SqliteHabitRepository {
    pool: DatabasePool,
}

impl SqliteHabitRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn fetch(&self, user_id: &str, id: &str) -> Result<Option<Habit>, RepositoryError> {
        let conn = self.pool.get()?;
        let habit = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE user_id = ?1 AND id = ?2", HABIT_COLUMNS),
                params![user_id, id],
                map_habit,
            )
            .optional()?;
        Ok(habit)
    }
}

fn map_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        archived: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_checkin(row: &Row<'_>) -> rusqlite::Result<HabitCheckin> {
    Ok(HabitCheckin {
        habit_id: row.get(0)?,
        checkin_date: row.get(1)?,
        completed: row.get(2)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl HabitRepositoryTrait for SqliteHabitRepository {
    async fn create(&self, habit: NewHabit) -> Result<Habit, RepositoryError> {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            user_id: habit.user_id,
            name: habit.name,
            description: habit.description,
            archived: false,
            created_at: now_timestamp(),
        };

        debug!("Storing habit in database: id={}", habit.id);

        let conn = self.pool.get()?;
        conn.execute(
            &format!("INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", HABIT_COLUMNS),
            params![
                habit.id,
                habit.user_id,
                habit.name,
                habit.description,
                habit.archived,
                habit.created_at,
            ],
        )?;

        Ok(habit)
    }

    async fn list(&self, user_id: &str, include_archived: bool) -> Result<Vec<Habit>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 AND (?2 OR archived = 0) ORDER BY created_at ASC, id",
            HABIT_COLUMNS
        ))?;
        let habits = stmt
            .query_map(params![user_id, include_archived], map_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Habit>, RepositoryError> {
        self.fetch(user_id, id)
    }

    async fn set_archived(&self, user_id: &str, id: &str, archived: bool) -> Result<Option<Habit>, RepositoryError> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE habits SET archived = ?3 WHERE user_id = ?1 AND id = ?2",
                params![user_id, id, archived],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.fetch(user_id, id)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM habits WHERE user_id = ?1 AND id = ?2", params![user_id, id])?;
        Ok(deleted > 0)
    }

    async fn upsert_checkin(&self, checkin: HabitCheckin) -> Result<HabitCheckin, RepositoryError> {
        debug!(
            "Recording check-in: habit={} date={} completed={}",
            checkin.habit_id, checkin.checkin_date, checkin.completed
        );

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO habit_checkins ({}) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(habit_id, checkin_date) DO UPDATE SET
                    completed = excluded.completed,
                    note = excluded.note",
                CHECKIN_COLUMNS
            ),
            params![
                checkin.habit_id,
                checkin.checkin_date,
                checkin.completed,
                checkin.note,
                checkin.created_at,
            ],
        )?;

        let stored = conn.query_row(
            &format!(
                "SELECT {} FROM habit_checkins WHERE habit_id = ?1 AND checkin_date = ?2",
                CHECKIN_COLUMNS
            ),
            params![checkin.habit_id, checkin.checkin_date],
            map_checkin,
        )?;
        Ok(stored)
    }

    async fn list_checkins(
        &self,
        habit_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<HabitCheckin>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habit_checkins
             WHERE habit_id = ?1
               AND (?2 IS NULL OR checkin_date >= ?2)
               AND (?3 IS NULL OR checkin_date <= ?3)
             ORDER BY checkin_date ASC",
            CHECKIN_COLUMNS
        ))?;
        let checkins = stmt
            .query_map(params![habit_id, start_date, end_date], map_checkin)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(checkins)
    }
}
