use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::now_timestamp;
use crate::database::DatabasePool;
use crate::models::goal::{Goal, NewGoal};

const COLUMNS: &str =
    "id, user_id, title, metric, target_value, current_value, unit, deadline, status, created_at, updated_at";

/// Repository trait for goals
#[async_trait]
pub trait GoalRepositoryTrait {
    async fn create(&self, goal: NewGoal) -> Result<Goal, RepositoryError>;

    /// List the user's goals, newest first, optionally restricted to one status
    async fn list(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Goal>, RepositoryError>;

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Goal>, RepositoryError>;

    /// Set the current value and status together
    async fn update_progress(
        &self,
        user_id: &str,
        id: &str,
        current_value: f64,
        status: &str,
    ) -> Result<Option<Goal>, RepositoryError>;

    async fn update_status(&self, user_id: &str, id: &str, status: &str) -> Result<Option<Goal>, RepositoryError>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;
}

/// SQLite-backed goal repository
#[derive(Debug, Clone)]
pub struct SqliteGoalRepository {
    pool: DatabasePool,
}

impl SqliteGoalRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn fetch(&self, user_id: &str, id: &str) -> Result<Option<Goal>, RepositoryError> {
        let conn = self.pool.get()?;
        let goal = conn
            .query_row(
                &format!("SELECT {} FROM goals WHERE user_id = ?1 AND id = ?2", COLUMNS),
                params![user_id, id],
                map_goal,
            )
            .optional()?;
        Ok(goal)
    }
}

fn map_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        metric: row.get(3)?,
        target_value: row.get(4)?,
        current_value: row.get(5)?,
        unit: row.get(6)?,
        deadline: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[async_trait]
impl GoalRepositoryTrait for SqliteGoalRepository {
    async fn create(&self, goal: NewGoal) -> Result<Goal, RepositoryError> {
        let now = now_timestamp();
        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            user_id: goal.user_id,
            title: goal.title,
            metric: goal.metric,
            target_value: goal.target_value,
            current_value: goal.current_value,
            unit: goal.unit,
            deadline: goal.deadline,
            status: goal.status,
            created_at: now.clone(),
            updated_at: now,
        };

        debug!("Storing goal in database: id={}", goal.id);

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                COLUMNS
            ),
            params![
                goal.id,
                goal.user_id,
                goal.title,
                goal.metric,
                goal.target_value,
                goal.current_value,
                goal.unit,
                goal.deadline,
                goal.status,
                goal.created_at,
                goal.updated_at,
            ],
        )?;

        Ok(goal)
    }

    async fn list(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Goal>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC, id",
            COLUMNS
        ))?;
        let goals = stmt
            .query_map(params![user_id, status], map_goal)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Goal>, RepositoryError> {
        self.fetch(user_id, id)
    }

    async fn update_progress(
        &self,
        user_id: &str,
        id: &str,
        current_value: f64,
        status: &str,
    ) -> Result<Option<Goal>, RepositoryError> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE goals SET current_value = ?3, status = ?4, updated_at = ?5
                 WHERE user_id = ?1 AND id = ?2",
                params![user_id, id, current_value, status, now_timestamp()],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.fetch(user_id, id)
    }

    async fn update_status(&self, user_id: &str, id: &str, status: &str) -> Result<Option<Goal>, RepositoryError> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE goals SET status = ?3, updated_at = ?4 WHERE user_id = ?1 AND id = ?2",
                params![user_id, id, status, now_timestamp()],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.fetch(user_id, id)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM goals WHERE user_id = ?1 AND id = ?2", params![user_id, id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::pool_with_user;

    fn new_goal(user_id: &str, title: &str) -> NewGoal {
        NewGoal {
            user_id: user_id.to_string(),
            title: title.to_string(),
            metric: "steps".to_string(),
            target_value: 10000.0,
            current_value: 0.0,
            unit: Some("steps".to_string()),
            deadline: None,
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (pool, user_id) = pool_with_user().await;
        let repo = SqliteGoalRepository::new(pool);

        let walk = repo.create(new_goal(&user_id, "Walk more")).await.unwrap();
        repo.create(new_goal(&user_id, "Sleep earlier")).await.unwrap();
        repo.update_status(&user_id, &walk.id, "abandoned").await.unwrap();

        assert_eq!(repo.list(&user_id, None).await.unwrap().len(), 2);
        let active = repo.list(&user_id, Some("active")).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Sleep earlier");
    }

    #[tokio::test]
    async fn test_update_progress_returns_stored_goal() {
        let (pool, user_id) = pool_with_user().await;
        let repo = SqliteGoalRepository::new(pool);
        let goal = repo.create(new_goal(&user_id, "Walk more")).await.unwrap();

        let updated = repo
            .update_progress(&user_id, &goal.id, 12000.0, "completed")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.current_value, 12000.0);
        assert_eq!(updated.status, "completed");

        assert!(repo.update_progress("other", &goal.id, 1.0, "active").await.unwrap().is_none());
        assert!(repo.delete(&user_id, &goal.id).await.unwrap());
        assert!(repo.get_by_id(&user_id, &goal.id).await.unwrap().is_none());
    }
}
