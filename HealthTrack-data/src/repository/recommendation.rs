use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::now_timestamp;
use crate::database::DatabasePool;
use crate::models::recommendation::{NewRecommendation, Recommendation};

/// Repository trait for stored advice
#[async_trait]
pub trait RecommendationRepositoryTrait {
    async fn create(&self, recommendation: NewRecommendation) -> Result<Recommendation, RepositoryError>;

    /// Most recent first
    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>, RepositoryError>;
}

/// SQLite-backed recommendation repository. Advice lines are stored as a JSON array.
#[derive(Debug, Clone)]
pub struct SqliteRecommendationRepository {
    pool: DatabasePool,
}

impl SqliteRecommendationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationRepositoryTrait for SqliteRecommendationRepository {
    async fn create(&self, recommendation: NewRecommendation) -> Result<Recommendation, RepositoryError> {
        let recommendation = Recommendation {
            id: Uuid::new_v4().to_string(),
            user_id: recommendation.user_id,
            source: recommendation.source,
            advice: recommendation.advice,
            period_days: recommendation.period_days,
            created_at: now_timestamp(),
        };

        debug!("Storing recommendation in database: id={}", recommendation.id);

        let advice = serde_json::to_string(&recommendation.advice)?;
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO recommendations (id, user_id, source, advice, period_days, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                recommendation.id,
                recommendation.user_id,
                recommendation.source,
                advice,
                recommendation.period_days,
                recommendation.created_at,
            ],
        )?;

        Ok(recommendation)
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>, RepositoryError> {
        let rows = {
            let conn = self.pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT id, user_id, source, advice, period_days, created_at
                 FROM recommendations WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, limit as i64], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter()
            .map(|(id, user_id, source, advice, period_days, created_at)| {
                Ok(Recommendation {
                    id,
                    user_id,
                    source,
                    advice: serde_json::from_str(&advice)?,
                    period_days,
                    created_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::pool_with_user;

    #[tokio::test]
    async fn test_advice_lines_round_trip_through_json_column() {
        let (pool, user_id) = pool_with_user().await;
        let repo = SqliteRecommendationRepository::new(pool);

        repo.create(NewRecommendation {
            user_id: user_id.clone(),
            source: "rules".to_string(),
            advice: vec!["Walk 30 minutes a day".to_string()],
            period_days: 30,
        })
        .await
        .unwrap();
        repo.create(NewRecommendation {
            user_id: user_id.clone(),
            source: "llm".to_string(),
            advice: vec!["Reduce salt".to_string(), "Sleep 7 hours".to_string()],
            period_days: 7,
        })
        .await
        .unwrap();

        let history = repo.list(&user_id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].source, "llm");
        assert_eq!(history[0].advice.len(), 2);

        assert_eq!(repo.list(&user_id, 1).await.unwrap().len(), 1);
    }
}
