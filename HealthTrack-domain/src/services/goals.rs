use async_trait::async_trait;
use tracing::info;

use health_track_data::models::goal::NewGoal;
use health_track_data::repository::GoalRepositoryTrait;

use crate::entities::common::parse_date;
use crate::entities::conversions;
use crate::entities::goal::{CreateGoalRequest, Goal, GoalStatus};
use crate::error::{validate_request, ServiceError};
use crate::services::progress::goal_progress_percent;

#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    async fn create_goal(&self, user_id: &str, request: CreateGoalRequest) -> Result<Goal, ServiceError>;

    async fn list_goals(&self, user_id: &str, status: Option<GoalStatus>) -> Result<Vec<Goal>, ServiceError>;

    async fn get_goal(&self, user_id: &str, id: &str) -> Result<Goal, ServiceError>;

    /// Record a new current value. An active goal that reaches its target is completed.
    async fn update_progress(&self, user_id: &str, id: &str, current_value: f64) -> Result<Goal, ServiceError>;

    async fn update_status(&self, user_id: &str, id: &str, status: GoalStatus) -> Result<Goal, ServiceError>;

    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;
}

pub struct GoalService<R: GoalRepositoryTrait> {
    repository: R,
}

impl<R: GoalRepositoryTrait> GoalService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Goal with ID {} not found", id))
}

fn check_value(name: &str, value: f64) -> Result<(), ServiceError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!("{} must be a finite number", name)))
    }
}

#[async_trait]
impl<R: GoalRepositoryTrait + Send + Sync> GoalServiceTrait for GoalService<R> {
    async fn create_goal(&self, user_id: &str, request: CreateGoalRequest) -> Result<Goal, ServiceError> {
        validate_request(&request)?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::Validation("title: Title is required".to_string()));
        }
        check_value("target_value", request.target_value)?;
        if request.target_value <= 0.0 {
            return Err(ServiceError::Validation(
                "target_value: Target value must be greater than 0".to_string(),
            ));
        }

        let current_value = request.current_value.unwrap_or(0.0);
        check_value("current_value", current_value)?;

        if let Some(deadline) = &request.deadline {
            parse_date(deadline)?;
        }

        let status = if goal_progress_percent(current_value, request.target_value) >= 100.0 {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        };

        let stored = self
            .repository
            .create(NewGoal {
                user_id: user_id.to_string(),
                title,
                metric: request.metric.as_str().to_string(),
                target_value: request.target_value,
                current_value,
                unit: request.unit,
                deadline: request.deadline,
                status: status.as_str().to_string(),
            })
            .await?;
        Ok(conversions::convert_to_domain_goal(stored))
    }

    async fn list_goals(&self, user_id: &str, status: Option<GoalStatus>) -> Result<Vec<Goal>, ServiceError> {
        let goals = self
            .repository
            .list(user_id, status.map(|s| s.as_str()))
            .await?;
        Ok(goals.into_iter().map(conversions::convert_to_domain_goal).collect())
    }

    async fn get_goal(&self, user_id: &str, id: &str) -> Result<Goal, ServiceError> {
        self.repository
            .get_by_id(user_id, id)
            .await?
            .map(conversions::convert_to_domain_goal)
            .ok_or_else(|| not_found(id))
    }

    async fn update_progress(&self, user_id: &str, id: &str, current_value: f64) -> Result<Goal, ServiceError> {
        check_value("current_value", current_value)?;
        let goal = self.get_goal(user_id, id).await?;

        let reached = goal_progress_percent(current_value, goal.target_value) >= 100.0;
        let status = match goal.status {
            GoalStatus::Active if reached => {
                info!("Goal {} for user {} reached its target", id, user_id);
                GoalStatus::Completed
            }
            other => other,
        };

        self.repository
            .update_progress(user_id, id, current_value, status.as_str())
            .await?
            .map(conversions::convert_to_domain_goal)
            .ok_or_else(|| not_found(id))
    }

    async fn update_status(&self, user_id: &str, id: &str, status: GoalStatus) -> Result<Goal, ServiceError> {
        self.repository
            .update_status(user_id, id, status.as_str())
            .await?
            .map(conversions::convert_to_domain_goal)
            .ok_or_else(|| not_found(id))
    }

    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::goal::GoalMetric;
    use health_track_data::database::DatabasePool;
    use health_track_data::models::user::NewUser;
    use health_track_data::repository::{SqliteGoalRepository, SqliteUserRepository, UserRepositoryTrait};

    async fn service_with_user() -> (GoalService<SqliteGoalRepository>, String) {
        let pool = DatabasePool::in_memory().unwrap();
        let user = SqliteUserRepository::new(pool.clone())
            .create(NewUser {
                email: "goals@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: None,
                roles: "user".to_string(),
            })
            .await
            .unwrap();
        (GoalService::new(SqliteGoalRepository::new(pool)), user.id)
    }

    fn steps_goal(target: f64) -> CreateGoalRequest {
        CreateGoalRequest {
            title: "Walk more".to_string(),
            metric: GoalMetric::Steps,
            target_value: target,
            current_value: None,
            unit: Some("steps".to_string()),
            deadline: Some("2030-01-01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_target() {
        let (service, user_id) = service_with_user().await;
        assert!(matches!(
            service.create_goal(&user_id, steps_goal(0.0)).await,
            Err(ServiceError::Validation(_))
        ));

        let mut bad_deadline = steps_goal(100.0);
        bad_deadline.deadline = Some("next week".to_string());
        assert!(service.create_goal(&user_id, bad_deadline).await.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (service, user_id) = service_with_user().await;
        let mut blank = steps_goal(100.0);
        blank.title = "   ".to_string();
        assert!(matches!(
            service.create_goal(&user_id, blank).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(service.list_goals(&user_id, None).await.unwrap().is_empty());

        let mut padded = steps_goal(100.0);
        padded.title = "  Walk more  ".to_string();
        let goal = service.create_goal(&user_id, padded).await.unwrap();
        assert_eq!(goal.title, "Walk more");
    }

    #[tokio::test]
    async fn test_progress_completes_active_goal() {
        let (service, user_id) = service_with_user().await;
        let goal = service.create_goal(&user_id, steps_goal(10000.0)).await.unwrap();
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.progress_percent, 0.0);

        let goal = service.update_progress(&user_id, &goal.id, 2500.0).await.unwrap();
        assert_eq!(goal.progress_percent, 25.0);
        assert_eq!(goal.status, GoalStatus::Active);

        let goal = service.update_progress(&user_id, &goal.id, 12000.0).await.unwrap();
        assert_eq!(goal.progress_percent, 100.0);
        assert_eq!(goal.status, GoalStatus::Completed);

        let completed = service.list_goals(&user_id, Some(GoalStatus::Completed)).await.unwrap();
        assert_eq!(completed.len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_goal_stays_abandoned() {
        let (service, user_id) = service_with_user().await;
        let goal = service.create_goal(&user_id, steps_goal(10.0)).await.unwrap();
        service.update_status(&user_id, &goal.id, GoalStatus::Abandoned).await.unwrap();

        let goal = service.update_progress(&user_id, &goal.id, 10.0).await.unwrap();
        assert_eq!(goal.status, GoalStatus::Abandoned);
        assert_eq!(goal.progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_delete_and_missing_goal() {
        let (service, user_id) = service_with_user().await;
        let goal = service.create_goal(&user_id, steps_goal(10.0)).await.unwrap();
        service.delete_goal(&user_id, &goal.id).await.unwrap();
        assert!(matches!(service.get_goal(&user_id, &goal.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.update_progress(&user_id, &goal.id, 1.0).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
