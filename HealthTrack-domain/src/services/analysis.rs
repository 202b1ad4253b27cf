use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::entities::analysis::HealthAnalysis;
use crate::entities::goal::GoalStatus;
use crate::error::ServiceError;
use crate::services::blood_pressure::{resolve_timeframe, BloodPressureServiceTrait};
use crate::services::diet::DietServiceTrait;
use crate::services::goals::GoalServiceTrait;
use crate::services::habits::HabitServiceTrait;
use crate::services::heart_rate::HeartRateServiceTrait;

#[async_trait]
pub trait AnalysisServiceTrait: Send + Sync {
    /// Build the report for the last `period_days` days (default 30)
    async fn analyze(&self, user_id: &str, period_days: Option<u32>) -> Result<HealthAnalysis, ServiceError>;
}

/// Combines the record services into one report
pub struct AnalysisService {
    blood_pressure: Arc<dyn BloodPressureServiceTrait>,
    heart_rate: Arc<dyn HeartRateServiceTrait>,
    diet: Arc<dyn DietServiceTrait>,
    goals: Arc<dyn GoalServiceTrait>,
    habits: Arc<dyn HabitServiceTrait>,
}

impl AnalysisService {
    pub fn new(
        blood_pressure: Arc<dyn BloodPressureServiceTrait>,
        heart_rate: Arc<dyn HeartRateServiceTrait>,
        diet: Arc<dyn DietServiceTrait>,
        goals: Arc<dyn GoalServiceTrait>,
        habits: Arc<dyn HabitServiceTrait>,
    ) -> Self {
        Self {
            blood_pressure,
            heart_rate,
            diet,
            goals,
            habits,
        }
    }
}

/// A section with no data is absent from the report, not an error
async fn optional<T>(section: impl Future<Output = Result<T, ServiceError>>) -> Result<Option<T>, ServiceError> {
    match section.await {
        Ok(value) => Ok(Some(value)),
        Err(ServiceError::InsufficientData(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl AnalysisServiceTrait for AnalysisService {
    async fn analyze(&self, user_id: &str, period_days: Option<u32>) -> Result<HealthAnalysis, ServiceError> {
        let days = resolve_timeframe(period_days)?;

        let (blood_pressure, heart_rate, diet, goals, habits) = futures::try_join!(
            optional(self.blood_pressure.get_insights(user_id, Some(days))),
            optional(self.heart_rate.get_insights(user_id, Some(days))),
            optional(self.diet.overview(user_id, Some(days))),
            self.goals.list_goals(user_id, Some(GoalStatus::Active)),
            self.habits.list_habits(user_id, false),
        )?;

        debug!(
            "Analysis for user {} over {} days: bp={}, hr={}, diet={}, goals={}, habits={}",
            user_id,
            days,
            blood_pressure.is_some(),
            heart_rate.is_some(),
            diet.is_some(),
            goals.len(),
            habits.len()
        );

        Ok(HealthAnalysis {
            period_days: days,
            generated_at: Utc::now(),
            blood_pressure,
            heart_rate,
            diet,
            goals,
            habits,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::blood_pressure::BloodPressureService;
    use crate::services::diet::DietService;
    use crate::services::goals::GoalService;
    use crate::services::habits::HabitService;
    use crate::services::heart_rate::HeartRateService;
    use health_track_data::database::DatabasePool;
    use health_track_data::repository::{
        SqliteBloodPressureRepository, SqliteDietRepository, SqliteGoalRepository, SqliteHabitRepository,
        SqliteHeartRateRepository,
    };

    /// Record services over one pool, plus the analysis built from them
    pub struct Services {
        pub blood_pressure: Arc<dyn BloodPressureServiceTrait>,
        pub heart_rate: Arc<dyn HeartRateServiceTrait>,
        pub diet: Arc<dyn DietServiceTrait>,
        pub goals: Arc<dyn GoalServiceTrait>,
        pub habits: Arc<dyn HabitServiceTrait>,
        pub analysis: Arc<dyn AnalysisServiceTrait>,
    }

    pub fn services(pool: &DatabasePool) -> Services {
        let blood_pressure: Arc<dyn BloodPressureServiceTrait> =
            Arc::new(BloodPressureService::new(SqliteBloodPressureRepository::new(pool.clone())));
        let heart_rate: Arc<dyn HeartRateServiceTrait> =
            Arc::new(HeartRateService::new(SqliteHeartRateRepository::new(pool.clone())));
        let diet: Arc<dyn DietServiceTrait> = Arc::new(DietService::new(SqliteDietRepository::new(pool.clone())));
        let goals: Arc<dyn GoalServiceTrait> = Arc::new(GoalService::new(SqliteGoalRepository::new(pool.clone())));
        let habits: Arc<dyn HabitServiceTrait> =
            Arc::new(HabitService::new(SqliteHabitRepository::new(pool.clone())));
        let analysis: Arc<dyn AnalysisServiceTrait> = Arc::new(AnalysisService::new(
            blood_pressure.clone(),
            heart_rate.clone(),
            diet.clone(),
            goals.clone(),
            habits.clone(),
        ));

        Services {
            blood_pressure,
            heart_rate,
            diet,
            goals,
            habits,
            analysis,
        }
    }
}
