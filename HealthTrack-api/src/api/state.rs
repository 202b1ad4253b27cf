use std::sync::Arc;

use axum::extract::FromRef;

use health_track_data::database::DatabasePool;
use health_track_data::repository::{
    SqliteBloodPressureRepository, SqliteDeviceCredentialRepository, SqliteDietRepository, SqliteGoalRepository,
    SqliteHabitRepository, SqliteHeartRateRepository, SqliteRecommendationRepository, SqliteUserRepository,
};
use health_track_domain::advice::AdviceProvider;
use health_track_domain::auth::TokenService;
use health_track_domain::health::{DatabaseHealthService, HealthServiceTrait};
use health_track_domain::security::CredentialCipher;
use health_track_domain::services::{
    AnalysisService, AnalysisServiceTrait, BloodPressureService, BloodPressureServiceTrait, DeviceService,
    DeviceServiceTrait, DietService, DietServiceTrait, GoalService, GoalServiceTrait, HabitService,
    HabitServiceTrait, HeartRateService, HeartRateServiceTrait, RecommendationService,
    RecommendationServiceTrait, UserService, UserServiceTrait,
};

/// Service types for dependency injection
pub type UserServiceRef = Arc<dyn UserServiceTrait>;
pub type BloodPressureServiceRef = Arc<dyn BloodPressureServiceTrait>;
pub type HeartRateServiceRef = Arc<dyn HeartRateServiceTrait>;
pub type DietServiceRef = Arc<dyn DietServiceTrait>;
pub type GoalServiceRef = Arc<dyn GoalServiceTrait>;
pub type HabitServiceRef = Arc<dyn HabitServiceTrait>;
pub type DeviceServiceRef = Arc<dyn DeviceServiceTrait>;
pub type AnalysisServiceRef = Arc<dyn AnalysisServiceTrait>;
pub type RecommendationServiceRef = Arc<dyn RecommendationServiceTrait>;
pub type HealthServiceRef = Arc<dyn HealthServiceTrait>;

/// Everything a handler may need, built once at startup.
/// Handlers extract just their own service with `State<...ServiceRef>`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: UserServiceRef,
    pub blood_pressure: BloodPressureServiceRef,
    pub heart_rate: HeartRateServiceRef,
    pub diet: DietServiceRef,
    pub goals: GoalServiceRef,
    pub habits: HabitServiceRef,
    pub devices: DeviceServiceRef,
    pub analysis: AnalysisServiceRef,
    pub recommendations: RecommendationServiceRef,
    pub health: HealthServiceRef,
}

impl AppState {
    /// Wire every service over one connection pool.
    /// Without an `advisor`, recommendations come from the built-in rules.
    pub fn new(
        pool: DatabasePool,
        tokens: Arc<TokenService>,
        cipher: CredentialCipher,
        advisor: Option<Arc<dyn AdviceProvider>>,
    ) -> Self {
        let users: UserServiceRef = Arc::new(UserService::new(SqliteUserRepository::new(pool.clone()), tokens.clone()));
        let blood_pressure: BloodPressureServiceRef =
            Arc::new(BloodPressureService::new(SqliteBloodPressureRepository::new(pool.clone())));
        let heart_rate: HeartRateServiceRef =
            Arc::new(HeartRateService::new(SqliteHeartRateRepository::new(pool.clone())));
        let diet: DietServiceRef = Arc::new(DietService::new(SqliteDietRepository::new(pool.clone())));
        let goals: GoalServiceRef = Arc::new(GoalService::new(SqliteGoalRepository::new(pool.clone())));
        let habits: HabitServiceRef = Arc::new(HabitService::new(SqliteHabitRepository::new(pool.clone())));

        let devices: DeviceServiceRef = Arc::new(DeviceService::new(
            SqliteDeviceCredentialRepository::new(pool.clone()),
            cipher,
            blood_pressure.clone(),
            heart_rate.clone(),
        ));

        let analysis: AnalysisServiceRef = Arc::new(AnalysisService::new(
            blood_pressure.clone(),
            heart_rate.clone(),
            diet.clone(),
            goals.clone(),
            habits.clone(),
        ));

        let recommendations: RecommendationServiceRef = Arc::new(RecommendationService::new(
            SqliteRecommendationRepository::new(pool.clone()),
            analysis.clone(),
            advisor,
        ));

        let health: HealthServiceRef = Arc::new(DatabaseHealthService::new(pool));

        Self {
            tokens,
            users,
            blood_pressure,
            heart_rate,
            diet,
            goals,
            habits,
            devices,
            analysis,
            recommendations,
            health,
        }
    }
}
