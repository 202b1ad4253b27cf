use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use health_track_data::models::recommendation::NewRecommendation;
use health_track_data::repository::RecommendationRepositoryTrait;

use crate::advice::{AdviceProvider, RuleBasedAdvisor};
use crate::entities::conversions;
use crate::entities::recommendation::{AdviceSource, GenerateRecommendationRequest, Recommendation};
use crate::error::{validate_request, ServiceError};
use crate::services::analysis::AnalysisServiceTrait;

/// History entries returned when the caller gives no limit
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

#[async_trait]
pub trait RecommendationServiceTrait: Send + Sync {
    /// Analyze recent data, produce advice and store it
    async fn generate(
        &self,
        user_id: &str,
        request: GenerateRecommendationRequest,
    ) -> Result<Recommendation, ServiceError>;

    /// Stored advice, newest first
    async fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Recommendation>, ServiceError>;
}

pub struct RecommendationService<R: RecommendationRepositoryTrait> {
    repository: R,
    analysis: Arc<dyn AnalysisServiceTrait>,
    advisor: Option<Arc<dyn AdviceProvider>>,
    fallback: RuleBasedAdvisor,
}

impl<R: RecommendationRepositoryTrait + Send + Sync> RecommendationService<R> {
    /// `advisor` is tried first when present; rules are used otherwise and on failure
    pub fn new(
        repository: R,
        analysis: Arc<dyn AnalysisServiceTrait>,
        advisor: Option<Arc<dyn AdviceProvider>>,
    ) -> Self {
        Self {
            repository,
            analysis,
            advisor,
            fallback: RuleBasedAdvisor::new(),
        }
    }
}

#[async_trait]
impl<R: RecommendationRepositoryTrait + Send + Sync> RecommendationServiceTrait for RecommendationService<R> {
    async fn generate(
        &self,
        user_id: &str,
        request: GenerateRecommendationRequest,
    ) -> Result<Recommendation, ServiceError> {
        validate_request(&request)?;
        let analysis = self.analysis.analyze(user_id, request.period_days).await?;

        let (source, advice) = match &self.advisor {
            Some(advisor) => match advisor.advise(&analysis).await {
                Ok(lines) if !lines.is_empty() => (advisor.source(), lines),
                Ok(_) => {
                    warn!("Advice provider returned nothing for user {}; using rules", user_id);
                    (AdviceSource::Rules, self.fallback.advice_for(&analysis))
                }
                Err(e) => {
                    warn!("Advice provider failed for user {}: {}; using rules", user_id, e);
                    (AdviceSource::Rules, self.fallback.advice_for(&analysis))
                }
            },
            None => (AdviceSource::Rules, self.fallback.advice_for(&analysis)),
        };

        let stored = self
            .repository
            .create(NewRecommendation {
                user_id: user_id.to_string(),
                source: source.as_str().to_string(),
                advice,
                period_days: analysis.period_days,
            })
            .await?;

        info!(
            "Generated {} advice lines for user {} from {}",
            stored.advice.len(),
            user_id,
            source.as_str()
        );
        Ok(conversions::convert_to_domain_recommendation(stored))
    }

    async fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Recommendation>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
        let stored = self.repository.list(user_id, limit).await?;
        Ok(stored
            .into_iter()
            .map(conversions::convert_to_domain_recommendation)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceError, MockAdviceProvider};
    use crate::services::analysis::test_support::services;
    use health_track_data::database::DatabasePool;
    use health_track_data::models::user::NewUser;
    use health_track_data::repository::{SqliteRecommendationRepository, SqliteUserRepository, UserRepositoryTrait};

    async fn setup(
        advisor: Option<Arc<dyn AdviceProvider>>,
    ) -> (RecommendationService<SqliteRecommendationRepository>, String) {
        let pool = DatabasePool::in_memory().unwrap();
        let user = SqliteUserRepository::new(pool.clone())
            .create(NewUser {
                email: "advice@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: None,
                roles: "user".to_string(),
            })
            .await
            .unwrap();

        let service = RecommendationService::new(
            SqliteRecommendationRepository::new(pool.clone()),
            services(&pool).analysis,
            advisor,
        );
        (service, user.id)
    }

    #[tokio::test]
    async fn test_rules_without_advisor() {
        let (service, user_id) = setup(None).await;
        let recommendation = service
            .generate(&user_id, GenerateRecommendationRequest::default())
            .await
            .unwrap();
        assert_eq!(recommendation.source, AdviceSource::Rules);
        assert_eq!(recommendation.period_days, 30);
        assert!(!recommendation.advice.is_empty());
    }

    #[tokio::test]
    async fn test_advisor_output_is_stored() {
        let mut advisor = MockAdviceProvider::new();
        advisor.expect_source().return_const(AdviceSource::Llm);
        advisor
            .expect_advise()
            .times(1)
            .returning(|_| Ok(vec!["Walk after dinner".to_string()]));

        let (service, user_id) = setup(Some(Arc::new(advisor))).await;
        let recommendation = service
            .generate(&user_id, GenerateRecommendationRequest { period_days: Some(14) })
            .await
            .unwrap();
        assert_eq!(recommendation.source, AdviceSource::Llm);
        assert_eq!(recommendation.advice, vec!["Walk after dinner"]);

        let history = service.history(&user_id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].period_days, 14);
    }

    #[tokio::test]
    async fn test_advisor_failure_falls_back_to_rules() {
        let mut advisor = MockAdviceProvider::new();
        advisor.expect_source().return_const(AdviceSource::Llm);
        advisor
            .expect_advise()
            .returning(|_| Err(AdviceError::Status { status: 503, body: "down".to_string() }));

        let (service, user_id) = setup(Some(Arc::new(advisor))).await;
        let recommendation = service
            .generate(&user_id, GenerateRecommendationRequest::default())
            .await
            .unwrap();
        assert_eq!(recommendation.source, AdviceSource::Rules);
        assert!(!recommendation.advice.is_empty());
    }

    #[tokio::test]
    async fn test_period_validation() {
        let (service, user_id) = setup(None).await;
        let result = service
            .generate(&user_id, GenerateRecommendationRequest { period_days: Some(0) })
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
