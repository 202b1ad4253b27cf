use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use health_track_data::models::heart_rate::NewHeartRateReading;
use health_track_data::repository::{HeartRateRepositoryTrait, RecordQuery};

use crate::entities::common::{format_timestamp, measurement_time, HistoryFilter};
use crate::entities::conversions;
use crate::entities::heart_rate::{CreateHeartRateRequest, HeartRateInsights, HeartRateReading};
use crate::error::{validate_request, ServiceError};
use crate::services::blood_pressure::{resolve_timeframe, MANUAL_SOURCE};
use crate::services::insights::categorize_heart_rate;

#[async_trait]
pub trait HeartRateServiceTrait: Send + Sync {
    fn calculate_insights(
        &self,
        readings: &[HeartRateReading],
        timeframe_days: u32,
    ) -> Result<HeartRateInsights, ServiceError>;

    async fn create_reading(
        &self,
        user_id: &str,
        request: CreateHeartRateRequest,
    ) -> Result<HeartRateReading, ServiceError>;

    /// Store a reading from an external source unless one already exists at the
    /// same timestamp. Returns whether a row was inserted.
    async fn import_reading(
        &self,
        user_id: &str,
        request: CreateHeartRateRequest,
        source: &str,
    ) -> Result<bool, ServiceError>;

    async fn get_filtered_readings(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<HeartRateReading>, usize), ServiceError>;

    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;

    async fn get_insights(
        &self,
        user_id: &str,
        timeframe_days: Option<u32>,
    ) -> Result<HeartRateInsights, ServiceError>;
}

pub struct HeartRateService<R: HeartRateRepositoryTrait> {
    repository: R,
}

impl<R: HeartRateRepositoryTrait> HeartRateService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn to_new_reading(
        user_id: &str,
        request: CreateHeartRateRequest,
        timestamp: String,
        source: &str,
    ) -> NewHeartRateReading {
        NewHeartRateReading {
            user_id: user_id.to_string(),
            bpm: request.bpm,
            context: request.context.map(|c| c.as_str().to_string()),
            notes: request.notes,
            timestamp,
            device_id: request.device_id,
            source: source.to_string(),
        }
    }
}

#[async_trait]
impl<R: HeartRateRepositoryTrait + Send + Sync> HeartRateServiceTrait for HeartRateService<R> {
    fn calculate_insights(
        &self,
        readings: &[HeartRateReading],
        timeframe_days: u32,
    ) -> Result<HeartRateInsights, ServiceError> {
        if readings.is_empty() {
            return Err(ServiceError::InsufficientData(
                "No heart rate readings available to generate insights".to_string(),
            ));
        }

        let sum: f64 = readings.iter().map(|r| f64::from(r.bpm)).sum();
        let avg_bpm = sum / readings.len() as f64;
        let min_bpm = readings.iter().map(|r| r.bpm).min().unwrap_or_default();
        let max_bpm = readings.iter().map(|r| r.bpm).max().unwrap_or_default();
        let category = categorize_heart_rate(avg_bpm.round() as u16);

        Ok(HeartRateInsights {
            avg_bpm,
            min_bpm,
            max_bpm,
            reading_count: readings.len(),
            category,
            category_label: category.label().to_string(),
            period_days: timeframe_days,
            generated_at: Utc::now(),
        })
    }

    async fn create_reading(
        &self,
        user_id: &str,
        request: CreateHeartRateRequest,
    ) -> Result<HeartRateReading, ServiceError> {
        validate_request(&request)?;
        let timestamp = measurement_time(request.timestamp.as_deref(), Utc::now())?;

        let stored = self
            .repository
            .create(Self::to_new_reading(user_id, request, timestamp, MANUAL_SOURCE))
            .await?;
        Ok(conversions::convert_to_domain_heart_rate(stored))
    }

    async fn import_reading(
        &self,
        user_id: &str,
        request: CreateHeartRateRequest,
        source: &str,
    ) -> Result<bool, ServiceError> {
        validate_request(&request)?;
        let timestamp = measurement_time(request.timestamp.as_deref(), Utc::now())?;

        if self.repository.exists_at(user_id, &timestamp, source).await? {
            debug!("Skipping duplicate {} heart rate sample at {}", source, timestamp);
            return Ok(false);
        }

        self.repository
            .create(Self::to_new_reading(user_id, request, timestamp, source))
            .await?;
        Ok(true)
    }

    async fn get_filtered_readings(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<HeartRateReading>, usize), ServiceError> {
        let query = filter.to_record_query(Utc::now())?;
        let (readings, total) = self.repository.get_filtered(user_id, &query).await?;
        Ok((
            readings.into_iter().map(conversions::convert_to_domain_heart_rate).collect(),
            total,
        ))
    }

    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Heart rate reading with ID {} not found", id)))
        }
    }

    async fn get_insights(
        &self,
        user_id: &str,
        timeframe_days: Option<u32>,
    ) -> Result<HeartRateInsights, ServiceError> {
        let days = resolve_timeframe(timeframe_days)?;
        let start = format_timestamp(Utc::now() - Duration::days(i64::from(days)));

        let (readings, _) = self
            .repository
            .get_filtered(user_id, &RecordQuery::since(start))
            .await?;
        let readings: Vec<HeartRateReading> = readings
            .into_iter()
            .map(conversions::convert_to_domain_heart_rate)
            .collect();

        self.calculate_insights(&readings, days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::heart_rate::{HeartRateCategory, HeartRateContext};
    use health_track_data::database::DatabasePool;
    use health_track_data::models::user::NewUser;
    use health_track_data::repository::{SqliteHeartRateRepository, SqliteUserRepository, UserRepositoryTrait};

    async fn service_with_user() -> (HeartRateService<SqliteHeartRateRepository>, String) {
        let pool = DatabasePool::in_memory().unwrap();
        let user = SqliteUserRepository::new(pool.clone())
            .create(NewUser {
                email: "hr@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: None,
                roles: "user".to_string(),
            })
            .await
            .unwrap();
        (HeartRateService::new(SqliteHeartRateRepository::new(pool)), user.id)
    }

    fn request(bpm: u16) -> CreateHeartRateRequest {
        CreateHeartRateRequest {
            bpm,
            context: Some(HeartRateContext::Resting),
            notes: None,
            timestamp: None,
            device_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_categorizes_reading() {
        let (service, user_id) = service_with_user().await;
        let reading = service.create_reading(&user_id, request(110)).await.unwrap();
        assert_eq!(reading.category, HeartRateCategory::High);
        assert_eq!(reading.category_label, "偏快");
        assert_eq!(reading.context, Some(HeartRateContext::Resting));

        assert!(matches!(
            service.create_reading(&user_id, request(10)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_insights_use_average() {
        let (service, user_id) = service_with_user().await;
        for bpm in [55, 65, 75] {
            service.create_reading(&user_id, request(bpm)).await.unwrap();
        }

        let insights = service.get_insights(&user_id, None).await.unwrap();
        assert_eq!(insights.reading_count, 3);
        assert_eq!(insights.min_bpm, 55);
        assert_eq!(insights.max_bpm, 75);
        assert!((insights.avg_bpm - 65.0).abs() < f64::EPSILON);
        assert_eq!(insights.category, HeartRateCategory::Normal);
    }

    #[tokio::test]
    async fn test_filtered_listing_and_delete() {
        let (service, user_id) = service_with_user().await;
        let first = service.create_reading(&user_id, request(70)).await.unwrap();
        service.create_reading(&user_id, request(72)).await.unwrap();

        let (page, total) = service
            .get_filtered_readings(&user_id, &HistoryFilter { limit: Some(1), ..HistoryFilter::default() })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(total, 2);

        service.delete_reading(&user_id, &first.id).await.unwrap();
        assert!(matches!(
            service.delete_reading(&user_id, &first.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
