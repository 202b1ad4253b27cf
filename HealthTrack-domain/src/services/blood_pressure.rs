use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info};

use health_track_data::models::blood_pressure::NewBloodPressureReading;
use health_track_data::repository::{BloodPressureRepositoryTrait, RecordQuery};

use crate::entities::blood_pressure::{
    BloodPressureCategory, BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest,
};
use crate::entities::common::{format_timestamp, measurement_time, HistoryFilter};
use crate::entities::conversions;
use crate::error::{validate_request, ServiceError};
use crate::services::insights::{categorize_blood_pressure, is_hypertensive_crisis};

/// Source value for readings entered by hand
pub const MANUAL_SOURCE: &str = "manual";

/// Insights window when the caller gives none
pub const DEFAULT_TIMEFRAME_DAYS: u32 = 30;

/// Longest insights window a caller may ask for
pub const MAX_TIMEFRAME_DAYS: u32 = 365;

/// Check an insights window, applying the default
pub(crate) fn resolve_timeframe(timeframe_days: Option<u32>) -> Result<u32, ServiceError> {
    let days = timeframe_days.unwrap_or(DEFAULT_TIMEFRAME_DAYS);
    if days == 0 || days > MAX_TIMEFRAME_DAYS {
        return Err(ServiceError::Validation(format!(
            "Timeframe must be between 1 and {} days",
            MAX_TIMEFRAME_DAYS
        )));
    }
    Ok(days)
}

/// Trait for blood pressure service operations
#[async_trait]
pub trait BloodPressureServiceTrait: Send + Sync {
    /// Validate a create blood pressure request
    fn validate_create_request(&self, request: &CreateBloodPressureRequest) -> Result<(), ServiceError>;

    /// Calculate blood pressure insights from readings
    fn calculate_insights(
        &self,
        readings: &[BloodPressureReading],
        timeframe_days: u32,
    ) -> Result<BloodPressureInsights, ServiceError>;

    /// Get severity category for a blood pressure reading
    fn get_severity(&self, reading: &BloodPressureReading) -> BloodPressureCategory;

    /// Check if a reading indicates a hypertensive crisis
    fn is_hypertensive_crisis(&self, reading: &BloodPressureReading) -> bool;

    /// Create a new manually entered reading
    async fn create_reading(
        &self,
        user_id: &str,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError>;

    /// Store a reading from an external source unless one already exists at the
    /// same timestamp (compared to the second). Returns whether a row was inserted.
    async fn import_reading(
        &self,
        user_id: &str,
        request: CreateBloodPressureRequest,
        source: &str,
    ) -> Result<bool, ServiceError>;

    /// Get a blood pressure reading by ID
    async fn get_reading_by_id(&self, user_id: &str, id: &str) -> Result<BloodPressureReading, ServiceError>;

    /// Most recent reading, if any
    async fn get_latest_reading(&self, user_id: &str) -> Result<Option<BloodPressureReading>, ServiceError>;

    /// Get a page of readings and the total matching the filter
    async fn get_filtered_readings(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<BloodPressureReading>, usize), ServiceError>;

    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;

    /// Insights over the last `timeframe_days` days (default 30, max 365)
    async fn get_insights(
        &self,
        user_id: &str,
        timeframe_days: Option<u32>,
    ) -> Result<BloodPressureInsights, ServiceError>;
}

/// Blood pressure service for domain logic
pub struct BloodPressureService<R: BloodPressureRepositoryTrait> {
    repository: R,
}

impl<R: BloodPressureRepositoryTrait> BloodPressureService<R> {
    /// Create a new blood pressure service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn to_new_reading(
        user_id: &str,
        request: CreateBloodPressureRequest,
        timestamp: String,
        source: &str,
    ) -> NewBloodPressureReading {
        NewBloodPressureReading {
            user_id: user_id.to_string(),
            systolic: request.systolic,
            diastolic: request.diastolic,
            pulse: request.pulse,
            notes: request.notes,
            timestamp,
            position: request.position,
            arm: request.arm,
            device_id: request.device_id,
            source: source.to_string(),
        }
    }
}

#[async_trait]
impl<R: BloodPressureRepositoryTrait + Send + Sync> BloodPressureServiceTrait for BloodPressureService<R> {
    fn validate_create_request(&self, request: &CreateBloodPressureRequest) -> Result<(), ServiceError> {
        validate_request(request)?;

        if request.systolic <= request.diastolic {
            return Err(ServiceError::Validation(
                "Systolic pressure must be greater than diastolic pressure".to_string(),
            ));
        }

        Ok(())
    }

    fn calculate_insights(
        &self,
        readings: &[BloodPressureReading],
        timeframe_days: u32,
    ) -> Result<BloodPressureInsights, ServiceError> {
        if readings.is_empty() {
            return Err(ServiceError::InsufficientData(
                "No readings available to generate insights".to_string(),
            ));
        }

        let mut systolic_sum: f64 = 0.0;
        let mut diastolic_sum: f64 = 0.0;
        let mut pulse_sum: f64 = 0.0;
        let mut pulse_count: usize = 0;

        let mut max_systolic = u16::MIN;
        let mut max_diastolic = u16::MIN;
        let mut min_systolic = u16::MAX;
        let mut min_diastolic = u16::MAX;
        let mut crisis_count = 0;

        for reading in readings {
            systolic_sum += f64::from(reading.systolic);
            diastolic_sum += f64::from(reading.diastolic);

            if let Some(pulse) = reading.pulse {
                pulse_sum += f64::from(pulse);
                pulse_count += 1;
            }

            max_systolic = max_systolic.max(reading.systolic);
            max_diastolic = max_diastolic.max(reading.diastolic);
            min_systolic = min_systolic.min(reading.systolic);
            min_diastolic = min_diastolic.min(reading.diastolic);

            if self.is_hypertensive_crisis(reading) {
                crisis_count += 1;
            }
        }

        let avg_systolic = systolic_sum / readings.len() as f64;
        let avg_diastolic = diastolic_sum / readings.len() as f64;
        let avg_pulse = if pulse_count > 0 {
            Some(pulse_sum / pulse_count as f64)
        } else {
            None
        };

        let category = categorize_blood_pressure(avg_systolic.round() as u16, avg_diastolic.round() as u16);

        Ok(BloodPressureInsights {
            avg_systolic,
            avg_diastolic,
            avg_pulse,
            max_systolic,
            max_diastolic,
            min_systolic,
            min_diastolic,
            category,
            category_label: category.label().to_string(),
            crisis_count,
            reading_count: readings.len(),
            period_days: timeframe_days,
            generated_at: Utc::now(),
        })
    }

    fn get_severity(&self, reading: &BloodPressureReading) -> BloodPressureCategory {
        categorize_blood_pressure(reading.systolic, reading.diastolic)
    }

    fn is_hypertensive_crisis(&self, reading: &BloodPressureReading) -> bool {
        is_hypertensive_crisis(reading.systolic, reading.diastolic)
    }

    async fn create_reading(
        &self,
        user_id: &str,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError> {
        self.validate_create_request(&request)?;
        let timestamp = measurement_time(request.timestamp.as_deref(), Utc::now())?;

        let new_reading = Self::to_new_reading(user_id, request, timestamp, MANUAL_SOURCE);
        let stored = self.repository.create(new_reading).await?;

        let reading = conversions::convert_to_domain_reading(stored);
        if self.is_hypertensive_crisis(&reading) {
            info!(
                "Crisis-level blood pressure recorded for user {}: {}/{}",
                user_id, reading.systolic, reading.diastolic
            );
        }
        Ok(reading)
    }

    async fn import_reading(
        &self,
        user_id: &str,
        request: CreateBloodPressureRequest,
        source: &str,
    ) -> Result<bool, ServiceError> {
        self.validate_create_request(&request)?;
        let timestamp = measurement_time(request.timestamp.as_deref(), Utc::now())?;

        if self.repository.exists_at(user_id, &timestamp, source).await? {
            debug!("Skipping duplicate {} blood pressure sample at {}", source, timestamp);
            return Ok(false);
        }

        let new_reading = Self::to_new_reading(user_id, request, timestamp, source);
        self.repository.create(new_reading).await?;
        Ok(true)
    }

    async fn get_reading_by_id(&self, user_id: &str, id: &str) -> Result<BloodPressureReading, ServiceError> {
        self.repository
            .get_by_id(user_id, id)
            .await?
            .map(conversions::convert_to_domain_reading)
            .ok_or_else(|| ServiceError::NotFound(format!("Blood pressure reading with ID {} not found", id)))
    }

    async fn get_latest_reading(&self, user_id: &str) -> Result<Option<BloodPressureReading>, ServiceError> {
        let latest = self.repository.get_latest(user_id).await?;
        Ok(latest.map(conversions::convert_to_domain_reading))
    }

    async fn get_filtered_readings(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<BloodPressureReading>, usize), ServiceError> {
        let query = filter.to_record_query(Utc::now())?;
        let (readings, total) = self.repository.get_filtered(user_id, &query).await?;

        let readings = readings
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect();
        Ok((readings, total))
    }

    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Blood pressure reading with ID {} not found", id)))
        }
    }

    async fn get_insights(
        &self,
        user_id: &str,
        timeframe_days: Option<u32>,
    ) -> Result<BloodPressureInsights, ServiceError> {
        let days = resolve_timeframe(timeframe_days)?;
        let start = format_timestamp(Utc::now() - Duration::days(i64::from(days)));

        let (readings, _) = self
            .repository
            .get_filtered(user_id, &RecordQuery::since(start))
            .await?;
        let readings: Vec<BloodPressureReading> = readings
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect();

        self.calculate_insights(&readings, days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_track_data::database::DatabasePool;
    use health_track_data::models::user::NewUser;
    use health_track_data::repository::{
        SqliteBloodPressureRepository, SqliteUserRepository, UserRepositoryTrait,
    };

    async fn service_with_user() -> (BloodPressureService<SqliteBloodPressureRepository>, String) {
        let pool = DatabasePool::in_memory().unwrap();
        let user = SqliteUserRepository::new(pool.clone())
            .create(NewUser {
                email: "bp@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: None,
                roles: "user".to_string(),
            })
            .await
            .unwrap();
        (BloodPressureService::new(SqliteBloodPressureRepository::new(pool)), user.id)
    }

    fn request(systolic: u16, diastolic: u16, timestamp: Option<&str>) -> CreateBloodPressureRequest {
        CreateBloodPressureRequest {
            systolic,
            diastolic,
            pulse: Some(72),
            notes: None,
            timestamp: timestamp.map(str::to_string),
            position: None,
            arm: None,
            device_id: None,
        }
    }

    fn reading(systolic: u16, diastolic: u16, pulse: Option<u16>) -> BloodPressureReading {
        let category = categorize_blood_pressure(systolic, diastolic);
        BloodPressureReading {
            id: "r".to_string(),
            systolic,
            diastolic,
            pulse,
            notes: None,
            timestamp: format_timestamp(Utc::now()),
            position: None,
            arm: None,
            device_id: None,
            source: MANUAL_SOURCE.to_string(),
            category,
            category_label: category.label().to_string(),
        }
    }

    #[tokio::test]
    async fn test_validate_create_request() {
        let (service, _) = service_with_user().await;
        assert!(service.validate_create_request(&request(120, 80, None)).is_ok());

        let err = service.validate_create_request(&request(350, 80, None)).unwrap_err();
        assert!(err.to_string().contains("Systolic"));

        let err = service.validate_create_request(&request(80, 90, None)).unwrap_err();
        assert!(err.to_string().contains("greater than diastolic"));
    }

    #[tokio::test]
    async fn test_calculate_insights() {
        let (service, _) = service_with_user().await;
        let readings = vec![
            reading(120, 80, Some(70)),
            reading(130, 85, None),
            reading(185, 95, Some(80)),
        ];

        let insights = service.calculate_insights(&readings, 7).unwrap();
        assert!((insights.avg_systolic - 145.0).abs() < f64::EPSILON);
        assert!((insights.avg_diastolic - 86.666).abs() < 0.01);
        assert_eq!(insights.avg_pulse, Some(75.0));
        assert_eq!(insights.max_systolic, 185);
        assert_eq!(insights.min_diastolic, 80);
        assert_eq!(insights.category, BloodPressureCategory::Grade1Hypertension);
        assert_eq!(insights.crisis_count, 1);
        assert_eq!(insights.reading_count, 3);
        assert_eq!(insights.period_days, 7);

        assert!(matches!(
            service.calculate_insights(&[], 7),
            Err(ServiceError::InsufficientData(_))
        ));
    }

    #[tokio::test]
    async fn test_create_get_and_delete() {
        let (service, user_id) = service_with_user().await;

        let created = service.create_reading(&user_id, request(142, 91, None)).await.unwrap();
        assert_eq!(created.category, BloodPressureCategory::Grade1Hypertension);
        assert_eq!(created.source, MANUAL_SOURCE);

        let fetched = service.get_reading_by_id(&user_id, &created.id).await.unwrap();
        assert_eq!(fetched, created);

        assert!(matches!(
            service.get_reading_by_id("someone-else", &created.id).await,
            Err(ServiceError::NotFound(_))
        ));

        service.delete_reading(&user_id, &created.id).await.unwrap();
        assert!(matches!(
            service.delete_reading(&user_id, &created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_future_timestamp_is_rejected() {
        let (service, user_id) = service_with_user().await;
        let future = format_timestamp(Utc::now() + Duration::days(1));
        let result = service.create_reading(&user_id, request(120, 80, Some(&future))).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_import_skips_duplicates() {
        let (service, user_id) = service_with_user().await;
        let at = format_timestamp(Utc::now() - Duration::hours(2));

        assert!(service.import_reading(&user_id, request(125, 82, Some(&at)), "garmin").await.unwrap());
        assert!(!service.import_reading(&user_id, request(125, 82, Some(&at)), "garmin").await.unwrap());
        // Same instant from another source is a different sample
        assert!(service.import_reading(&user_id, request(125, 82, Some(&at)), "huawei").await.unwrap());

        let latest = service.get_latest_reading(&user_id).await.unwrap().unwrap();
        assert_eq!(latest.timestamp, at);
    }

    #[tokio::test]
    async fn test_insights_window() {
        let (service, user_id) = service_with_user().await;
        assert!(matches!(
            service.get_insights(&user_id, None).await,
            Err(ServiceError::InsufficientData(_))
        ));
        assert!(matches!(
            service.get_insights(&user_id, Some(400)).await,
            Err(ServiceError::Validation(_))
        ));

        let old = format_timestamp(Utc::now() - Duration::days(60));
        service.create_reading(&user_id, request(170, 100, Some(&old))).await.unwrap();
        service.create_reading(&user_id, request(118, 76, None)).await.unwrap();

        let insights = service.get_insights(&user_id, Some(30)).await.unwrap();
        assert_eq!(insights.reading_count, 1);
        assert_eq!(insights.category, BloodPressureCategory::Normal);

        let insights = service.get_insights(&user_id, Some(90)).await.unwrap();
        assert_eq!(insights.reading_count, 2);
    }
}
