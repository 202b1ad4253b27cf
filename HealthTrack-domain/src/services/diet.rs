use async_trait::async_trait;
use chrono::{Duration, Utc};

use health_track_data::models::diet::NewDietRecord;
use health_track_data::repository::DietRepositoryTrait;

use crate::entities::common::{format_timestamp, measurement_time, HistoryFilter};
use crate::entities::conversions;
use crate::entities::diet::{CreateDietRecordRequest, DailyDietSummary, DietOverview, DietRecord};
use crate::error::{validate_request, ServiceError};
use crate::services::blood_pressure::resolve_timeframe;

#[async_trait]
pub trait DietServiceTrait: Send + Sync {
    async fn create_record(&self, user_id: &str, request: CreateDietRecordRequest) -> Result<DietRecord, ServiceError>;

    async fn get_filtered_records(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<DietRecord>, usize), ServiceError>;

    async fn delete_record(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;

    /// Per-day totals for the last `days` days, oldest first. Days without records are omitted.
    async fn daily_summary(&self, user_id: &str, days: Option<u32>) -> Result<Vec<DailyDietSummary>, ServiceError>;

    /// Daily averages over the logged days of the period
    async fn overview(&self, user_id: &str, days: Option<u32>) -> Result<DietOverview, ServiceError>;
}

pub struct DietService<R: DietRepositoryTrait> {
    repository: R,
}

impl<R: DietRepositoryTrait> DietService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: DietRepositoryTrait + Send + Sync> DietServiceTrait for DietService<R> {
    async fn create_record(&self, user_id: &str, request: CreateDietRecordRequest) -> Result<DietRecord, ServiceError> {
        validate_request(&request)?;
        let recorded_at = measurement_time(request.recorded_at.as_deref(), Utc::now())?;

        let food_name = request.food_name.trim().to_string();
        if food_name.is_empty() {
            return Err(ServiceError::Validation("food_name: Food name is required".to_string()));
        }

        let stored = self
            .repository
            .create(NewDietRecord {
                user_id: user_id.to_string(),
                meal_type: request.meal_type.as_str().to_string(),
                food_name,
                calories: request.calories,
                protein_g: request.protein_g,
                carbs_g: request.carbs_g,
                fat_g: request.fat_g,
                notes: request.notes,
                recorded_at,
            })
            .await?;
        Ok(conversions::convert_to_domain_diet_record(stored))
    }

    async fn get_filtered_records(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<DietRecord>, usize), ServiceError> {
        let query = filter.to_record_query(Utc::now())?;
        let (records, total) = self.repository.get_filtered(user_id, &query).await?;
        Ok((
            records.into_iter().map(conversions::convert_to_domain_diet_record).collect(),
            total,
        ))
    }

    async fn delete_record(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Diet record with ID {} not found", id)))
        }
    }

    async fn daily_summary(&self, user_id: &str, days: Option<u32>) -> Result<Vec<DailyDietSummary>, ServiceError> {
        let days = resolve_timeframe(days)?;
        let start = format_timestamp(Utc::now() - Duration::days(i64::from(days)));

        let totals = self.repository.daily_totals(user_id, &start).await?;
        Ok(totals
            .into_iter()
            .map(conversions::convert_to_domain_daily_summary)
            .collect())
    }

    async fn overview(&self, user_id: &str, days: Option<u32>) -> Result<DietOverview, ServiceError> {
        let period_days = resolve_timeframe(days)?;
        let summary = self.daily_summary(user_id, Some(period_days)).await?;
        if summary.is_empty() {
            return Err(ServiceError::InsufficientData(
                "No diet records in the selected period".to_string(),
            ));
        }

        let logged = summary.len() as f64;
        let average = |select: fn(&DailyDietSummary) -> f64| summary.iter().map(select).sum::<f64>() / logged;

        Ok(DietOverview {
            days_logged: summary.len(),
            avg_daily_calories: average(|day| day.total_calories),
            avg_daily_protein_g: average(|day| day.total_protein_g),
            avg_daily_carbs_g: average(|day| day.total_carbs_g),
            avg_daily_fat_g: average(|day| day.total_fat_g),
            period_days,
            generated_at: Utc::now(),
        })
    }
}
