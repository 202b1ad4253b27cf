use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use health_track_data::models::habit::{HabitCheckin as StoredCheckin, NewHabit};
use health_track_data::repository::HabitRepositoryTrait;

use crate::entities::common::{format_timestamp, parse_date};
use crate::entities::conversions;
use crate::entities::habit::{CheckinRequest, CreateHabitRequest, Habit, HabitCheckin, HabitStats};
use crate::error::{validate_request, ServiceError};
use crate::services::progress::{completion_rate, current_streak, longest_streak};

/// Compute habit statistics from its check-ins as of `today`
pub fn compute_stats(checkins: &[HabitCheckin], today: NaiveDate) -> HabitStats {
    let completed_dates: Vec<NaiveDate> = checkins
        .iter()
        .filter(|c| c.completed)
        .filter_map(|c| NaiveDate::parse_from_str(&c.date, "%Y-%m-%d").ok())
        .collect();

    let total_count = checkins.len() as u32;
    let completed_count = checkins.iter().filter(|c| c.completed).count() as u32;

    HabitStats {
        total_count,
        completed_count,
        completion_rate: completion_rate(completed_count, total_count),
        current_streak: current_streak(&completed_dates, today),
        longest_streak: longest_streak(&completed_dates),
        last_checkin: completed_dates
            .iter()
            .max()
            .map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

#[async_trait]
pub trait HabitServiceTrait: Send + Sync {
    async fn create_habit(&self, user_id: &str, request: CreateHabitRequest) -> Result<Habit, ServiceError>;

    async fn list_habits(&self, user_id: &str, include_archived: bool) -> Result<Vec<Habit>, ServiceError>;

    async fn get_habit(&self, user_id: &str, id: &str) -> Result<Habit, ServiceError>;

    async fn set_archived(&self, user_id: &str, id: &str, archived: bool) -> Result<Habit, ServiceError>;

    /// Delete a habit and all of its check-ins
    async fn delete_habit(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;

    /// Check in for a day (today by default). Checking the same day again replaces it.
    async fn check_in(&self, user_id: &str, habit_id: &str, request: CheckinRequest) -> Result<HabitCheckin, ServiceError>;

    /// Check-ins in an inclusive date range, oldest first
    async fn list_checkins(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Vec<HabitCheckin>, ServiceError>;

    async fn get_stats(&self, user_id: &str, habit_id: &str) -> Result<HabitStats, ServiceError>;
}

pub struct HabitService<R: HabitRepositoryTrait> {
    repository: R,
}

impl<R: HabitRepositoryTrait + Send + Sync> HabitService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    async fn stored_habit(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<health_track_data::models::habit::Habit, ServiceError> {
        self.repository
            .get_by_id(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Habit with ID {} not found", id)))
    }

    async fn stats_for(&self, habit_id: &str) -> Result<HabitStats, ServiceError> {
        let checkins: Vec<HabitCheckin> = self
            .repository
            .list_checkins(habit_id, None, None)
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_checkin)
            .collect();
        Ok(compute_stats(&checkins, Utc::now().date_naive()))
    }

    async fn with_stats(&self, habit: health_track_data::models::habit::Habit) -> Result<Habit, ServiceError> {
        let stats = self.stats_for(&habit.id).await?;
        Ok(conversions::convert_to_domain_habit(habit, stats))
    }
}

#[async_trait]
impl<R: HabitRepositoryTrait + Send + Sync> HabitServiceTrait for HabitService<R> {
    async fn create_habit(&self, user_id: &str, request: CreateHabitRequest) -> Result<Habit, ServiceError> {
        validate_request(&request)?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("name: Name is required".to_string()));
        }

        let stored = self
            .repository
            .create(NewHabit {
                user_id: user_id.to_string(),
                name,
                description: request.description,
            })
            .await?;
        Ok(conversions::convert_to_domain_habit(stored, HabitStats::default()))
    }

    async fn list_habits(&self, user_id: &str, include_archived: bool) -> Result<Vec<Habit>, ServiceError> {
        let stored = self.repository.list(user_id, include_archived).await?;
        let mut habits = Vec::with_capacity(stored.len());
        for habit in stored {
            habits.push(self.with_stats(habit).await?);
        }
        Ok(habits)
    }

    async fn get_habit(&self, user_id: &str, id: &str) -> Result<Habit, ServiceError> {
        let habit = self.stored_habit(user_id, id).await?;
        self.with_stats(habit).await
    }

    async fn set_archived(&self, user_id: &str, id: &str, archived: bool) -> Result<Habit, ServiceError> {
        let habit = self
            .repository
            .set_archived(user_id, id, archived)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Habit with ID {} not found", id)))?;
        self.with_stats(habit).await
    }

    async fn delete_habit(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Habit with ID {} not found", id)))
        }
    }

    async fn check_in(&self, user_id: &str, habit_id: &str, request: CheckinRequest) -> Result<HabitCheckin, ServiceError> {
        validate_request(&request)?;
        self.stored_habit(user_id, habit_id).await?;

        let now = Utc::now();
        let today = now.date_naive();
        let date = match &request.date {
            Some(raw) => parse_date(raw)?,
            None => today,
        };
        if date > today {
            return Err(ServiceError::Validation(
                "Cannot check in for a future date".to_string(),
            ));
        }

        let stored = self
            .repository
            .upsert_checkin(StoredCheckin {
                habit_id: habit_id.to_string(),
                checkin_date: date.format("%Y-%m-%d").to_string(),
                completed: request.completed.unwrap_or(true),
                note: request.note,
                created_at: format_timestamp(now),
            })
            .await?;
        Ok(conversions::convert_to_domain_checkin(stored))
    }

    async fn list_checkins(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Vec<HabitCheckin>, ServiceError> {
        if let Some(start) = &start_date {
            parse_date(start)?;
        }
        if let Some(end) = &end_date {
            parse_date(end)?;
        }
        self.stored_habit(user_id, habit_id).await?;

        let checkins = self
            .repository
            .list_checkins(habit_id, start_date.as_deref(), end_date.as_deref())
            .await?;
        Ok(checkins.into_iter().map(conversions::convert_to_domain_checkin).collect())
    }

    async fn get_stats(&self, user_id: &str, habit_id: &str) -> Result<HabitStats, ServiceError> {
        self.stored_habit(user_id, habit_id).await?;
        self.stats_for(habit_id).await
    }
}
