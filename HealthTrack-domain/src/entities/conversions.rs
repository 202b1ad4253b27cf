//! Conversion functions between data models and domain entities.
//!
//! Functions follow the pattern `convert_to_[target_layer]_[model_name]`.
//! Stored enum columns that no longer parse fall back to a neutral value
//! rather than failing the whole read.

use health_track_data::models;

use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::device::{DeviceConnectionStatus, DeviceCredential, DeviceProvider};
use crate::entities::diet::{DailyDietSummary, DietRecord, MealType};
use crate::entities::goal::{Goal, GoalMetric, GoalStatus};
use crate::entities::habit::{Habit, HabitCheckin, HabitStats};
use crate::entities::heart_rate::{HeartRateContext, HeartRateReading};
use crate::entities::recommendation::{AdviceSource, Recommendation};
use crate::entities::user::{Gender, User};
use crate::services::insights::{categorize_blood_pressure, categorize_heart_rate};
use crate::services::progress::goal_progress_percent;

/// Convert from data model to domain entity for a blood pressure reading
pub fn convert_to_domain_reading(data: models::blood_pressure::BloodPressureReading) -> BloodPressureReading {
    let category = categorize_blood_pressure(data.systolic, data.diastolic);
    BloodPressureReading {
        id: data.id,
        systolic: data.systolic,
        diastolic: data.diastolic,
        pulse: data.pulse,
        notes: data.notes,
        timestamp: data.timestamp,
        position: data.position,
        arm: data.arm,
        device_id: data.device_id,
        source: data.source,
        category,
        category_label: category.label().to_string(),
    }
}

pub fn convert_to_domain_heart_rate(data: models::heart_rate::HeartRateReading) -> HeartRateReading {
    let category = categorize_heart_rate(data.bpm);
    HeartRateReading {
        id: data.id,
        bpm: data.bpm,
        context: data.context.as_deref().and_then(HeartRateContext::parse),
        notes: data.notes,
        timestamp: data.timestamp,
        device_id: data.device_id,
        source: data.source,
        category,
        category_label: category.label().to_string(),
    }
}

pub fn convert_to_domain_diet_record(data: models::diet::DietRecord) -> DietRecord {
    DietRecord {
        id: data.id,
        meal_type: MealType::parse(&data.meal_type).unwrap_or(MealType::Snack),
        food_name: data.food_name,
        calories: data.calories,
        protein_g: data.protein_g,
        carbs_g: data.carbs_g,
        fat_g: data.fat_g,
        notes: data.notes,
        recorded_at: data.recorded_at,
    }
}

pub fn convert_to_domain_daily_summary(data: models::diet::DailyDietTotals) -> DailyDietSummary {
    DailyDietSummary {
        date: data.date,
        total_calories: data.calories,
        total_protein_g: data.protein_g,
        total_carbs_g: data.carbs_g,
        total_fat_g: data.fat_g,
        meal_count: data.meal_count,
    }
}

/// Convert a stored goal, attaching its computed progress
pub fn convert_to_domain_goal(data: models::goal::Goal) -> Goal {
    Goal {
        progress_percent: goal_progress_percent(data.current_value, data.target_value),
        id: data.id,
        title: data.title,
        metric: GoalMetric::parse(&data.metric),
        target_value: data.target_value,
        current_value: data.current_value,
        unit: data.unit,
        deadline: data.deadline,
        status: GoalStatus::parse(&data.status).unwrap_or(GoalStatus::Active),
        created_at: data.created_at,
        updated_at: data.updated_at,
    }
}

/// Convert a stored habit; stats are computed by the habit service
pub fn convert_to_domain_habit(data: models::habit::Habit, stats: HabitStats) -> Habit {
    Habit {
        id: data.id,
        name: data.name,
        description: data.description,
        archived: data.archived,
        created_at: data.created_at,
        stats,
    }
}

pub fn convert_to_domain_checkin(data: models::habit::HabitCheckin) -> HabitCheckin {
    HabitCheckin {
        habit_id: data.habit_id,
        date: data.checkin_date,
        completed: data.completed,
        note: data.note,
        created_at: data.created_at,
    }
}

/// Convert a stored credential, dropping the sealed secret.
///
/// Returns `None` for a row whose provider is not one we support.
pub fn convert_to_domain_credential(data: models::device::DeviceCredential) -> Option<DeviceCredential> {
    let provider = data.provider.parse::<DeviceProvider>().ok()?;
    Some(DeviceCredential {
        id: data.id,
        provider,
        account: data.account,
        has_secret: !data.secret.is_empty(),
        status: DeviceConnectionStatus::parse(&data.status),
        last_sync_at: data.last_sync_at,
        last_sync_message: data.last_sync_message,
        created_at: data.created_at,
        updated_at: data.updated_at,
    })
}

pub fn convert_to_domain_recommendation(data: models::recommendation::Recommendation) -> Recommendation {
    Recommendation {
        id: data.id,
        source: AdviceSource::parse(&data.source),
        advice: data.advice,
        period_days: data.period_days,
        created_at: data.created_at,
    }
}

pub fn convert_to_domain_user(data: models::user::UserRecord) -> User {
    User {
        id: data.id,
        email: data.email,
        name: data.name,
        gender: data.gender.as_deref().and_then(Gender::parse),
        birth_date: data.birth_date,
        height_cm: data.height_cm,
        roles: split_roles(&data.roles),
        created_at: data.created_at,
        updated_at: data.updated_at,
    }
}

/// Roles are stored as a comma-separated column
pub fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::blood_pressure::BloodPressureCategory;

    #[test]
    fn test_reading_conversion_attaches_category() {
        let reading = convert_to_domain_reading(models::blood_pressure::BloodPressureReading {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            systolic: 120,
            diastolic: 80,
            pulse: None,
            notes: None,
            timestamp: "2024-03-01T08:00:00Z".to_string(),
            position: None,
            arm: None,
            device_id: None,
            source: "manual".to_string(),
        });
        assert_eq!(reading.category, BloodPressureCategory::HighNormal);
        assert_eq!(reading.category_label, "正常偏高");
    }

    #[test]
    fn test_credential_conversion_masks_secret() {
        let credential = convert_to_domain_credential(models::device::DeviceCredential {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            provider: "huawei".to_string(),
            account: "amy".to_string(),
            secret: "enc:v1:default:abc:def".to_string(),
            status: "connected".to_string(),
            last_sync_at: None,
            last_sync_message: None,
            created_at: "2024-03-01T08:00:00Z".to_string(),
            updated_at: "2024-03-01T08:00:00Z".to_string(),
        })
        .unwrap();
        assert!(credential.has_secret);
        assert_eq!(credential.provider, DeviceProvider::Huawei);
        assert!(!serde_json::to_string(&credential).unwrap().contains("enc:v1"));
    }

    #[test]
    fn test_split_roles() {
        assert_eq!(split_roles("user, admin,"), vec!["user", "admin"]);
        assert!(split_roles("").is_empty());
    }
}
