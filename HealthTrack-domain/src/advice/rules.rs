use async_trait::async_trait;

use crate::entities::analysis::HealthAnalysis;
use crate::entities::blood_pressure::BloodPressureCategory;
use crate::entities::goal::GoalStatus;
use crate::entities::heart_rate::HeartRateCategory;
use crate::entities::recommendation::AdviceSource;

use super::{AdviceError, AdviceProvider};

/// Habits below this completion rate get a nudge
const LOW_COMPLETION_RATE: u32 = 50;

/// Check-ins needed before a completion rate is worth commenting on
const MIN_CHECKINS_FOR_RATE: u32 = 3;

/// Active goals below this progress are considered stalled
const STALLED_GOAL_PERCENT: f64 = 25.0;

const STREAK_PRAISE_DAYS: u32 = 7;

/// Deterministic advice from fixed thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Advice lines for an analysis. Never empty.
    pub fn advice_for(&self, analysis: &HealthAnalysis) -> Vec<String> {
        let mut advice = Vec::new();

        if let Some(bp) = &analysis.blood_pressure {
            if bp.crisis_count > 0 {
                advice.push(format!(
                    "{} reading(s) reached {}. Seek medical attention if readings stay this high or you have symptoms.",
                    bp.crisis_count,
                    BloodPressureCategory::Grade3Hypertension.label()
                ));
            }
            match bp.category {
                BloodPressureCategory::Grade1Hypertension
                | BloodPressureCategory::Grade2Hypertension
                | BloodPressureCategory::Grade3Hypertension => advice.push(format!(
                    "Your average blood pressure ({:.0}/{:.0}) is in the {} range. Reduce salt, stay active and review it with your doctor.",
                    bp.avg_systolic, bp.avg_diastolic, bp.category_label
                )),
                BloodPressureCategory::HighNormal => advice.push(format!(
                    "Your average blood pressure ({:.0}/{:.0}) is {}. Keep salt low and measure regularly.",
                    bp.avg_systolic, bp.avg_diastolic, bp.category_label
                )),
                BloodPressureCategory::Low => advice.push(
                    "Your blood pressure runs low. Drink enough water and stand up slowly.".to_string(),
                ),
                BloodPressureCategory::Normal => {}
            }
        }

        if let Some(hr) = &analysis.heart_rate {
            match hr.category {
                HeartRateCategory::High => advice.push(format!(
                    "Your average heart rate ({:.0} bpm) is {}. Limit caffeine and check it again at rest.",
                    hr.avg_bpm, hr.category_label
                )),
                HeartRateCategory::Low => advice.push(format!(
                    "Your average heart rate ({:.0} bpm) is {}. Talk to a doctor if you feel dizzy or tired.",
                    hr.avg_bpm, hr.category_label
                )),
                HeartRateCategory::Normal => {}
            }
        }

        if let Some(diet) = &analysis.diet {
            if diet.avg_daily_calories > 2500.0 {
                advice.push(format!(
                    "You averaged {:.0} kcal per logged day. Smaller portions would help.",
                    diet.avg_daily_calories
                ));
            } else if diet.avg_daily_calories < 1200.0 {
                advice.push(format!(
                    "You averaged only {:.0} kcal per logged day. Make sure you eat enough.",
                    diet.avg_daily_calories
                ));
            }
        }

        for goal in &analysis.goals {
            if goal.status == GoalStatus::Active && goal.progress_percent < STALLED_GOAL_PERCENT {
                advice.push(format!(
                    "Goal \"{}\" is at {:.0}%. Try a smaller first milestone.",
                    goal.title, goal.progress_percent
                ));
            }
        }

        for habit in &analysis.habits {
            let stats = &habit.stats;
            if stats.total_count >= MIN_CHECKINS_FOR_RATE && stats.completion_rate < LOW_COMPLETION_RATE {
                advice.push(format!(
                    "Habit \"{}\" is completed {}% of the time. Pick a fixed time of day for it.",
                    habit.name, stats.completion_rate
                ));
            } else if stats.current_streak >= STREAK_PRAISE_DAYS {
                advice.push(format!(
                    "{} days in a row for \"{}\". Keep it going!",
                    stats.current_streak, habit.name
                ));
            }
        }

        if advice.is_empty() {
            advice.push(if analysis.is_empty() {
                "Start logging blood pressure, meals and habits to get personal advice.".to_string()
            } else {
                "Everything looks on track. Keep up your current routine.".to_string()
            });
        }

        advice
    }
}

#[async_trait]
impl AdviceProvider for RuleBasedAdvisor {
    fn source(&self) -> AdviceSource {
        AdviceSource::Rules
    }

    async fn advise(&self, analysis: &HealthAnalysis) -> Result<Vec<String>, AdviceError> {
        Ok(self.advice_for(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::blood_pressure::BloodPressureInsights;
    use crate::entities::habit::{Habit, HabitStats};
    use chrono::Utc;

    fn empty_analysis() -> HealthAnalysis {
        HealthAnalysis {
            period_days: 30,
            generated_at: Utc::now(),
            blood_pressure: None,
            heart_rate: None,
            diet: None,
            goals: Vec::new(),
            habits: Vec::new(),
        }
    }

    fn bp(avg_systolic: f64, avg_diastolic: f64, category: BloodPressureCategory, crisis_count: usize) -> BloodPressureInsights {
        BloodPressureInsights {
            avg_systolic,
            avg_diastolic,
            avg_pulse: None,
            max_systolic: 190,
            max_diastolic: 100,
            min_systolic: 120,
            min_diastolic: 80,
            category,
            category_label: category.label().to_string(),
            crisis_count,
            reading_count: 4,
            period_days: 30,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_analysis_gets_starter_advice() {
        let advice = RuleBasedAdvisor::new().advice_for(&empty_analysis());
        assert_eq!(advice.len(), 1);
        assert!(advice[0].contains("Start logging"));
    }

    #[test]
    fn test_hypertension_and_crisis_advice() {
        let mut analysis = empty_analysis();
        analysis.blood_pressure = Some(bp(150.0, 95.0, BloodPressureCategory::Grade1Hypertension, 1));

        let advice = RuleBasedAdvisor::new().advice_for(&analysis);
        assert_eq!(advice.len(), 2);
        assert!(advice[0].contains("3级高血压"));
        assert!(advice[1].contains("1级高血压"));
    }

    #[test]
    fn test_low_completion_habit_advice() {
        let mut analysis = empty_analysis();
        analysis.habits.push(Habit {
            id: "h1".to_string(),
            name: "Stretch".to_string(),
            description: None,
            archived: false,
            created_at: "2024-03-01T00:00:00Z".to_string(),
            stats: HabitStats {
                total_count: 10,
                completed_count: 3,
                completion_rate: 30,
                current_streak: 0,
                longest_streak: 2,
                last_checkin: None,
            },
        });

        let advice = RuleBasedAdvisor::new().advice_for(&analysis);
        assert!(advice.iter().any(|line| line.contains("Stretch") && line.contains("30%")));
    }

    #[tokio::test]
    async fn test_provider_source_is_rules() {
        let advisor = RuleBasedAdvisor::new();
        assert_eq!(advisor.source(), AdviceSource::Rules);
        assert!(!advisor.advise(&empty_analysis()).await.unwrap().is_empty());
    }
}
