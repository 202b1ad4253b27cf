use crate::entities::blood_pressure::BloodPressureCategory;
use crate::entities::heart_rate::HeartRateCategory;

/// Categorize blood pressure based on measurements.
///
/// Grades are checked from most to least severe and the first match wins, so
/// a reading is graded by whichever of the two pressures is worse.
pub fn categorize_blood_pressure(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 110 {
        BloodPressureCategory::Grade3Hypertension
    } else if systolic >= 160 || diastolic >= 100 {
        BloodPressureCategory::Grade2Hypertension
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Grade1Hypertension
    } else if systolic >= 120 || diastolic >= 80 {
        BloodPressureCategory::HighNormal
    } else if systolic < 90 || diastolic < 60 {
        BloodPressureCategory::Low
    } else {
        BloodPressureCategory::Normal
    }
}

/// Whether a reading is in the most severe hypertension grade
pub fn is_hypertensive_crisis(systolic: u16, diastolic: u16) -> bool {
    categorize_blood_pressure(systolic, diastolic) == BloodPressureCategory::Grade3Hypertension
}

/// Categorize a heart rate in beats per minute
pub fn categorize_heart_rate(bpm: u16) -> HeartRateCategory {
    if bpm < 60 {
        HeartRateCategory::Low
    } else if bpm <= 100 {
        HeartRateCategory::Normal
    } else {
        HeartRateCategory::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bp_category_normal() {
        assert_eq!(categorize_blood_pressure(110, 75), BloodPressureCategory::Normal);
        assert_eq!(categorize_blood_pressure(119, 79), BloodPressureCategory::Normal);
    }

    #[test]
    fn test_bp_category_high_normal_starts_at_120_80() {
        assert_eq!(categorize_blood_pressure(120, 80), BloodPressureCategory::HighNormal);
        assert_eq!(categorize_blood_pressure(120, 70), BloodPressureCategory::HighNormal);
        assert_eq!(categorize_blood_pressure(110, 85), BloodPressureCategory::HighNormal);
    }

    #[test]
    fn test_bp_category_grades() {
        // Either pressure can push a reading into a grade
        assert_eq!(categorize_blood_pressure(145, 75), BloodPressureCategory::Grade1Hypertension);
        assert_eq!(categorize_blood_pressure(120, 95), BloodPressureCategory::Grade1Hypertension);
        assert_eq!(categorize_blood_pressure(160, 80), BloodPressureCategory::Grade2Hypertension);
        assert_eq!(categorize_blood_pressure(130, 105), BloodPressureCategory::Grade2Hypertension);
        assert_eq!(categorize_blood_pressure(180, 80), BloodPressureCategory::Grade3Hypertension);
        assert_eq!(categorize_blood_pressure(130, 110), BloodPressureCategory::Grade3Hypertension);
    }

    #[test]
    fn test_bp_category_low() {
        assert_eq!(categorize_blood_pressure(85, 65), BloodPressureCategory::Low);
        assert_eq!(categorize_blood_pressure(100, 55), BloodPressureCategory::Low);
        // High diastolic wins over low systolic
        assert_eq!(categorize_blood_pressure(85, 92), BloodPressureCategory::Grade1Hypertension);
    }

    #[test]
    fn test_crisis_is_grade_three() {
        assert!(is_hypertensive_crisis(185, 75));
        assert!(!is_hypertensive_crisis(179, 109));
    }

    #[test]
    fn test_heart_rate_boundaries() {
        assert_eq!(categorize_heart_rate(59), HeartRateCategory::Low);
        assert_eq!(categorize_heart_rate(60), HeartRateCategory::Normal);
        assert_eq!(categorize_heart_rate(100), HeartRateCategory::Normal);
        assert_eq!(categorize_heart_rate(101), HeartRateCategory::High);
    }
}
