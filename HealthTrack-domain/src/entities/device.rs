use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::heart_rate::HeartRateContext;

/// Wearable vendor a user can connect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeviceProvider {
    Garmin,
    Huawei,
    AppleHealth,
}

impl DeviceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProvider::Garmin => "garmin",
            DeviceProvider::Huawei => "huawei",
            DeviceProvider::AppleHealth => "apple_health",
        }
    }
}

impl fmt::Display for DeviceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "garmin" => Ok(DeviceProvider::Garmin),
            "huawei" => Ok(DeviceProvider::Huawei),
            "apple_health" => Ok(DeviceProvider::AppleHealth),
            other => Err(format!(
                "Unknown device provider '{}'. Expected garmin, huawei or apple_health",
                other
            )),
        }
    }
}

/// State of a provider connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeviceConnectionStatus {
    Connected,
    Syncing,
    Error,
}

impl DeviceConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceConnectionStatus::Connected => "connected",
            DeviceConnectionStatus::Syncing => "syncing",
            DeviceConnectionStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "connected" => DeviceConnectionStatus::Connected,
            "syncing" => DeviceConnectionStatus::Syncing,
            _ => DeviceConnectionStatus::Error,
        }
    }
}

/// A provider connection as shown to its owner. The secret never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DeviceCredential {
    pub id: String,
    pub provider: DeviceProvider,
    pub account: String,
    pub has_secret: bool,
    pub status: DeviceConnectionStatus,
    pub last_sync_at: Option<String>,
    pub last_sync_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request payload for connecting or updating a provider
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ConnectDeviceRequest {
    #[validate(length(min = 1, max = 200, message = "Account must be between 1 and 200 characters"))]
    pub account: String,

    /// Password or API token for the provider account
    #[validate(length(min = 1, max = 4096, message = "Secret must be between 1 and 4096 characters"))]
    pub secret: String,
}

/// One measurement pulled from a wearable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceSample {
    BloodPressure {
        systolic: u16,
        diastolic: u16,
        pulse: Option<u16>,
        /// RFC 3339
        timestamp: String,
        device_id: Option<String>,
    },
    HeartRate {
        bpm: u16,
        context: Option<HeartRateContext>,
        /// RFC 3339
        timestamp: String,
        device_id: Option<String>,
    },
}

/// Batch of samples pushed for a connected provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SyncRequest {
    pub samples: Vec<DeviceSample>,
}

/// Outcome of a sync import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SyncReport {
    pub provider: DeviceProvider,
    pub blood_pressure_imported: u32,
    pub heart_rate_imported: u32,

    /// Samples already stored for this provider and timestamp
    pub duplicates: u32,

    /// Samples that failed validation
    pub invalid: u32,

    pub synced_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("apple_health".parse::<DeviceProvider>().unwrap(), DeviceProvider::AppleHealth);
        assert!("fitbit".parse::<DeviceProvider>().is_err());
        assert_eq!(DeviceProvider::Garmin.to_string(), "garmin");
    }

    #[test]
    fn test_samples_are_tagged_by_kind() {
        let json = r#"[
            {"kind": "blood_pressure", "systolic": 128, "diastolic": 82, "pulse": 70,
             "timestamp": "2024-03-01T07:00:00Z", "device_id": null},
            {"kind": "heart_rate", "bpm": 64, "context": "resting",
             "timestamp": "2024-03-01T07:01:00Z", "device_id": "watch-1"}
        ]"#;
        let samples: Vec<DeviceSample> = serde_json::from_str(json).unwrap();
        assert!(matches!(samples[0], DeviceSample::BloodPressure { systolic: 128, .. }));
        assert!(matches!(
            samples[1],
            DeviceSample::HeartRate { bpm: 64, context: Some(HeartRateContext::Resting), .. }
        ));
    }
}
