use serde::{Deserialize, Serialize};

/// Storage model for a wearable-provider credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceCredential {
    pub id: String,
    pub user_id: String,

    /// garmin, huawei or apple_health
    pub provider: String,

    /// Account name at the provider
    pub account: String,

    /// Sealed secret envelope, never plaintext
    pub secret: String,

    /// connected or error
    pub status: String,

    pub last_sync_at: Option<String>,
    pub last_sync_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input data for connecting (or reconnecting) a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeviceCredential {
    pub user_id: String,
    pub provider: String,
    pub account: String,
    pub secret: String,
}

/// Outcome of a sync attempt recorded on the credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusUpdate {
    pub status: String,
    pub message: Option<String>,
    /// Completion time of a successful sync; `None` keeps the previous value
    pub synced_at: Option<String>,
}
