use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use health_track_data::models::device::{NewDeviceCredential, SyncStatusUpdate};
use health_track_data::repository::DeviceCredentialRepositoryTrait;

use crate::entities::blood_pressure::CreateBloodPressureRequest;
use crate::entities::common::format_timestamp;
use crate::entities::conversions;
use crate::entities::device::{
    ConnectDeviceRequest, DeviceConnectionStatus, DeviceCredential, DeviceProvider, DeviceSample, SyncReport,
    SyncRequest,
};
use crate::entities::heart_rate::CreateHeartRateRequest;
use crate::error::{validate_request, ServiceError};
use crate::security::CredentialCipher;
use crate::services::blood_pressure::BloodPressureServiceTrait;
use crate::services::heart_rate::HeartRateServiceTrait;

#[async_trait]
pub trait DeviceServiceTrait: Send + Sync {
    /// Connect a provider, replacing any existing credential for it
    async fn connect(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        request: ConnectDeviceRequest,
    ) -> Result<DeviceCredential, ServiceError>;

    async fn list(&self, user_id: &str) -> Result<Vec<DeviceCredential>, ServiceError>;

    async fn disconnect(&self, user_id: &str, provider: DeviceProvider) -> Result<(), ServiceError>;

    /// Import samples fetched from a connected provider.
    ///
    /// Timestamps are stored at whole-second precision, so two samples of the
    /// same kind from one provider within the same second count as duplicates.
    async fn sync(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        request: SyncRequest,
    ) -> Result<SyncReport, ServiceError>;
}

pub struct DeviceService<R: DeviceCredentialRepositoryTrait> {
    repository: R,
    cipher: CredentialCipher,
    blood_pressure: Arc<dyn BloodPressureServiceTrait>,
    heart_rate: Arc<dyn HeartRateServiceTrait>,
}

impl<R: DeviceCredentialRepositoryTrait + Send + Sync> DeviceService<R> {
    pub fn new(
        repository: R,
        cipher: CredentialCipher,
        blood_pressure: Arc<dyn BloodPressureServiceTrait>,
        heart_rate: Arc<dyn HeartRateServiceTrait>,
    ) -> Self {
        Self {
            repository,
            cipher,
            blood_pressure,
            heart_rate,
        }
    }

    async fn record_status(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        status: DeviceConnectionStatus,
        message: Option<String>,
        synced_at: Option<String>,
    ) -> Result<(), ServiceError> {
        self.repository
            .record_sync(
                user_id,
                provider.as_str(),
                SyncStatusUpdate {
                    status: status.as_str().to_string(),
                    message,
                    synced_at,
                },
            )
            .await?;
        Ok(())
    }

    async fn import_samples(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        samples: Vec<DeviceSample>,
        report: &mut SyncReport,
    ) -> Result<(), ServiceError> {
        let source = provider.as_str();

        for sample in samples {
            let (outcome, is_blood_pressure) = match sample {
                DeviceSample::BloodPressure {
                    systolic,
                    diastolic,
                    pulse,
                    timestamp,
                    device_id,
                } => {
                    let request = CreateBloodPressureRequest {
                        systolic,
                        diastolic,
                        pulse,
                        notes: None,
                        timestamp: Some(timestamp),
                        position: None,
                        arm: None,
                        device_id,
                    };
                    (self.blood_pressure.import_reading(user_id, request, source).await, true)
                }
                DeviceSample::HeartRate {
                    bpm,
                    context,
                    timestamp,
                    device_id,
                } => {
                    let request = CreateHeartRateRequest {
                        bpm,
                        context,
                        notes: None,
                        timestamp: Some(timestamp),
                        device_id,
                    };
                    (self.heart_rate.import_reading(user_id, request, source).await, false)
                }
            };

            match outcome {
                Ok(true) if is_blood_pressure => report.blood_pressure_imported += 1,
                Ok(true) => report.heart_rate_imported += 1,
                Ok(false) => report.duplicates += 1,
                Err(ServiceError::Validation(reason)) => {
                    warn!("Skipping invalid {} sample for user {}: {}", source, user_id, reason);
                    report.invalid += 1;
                }
                Err(other) => return Err(other),
            }
        }

        Ok(())
    }
}

fn not_connected(provider: DeviceProvider) -> ServiceError {
    ServiceError::NotFound(format!("Device provider {} is not connected", provider))
}

#[async_trait]
impl<R: DeviceCredentialRepositoryTrait + Send + Sync> DeviceServiceTrait for DeviceService<R> {
    async fn connect(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        request: ConnectDeviceRequest,
    ) -> Result<DeviceCredential, ServiceError> {
        validate_request(&request)?;

        let secret = self
            .cipher
            .seal(&request.secret)
            .map_err(|e| ServiceError::Crypto(e.to_string()))?;

        let stored = self
            .repository
            .upsert(NewDeviceCredential {
                user_id: user_id.to_string(),
                provider: provider.as_str().to_string(),
                account: request.account.trim().to_string(),
                secret,
            })
            .await?;

        info!("User {} connected device provider {}", user_id, provider);
        conversions::convert_to_domain_credential(stored)
            .ok_or_else(|| ServiceError::Internal(format!("Stored provider {} is not recognized", provider)))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<DeviceCredential>, ServiceError> {
        let stored = self.repository.list(user_id).await?;
        Ok(stored
            .into_iter()
            .filter_map(conversions::convert_to_domain_credential)
            .collect())
    }

    async fn disconnect(&self, user_id: &str, provider: DeviceProvider) -> Result<(), ServiceError> {
        if self.repository.delete(user_id, provider.as_str()).await? {
            info!("User {} disconnected device provider {}", user_id, provider);
            Ok(())
        } else {
            Err(not_connected(provider))
        }
    }

    async fn sync(
        &self,
        user_id: &str,
        provider: DeviceProvider,
        request: SyncRequest,
    ) -> Result<SyncReport, ServiceError> {
        let credential = self
            .repository
            .get(user_id, provider.as_str())
            .await?
            .ok_or_else(|| not_connected(provider))?;

        // The secret must still open with the configured key
        if let Err(e) = self.cipher.open(&credential.secret) {
            error!("Stored {} credential for user {} cannot be opened: {}", provider, user_id, e);
            self.record_status(
                user_id,
                provider,
                DeviceConnectionStatus::Error,
                Some("Stored credential could not be decrypted; reconnect the device".to_string()),
                None,
            )
            .await?;
            return Err(ServiceError::Crypto(e.to_string()));
        }

        self.record_status(
            user_id,
            provider,
            DeviceConnectionStatus::Syncing,
            None,
            None,
        )
        .await?;

        let mut report = SyncReport {
            provider,
            blood_pressure_imported: 0,
            heart_rate_imported: 0,
            duplicates: 0,
            invalid: 0,
            synced_at: String::new(),
        };

        if let Err(e) = self.import_samples(user_id, provider, request.samples, &mut report).await {
            self.record_status(
                user_id,
                provider,
                DeviceConnectionStatus::Error,
                Some(format!("Sync failed: {}", e)),
                None,
            )
            .await?;
            return Err(e);
        }

        let message = format!(
            "Imported {} blood pressure and {} heart rate samples ({} duplicates, {} invalid)",
            report.blood_pressure_imported, report.heart_rate_imported, report.duplicates, report.invalid
        );
        info!("Device sync for user {} via {}: {}", user_id, provider, message);

        report.synced_at = format_timestamp(Utc::now());
        self.record_status(
            user_id,
            provider,
            DeviceConnectionStatus::Connected,
            Some(message),
            Some(report.synced_at.clone()),
        )
        .await?;

        Ok(report)
    }
}
