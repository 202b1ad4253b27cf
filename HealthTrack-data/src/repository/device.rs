use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::now_timestamp;
use crate::database::DatabasePool;
use crate::models::device::{DeviceCredential, NewDeviceCredential, SyncStatusUpdate};

const COLUMNS: &str = "id, user_id, provider, account, secret, status, last_sync_at, last_sync_message, created_at, updated_at";

/// Repository trait for wearable-provider credentials
#[async_trait]
pub trait DeviceCredentialRepositoryTrait {
    /// Connect a provider, replacing the account and secret if already connected.
    /// Reconnecting resets the status to `connected`.
    async fn upsert(&self, credential: NewDeviceCredential) -> Result<DeviceCredential, RepositoryError>;

    async fn list(&self, user_id: &str) -> Result<Vec<DeviceCredential>, RepositoryError>;

    async fn get(&self, user_id: &str, provider: &str) -> Result<Option<DeviceCredential>, RepositoryError>;

    async fn delete(&self, user_id: &str, provider: &str) -> Result<bool, RepositoryError>;

    /// Record the outcome of a sync attempt
    async fn record_sync(
        &self,
        user_id: &str,
        provider: &str,
        update: SyncStatusUpdate,
    ) -> Result<Option<DeviceCredential>, RepositoryError>;
}

/// SQLite-backed credential repository
#[derive(Debug, Clone)]
pub struct SqliteDeviceCredentialRepository {
    pool: DatabasePool,
}

impl SqliteDeviceCredentialRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn fetch(&self, user_id: &str, provider: &str) -> Result<Option<DeviceCredential>, RepositoryError> {
        let conn = self.pool.get()?;
        let credential = conn
            .query_row(
                &format!(
                    "SELECT {} FROM device_credentials WHERE user_id = ?1 AND provider = ?2",
                    COLUMNS
                ),
                params![user_id, provider],
                map_credential,
            )
            .optional()?;
        Ok(credential)
    }
}

fn map_credential(row: &Row<'_>) -> rusqlite::Result<DeviceCredential> {
    Ok(DeviceCredential {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider: row.get(2)?,
        account: row.get(3)?,
        secret: row.get(4)?,
        status: row.get(5)?,
        last_sync_at: row.get(6)?,
        last_sync_message: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[async_trait]
impl DeviceCredentialRepositoryTrait for SqliteDeviceCredentialRepository {
    async fn upsert(&self, credential: NewDeviceCredential) -> Result<DeviceCredential, RepositoryError> {
        debug!(
            "Storing device credential: user={} provider={}",
            credential.user_id, credential.provider
        );

        let now = now_timestamp();
        {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO device_credentials
                    (id, user_id, provider, account, secret, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'connected', ?6, ?6)
                 ON CONFLICT(user_id, provider) DO UPDATE SET
                    account = excluded.account,
                    secret = excluded.secret,
                    status = 'connected',
                    last_sync_message = NULL,
                    updated_at = excluded.updated_at",
                params![
                    Uuid::new_v4().to_string(),
                    credential.user_id,
                    credential.provider,
                    credential.account,
                    credential.secret,
                    now,
                ],
            )?;
        }

        self.fetch(&credential.user_id, &credential.provider)?
            .ok_or_else(|| RepositoryError::NotFound(format!("credential for {}", credential.provider)))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<DeviceCredential>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM device_credentials WHERE user_id = ?1 ORDER BY provider",
            COLUMNS
        ))?;
        let credentials = stmt
            .query_map([user_id], map_credential)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(credentials)
    }

    async fn get(&self, user_id: &str, provider: &str) -> Result<Option<DeviceCredential>, RepositoryError> {
        self.fetch(user_id, provider)
    }

    async fn delete(&self, user_id: &str, provider: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM device_credentials WHERE user_id = ?1 AND provider = ?2",
            params![user_id, provider],
        )?;
        Ok(deleted > 0)
    }

    async fn record_sync(
        &self,
        user_id: &str,
        provider: &str,
        update: SyncStatusUpdate,
    ) -> Result<Option<DeviceCredential>, RepositoryError> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE device_credentials
                 SET status = ?3, last_sync_message = ?4,
                     last_sync_at = COALESCE(?5, last_sync_at), updated_at = ?6
                 WHERE user_id = ?1 AND provider = ?2",
                params![
                    user_id,
                    provider,
                    update.status,
                    update.message,
                    update.synced_at,
                    now_timestamp()
                ],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.fetch(user_id, provider)
    }
}
