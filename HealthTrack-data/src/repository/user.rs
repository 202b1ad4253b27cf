use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::now_timestamp;
use crate::database::DatabasePool;
use crate::models::user::{NewUser, UserProfileUpdate, UserRecord};

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait {
    /// Insert a user. A duplicate email is a `Conflict`.
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Get a user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Get a user by (lower-cased) email
    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Apply a profile update, returning the stored user
    async fn update_profile(
        &self,
        id: &str,
        update: UserProfileUpdate,
    ) -> Result<Option<UserRecord>, RepositoryError>;
}

/// SQLite-backed user repository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn find_one(&self, column: &str, value: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT id, email, password_hash, name, gender, birth_date, height_cm, roles, created_at, updated_at
             FROM users WHERE {} = ?1",
            column
        );
        let user = conn.query_row(&sql, [value], map_user).optional()?;
        Ok(user)
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        gender: row.get(4)?,
        birth_date: row.get(5)?,
        height_cm: row.get(6)?,
        roles: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[async_trait]
impl UserRepositoryTrait for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        let now = now_timestamp();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            gender: None,
            birth_date: None,
            height_cm: None,
            roles: user.roles,
            created_at: now.clone(),
            updated_at: now,
        };

        debug!("Storing user: id={}", record.id);

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, roles, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.email,
                record.password_hash,
                record.name,
                record.roles,
                record.created_at,
                record.updated_at,
            ],
        )
        .map_err(|e| RepositoryError::from_insert(e, "email is already registered"))?;

        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_one("id", id)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_one("email", email)
    }

    async fn update_profile(
        &self,
        id: &str,
        update: UserProfileUpdate,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    gender = COALESCE(?3, gender),
                    birth_date = COALESCE(?4, birth_date),
                    height_cm = COALESCE(?5, height_cm),
                    updated_at = ?6
                 WHERE id = ?1",
                params![
                    id,
                    update.name,
                    update.gender,
                    update.birth_date,
                    update.height_cm,
                    now_timestamp(),
                ],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.find_one("id", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: None,
            roles: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let repo = SqliteUserRepository::new(DatabasePool::in_memory().unwrap());
        let created = repo.create(new_user("ann@example.com")).await.unwrap();

        let by_email = repo.get_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ann@example.com");

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = SqliteUserRepository::new(DatabasePool::in_memory().unwrap());
        repo.create(new_user("dup@example.com")).await.unwrap();

        let err = repo.create(new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let repo = SqliteUserRepository::new(DatabasePool::in_memory().unwrap());
        let created = repo.create(new_user("bo@example.com")).await.unwrap();

        repo.update_profile(
            &created.id,
            UserProfileUpdate {
                name: Some("Bo".to_string()),
                height_cm: Some(172.5),
                ..UserProfileUpdate::default()
            },
        )
        .await
        .unwrap();

        let updated = repo
            .update_profile(
                &created.id,
                UserProfileUpdate {
                    gender: Some("female".to_string()),
                    ..UserProfileUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Bo"));
        assert_eq!(updated.height_cm, Some(172.5));
        assert_eq!(updated.gender.as_deref(), Some("female"));

        assert!(repo
            .update_profile("missing", UserProfileUpdate::default())
            .await
            .unwrap()
            .is_none());
    }
}
