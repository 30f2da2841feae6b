use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String, // always lowercased
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub created_at: OffsetDateTime,
}

impl User {
    /// Builds a fresh identity. `username` must already be normalized.
    pub fn new(username: &str, password_hash: String) -> Result<Self, AppError> {
        if username.is_empty() || username != username.to_lowercase() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "username not normalized before building identity"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}
