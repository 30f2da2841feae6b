use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::{auth::repo_types::User, db::is_unique_violation, error::AppError};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Exact match on the stored (lowercased) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Fails with `UsernameTaken` when the username already exists.
    async fn insert(&self, user: &User) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.db)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                debug!(username = %user.username, "insert lost the username race");
                Err(AppError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }
}
