use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppError,
    timelogs::repo_types::{NewTimeLog, TimeLogEntry, TimeLogFilter},
};

/// Storage for time log entries. Every lookup that touches a single entry
/// matches on `id` and `owner` together.
#[async_trait]
pub trait TimeLogRepo: Send + Sync {
    async fn insert(&self, entry: &TimeLogEntry) -> Result<(), AppError>;
    /// Returns whether an entry with this id and owner was found.
    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        fields: &NewTimeLog,
        now: OffsetDateTime,
    ) -> Result<bool, AppError>;
    /// Returns whether an entry with this id and owner was found.
    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, AppError>;
    /// Matching entries ordered by day, then creation time.
    async fn query(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLogEntry>, AppError>;
}

#[derive(Clone)]
pub struct PgTimeLogRepo {
    db: PgPool,
}

impl PgTimeLogRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeLogRepo for PgTimeLogRepo {
    async fn insert(&self, entry: &TimeLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO time_logs (id, owner, day, hours, activity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.owner)
        .bind(entry.day)
        .bind(entry.hours)
        .bind(entry.activity.as_deref())
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        fields: &NewTimeLog,
        now: OffsetDateTime,
    ) -> Result<bool, AppError> {
        // activity is always written, so an omitted one clears the column
        let res = sqlx::query(
            r#"
            UPDATE time_logs
               SET day = $3, hours = $4, activity = $5, updated_at = $6
             WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(fields.day)
        .bind(fields.hours)
        .bind(fields.activity.as_deref())
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, AppError> {
        let res = sqlx::query(
            r#"
            DELETE FROM time_logs
             WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn query(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, TimeLogEntry>(
            r#"
            SELECT id, owner, day, hours, activity, created_at, updated_at
              FROM time_logs
             WHERE owner = $1
               AND ($2::date IS NULL OR day >= $2)
               AND ($3::date IS NULL OR day <= $3)
             ORDER BY day ASC, created_at ASC
            "#,
        )
        .bind(&filter.owner)
        .bind(filter.range.start)
        .bind(filter.range.end)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
