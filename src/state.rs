use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::db;
use crate::timelogs::repo::{PgTimeLogRepo, TimeLogRepo};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub logs: Arc<dyn TimeLogRepo>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config.db).await?;
        Self::with_pool(config, pool).await
    }

    /// Brings the schema up to date before any store is handed out.
    pub async fn with_pool(config: Arc<AppConfig>, pool: PgPool) -> anyhow::Result<Self> {
        db::migrate(&pool).await?;

        let users = Arc::new(PgUserRepo::new(pool.clone())) as Arc<dyn UserRepo>;
        let logs = Arc::new(PgTimeLogRepo::new(pool)) as Arc<dyn TimeLogRepo>;
        Ok(Self::from_parts(config, users, logs))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        logs: Arc<dyn TimeLogRepo>,
    ) -> Self {
        Self {
            config,
            users,
            logs,
        }
    }
}
