//! PostgreSQL-backed store on a shared `sqlx` pool.

use super::UserStore;
use crate::config::Settings;
use crate::error::{AppError, StartupError};
use crate::model::{NewUser, User};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub(crate) const USERS_TABLE: &str = "users";

/// Quote a PostgreSQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    schema: String,
    table: String,
}

impl PgUserStore {
    /// Open the pool described by `settings`. Does not touch the schema; see [`crate::migration`].
    pub async fn connect(settings: &Settings) -> Result<Self, StartupError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.database_url)
            .await
            .map_err(StartupError::Connect)?;
        Ok(Self::from_pool(pool, &settings.schema))
    }

    /// Wrap an existing pool. `schema` must already be a validated identifier.
    pub fn from_pool(pool: PgPool, schema: &str) -> Self {
        PgUserStore {
            table: format!("{}.{}", quote_ident(schema), quote_ident(USERS_TABLE)),
            schema: schema.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id, name", self.table);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", self.table);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
