//! Process wiring: store construction, migration gate, listener.
//! Every failure is returned as a [`StartupError`]; the binary decides how to exit.

use crate::config::Settings;
use crate::error::StartupError;
use crate::migration::{apply_migrations, pending_migrations};
use crate::routes::app;
use crate::state::AppState;
use crate::store::{MemoryUserStore, PgUserStore, UserStore};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Connect and bring the schema up to date. Returns the versions applied (empty when current).
pub async fn migrate(settings: &Settings) -> Result<Vec<i64>, StartupError> {
    let store = PgUserStore::connect(settings).await?;
    let applied = apply_migrations(store.pool(), store.schema())
        .await
        .map_err(StartupError::Migration)?;
    if applied.is_empty() {
        tracing::info!("schema {} is up to date", store.schema());
    } else {
        tracing::info!("applied migrations {:?} to schema {}", applied, store.schema());
    }
    Ok(applied)
}

/// Open the PostgreSQL store. With `run_migrations` the schema is migrated first;
/// otherwise any pending migration is a startup error.
pub async fn postgres_store(settings: &Settings, run_migrations: bool) -> Result<PgUserStore, StartupError> {
    let store = PgUserStore::connect(settings).await?;
    if run_migrations {
        apply_migrations(store.pool(), store.schema())
            .await
            .map_err(StartupError::Migration)?;
    }
    let pending = pending_migrations(store.pool(), store.schema())
        .await
        .map_err(StartupError::Migration)?;
    if !pending.is_empty() {
        return Err(StartupError::PendingMigrations(pending));
    }
    Ok(store)
}

pub fn memory_store() -> MemoryUserStore {
    tracing::warn!("using in-memory store; data is lost on exit");
    MemoryUserStore::new()
}

/// Bind `settings.bind_addr` and serve until the listener fails.
pub async fn serve(settings: &Settings, store: Arc<dyn UserStore>) -> Result<(), StartupError> {
    let router = app(AppState::new(store), settings.max_body_bytes);
    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: settings.bind_addr,
            source,
        })?;
    let local = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!("listening on http://{}", local);
    axum::serve(listener, router).await.map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = Settings::from_lookup(|k| match k {
            "BIND_ADDR" => Some(taken.local_addr().unwrap().to_string()),
            _ => None,
        })
        .unwrap();
        let err = serve(&settings, Arc::new(MemoryUserStore::new())).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }

    #[test]
    fn pending_migrations_message_names_the_fix() {
        let msg = StartupError::PendingMigrations(vec![1]).to_string();
        assert!(msg.contains("users-api migrate"));
    }
}
