//! Users API: create and list users over HTTP, persisted in PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError, StartupError};
pub use migration::{apply_migrations, pending_migrations};
pub use model::{NewUser, User};
pub use routes::{app, common_routes, user_routes};
pub use state::AppState;
pub use store::{MemoryUserStore, PgUserStore, UserStore};
