//! Data store adapter: every read and write of users goes through [`UserStore`].

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::{quote_ident, PgUserStore};

use crate::error::AppError;
use crate::model::{NewUser, User};
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert one user and return it with its assigned id.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// All stored users, ordered by id.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
