//! Process-local store for tests and `serve --in-memory`.

use super::UserStore;
use crate::error::AppError;
use crate::model::{NewUser, User};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<User>,
}

/// Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: new_user.name,
        };
        inner.rows.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.inner.read().await.rows.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
