//! Repository layer for data access operations.
//!
//! Every backend implements [`UserStore`]; the configured one is chosen at
//! startup.

mod memory_repo;
mod traits;
mod user_repo;

use std::sync::Arc;

pub use memory_repo::MemoryUserRepository;
pub use traits::UserStore;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap: the store sits behind an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
}

impl Repositories {
    /// Creates repositories backed by PostgreSQL.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn postgres(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    /// Creates repositories backed by the in-process store.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
        }
    }
}
