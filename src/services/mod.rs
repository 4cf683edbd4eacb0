//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod user_service;

pub use user_service::UserService;

use crate::config::PaginationConfig;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since the underlying store sits behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories, pagination: PaginationConfig) -> Self {
        Self {
            users: UserService::new(repos.users, pagination),
        }
    }
}
