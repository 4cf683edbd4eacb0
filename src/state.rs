//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::config::{JwtConfig, PaginationConfig};
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since Services share the store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Secret and lifetime for issuing and checking bearer tokens
    pub jwt_config: JwtConfig,
}

impl AppState {
    /// Creates a new AppState over the given repositories.
    ///
    /// # Example
    /// ```ignore
    /// let state = AppState::new(Repositories::in_memory(), jwt_config, pagination);
    /// ```
    pub fn new(repos: Repositories, jwt_config: JwtConfig, pagination: PaginationConfig) -> Self {
        Self {
            services: Services::new(repos, pagination),
            jwt_config,
        }
    }
}
