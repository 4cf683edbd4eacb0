//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` - User-related request/response DTOs
//! - `error` - Common error response DTOs
//! - `health` - Probe responses

mod error;
mod health;
mod user;

pub use error::ErrorResponse;
pub use health::{HealthResponse, HealthStatus};
pub use user::{RegisterRequest, UserResponse, UsersQuery};
