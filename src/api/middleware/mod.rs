//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! error rendering, and optional bearer authentication.

mod auth;
mod error_handler;
mod logging;
mod request_id;

pub use auth::{AuthUser, OptionalAuthUser, bearer_token, optional_auth_middleware};
pub use error_handler::{error_response_middleware, error_to_status_code};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
