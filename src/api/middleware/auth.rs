//! Bearer token middleware.
//!
//! Tokens are optional on the users resource: a valid token attaches the
//! caller to the request, anything else leaves the request anonymous and
//! lets the handler decide whether identity was required.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;
use crate::utils::jwt::resolve_user_id;

/// Authenticated caller, added to request extensions by
/// [`optional_auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Extractor for the caller, `None` for anonymous requests. Never rejects.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().copied()))
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Optional JWT authentication middleware
///
/// If a valid token is provided, the caller is added to extensions.
/// Missing or invalid tokens are not an error here.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/users", get(handler))
///     .layer(middleware::from_fn_with_state(state.clone(), optional_auth_middleware))
/// ```
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(&request).map(|token| resolve_user_id(token, &state.jwt_config.secret));

    match caller {
        Some(Ok(user_id)) => {
            request.extensions_mut().insert(AuthUser { user_id });
        }
        Some(Err(e)) => tracing::debug!(error = %e, "Ignoring unusable bearer token"),
        None => {}
    }

    next.run(request).await
}
