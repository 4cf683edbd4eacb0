//! Handlers for the `/users` resource.
//!
//! `GET /users` lists every user, or one page of a follow relationship when
//! `followedBy` / `followerOf` is given. `POST /users` registers a user and
//! answers with a bearer token for it.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{ErrorResponse, RegisterRequest, UserResponse, UsersQuery};
use crate::api::middleware::OptionalAuthUser;
use crate::error::{AppError, AppResult};
use crate::models::Relation;
use crate::state::AppState;
use crate::utils::jwt::generate_token;

/// Request header carrying the page size.
pub const LIMIT_HEADER: &str = "limit";
/// Request and response header carrying the pagination cursor
/// (`continuationToken`; header names are case-insensitive).
pub const CONTINUATION_HEADER: &str = "continuationtoken";

/// Creates the users routes
///
/// # Routes
/// - `GET /users` - List users, optionally filtered by a follow relationship
/// - `POST /users` - Register a new user
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_users, register_user))
}

/// Whose relationships are listed: the caller or an explicit user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Me,
    ById(i64),
}

impl Subject {
    /// Parses a `followedBy` / `followerOf` value; `param` names it in errors.
    /// The value is taken verbatim; surrounding whitespace makes it invalid.
    pub fn parse(raw: &str, param: &str) -> AppResult<Self> {
        if raw == "me" {
            return Ok(Subject::Me);
        }
        raw.parse::<i64>()
            .map(Subject::ById)
            .map_err(|_| AppError::invalid_request(format!("Id {} is not valid", param)))
    }
}

/// Resolves a subject to a user id; `Me` needs a token naming an existing user.
async fn resolve_subject(
    state: &AppState,
    subject: Subject,
    caller: OptionalAuthUser,
) -> AppResult<i64> {
    match subject {
        Subject::ById(id) => Ok(id),
        Subject::Me => {
            let caller = caller
                .0
                .ok_or_else(|| AppError::invalid_request("Token is needed"))?;
            match state.services.users.get_user(caller.user_id).await? {
                Some(user) => Ok(user.id),
                None => Err(AppError::invalid_request(
                    "Token does not name an existing user",
                )),
            }
        }
    }
}

/// Page size from the `limit` header. Anything unusable counts as absent.
fn limit_header(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}

/// Cursor from the `continuationToken` header; empty counts as absent.
fn continuation_header(headers: &HeaderMap) -> AppResult<Option<&str>> {
    match headers.get(CONTINUATION_HEADER) {
        None => Ok(None),
        Some(value) => {
            let token = value
                .to_str()
                .map_err(|_| AppError::invalid_request("Continuation token is not valid"))?
                .trim();
            Ok(Some(token).filter(|t| !t.is_empty()))
        }
    }
}

/// GET /users - List users
///
/// Without filters returns every user and ignores the paging headers.
/// With `followedBy` returns the users the subject follows; with
/// `followerOf` the users following it. `followedBy` wins when both are set.
#[utoipa::path(
    get,
    path = "/users",
    tag = USER_TAG,
    params(
        UsersQuery,
        ("limit" = Option<i64>, Header, description = "Page size for relationship listings"),
        ("continuationToken" = Option<String>, Header, description = "Cursor returned by the previous page"),
    ),
    responses(
        (status = 200, description = "Users", body = [UserResponse],
            headers(("continuationToken" = String, description = "Cursor of the next page, absent on the last page"))),
        (status = 400, description = "Invalid subject, cursor or missing token", body = ErrorResponse)
    ),
    security((), ("bearerAuth" = []))
)]
async fn list_users(
    State(state): State<AppState>,
    caller: OptionalAuthUser,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Response> {
    let Query(pairs) = query.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let query = UsersQuery::from_pairs(pairs);

    let filter = match (query.followed_by.as_deref(), query.follower_of.as_deref()) {
        (Some(raw), _) => Some((Subject::parse(raw, "followedBy")?, Relation::Followees)),
        (None, Some(raw)) => Some((Subject::parse(raw, "followerOf")?, Relation::Followers)),
        (None, None) => None,
    };

    let Some((subject, relation)) = filter else {
        let users = state.services.users.list_users().await?;
        let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        return Ok(Json(body).into_response());
    };

    let subject_id = resolve_subject(&state, subject, caller).await?;
    let page = state
        .services
        .users
        .list_related(
            subject_id,
            relation,
            limit_header(&headers),
            continuation_header(&headers)?,
        )
        .await?;

    let body: Vec<UserResponse> = page.users.into_iter().map(UserResponse::from).collect();
    let mut response = Json(body).into_response();
    if let Some(cursor) = page.cursor {
        let value = HeaderValue::from_str(&cursor).map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("unencodable cursor: {}", e),
        })?;
        response
            .headers_mut()
            .insert(HeaderName::from_static(CONTINUATION_HEADER), value);
    }
    Ok(response)
}

/// POST /users - Register a new user
///
/// Returns a bearer token for the new user as a JSON string.
#[utoipa::path(
    post,
    path = "/users",
    tag = USER_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered; body is the bearer token", body = String),
        (status = 400, description = "invalidRequest, invalidLogin, invalidPassword, invalidEmail, duplicateLogin or duplicateEmail", body = ErrorResponse)
    )
)]
async fn register_user(State(state): State<AppState>, body: Bytes) -> AppResult<Json<String>> {
    // Parsed by hand so a malformed body reports `invalidRequest`.
    let payload: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::invalid_request("Invalid JSON body"))?;

    let user = state
        .services
        .users
        .register(&payload.login, &payload.password, &payload.email)
        .await?;

    let token = generate_token(
        user.id,
        &state.jwt_config.secret,
        state.jwt_config.token_expiration,
    )?;
    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_subject_parsing() {
        assert_eq!(Subject::parse("me", "followedBy").unwrap(), Subject::Me);
        assert_eq!(Subject::parse("42", "followedBy").unwrap(), Subject::ById(42));
        assert!(Subject::parse(" 7", "followerOf").is_err());
        assert!(Subject::parse(" me", "followedBy").is_err());
        assert!(Subject::parse("", "followedBy").is_err());

        match Subject::parse("abc", "followedBy") {
            Err(AppError::BadRequest { code, message }) => {
                assert_eq!(code, ErrorCode::InvalidRequest);
                assert!(message.contains("followedBy"));
            }
            other => panic!("Expected invalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_limit_header_is_lenient() {
        let mut headers = HeaderMap::new();
        assert_eq!(limit_header(&headers), None);

        headers.insert(LIMIT_HEADER, HeaderValue::from_static("five"));
        assert_eq!(limit_header(&headers), None);

        headers.insert(LIMIT_HEADER, HeaderValue::from_static("5"));
        assert_eq!(limit_header(&headers), Some(5));
    }

    #[test]
    fn test_empty_continuation_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTINUATION_HEADER, HeaderValue::from_static(""));
        assert_eq!(continuation_header(&headers).unwrap(), None);

        headers.insert(CONTINUATION_HEADER, HeaderValue::from_static("Mg"));
        assert_eq!(continuation_header(&headers).unwrap(), Some("Mg"));
    }
}
