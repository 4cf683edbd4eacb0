//! Error handler for converting AppError to HTTP responses.
//!
//! Handlers return `AppError`; this module turns it into a status code and
//! an [`ErrorResponse`] body. Server-side failures are logged with their
//! source and answered with a generic message.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Maps an AppError variant to its HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    match error {
        AppError::BadRequest { code, message } => ErrorResponse::new(code.as_str(), message),
        AppError::Duplicate { field, .. } => {
            ErrorResponse::new("duplicate", &format!("Duplicate {}", field))
        }
        AppError::Unauthorized { message } => ErrorResponse::new("unauthorized", message),
        AppError::Database { .. } => {
            ErrorResponse::new("databaseError", "A storage error occurred")
        }
        AppError::Configuration { .. } | AppError::Internal { .. } => {
            ErrorResponse::new("internalError", "An internal error occurred")
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new("serviceUnavailable", "Storage is temporarily unavailable")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let body = error_body(&self);
        let mut response = (status, Json(body.clone())).into_response();
        // Kept so the outer middleware can attach the request id.
        response.extensions_mut().insert(body);
        response
    }
}

fn fallback_body(status: StatusCode) -> ErrorResponse {
    match status {
        StatusCode::NOT_FOUND => ErrorResponse::new("notFound", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ErrorResponse::new("methodNotAllowed", "HTTP method not allowed for this endpoint")
        }
        StatusCode::REQUEST_TIMEOUT => {
            ErrorResponse::new("requestTimeout", "The request took too long to complete")
        }
        s if s.is_client_error() => ErrorResponse::new("invalidRequest", "Invalid request"),
        _ => ErrorResponse::new("internalError", "An internal error occurred"),
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Gives every error response the standard JSON shape with the request id.
///
/// Errors raised through `AppError` are re-rendered with the id attached;
/// plain error responses produced by the framework (unknown route, wrong
/// method) are replaced. JSON error bodies from elsewhere pass through.
pub async fn error_response_middleware(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let body = match response.extensions().get::<ErrorResponse>() {
        Some(body) => body.clone(),
        None if is_json(&response) => return response,
        None => fallback_body(status),
    };
    let body = match request_id {
        Some(RequestId(id)) => body.with_request_id(&id),
        None => body,
    };

    let mut rebuilt = (status, Json(body)).into_response();
    for (name, value) in response.headers() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt
}
