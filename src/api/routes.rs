//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    error_response_middleware, logging_middleware, optional_auth_middleware,
    request_id_middleware,
};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. Error response middleware - renders every error as JSON with the request ID
/// 4. Request timeout - answers 408 after `server.request_timeout` seconds
/// 5. Optional auth middleware - attaches the caller when a valid bearer token is sent
///
/// # Routes
/// - `/users` - Register and list users
/// - `/health/live`, `/health/ready` - Probes
/// - `/swagger-ui` - API documentation
///
/// # Example
/// ```ignore
/// let state = AppState::new(Repositories::in_memory(), jwt_config, pagination);
/// let router = create_router(state, &settings.server);
/// ```
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::users::user_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    let router = router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api));
    with_middleware(router, state, server)
}

fn with_middleware(router: Router<AppState>, state: AppState, server: &ServerConfig) -> Router {
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(middleware::from_fn(error_response_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, PaginationConfig};
    use crate::repositories::Repositories;
    use crate::utils::jwt::{generate_token, resolve_user_id};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TEST_SECRET: &str = "router_test_secret_with_32_bytes!";

    fn test_state() -> AppState {
        let jwt = JwtConfig {
            secret: TEST_SECRET.to_string(),
            ..JwtConfig::default()
        };
        AppState::new(Repositories::in_memory(), jwt, PaginationConfig::default())
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        create_router(state.clone(), &ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn register_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> axum::http::request::Builder {
        Request::builder().method(Method::GET).uri(uri)
    }

    /// Registers a user and returns (id, token).
    async fn register(state: &AppState, login: &str) -> (i64, String) {
        let body = json!({
            "login": login,
            "password": "secret1",
            "email": format!("{login}@example.com"),
        });
        let response = send(state, register_request(&body.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await.as_str().unwrap().to_string();
        (resolve_user_id(&token, TEST_SECRET).unwrap(), token)
    }

    fn ids(body: &Value) -> Vec<i64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_register_returns_token_for_listed_user() {
        let state = test_state();
        let (id, _) = register(&state, "alice").await;

        let response = send(&state, get("/users").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], id);
        assert_eq!(users[0]["login"], "alice");
        assert_eq!(users[0]["email"], "alice@example.com");
        assert!(
            users[0]["avatar"]
                .as_str()
                .unwrap()
                .starts_with("http://www.gravatar.com/avatar/")
        );
        assert!(users[0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login_and_email_are_reported() {
        let state = test_state();
        register(&state, "alice").await;

        let response = send(
            &state,
            register_request(r#"{"login":"alice","password":"secret1","email":"other@example.com"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "duplicateLogin");

        let response = send(
            &state,
            register_request(r#"{"login":"alice2","password":"secret1","email":"alice@example.com"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "duplicateEmail");
    }

    #[tokio::test]
    async fn test_registration_field_errors() {
        let state = test_state();
        let cases = [
            (r#"{"login":"ab","password":"secret1","email":"a@example.com"}"#, "invalidLogin"),
            (r#"{"login":"alice","password":"short","email":"a@example.com"}"#, "invalidPassword"),
            (r#"{"login":"alice","password":"secret1","email":"not-an-email"}"#, "invalidEmail"),
            (r#"{"login":"ab","password":"short","email":"nope"}"#, "invalidLogin"),
            (r#"{"login":"alice""#, "invalidRequest"),
            (r#"{"login":"alice","password":"secret1"}"#, "invalidRequest"),
        ];

        for (body, code) in cases {
            let response = send(&state, register_request(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let json = body_json(response).await;
            assert_eq!(json["code"], code, "body: {body}");
            assert!(json["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let state = test_state();
        register(&state, "alice").await;

        let response = send(&state, get("/users?followedBy=me").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "invalidRequest");

        let response = send(
            &state,
            get("/users?followerOf=me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_with_token_for_deleted_user_is_rejected() {
        let state = test_state();
        let token = generate_token(999, TEST_SECRET, 1).unwrap();

        let response = send(
            &state,
            get("/users?followedBy=me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "invalidRequest");
    }

    #[tokio::test]
    async fn test_invalid_subject_is_rejected() {
        let state = test_state();
        for uri in [
            "/users?followedBy=abc",
            "/users?followerOf=1.5",
            "/users?followedBy=%207",
            "/users?followedBy=%20me",
        ] {
            let response = send(&state, get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
            assert_eq!(body_json(response).await["code"], "invalidRequest");
        }
    }

    #[tokio::test]
    async fn test_follow_relationships_both_directions() {
        let state = test_state();
        let (alice, alice_token) = register(&state, "alice").await;
        let (bob, _) = register(&state, "bobby").await;
        let (carol, _) = register(&state, "carol").await;

        let users = &state.services.users;
        users.follow(alice, bob).await.unwrap();
        users.follow(alice, carol).await.unwrap();
        users.follow(carol, alice).await.unwrap();

        let response = send(
            &state,
            get("/users?followedBy=me")
                .header(header::AUTHORIZATION, format!("Bearer {alice_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&body_json(response).await), vec![bob, carol]);

        let uri = format!("/users?followerOf={alice}");
        let response = send(&state, get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(ids(&body_json(response).await), vec![carol]);

        // followedBy wins over followerOf
        let uri = format!("/users?followedBy={carol}&followerOf={bob}");
        let response = send(&state, get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(ids(&body_json(response).await), vec![alice]);
    }

    #[tokio::test]
    async fn test_follower_of_is_not_evaluated_when_followed_by_is_set() {
        let state = test_state();
        let (alice, _) = register(&state, "alice").await;
        let (bob, _) = register(&state, "bobby").await;
        state.services.users.follow(alice, bob).await.unwrap();

        let uri = format!("/users?followedBy={alice}&followerOf=abc");
        let response = send(&state, get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&body_json(response).await), vec![bob]);
    }

    #[tokio::test]
    async fn test_repeated_filter_uses_first_value() {
        let state = test_state();
        let (alice, _) = register(&state, "alice").await;
        let (bob, _) = register(&state, "bobby").await;
        let (carol, _) = register(&state, "carol").await;
        state.services.users.follow(alice, bob).await.unwrap();
        state.services.users.follow(carol, alice).await.unwrap();

        let uri = format!("/users?followedBy={alice}&followedBy={carol}");
        let response = send(&state, get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&body_json(response).await), vec![bob]);
    }

    #[tokio::test]
    async fn test_slow_request_times_out_as_json() {
        use axum::routing::get as get_route;
        use std::time::Duration;

        let router = Router::new().route(
            "/slow",
            get_route(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "done"
            }),
        );
        let server = ServerConfig {
            request_timeout: 1,
            ..ServerConfig::default()
        };
        let state = test_state();

        let response = with_middleware(router, state, &server)
            .oneshot(get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_json(response).await["code"], "requestTimeout");
    }

    #[tokio::test]
    async fn test_unknown_subject_lists_nobody() {
        let state = test_state();
        register(&state, "alice").await;

        let response = send(&state, get("/users?followedBy=4242").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_paging_with_continuation_token() {
        let state = test_state();
        let (alice, _) = register(&state, "alice").await;
        let mut followees = Vec::new();
        for login in ["user1", "user2", "user3", "user4", "user5"] {
            let (id, _) = register(&state, login).await;
            state.services.users.follow(alice, id).await.unwrap();
            followees.push(id);
        }

        let uri = format!("/users?followedBy={alice}");
        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            let mut request = get(&uri).header("limit", "2");
            if let Some(token) = &cursor {
                request = request.header("continuationToken", token.as_str());
            }
            let response = send(&state, request.body(Body::empty()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::OK);
            cursor = response
                .headers()
                .get("continuationtoken")
                .map(|v| v.to_str().unwrap().to_string());
            let page = ids(&body_json(response).await);
            assert!(page.len() <= 2);
            seen.extend(page);
            pages += 1;
            if cursor.is_none() {
                break;
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen, followees);
    }

    #[tokio::test]
    async fn test_paging_headers_ignored_without_filter() {
        let state = test_state();
        for login in ["user1", "user2", "user3"] {
            register(&state, login).await;
        }

        let response = send(
            &state,
            get("/users")
                .header("limit", "1")
                .header("continuationToken", "garbage!")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("continuationtoken").is_none());
        assert_eq!(ids(&body_json(response).await).len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_continuation_token_is_rejected() {
        let state = test_state();
        let (alice, _) = register(&state, "alice").await;

        let uri = format!("/users?followedBy={alice}");
        let response = send(
            &state,
            get(&uri)
                .header("continuationToken", "***")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "invalidRequest");
    }

    #[tokio::test]
    async fn test_error_body_carries_request_id() {
        let state = test_state();
        let response = send(
            &state,
            get("/users?followedBy=me")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
        let body = body_json(response).await;
        assert_eq!(body["request_id"], "req-123");
        assert_eq!(body["code"], "invalidRequest");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let state = test_state();
        let response = send(&state, get("/nowhere").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "notFound");
    }

    #[tokio::test]
    async fn test_health_probes() {
        let state = test_state();

        let response = send(&state, get("/health/live").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = send(&state, get("/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["storage"], "memory");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_users_path() {
        let state = test_state();
        let response = send(&state, get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["paths"]["/users"]["get"].is_object());
        assert!(doc["paths"]["/users"]["post"].is_object());
    }
}
