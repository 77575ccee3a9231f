//! Common test utilities for temperatures-api integration tests
//!
//! This module provides:
//! - Builders for fully wired entry and resolver routers
//! - A helper that serves the resolver role on a real socket
//! - Wiremock fixtures for the directory and weather providers
//! - Request/response helpers for driving routers with `oneshot`

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use temperatures_api::{
    build_lookup, create_router, AppState, ServiceConfig, ServiceMetrics, ServiceRole,
};
use temperatures_core::W3cPropagator;
use tower::ServiceExt; // For `oneshot`
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Router builders
// ============================================================================

/// Build an entry-role config pointing at the given peer base URL.
pub fn entry_config(peer_base_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.role = Some(ServiceRole::Entry);
    config.upstream.peer_base_url = peer_base_url.to_string();
    config.upstream.request_timeout_seconds = 2;
    config
}

/// Build a resolver-role config pointing at the given provider base URLs.
pub fn resolver_config(directory_base_url: &str, weather_base_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.role = Some(ServiceRole::Resolver);
    config.upstream.directory_base_url = directory_base_url.to_string();
    config.upstream.weather_base_url = weather_base_url.to_string();
    config.upstream.weather_api_key = "test-key".to_string();
    config.upstream.request_timeout_seconds = 2;
    config
}

/// Build a fully wired router for the given config.
pub fn make_router(config: ServiceConfig) -> Router {
    let role = config.role.expect("test config must carry a role");
    let lookup = build_lookup(&config).expect("lookup should build from test config");
    let metrics = ServiceMetrics::new().expect("metrics should initialize");

    create_router(AppState::new(
        config,
        role,
        lookup,
        metrics,
        Arc::new(W3cPropagator),
    ))
}

/// Serve the resolver role on an ephemeral local port and return its base URL.
pub async fn spawn_resolver(directory_base_url: &str, weather_base_url: &str) -> String {
    let router = make_router(resolver_config(directory_base_url, weather_base_url));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("bound socket has an address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test resolver server should run");
    });

    format!("http://{addr}")
}

// ============================================================================
// Provider fixtures
// ============================================================================

/// Mount a directory provider that resolves every postal code to the given
/// locality.
pub async fn mount_directory(server: &MockServer, locality: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/ws/[0-9A-Za-z]+/json/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": locality,
            "estado": "São Paulo",
            "regiao": "Sudeste",
        })))
        .mount(server)
        .await;
}

/// Mount a directory provider that answers with the unknown-code shape:
/// HTTP 200 with no locality field.
pub async fn mount_directory_unknown(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/ws/[0-9A-Za-z]+/json/$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": "true" })),
        )
        .mount(server)
        .await;
}

/// Mount a weather provider reporting the given Celsius temperature.
pub async fn mount_weather(server: &MockServer, locality: &str, temp_c: f64) {
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", locality))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": { "name": locality },
            "current": { "temp_c": temp_c, "temp_f": temp_c * 1.8 + 32.0 },
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Request helpers
// ============================================================================

/// POST a JSON payload to the entry endpoint.
pub async fn post_lookup(router: Router, payload: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");

    router.oneshot(request).await.expect("router should respond")
}

/// GET the resolver endpoint with an optional zipcode query parameter.
pub async fn get_lookup(router: Router, zipcode: Option<&str>) -> Response {
    let uri = match zipcode {
        Some(zip) => format!("/?zipcode={zip}"),
        None => "/".to_string(),
    };

    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    router.oneshot(request).await.expect("router should respond")
}

/// Read the full response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert status and plain-text body in one step.
pub async fn assert_error_response(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    assert_eq!(body_text(response).await, message);
}
