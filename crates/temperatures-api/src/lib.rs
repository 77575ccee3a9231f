//! # Temperatures HTTP Service
//!
//! HTTP surface for the two cooperating postal-code temperature services.
//!
//! This library provides:
//! - The entry router (`POST /` with a JSON postal-code body) and the
//!   resolver router (`GET /?zipcode=...`), selected by service role
//! - Handler error to HTTP status mapping
//! - Prometheus metrics and the `/metrics` endpoint
//! - OpenTelemetry provider lifecycle and per-request server spans
//! - Server startup with signal-driven graceful shutdown

// Public modules
pub mod config;
pub mod errors;
pub mod metrics;
pub mod telemetry;


use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use bytes::Bytes;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{global, Context};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use temperatures_core::{
    ContextPropagator, DirectoryLocalityResolver, LookupChain, PeerLookup, TemperatureLookup,
    TemperatureReading, W3cPropagator, WeatherTemperatureResolver, ZipCode,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

pub use config::{ServiceConfig, ServiceRole};
pub use errors::{ConfigError, LookupHandlerError, ServiceError};
pub use metrics::ServiceMetrics;
pub use telemetry::{init_telemetry, TelemetryGuard};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Role this process runs as
    pub role: ServiceRole,

    /// Orchestrator variant for this role
    pub lookup: Arc<dyn TemperatureLookup>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,

    /// Trace-context propagation capability
    pub propagator: Arc<dyn ContextPropagator>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        role: ServiceRole,
        lookup: Arc<dyn TemperatureLookup>,
        metrics: Arc<ServiceMetrics>,
        propagator: Arc<dyn ContextPropagator>,
    ) -> Self {
        Self {
            config,
            role,
            lookup,
            metrics,
            propagator,
        }
    }
}

// ============================================================================
// Orchestrator Assembly
// ============================================================================

/// Build the orchestrator variant for the configured role.
///
/// The entry role delegates to the peer resolver service; the resolver role
/// runs the directory + weather chain locally. Both share one HTTP client
/// carrying the bounded outbound timeout.
pub fn build_lookup(config: &ServiceConfig) -> Result<Arc<dyn TemperatureLookup>, ServiceError> {
    let role = config.role.ok_or(ConfigError::Missing { key: "role" })?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.request_timeout_seconds))
        .build()
        .map_err(|e| {
            ServiceError::Configuration(ConfigError::Invalid {
                message: format!("failed to create HTTP client: {e}"),
            })
        })?;

    let propagator: Arc<dyn ContextPropagator> = Arc::new(W3cPropagator);

    let lookup: Arc<dyn TemperatureLookup> = match role {
        ServiceRole::Entry => Arc::new(PeerLookup::new(
            http_client,
            config.upstream.peer_base_url.clone(),
            propagator,
        )),
        ServiceRole::Resolver => {
            let locality = Arc::new(DirectoryLocalityResolver::new(
                http_client.clone(),
                config.upstream.directory_base_url.clone(),
                propagator.clone(),
            ));
            let temperature = Arc::new(WeatherTemperatureResolver::new(
                http_client,
                config.upstream.weather_base_url.clone(),
                config.upstream.weather_api_key.clone(),
                propagator,
            ));
            Arc::new(LookupChain::new(locality, temperature))
        }
    };

    Ok(lookup)
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create the HTTP router for the configured role
pub fn create_router(state: AppState) -> Router {
    let lookup_routes = match state.role {
        // The entry endpoint matches every method so non-POST requests can be
        // rejected with 404 rather than axum's default 405
        ServiceRole::Entry => Router::new().route("/", any(handle_entry_lookup)),
        ServiceRole::Resolver => Router::new().route("/", get(handle_chain_lookup)),
    };

    let observability_routes = Router::new().route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(lookup_routes)
        .merge(observability_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            track_http_metrics,
        ))
        .with_state(state)
}

/// Start the HTTP server and run until a shutdown signal arrives.
///
/// On SIGINT/SIGTERM the listener stops accepting connections and in-flight
/// requests get a bounded grace period to finish; whatever is still running
/// when it elapses is abandoned.
pub async fn start_server(
    config: ServiceConfig,
    lookup: Arc<dyn TemperatureLookup>,
) -> Result<(), ServiceError> {
    let role = config.role.ok_or(ConfigError::Missing { key: "role" })?;

    let metrics = ServiceMetrics::new().map_err(|e| {
        ServiceError::Configuration(ConfigError::Invalid {
            message: format!("Failed to initialize metrics: {e}"),
        })
    })?;

    let state = AppState::new(
        config.clone(),
        role,
        lookup,
        metrics,
        Arc::new(W3cPropagator),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.clone(),
                message: e.to_string(),
            })?;

    info!(address = %addr, role = %role, "Starting HTTP server");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown");
            },
        }

        let _ = signal_tx.send(());
    };

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
    });

    let served = tokio::select! {
        result = &mut server => result,
        _ = signal_rx => {
            // Listener has stopped accepting; wait out the grace period for
            // in-flight requests, then abandon whatever is still running.
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        grace_seconds = shutdown_timeout.as_secs(),
                        "Grace period elapsed; abandoning in-flight requests"
                    );
                    server.abort();
                    info!("HTTP server shutdown complete");
                    return Ok(());
                }
            }
        }
    };

    match served {
        Ok(Ok(())) => {
            info!("HTTP server shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => Err(ServiceError::ServerFailed {
            message: e.to_string(),
        }),
        Err(e) => Err(ServiceError::ServerFailed {
            message: format!("server task failed: {e}"),
        }),
    }
}

// ============================================================================
// Lookup Handlers
// ============================================================================

/// Query parameters for the resolver-service lookup
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    zipcode: Option<String>,
}

/// Handle the entry-service lookup (`POST /` with a JSON body).
///
/// Every method lands here; anything other than POST is rejected with 404
/// before validation runs. The body is validated with the strict-length
/// policy, then the whole resolution is delegated to the peer service.
#[instrument(skip(state, headers, body))]
async fn handle_entry_lookup(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cx = start_request_span(&state, &headers, "zip-code lookup");

    let result = entry_lookup(&state, &cx, &method, &body).await;

    state.metrics.record_lookup(&result);
    end_request_span(&cx, &result);
    into_lookup_response(result)
}

async fn entry_lookup(
    state: &AppState,
    cx: &Context,
    method: &Method,
    body: &Bytes,
) -> Result<TemperatureReading, LookupHandlerError> {
    if *method != Method::POST {
        return Err(LookupHandlerError::MethodNotAllowed);
    }

    let zip_code =
        ZipCode::from_body(body).map_err(|e| LookupHandlerError::MalformedBody {
            message: e.to_string(),
        })?;

    zip_code.validate_length()?;

    let reading = state.lookup.lookup(cx, zip_code.as_str()).await?;

    info!(city = %reading.city, "Resolved temperature via peer service");
    Ok(reading)
}

/// Handle the resolver-service lookup (`GET /?zipcode=...`).
///
/// The query parameter is validated with the strict-format policy, then the
/// local directory + weather chain runs.
#[instrument(skip(state, headers, params))]
async fn handle_chain_lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
    headers: HeaderMap,
) -> Response {
    let cx = start_request_span(&state, &headers, "resolver chain");

    let result = chain_lookup(&state, &cx, &params).await;

    state.metrics.record_lookup(&result);
    end_request_span(&cx, &result);
    into_lookup_response(result)
}

async fn chain_lookup(
    state: &AppState,
    cx: &Context,
    params: &LookupParams,
) -> Result<TemperatureReading, LookupHandlerError> {
    let zip_code = ZipCode::from_query(params.zipcode.as_deref());

    zip_code.validate_format()?;

    let reading = state.lookup.lookup(cx, zip_code.as_str()).await?;

    info!(city = %reading.city, "Resolved temperature via local chain");
    Ok(reading)
}

fn into_lookup_response(result: Result<TemperatureReading, LookupHandlerError>) -> Response {
    match result {
        Ok(reading) => (StatusCode::OK, Json(reading)).into_response(),
        Err(error) => error.into_response(),
    }
}

// ============================================================================
// Request Spans
// ============================================================================

/// Start the per-request server span under any inbound trace context.
///
/// The returned context carries the span and is threaded through the
/// orchestrator so outbound calls join the same trace.
fn start_request_span(state: &AppState, headers: &HeaderMap, detail: &str) -> Context {
    let parent = state.propagator.extract(headers);
    let tracer = global::tracer("temperatures");

    let span = tracer
        .span_builder(format!(
            "{} {}",
            state.config.request_span_name(state.role),
            detail
        ))
        .with_kind(SpanKind::Server)
        .start_with_context(&tracer, &parent);

    parent.with_span(span)
}

/// End the request span, recording error status on failure.
///
/// Runs on every exit path: success, validation error, business error, and
/// internal error.
fn end_request_span<T>(cx: &Context, result: &Result<T, LookupHandlerError>) {
    let span = cx.span();
    if let Err(error) = result {
        span.set_status(Status::error(error.to_string()));
    }
    span.end();
}

// ============================================================================
// Observability Handlers
// ============================================================================

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .render()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// Middleware
// ============================================================================

/// Correlation-ID middleware
///
/// Reuses an inbound `x-correlation-id` or generates one, records it on the
/// request span, and echoes it back in the response headers. Completion is
/// logged once; an error level is reserved for server-side failures since
/// client errors are an expected outcome of the validation policies.
#[instrument(skip_all, fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%status, duration_ms, "Request failed");
    } else {
        info!(%status, duration_ms, "Request completed");
    }

    response
}

/// HTTP metrics middleware recording request counts and durations
async fn track_http_metrics(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = std::time::Instant::now();
    let response = next.run(request).await;
    state.metrics.record_http_request(start.elapsed());
    response
}
