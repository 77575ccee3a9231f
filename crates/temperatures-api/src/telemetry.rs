//! OpenTelemetry tracer provider lifecycle.
//!
//! The provider is modeled as an explicit resource: [`init_telemetry`]
//! acquires it at startup and the returned [`TelemetryGuard`] releases it
//! (flushing pending spans) when the process shuts down. The orchestrators
//! never touch the provider directly — they only see a
//! [`temperatures_core::ContextPropagator`] — so they stay testable without a
//! collector.

use crate::config::{ServiceRole, TelemetryConfig};
use crate::errors::ServiceError;
use opentelemetry::global;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use std::time::Duration;
use tracing::{info, warn};

/// Scoped handle to the process-wide tracer provider
///
/// Dropping the guard shuts the provider down; call
/// [`TelemetryGuard::shutdown`] for an explicit, logged release at the end of
/// `main`.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Flush pending spans and release the provider.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "Failed to shut down tracer provider cleanly");
            } else {
                info!("Tracer provider shut down");
            }
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Initialize tracing for the given service role.
///
/// Registers the W3C text-map propagator unconditionally — trace headers must
/// flow across the service hop even when span export is disabled — and, when
/// enabled, connects an OTLP/gRPC span exporter to the collector with a
/// bounded export timeout.
///
/// # Errors
///
/// Returns [`ServiceError::Telemetry`] when the exporter cannot be built.
pub fn init_telemetry(
    config: &TelemetryConfig,
    service_name: String,
    role: ServiceRole,
) -> Result<TelemetryGuard, ServiceError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    if !config.enabled {
        info!(role = %role, "Span export disabled; trace propagation only");
        return Ok(TelemetryGuard { provider: None });
    }

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(config.export_timeout_seconds))
        .build()
        .map_err(|e| ServiceError::Telemetry {
            message: format!("failed to build OTLP span exporter: {e}"),
        })?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.clone())
                .build(),
        )
        .build();

    global::set_tracer_provider(provider.clone());

    info!(
        service_name = %service_name,
        role = %role,
        endpoint = %config.otlp_endpoint,
        "Tracer provider initialized"
    );

    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}
