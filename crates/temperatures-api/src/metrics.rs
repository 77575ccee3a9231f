//! Prometheus metrics for the lookup services.
//!
//! Metrics live in an owned [`Registry`] rather than the process-global
//! default so test runs never collide on metric names and the `/metrics`
//! endpoint only exposes what this service registered.

use crate::errors::LookupHandlerError;
use axum::http::StatusCode;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Service metrics for observability
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    // HTTP request metrics
    pub http_requests_total: IntCounter,
    pub http_request_duration: Histogram,

    // Lookup pipeline metrics
    pub lookup_requests_total: IntCounter,
    pub lookup_validation_failures: IntCounter,
    pub lookup_not_found_total: IntCounter,
    pub lookup_internal_errors: IntCounter,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request processing time",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        let lookup_requests_total = IntCounter::new(
            "lookup_requests_total",
            "Total postal-code lookup requests received",
        )?;
        registry.register(Box::new(lookup_requests_total.clone()))?;

        let lookup_validation_failures = IntCounter::new(
            "lookup_validation_failures",
            "Lookup requests rejected before any network call",
        )?;
        registry.register(Box::new(lookup_validation_failures.clone()))?;

        let lookup_not_found_total = IntCounter::new(
            "lookup_not_found_total",
            "Postal codes that did not resolve to a locality",
        )?;
        registry.register(Box::new(lookup_not_found_total.clone()))?;

        let lookup_internal_errors = IntCounter::new(
            "lookup_internal_errors",
            "Lookups that failed on transport or decode errors",
        )?;
        registry.register(Box::new(lookup_internal_errors.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration,
            lookup_requests_total,
            lookup_validation_failures,
            lookup_not_found_total,
            lookup_internal_errors,
        }))
    }

    pub fn record_http_request(&self, duration: std::time::Duration) {
        self.http_requests_total.inc();
        self.http_request_duration.observe(duration.as_secs_f64());
    }

    /// Record a finished lookup, bucketing failures by kind.
    pub fn record_lookup<T>(&self, result: &Result<T, LookupHandlerError>) {
        self.lookup_requests_total.inc();

        if let Err(error) = result {
            match error.status_code() {
                StatusCode::UNPROCESSABLE_ENTITY => self.lookup_validation_failures.inc(),
                StatusCode::NOT_FOUND => self.lookup_not_found_total.inc(),
                _ => self.lookup_internal_errors.inc(),
            }
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
