//! Trace-context propagation across service boundaries.
//!
//! Distributed traces survive the two network hops by extracting the inbound
//! context from request headers and injecting the active context into every
//! outbound request. Rather than reaching for global propagator state at each
//! call site, the capability is modeled as the [`ContextPropagator`] trait and
//! passed explicitly into the resolvers and orchestrators, so the chain can be
//! exercised in tests without a live collector.

use http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector};
use opentelemetry::{global, Context};

/// Carrier-based trace-context extract/inject over HTTP header maps
pub trait ContextPropagator: Send + Sync {
    /// Extract a trace context from inbound request headers.
    ///
    /// Returns an empty root context when no (or invalid) trace headers are
    /// present.
    fn extract(&self, headers: &HeaderMap) -> Context;

    /// Inject the given context into outbound request headers.
    fn inject(&self, cx: &Context, headers: &mut HeaderMap);
}

/// W3C trace-context propagation backed by the global text-map propagator
///
/// Requires the process to have registered a text-map propagator (done during
/// telemetry startup); with none registered both operations are no-ops, which
/// is also the desired behavior when telemetry is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct W3cPropagator;

impl ContextPropagator for W3cPropagator {
    fn extract(&self, headers: &HeaderMap) -> Context {
        global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(headers))
        })
    }

    fn inject(&self, cx: &Context, headers: &mut HeaderMap) {
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(cx, &mut HeaderInjector(headers));
        });
    }
}

/// Propagator that never reads or writes headers, for tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPropagator;

impl ContextPropagator for NoopPropagator {
    fn extract(&self, _headers: &HeaderMap) -> Context {
        Context::new()
    }

    fn inject(&self, _cx: &Context, _headers: &mut HeaderMap) {}
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(_) => return,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.0.insert(name, value);
        }
    }
}

#[cfg(test)]
#[path = "propagation_tests.rs"]
mod tests;
