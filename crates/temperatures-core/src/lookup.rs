//! Orchestrators chaining a validated postal code to a temperature reading.
//!
//! Two variants exist behind the [`TemperatureLookup`] seam:
//!
//! - [`PeerLookup`] (entry service): delegates the whole sequence to the peer
//!   service over HTTP, mapping its status codes back into the error taxonomy
//! - [`LookupChain`] (resolver service): runs the locality and temperature
//!   resolvers in sequence locally
//!
//! Neither variant retries, caches, or degrades: every outcome is a complete
//! reading or a single error, and errors propagate unchanged.

use crate::error::ResolveError;
use crate::propagation::ContextPropagator;
use crate::reading::TemperatureReading;
use crate::resolver::{LocalityResolver, TemperatureResolver};
use crate::ResolveResult;
use http::HeaderMap;
use opentelemetry::Context;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::error;

/// Seam between the HTTP handlers and whichever orchestration variant a
/// service role runs
#[async_trait::async_trait]
pub trait TemperatureLookup: Send + Sync {
    /// Resolve a validated postal code to a finished temperature reading.
    async fn lookup(&self, cx: &Context, zip_code: &str) -> ResolveResult<TemperatureReading>;
}

/// Local two-hop chain: directory lookup, then weather lookup
///
/// A `NotFound` from the locality resolver short-circuits the chain — the
/// temperature resolver is never invoked for a postal code that did not
/// resolve. All errors propagate unchanged; classification happened where the
/// distinction was knowable.
pub struct LookupChain {
    locality: Arc<dyn LocalityResolver>,
    temperature: Arc<dyn TemperatureResolver>,
}

impl LookupChain {
    /// Assemble the chain from its two resolvers.
    pub fn new(
        locality: Arc<dyn LocalityResolver>,
        temperature: Arc<dyn TemperatureResolver>,
    ) -> Self {
        Self {
            locality,
            temperature,
        }
    }
}

#[async_trait::async_trait]
impl TemperatureLookup for LookupChain {
    async fn lookup(&self, cx: &Context, zip_code: &str) -> ResolveResult<TemperatureReading> {
        let locality = self.locality.resolve(cx, zip_code).await?;
        self.temperature.resolve(cx, &locality).await
    }
}

/// Cross-service delegation to the peer resolver service
///
/// Issues `GET {peer_base_url}/?zipcode={code}` with the active trace context
/// injected. The peer's 404 is the only status translated into the `NotFound`
/// business outcome; any other non-success status, transport failure, or
/// undecodable body is an internal error.
pub struct PeerLookup {
    http_client: reqwest::Client,
    peer_base_url: String,
    propagator: Arc<dyn ContextPropagator>,
}

impl PeerLookup {
    /// Create a lookup that delegates to the peer at `peer_base_url`.
    pub fn new(
        http_client: reqwest::Client,
        peer_base_url: impl Into<String>,
        propagator: Arc<dyn ContextPropagator>,
    ) -> Self {
        Self {
            http_client,
            peer_base_url: peer_base_url.into(),
            propagator,
        }
    }
}

#[async_trait::async_trait]
impl TemperatureLookup for PeerLookup {
    async fn lookup(&self, cx: &Context, zip_code: &str) -> ResolveResult<TemperatureReading> {
        let mut url = reqwest::Url::parse(&self.peer_base_url).map_err(|e| {
            error!(error = %e, "Invalid peer service URL");
            ResolveError::internal(e)
        })?;
        url.query_pairs_mut().append_pair("zipcode", zip_code);

        let mut headers = HeaderMap::new();
        self.propagator.inject(cx, &mut headers);

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, zip_code = %zip_code, "Peer service request failed");
                ResolveError::internal(e)
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            error!(status = %status, zip_code = %zip_code, "Peer service returned an error status");
            return Err(ResolveError::internal(format!(
                "peer service returned status {status}"
            )));
        }

        response.json::<TemperatureReading>().await.map_err(|e| {
            error!(error = %e, zip_code = %zip_code, "Failed to decode peer service response");
            ResolveError::internal(e)
        })
    }
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
