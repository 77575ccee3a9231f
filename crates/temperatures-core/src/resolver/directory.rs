//! Locality resolution against the external postal-code directory.

use super::{Address, LocalityResolver};
use crate::error::ResolveError;
use crate::propagation::ContextPropagator;
use crate::ResolveResult;
use http::HeaderMap;
use opentelemetry::Context;
use std::sync::Arc;
use tracing::{debug, error};

/// Locality resolver backed by the HTTP directory provider
///
/// Issues `GET {base_url}/ws/{zipcode}/json/` with the active trace context
/// injected into the request headers and decodes the response as an
/// [`Address`]. An address whose city is empty after decode means the postal
/// code did not resolve — a business outcome, distinct from transport errors.
pub struct DirectoryLocalityResolver {
    http_client: reqwest::Client,
    base_url: String,
    propagator: Arc<dyn ContextPropagator>,
}

impl DirectoryLocalityResolver {
    /// Create a resolver against the given directory base URL.
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        propagator: Arc<dyn ContextPropagator>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            propagator,
        }
    }
}

#[async_trait::async_trait]
impl LocalityResolver for DirectoryLocalityResolver {
    async fn resolve(&self, cx: &Context, zip_code: &str) -> ResolveResult<String> {
        let url = format!(
            "{}/ws/{}/json/",
            self.base_url.trim_end_matches('/'),
            zip_code
        );

        let mut headers = HeaderMap::new();
        self.propagator.inject(cx, &mut headers);

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, zip_code = %zip_code, "Directory request failed");
                ResolveError::internal(e)
            })?;

        let address = response.json::<Address>().await.map_err(|e| {
            error!(error = %e, zip_code = %zip_code, "Failed to decode directory response");
            ResolveError::internal(e)
        })?;

        if address.localidade.is_empty() {
            debug!(zip_code = %zip_code, "Postal code not found in directory");
            return Err(ResolveError::NotFound);
        }

        Ok(address.localidade)
    }
}

impl std::fmt::Debug for DirectoryLocalityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryLocalityResolver")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
