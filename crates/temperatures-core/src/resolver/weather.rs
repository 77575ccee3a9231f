//! Temperature resolution against the external weather provider.

use super::TemperatureResolver;
use crate::error::ResolveError;
use crate::propagation::ContextPropagator;
use crate::reading::TemperatureReading;
use crate::ResolveResult;
use http::HeaderMap;
use opentelemetry::Context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

/// Envelope around the provider's `current` conditions object
#[derive(Debug, Deserialize)]
struct CurrentConditions {
    current: TemperatureReading,
}

/// Temperature resolver backed by the HTTP weather provider
///
/// Issues `GET {base_url}/v1/current.json?q={locality}&key={api_key}` with the
/// locality percent-encoded and the active trace context injected into the
/// request headers. After decoding, the reading is finalized: Kelvin derived
/// from Celsius and the city pinned to the locality that was asked for.
pub struct WeatherTemperatureResolver {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    propagator: Arc<dyn ContextPropagator>,
}

impl WeatherTemperatureResolver {
    /// Create a resolver against the given weather provider base URL.
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        propagator: Arc<dyn ContextPropagator>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            propagator,
        }
    }
}

#[async_trait::async_trait]
impl TemperatureResolver for WeatherTemperatureResolver {
    async fn resolve(&self, cx: &Context, locality: &str) -> ResolveResult<TemperatureReading> {
        // query_pairs_mut percent-encodes the locality name
        let mut url = reqwest::Url::parse(&format!(
            "{}/v1/current.json",
            self.base_url.trim_end_matches('/')
        ))
        .map_err(|e| {
            error!(error = %e, "Invalid weather provider URL");
            ResolveError::internal(e)
        })?;
        url.query_pairs_mut()
            .append_pair("q", locality)
            .append_pair("key", &self.api_key);

        let mut headers = HeaderMap::new();
        self.propagator.inject(cx, &mut headers);

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, locality = %locality, "Weather request failed");
                ResolveError::internal(e)
            })?;

        let conditions = response.json::<CurrentConditions>().await.map_err(|e| {
            error!(error = %e, locality = %locality, "Failed to decode weather response");
            ResolveError::internal(e)
        })?;

        Ok(conditions.current.finalize(locality))
    }
}

impl std::fmt::Debug for WeatherTemperatureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherTemperatureResolver")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[path = "weather_tests.rs"]
mod tests;
