//! Upstream resolvers for the two external providers.
//!
//! The chain is strictly sequential: a postal code resolves to a locality
//! through the directory provider, then the locality resolves to a temperature
//! through the weather provider. Each resolver is a trait so the orchestrator
//! can be tested with doubles, plus one production implementation per
//! provider.

mod directory;
mod weather;

use crate::reading::TemperatureReading;
use crate::ResolveResult;
use opentelemetry::Context;
use serde::Deserialize;

pub use directory::DirectoryLocalityResolver;
pub use weather::WeatherTemperatureResolver;

/// Resolves a validated postal code to a locality name
#[async_trait::async_trait]
pub trait LocalityResolver: Send + Sync {
    /// Resolve `zip_code` to a locality, propagating `cx` onto the wire.
    ///
    /// # Errors
    ///
    /// - [`crate::ResolveError::NotFound`] when the postal code does not map
    ///   to a known locality
    /// - [`crate::ResolveError::Internal`] for transport or decode failures
    async fn resolve(&self, cx: &Context, zip_code: &str) -> ResolveResult<String>;
}

/// Resolves a locality name to a current temperature reading
#[async_trait::async_trait]
pub trait TemperatureResolver: Send + Sync {
    /// Resolve `locality` to a temperature reading, propagating `cx` onto the
    /// wire.
    ///
    /// This resolver has no "not found" outcome of its own — that
    /// classification only exists one hop earlier, on the locality lookup.
    ///
    /// # Errors
    ///
    /// [`crate::ResolveError::Internal`] for any transport or decode failure.
    async fn resolve(&self, cx: &Context, locality: &str) -> ResolveResult<TemperatureReading>;
}

/// Address record in the directory provider's wire format
///
/// Only `localidade` (the city) is consumed downstream; the remaining fields
/// are decoded for completeness. The provider answers unknown-but-well-formed
/// postal codes with a body that simply lacks these fields, so every field
/// defaults to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub regiao: String,
}
