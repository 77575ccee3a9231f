//! Temperature reading model.

use serde::{Deserialize, Serialize};

/// Degrees added to Celsius to obtain Kelvin
const KELVIN_OFFSET: f64 = 273.15;

/// A resolved temperature reading for a locality
///
/// Serialized with the `temp_C`/`temp_F`/`temp_K` wire names. Deserialization
/// additionally accepts the weather provider's lowercase `temp_c`/`temp_f`
/// spelling, so the same type decodes the provider's `current` object and
/// round-trips our own responses.
///
/// Kelvin is never supplied by a provider; it is derived at resolution time
/// via [`TemperatureReading::finalize`], which also overwrites `city` with
/// the locality that was actually resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Resolved locality name (not necessarily what the provider reported)
    #[serde(default)]
    pub city: String,

    /// Temperature in degrees Celsius
    #[serde(rename = "temp_C", alias = "temp_c")]
    pub temp_c: f64,

    /// Temperature in degrees Fahrenheit, when the provider supplies it
    #[serde(rename = "temp_F", alias = "temp_f", default)]
    pub temp_f: f64,

    /// Temperature in Kelvin, always derived from Celsius
    #[serde(rename = "temp_K", default)]
    pub temp_k: f64,
}

impl TemperatureReading {
    /// Derive Kelvin from Celsius and pin the city to the resolved locality.
    ///
    /// Called exactly once, after decoding the provider response. Whatever
    /// city value the provider returned is discarded.
    pub fn finalize(mut self, locality: &str) -> Self {
        self.temp_k = self.temp_c + KELVIN_OFFSET;
        self.city = locality.to_string();
        self
    }
}

#[cfg(test)]
#[path = "reading_tests.rs"]
mod tests;
