//! Service configuration.
//!
//! Every field carries a serde default so an entirely unconfigured
//! environment produces a valid configuration: the peer service and trace
//! collector addresses are fixed by deployment convention rather than being
//! required inputs. The only hard requirement is a weather API key when the
//! service runs the resolver role, enforced by [`ServiceConfig::validate`] at
//! startup.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Which of the two cooperating services this process runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    /// Service A: accepts a postal code via POST body and delegates the
    /// lookup to the peer resolver service
    Entry,

    /// Service B: accepts a postal code via query parameter and runs the
    /// directory + weather chain locally
    Resolver,
}

impl ServiceRole {
    /// Short role letter used in service and span names ("a" / "b").
    pub fn letter(&self) -> &'static str {
        match self {
            Self::Entry => "a",
            Self::Resolver => "b",
        }
    }
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Resolver => write!(f, "resolver"),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Which role this process runs
    pub role: Option<ServiceRole>,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Upstream provider and peer settings
    pub upstream: UpstreamConfig,

    /// Tracing exporter settings
    pub telemetry: TelemetryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate the configuration for the selected role.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when no role is configured, or when the
    ///   resolver role has no weather API key
    /// - [`ConfigError::Invalid`] for out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let role = self.role.ok_or(ConfigError::Missing { key: "role" })?;

        if role == ServiceRole::Resolver && self.upstream.weather_api_key.is_empty() {
            return Err(ConfigError::Missing {
                key: "upstream.weather_api_key",
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Service name reported to the trace collector (`api_a` / `api_b`).
    pub fn service_name(&self, role: ServiceRole) -> String {
        format!("api_{}", role.letter())
    }

    /// Per-service template for request span names (`request-a` / `request-b`).
    pub fn request_span_name(&self, role: ServiceRole) -> String {
        format!("request-{}", role.letter())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown grace period in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 5,
        }
    }
}

/// Upstream provider and peer-service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the peer resolver service (entry role only)
    pub peer_base_url: String,

    /// Base URL of the postal-code directory provider (resolver role only)
    pub directory_base_url: String,

    /// Base URL of the weather provider (resolver role only)
    pub weather_base_url: String,

    /// API key for the weather provider; also read from the WEATHER_API_KEY
    /// environment variable at startup
    pub weather_api_key: String,

    /// Bounded timeout applied to every outbound call, in seconds
    pub request_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            peer_base_url: "http://api-b:8080".to_string(),
            directory_base_url: "https://viacep.com.br".to_string(),
            weather_base_url: "http://api.weatherapi.com".to_string(),
            weather_api_key: String::new(),
            request_timeout_seconds: 10,
        }
    }
}

/// Tracing exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Export spans to the collector; propagation headers are handled either
    /// way
    pub enabled: bool,

    /// OTLP gRPC endpoint of the trace collector
    pub otlp_endpoint: String,

    /// Bounded wait for the exporter connection at startup, in seconds
    pub export_timeout_seconds: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_endpoint: "http://otel-collector:4317".to_string(),
            export_timeout_seconds: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
