//! # Temperatures Service
//!
//! Binary entry point for the two cooperating postal-code temperature
//! services. One binary serves both roles: `role: entry` runs service A
//! (POST body, delegates to the peer), `role: resolver` runs service B
//! (query parameter, directory + weather chain).
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging and the OpenTelemetry tracer provider
//! - Builds the role-appropriate lookup orchestrator
//! - Starts the HTTP server from temperatures-api

use temperatures_api::{build_lookup, init_telemetry, start_server, ServiceConfig, ServiceError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/temperatures/service.yaml     — system-wide defaults
    //  2. ./config/service.yaml              — deployment-local override
    //  3. Path given by TEMP_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed TEMP__ (double-underscore separator)
    //     e.g. TEMP__SERVER__PORT=9090 sets server.port = 9090
    //  5. WEATHER_API_KEY — plain-name fallback for the weather provider key
    //
    // All service configuration fields carry serde defaults, so absent files
    // or an entirely unconfigured environment still deserializes; validation
    // then enforces the role and the weather key for the resolver role.
    // A malformed file or an environment variable that cannot be coerced to
    // the correct type IS a hard error because it indicates
    // deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/temperatures/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("TEMP_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("TEMP").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to build configuration; aborting: {e}");
            std::process::exit(3);
        }
    };

    let mut service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            eprintln!(
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart: {e}"
            );
            std::process::exit(3);
        }
    };

    // WEATHER_API_KEY is the conventional name for the provider key; it wins
    // over anything the files supplied.
    if let Ok(key) = std::env::var("WEATHER_API_KEY") {
        if !key.is_empty() {
            service_config.upstream.weather_api_key = key;
        }
    }

    // Initialize logging before validation so failures are reported through
    // the configured format.
    init_logging(&service_config);

    let role = match service_config.validate() {
        Ok(()) => service_config
            .role
            .expect("validate() guarantees a role is configured"),
        Err(e) => {
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    info!(role = %role, "Starting temperatures service");

    // -------------------------------------------------------------------------
    // Initialize the tracer provider
    //
    // The W3C propagator is registered even when span export is disabled so
    // trace headers still flow across the service hop.
    // -------------------------------------------------------------------------
    let telemetry_guard = match init_telemetry(
        &service_config.telemetry,
        service_config.service_name(role),
        role,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            error!(error = %e, "Failed to initialize telemetry; aborting");
            std::process::exit(5);
        }
    };

    // Build the role-appropriate orchestrator: the entry role delegates to
    // the peer service, the resolver role runs the local chain.
    let lookup = match build_lookup(&service_config) {
        Ok(lookup) => lookup,
        Err(e) => {
            error!(error = %e, "Failed to build lookup orchestrator; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        "Starting HTTP server"
    );

    // Start the server
    if let Err(e) = start_server(service_config, lookup).await {
        error!("Failed to start server: {}", e);
        telemetry_guard.shutdown();

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
            ServiceError::Telemetry { .. } => 5,
        };

        std::process::exit(exit_code);
    }

    // Flush pending spans before the process exits.
    telemetry_guard.shutdown();

    Ok(())
}

// ============================================================================
// Private helpers
// ============================================================================

/// Initialize the tracing subscriber from the logging section.
///
/// `RUST_LOG` overrides the configured level; `json_format` switches the
/// fmt layer to structured output.
fn init_logging(service_config: &ServiceConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "temperatures_service={level},temperatures_api={level},temperatures_core={level},tower_http=debug",
            level = service_config.logging.level
        )
        .into()
    });

    if service_config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
