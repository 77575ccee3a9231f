//! # Temperatures Core
//!
//! Core business logic for the postal-code-to-temperature lookup services.
//!
//! This crate contains the domain logic shared by both deployable services:
//! postal-code normalization and validation, the locality and temperature
//! resolvers that call the external directory and weather providers, and the
//! two orchestrator variants that chain them together.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on trait abstractions
//! - Outbound HTTP and trace-context propagation are injected at runtime
//! - The HTTP transport layer lives in `temperatures-api`, not here
//!
//! ## Usage
//!
//! ```rust
//! use temperatures_core::ZipCode;
//!
//! let zip_code = ZipCode::from_query(Some("01001000"));
//! assert!(zip_code.validate_format().is_ok());
//! ```

pub mod error;
pub mod lookup;
pub mod propagation;
pub mod reading;
pub mod resolver;
pub mod zip_code;

pub use error::{ResolveError, ValidationError};
pub use lookup::{LookupChain, PeerLookup, TemperatureLookup};
pub use propagation::{ContextPropagator, NoopPropagator, W3cPropagator};
pub use reading::TemperatureReading;
pub use resolver::{
    Address, DirectoryLocalityResolver, LocalityResolver, TemperatureResolver,
    WeatherTemperatureResolver,
};
pub use zip_code::ZipCode;

/// Standard result type for resolver and orchestrator operations
pub type ResolveResult<T> = Result<T, ResolveError>;
