//! Error taxonomy for the lookup pipeline.
//!
//! Every component in the chain returns exactly one of these kinds:
//!
//! - [`ValidationError`]: user input fault, raised before any network call
//! - [`ResolveError::NotFound`]: the postal code does not resolve to a known
//!   locality — a terminal business outcome, not a transport failure
//! - [`ResolveError::Internal`]: any transport failure, non-decodable upstream
//!   response, or unexpected condition
//!
//! The orchestrators never translate one kind into another; classification
//! happens only where the distinction is knowable (the locality resolver for
//! the local chain, the peer status code for the cross-service path). The
//! `Display` output of each variant is the plain human-readable message
//! surfaced to clients; causes carry detail for server-side logging only.

/// Postal-code validation failures
///
/// Both ingress paths share these two outcomes but apply different policies
/// to produce them. See [`crate::zip_code::ZipCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No postal code was supplied (empty after normalization)
    #[error("zipcode is required")]
    Required,

    /// The postal code is present but does not satisfy the active policy
    #[error("invalid zipcode")]
    InvalidFormat,
}

/// Resolver and orchestrator failures
///
/// `NotFound` is a distinct variant rather than a generic failure so the
/// transport boundary can deterministically choose 404 vs 500.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The postal code passed validation but did not resolve to a locality
    #[error("can not find zipcode")]
    NotFound,

    /// Transport failure, undecodable upstream response, or unexpected state
    ///
    /// The `message` is logged server-side; clients only ever see the generic
    /// display text.
    #[error("internal server error")]
    Internal { message: String },
}

impl ResolveError {
    /// Build an internal error from any displayable cause.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: cause.to_string(),
        }
    }

    /// Whether this error maps to a 404 at the transport boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
