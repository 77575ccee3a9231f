//! Postal-code DTO, normalization, and the two validation policies.
//!
//! A postal code arrives on the wire in one of two shapes:
//!
//! - JSON body (entry service): a string-to-string object carrying the code
//!   under `zipcode`, or under the localized alias `cep` when `zipcode` is
//!   absent
//! - Query parameter (resolver service): a single `zipcode` parameter with no
//!   alias fallback
//!
//! Two independent validation policies exist, one per ingress path. They are
//! divergent on purpose and must stay distinct: the body path only checks
//! length, while the query path additionally requires digit-only content.
//! Unifying them would silently change observable behavior on one path.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Expected length of a valid postal code, in bytes
const ZIP_CODE_LENGTH: usize = 8;

static ZIP_CODE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("zip code pattern is a valid regex"));

/// Postal code as received from a client
///
/// Always constructed through [`ZipCode::from_body`] or [`ZipCode::from_query`]
/// so the alias precedence rules apply uniformly. The inner value may be empty
/// or malformed until one of the validation policies has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipCode {
    #[serde(rename = "zipcode")]
    zip_code: String,
}

impl ZipCode {
    /// Normalize a JSON request body into a postal code.
    ///
    /// The payload must decode as a string-to-string object. The `zipcode`
    /// key wins; `cep` is consulted only when `zipcode` is absent; neither
    /// key present yields an empty postal code. A payload that does not
    /// decode (wrong shape, non-string values) is a hard error — the caller
    /// surfaces it as an internal failure, never as "empty".
    pub fn from_body(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Normalize the `zipcode` query parameter into a postal code.
    ///
    /// No alias fallback on this path; a missing parameter yields an empty
    /// postal code.
    pub fn from_query(value: Option<&str>) -> Self {
        Self {
            zip_code: value.unwrap_or_default().to_string(),
        }
    }

    /// Strict-length policy (body ingress).
    ///
    /// Empty → required; length other than eight bytes → invalid format.
    /// No character-class check on this path.
    pub fn validate_length(&self) -> Result<(), ValidationError> {
        if self.zip_code.is_empty() {
            return Err(ValidationError::Required);
        }

        if self.zip_code.len() != ZIP_CODE_LENGTH {
            return Err(ValidationError::InvalidFormat);
        }

        Ok(())
    }

    /// Strict-format policy (query ingress).
    ///
    /// Empty → required; anything not matching `^[0-9]{8}$` → invalid format.
    pub fn validate_format(&self) -> Result<(), ValidationError> {
        if self.zip_code.is_empty() {
            return Err(ValidationError::Required);
        }

        if !ZIP_CODE_FORMAT.is_match(&self.zip_code) {
            return Err(ValidationError::InvalidFormat);
        }

        Ok(())
    }

    /// Get the raw postal-code string.
    pub fn as_str(&self) -> &str {
        &self.zip_code
    }
}

impl<'de> Deserialize<'de> for ZipCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = HashMap::<String, String>::deserialize(deserializer)?;

        let zip_code = fields
            .get("zipcode")
            .or_else(|| fields.get("cep"))
            .cloned()
            .unwrap_or_default();

        Ok(Self { zip_code })
    }
}

#[cfg(test)]
#[path = "zip_code_tests.rs"]
mod tests;
