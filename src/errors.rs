/*!
 * Error types for the anchorlate pipeline.
 *
 * This module contains custom error types for different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Maximum number of characters of a provider error body carried in an error.
/// Bodies are truncated so user content never leaks into error messages.
pub const ERROR_BODY_LIMIT: usize = 240;

/// Truncate a provider error body for inclusion in an error message
pub fn truncate_error_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

/// Errors that can occur when calling provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Non-success HTTP status or network failure
    #[error("{provider} request failed ({status}): {body}")]
    RequestFailed {
        /// Provider identifier
        provider: String,
        /// HTTP status code, or 0 for a transport-level failure
        status: u16,
        /// Truncated error body
        body: String,
    },

    /// Unparseable or semantically invalid response
    #[error("{provider} returned an invalid response: {reason}")]
    ResponseInvalid {
        /// Provider identifier
        provider: String,
        /// What was wrong with the response
        reason: String,
    },

    /// Error obtaining or refreshing credentials
    #[error("{provider} authentication failed: {reason}")]
    Authentication {
        /// Provider identifier
        provider: String,
        /// Failure description
        reason: String,
    },
}

impl ProviderError {
    /// Build a RequestFailed error from a status and raw body
    pub fn request_failed(provider: &str, status: u16, body: &str) -> Self {
        Self::RequestFailed {
            provider: provider.to_string(),
            status,
            body: truncate_error_body(body),
        }
    }

    /// Build a ResponseInvalid error
    pub fn response_invalid(provider: &str, reason: impl Into<String>) -> Self {
        Self::ResponseInvalid {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Build an Authentication error
    pub fn authentication(provider: &str, reason: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during an anchored translation run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Missing or inconsistent configuration (e.g. no key for a keyed-only service)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The selection needs more chunks than the provider budget allows.
    /// Raised before any chunk is dispatched.
    #[error("Selection requires {required} chunks but the limit is {limit}")]
    ChunkLimitExceeded {
        /// Number of chunks the selection would produce
        required: usize,
        /// Provider chunk-count budget
        limit: usize,
    },

    /// Error from a provider adapter, propagated unchanged
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Post-translation sentinel-token mismatch. Carries counts only,
    /// never region content.
    #[error(
        "Integrity check failed: {missing} missing, {extra} extra \
         (expected {expected_total}, got {got_total}, order preserved: {order_preserved})"
    )]
    Integrity {
        /// Tokens expected but absent from the output
        missing: usize,
        /// Tokens present in the output but not expected
        extra: usize,
        /// Whether the surviving tokens kept their original order
        order_preserved: bool,
        /// Total expected token occurrences
        expected_total: usize,
        /// Total token occurrences found
        got_total: usize,
    },
}
