use std::collections::BTreeMap;

use thiserror::Error;

/// Top-level error type for the `rolo-api` crate.
///
/// Classifies every failure mode of the directory API: structured 4xx
/// validation failures, authorization failures (which force a session
/// clear upstream), missing resources, server-side faults, and transport
/// problems. `rolo-core` maps these into user-facing conditions.
#[derive(Debug, Error)]
pub enum Error {
    // ── Structured API failures ─────────────────────────────────────
    /// 4xx with per-field errors (e.g. a rejected contact payload).
    #[error("Validation failed (HTTP {status}): {message}")]
    Validation {
        status: u16,
        message: String,
        /// Field name -> reason, as reported by the server.
        errors: BTreeMap<String, String>,
    },

    /// 401 or 403 -- the bearer token is invalid, expired, or missing.
    #[error("Authorization failed (HTTP {status}): {message}")]
    Authorization { status: u16, message: String },

    /// 404 for a contact or user that does not exist.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 5xx -- the server failed; eligible for caller-level retry.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The envelope arrived with `success: false` on a 2xx response.
    #[error("API rejected the request: {message}")]
    Api { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session should be cleared and the user sent
    /// back to login.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }

    /// Returns `true` for a structured validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a transient error worth a manual retry.
    ///
    /// Covers network faults, timeouts, and 5xx responses. The client
    /// never retries internally; the caller decides.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Server { .. } => true,
            _ => false,
        }
    }

    /// The per-field errors from a validation failure, if any.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
