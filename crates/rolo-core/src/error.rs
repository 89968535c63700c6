use thiserror::Error;

/// Failures surfaced by the core state layer.
///
/// API failures pass through as [`CoreError::Api`]; the variants above it
/// are conditions the core detects itself, before or after the network.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An authenticated operation was attempted while logged out.
    /// Detected locally; no request is sent.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The server rejected the bearer token; the session has been cleared
    /// and the user must log in again.
    #[error("Session expired -- please log in again")]
    SessionExpired,

    /// Login was rejected (wrong username/password).
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// A contact payload failed client-side validation, before submission.
    #[error("Invalid contact: {reason}")]
    InvalidContact { reason: String },

    /// An import file has an extension the pipeline does not recognize.
    /// Rejected before any network call.
    #[error("Unsupported import format: {file_name} (expected .json or .csv)")]
    UnsupportedFormat { file_name: String },

    /// An import file failed to parse or validate; the whole batch is
    /// rejected and nothing is submitted.
    #[error("Import rejected ({file_name}): {reason}")]
    MalformedImport { file_name: String, reason: String },

    /// The session vault could not be written during login/register.
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// An API error passed through from the directory client.
    #[error(transparent)]
    Api(#[from] rolo_api::Error),

    /// A failure observed through a deduplicated query. The original error
    /// is shared with every caller that joined the same fetch.
    #[error("{0}")]
    Shared(std::sync::Arc<CoreError>),
}

impl CoreError {
    /// Returns `true` if the condition is worth a manual retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transient(),
            Self::Shared(e) => e.is_transient(),
            _ => false,
        }
    }
}
