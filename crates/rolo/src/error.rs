//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use rolo_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(code(rolo::auth_required), help("Run: rolo login"))]
    AuthRequired,

    #[error("Session expired")]
    #[diagnostic(code(rolo::session_expired), help("Log in again with: rolo login"))]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    #[diagnostic(code(rolo::auth_failed), help("Check your username and password."))]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Contact not found: {message}")]
    #[diagnostic(code(rolo::not_found), help("Run: rolo list to see available contacts"))]
    NotFound { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid input: {reason}")]
    #[diagnostic(code(rolo::validation))]
    Validation { reason: String },

    #[error("The server rejected the request: {message}")]
    #[diagnostic(code(rolo::rejected), help("{fields}"))]
    Rejected { message: String, fields: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the server")]
    #[diagnostic(
        code(rolo::connection_failed),
        help("Check the server URL (--server or ROLO_SERVER) and your network.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(rolo::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    #[error("Server error: {message}")]
    #[diagnostic(code(rolo::server_error), help("The server failed; try again shortly."))]
    Server { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No server configured")]
    #[diagnostic(
        code(rolo::no_server),
        help(
            "Pass --server, set ROLO_SERVER, or add `server = \"https://host/api\"`\n\
             to the config file at: {path}"
        )
    )]
    NoServer { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rolo::config))]
    Config { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(rolo::config_file))]
    ConfigFile(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Deleting a contact requires confirmation")]
    #[diagnostic(
        code(rolo::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    ConfirmationRequired,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::ConfigFile(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthRequired | Self::SessionExpired | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Rejected { .. }
            | Self::Config { .. }
            | Self::ConfirmationRequired => exit_code::USAGE,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => Self::AuthRequired,
            CoreError::SessionExpired => Self::SessionExpired,
            CoreError::InvalidCredentials { message } => Self::AuthFailed { message },
            CoreError::InvalidContact { reason } => Self::Validation { reason },
            CoreError::UnsupportedFormat { file_name } => Self::Validation {
                reason: format!("{file_name}: unsupported format (expected .json or .csv)"),
            },
            CoreError::MalformedImport { file_name, reason } => Self::Validation {
                reason: format!("{file_name}: {reason}"),
            },
            CoreError::Storage(e) => Self::Io(e),
            CoreError::Api(e) => from_api(e),
            CoreError::Shared(e) => from_core_ref(&e),
        }
    }
}

/// Mapping for errors shared with other in-flight callers, which arrive
/// behind an `Arc` and can only be read, not moved.
fn from_core_ref(err: &CoreError) -> CliError {
    match err {
        CoreError::NotAuthenticated => CliError::AuthRequired,
        CoreError::SessionExpired => CliError::SessionExpired,
        CoreError::InvalidCredentials { message } => CliError::AuthFailed {
            message: message.clone(),
        },
        CoreError::InvalidContact { reason } => CliError::Validation {
            reason: reason.clone(),
        },
        CoreError::Shared(inner) => from_core_ref(inner),
        other => CliError::Server {
            message: other.to_string(),
        },
    }
}

fn from_api(err: rolo_api::Error) -> CliError {
    match err {
        rolo_api::Error::NotFound { message } => CliError::NotFound { message },
        rolo_api::Error::Authorization { message, .. } => CliError::AuthFailed { message },
        rolo_api::Error::Validation {
            message, errors, ..
        } => {
            let fields = if errors.is_empty() {
                "Fix the input and retry.".to_owned()
            } else {
                errors
                    .iter()
                    .map(|(field, reason)| format!("{field}: {reason}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            CliError::Rejected { message, fields }
        }
        rolo_api::Error::Server { message, .. } => CliError::Server { message },
        rolo_api::Error::Api { message } => CliError::Server { message },
        rolo_api::Error::Transport(e) => {
            if e.is_timeout() {
                CliError::Timeout
            } else {
                CliError::ConnectionFailed { source: e.into() }
            }
        }
        other => CliError::Server {
            message: other.to_string(),
        },
    }
}
