//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use modemex_api::Error as ApiError;
use modemex_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(modemex::validation),
        help("Set it in the config file or through MODEM_{upper}.")
    )]
    Validation {
        field: String,
        upper: String,
        reason: String,
    },

    #[error("No password configured")]
    #[diagnostic(
        code(modemex::no_credentials),
        help("Set MODEM_PASSWORD, or point password_file at a file holding it.")
    )]
    NoCredentials,

    #[error(transparent)]
    #[diagnostic(code(modemex::config))]
    Config(ConfigError),

    // ── Device ───────────────────────────────────────────────────────
    #[error("Unsupported device")]
    #[diagnostic(
        code(modemex::unsupported_device),
        help("Run: modemex models to see the supported vendors and models")
    )]
    UnsupportedDevice {
        #[source]
        source: ApiError,
    },

    #[error("Could not authenticate with the device")]
    #[diagnostic(
        code(modemex::auth_failed),
        help("Check the configured user and password against the web UI.")
    )]
    AuthFailed {
        #[source]
        source: ApiError,
    },

    #[error("Could not reach the device")]
    #[diagnostic(
        code(modemex::connection_failed),
        help(
            "Check that the device URL is reachable from this host.\n\
             For self-signed certificates set insecure = true or ca_cert."
        )
    )]
    ConnectionFailed {
        #[source]
        source: ApiError,
    },

    #[error("Reading the device failed")]
    #[diagnostic(code(modemex::read_failed))]
    ReadFailed {
        #[source]
        source: ApiError,
    },

    #[error("Could not encode metrics")]
    #[diagnostic(code(modemex::metrics))]
    Metrics(#[from] prometheus::Error),

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoCredentials | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::UnsupportedDevice { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation {
                upper: field.to_ascii_uppercase(),
                field,
                reason,
            },
            ConfigError::NoCredentials => Self::NoCredentials,
            other => Self::Config(other),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err.root_cause() {
            ApiError::UnknownVendor { .. } | ApiError::UnknownModel { .. } => {
                Self::UnsupportedDevice { source: err }
            }
            ApiError::LoginRejected { .. } | ApiError::NoSessionCookie | ApiError::NeedAuth => {
                Self::AuthFailed { source: err }
            }
            ApiError::Transport(_) | ApiError::Tls(_) | ApiError::InvalidUrl(_) => {
                Self::ConnectionFailed { source: err }
            }
            _ => Self::ReadFailed { source: err },
        }
    }
}
