use std::fmt;

use thiserror::Error;

/// The protocol step a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TokenFetch,
    Login,
    StatFetch,
    Parse,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TokenFetch => "token fetch",
            Self::Login => "login",
            Self::StatFetch => "stat fetch",
            Self::Parse => "parse",
        })
    }
}

/// Top-level error type for the `modemex-api` crate.
///
/// Leaf variants describe what went wrong; [`Error::Context`] records which
/// protocol step it went wrong in. The binary maps these into exit codes
/// and HTTP 500 responses.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The caller cancelled the read while a request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// A non-200 response where 200 was required.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    // ── Session ─────────────────────────────────────────────────────
    /// The device no longer accepts the held session cookie.
    #[error("session rejected by device -- re-authentication required")]
    NeedAuth,

    /// The login POST was answered with a non-200 status.
    #[error("login rejected (HTTP {status})")]
    LoginRejected { status: u16 },

    /// The login POST succeeded but set no session cookie.
    #[error("login response carried no session cookie")]
    NoSessionCookie,

    // ── Page contract ───────────────────────────────────────────────
    /// The login surface did not contain a recognizable token.
    #[error("authentication token not found in response")]
    TokenNotFound,

    /// The stat page loaded but carried no statistics line.
    #[error("statistics line not found on diagnostics page")]
    DataNotFound,

    /// The statistics line did not match the expected grammar.
    #[error("malformed statistics data: {message}")]
    MalformedData { message: String },

    // ── Registry ────────────────────────────────────────────────────
    #[error("modem vendor '{vendor}' not found")]
    UnknownVendor { vendor: String },

    #[error("modem vendor '{vendor}' model '{model}' not found")]
    UnknownModel { vendor: String, model: String },

    // ── Context ─────────────────────────────────────────────────────
    /// A failure tagged with the step that produced it.
    #[error("{operation} failed: {source}")]
    Context {
        operation: Operation,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData {
            message: message.into(),
        }
    }

    /// Tag this error with the step that produced it.
    pub fn context(self, operation: Operation) -> Self {
        Self::Context {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, with every [`Error::Context`] layer peeled off.
    pub fn root_cause(&self) -> &Self {
        let mut err = self;
        while let Self::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// The outermost step this error is tagged with, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Context { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_need_auth(&self) -> bool {
        matches!(self.root_cause(), Self::NeedAuth)
    }

    /// Returns `true` for failures caused by the network rather than the page.
    pub fn is_transient(&self) -> bool {
        match self.root_cause() {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
