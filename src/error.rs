//! Error types for esql-reports.
//!
//! Defines the main error enum used throughout the application. Transport
//! failures while talking to the query endpoint have no variant: the client
//! logs them and returns an empty response instead.

use thiserror::Error;

/// Main error type for esql-reports operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The connection URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The connection URL carries a username without a password, or the reverse.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The backend answered with an error object.
    #[error("response contained error: {response}")]
    Backend {
        /// Pretty-printed raw response.
        response: String,
    },

    /// The backend answered with something that is not a query result.
    #[error("response contained {reason}: {response}")]
    MalformedResponse {
        /// What was wrong with the response (e.g. "no columns").
        reason: String,
        /// Pretty-printed raw response.
        response: String,
    },

    /// A chart script could not be loaded or failed to build its chart.
    #[error("Script error: {0}")]
    Script(String),

    /// The external chart renderer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The external document compiler failed.
    #[error("Compile error: {0}")]
    Compile(String),

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors while reading documents or writing images.
    #[error("IO error: {0}")]
    Io(String),
}

impl ReportError {
    /// Creates an invalid URL error with the given message.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Creates an invalid credentials error with the given message.
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    /// Creates a backend error carrying the raw response.
    pub fn backend(response: &serde_json::Value) -> Self {
        Self::Backend {
            response: pretty(response),
        }
    }

    /// Creates a malformed response error carrying the raw response.
    pub fn malformed(reason: impl Into<String>, response: &serde_json::Value) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            response: pretty(response),
        }
    }

    /// Creates a script error with the given message.
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Creates a compile error with the given message.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an IO error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "URL Error",
            Self::InvalidCredentials(_) => "Credentials Error",
            Self::Backend { .. } => "Backend Error",
            Self::MalformedResponse { .. } => "Response Error",
            Self::Script(_) => "Script Error",
            Self::Render(_) => "Render Error",
            Self::Compile(_) => "Compile Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "IO Error",
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;
