//! Error types for the paybutton library

use thiserror::Error;

/// Result type alias for paybutton operations
pub type Result<T> = std::result::Result<T, PayButtonError>;

/// Main error type for paybutton operations
#[derive(Error, Debug)]
pub enum PayButtonError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base64 encoding/decoding error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// URL parse error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// No embed token was supplied
    #[error("Missing embed token")]
    MissingEmbedToken,

    /// Neither a bitcoin nor a fiat amount was supplied
    #[error("Missing amount: one of btc or usd is required")]
    MissingAmount,

    /// Both a bitcoin and a fiat amount were supplied
    #[error("Duplicate amount: btc and usd are mutually exclusive")]
    DuplicateAmount,

    /// The amount could not be parsed as a positive number
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// The status endpoint answered with a non-success status
    #[error("Status request failed with status {status}")]
    StatusRequest { status: u16 },

    /// Polling needs a tokio runtime
    #[error("No async runtime available to drive status polling")]
    NoRuntime,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PayButtonError {
    /// Create an invalid amount error
    pub fn invalid_amount(value: impl Into<String>) -> Self {
        Self::InvalidAmount {
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is raised while resolving button configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingEmbedToken
                | Self::MissingAmount
                | Self::DuplicateAmount
                | Self::InvalidAmount { .. }
                | Self::Config { .. }
        )
    }
}
