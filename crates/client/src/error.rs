//! Typed error enums for the API client.

use std::path::PathBuf;

use thiserror::Error;

/// A response body that does not match the expected schema.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("inconsistent {field} in {context}: {reason}")]
    Inconsistent { context: String, field: &'static str, reason: String },
}

/// Failure of the durable credential store.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt credentials file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no configuration directory available for credentials")]
    NoConfigDir,
}

/// Errors from attendify API operations.
///
/// Every variant exposes a machine `code()`, a human `message()` and,
/// for server-reported failures, structured `details()`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String, details: Option<serde_json::Value> },
    #[error("invalid response: {0}")]
    Decode(#[from] DecodeError),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

impl ApiError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Status { status, .. } => match status {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            Self::Decode(_) => "DECODE_ERROR",
            Self::ClientInit(_) => "CLIENT_INIT",
        }
    }

    /// Message suitable for a transient notification.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Timeout => "The server took too long to respond".to_owned(),
            Self::Network(_) => "Could not reach the server".to_owned(),
            other => other.to_string(),
        }
    }

    /// Structured details reported by the server, if any.
    #[must_use]
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
