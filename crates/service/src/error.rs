//! Typed error enum for the service layer.
//!
//! Separates field validation failures (shown inline), API failures (shown as
//! notifications) and missing entities (shown as the not-found view).

use std::collections::BTreeMap;
use std::fmt;

use attendify_client::{ApiError, CredentialsError};
use attendify_core::CoreError;
use thiserror::Error;

/// Field-keyed validation messages, kept inside dialog state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Service-layer error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The API call failed; the message is meant for a notification.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Input rejected before anything was sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The requested entity does not exist.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },

    /// The operation needs a signed-in session.
    #[error("not signed in")]
    NotAuthenticated,

    /// A state machine was asked for a transition its current state forbids.
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: &'static str, action: &'static str },

    /// The token store could not be read or written.
    #[error("credential storage: {0}")]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ServiceError {
    /// Whether this error should be rendered as the not-found view.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api(e) => e.is_not_found(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::NotAuthenticated => true,
            Self::Api(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.message(),
            other => other.to_string(),
        }
    }
}
