//! Error types for the load & booking client

use thiserror::Error;

/// Main error type for the load & booking client
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// The server answered with a non-2xx status
    #[error("API returned error {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server supplied message, or the canonical reason
        message: String,
    },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Not found error
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// The entity's status does not offer the requested action
    #[error("Action '{action}' is not available while status is {status}")]
    ActionNotAllowed {
        /// Requested action
        action: String,
        /// Current status of the entity
        status: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error = Error::from(io_error);

        assert!(matches!(app_error, Error::Io(_)));
        assert!(format!("{}", app_error).contains("I/O error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_http_error_display() {
        let error = Error::Http {
            status: 400,
            message: "Cannot update cancelled load".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "API returned error 400: Cannot update cancelled load"
        );
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_action_not_allowed_display() {
        let error = Error::ActionNotAllowed {
            action: "edit".to_string(),
            status: "CANCELLED".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Action 'edit' is not available while status is CANCELLED"
        );
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_validation_error() {
        let error = Error::Validation {
            field: "shipperId".to_string(),
            message: "Please enter shipper ID".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Validation error: shipperId - Please enter shipper ID"
        );
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let app_error = Error::from(json_error);

        assert!(matches!(app_error, Error::Serialization(_)));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_configuration_constructor() {
        let error = Error::configuration("missing base url");
        assert_eq!(error.to_string(), "Configuration error: missing base url");
    }
}
