//! Error types for Transfluent client operations

use thiserror::Error;

/// Errors raised by the Transfluent client
#[derive(Error, Debug)]
pub enum TransfluentError {
    /// Client could not be set up (invalid config, HTTP client build failure)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },

    /// Caller-supplied arguments failed a local precondition check
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Transport asked to use a verb other than GET or POST
    #[error("Unsupported request method: {method}")]
    UnsupportedMethod {
        method: String,
    },

    /// The HTTP exchange could not be completed (DNS, TCP, TLS)
    #[error("Failed to connect with Transfluent's API: {message}")]
    Connectivity {
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// The caller cancelled the operation
    #[error("Request cancelled")]
    Cancelled,

    /// Response body was expected to be JSON but was not
    #[error("Could not parse API's response: {body}")]
    Parse {
        body: String,
    },

    /// Credential exchange did not yield a token
    #[error("Could not authenticate with API: {message}")]
    Authentication {
        message: String,
    },

    /// Server returned a structured error
    #[error(
        "API returned an error #{kind}: {message}.{}",
        describe(.description)
    )]
    Api {
        kind: String,
        message: String,
        description: Option<String>,
    },

    /// Response matched neither a success nor an error envelope
    #[error("API returned unexpected response: {body}")]
    UnexpectedResponse {
        body: String,
    },

    /// Local file for upload does not exist
    #[error("File not found: {path}")]
    FileAccess {
        path: String,
    },

    /// File download returned a non-200 status
    #[error("Could not retrieve the file! Error: {body}")]
    FileRetrieval {
        body: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe(description: &Option<String>) -> String {
    match description {
        Some(d) => format!(" Error description: {d}"),
        None => String::new(),
    }
}

impl TransfluentError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TransfluentError::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        TransfluentError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(body: impl Into<String>) -> Self {
        TransfluentError::UnexpectedResponse { body: body.into() }
    }

    /// True when the server answered with a structured error of this type code
    pub fn is_api_error_of(&self, kind: &str) -> bool {
        matches!(self, TransfluentError::Api { kind: k, .. } if k == kind)
    }
}

impl From<reqwest::Error> for TransfluentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransfluentError::Timeout
        } else if err.is_builder() {
            TransfluentError::configuration(err.to_string())
        } else {
            TransfluentError::Connectivity {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, TransfluentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_description() {
        let err = TransfluentError::Api {
            kind: "EBackendSecurityViolation".to_string(),
            message: "Invalid token".to_string(),
            description: Some("token expired".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API returned an error #EBackendSecurityViolation: Invalid token. Error description: token expired"
        );
    }

    #[test]
    fn test_api_error_display_without_description() {
        let err = TransfluentError::Api {
            kind: "forbidden".to_string(),
            message: "no".to_string(),
            description: None,
        };
        assert_eq!(err.to_string(), "API returned an error #forbidden: no.");
        assert!(err.is_api_error_of("forbidden"));
        assert!(!err.is_api_error_of("other"));
    }
}
