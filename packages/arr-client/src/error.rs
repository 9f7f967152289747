//! Catalog gateway error types

use thiserror::Error;

/// Errors returned by Radarr / Sonarr calls
#[derive(Error, Debug)]
pub enum ArrError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("request to {service} timed out: {path}")]
    Timeout { service: &'static str, path: String },

    /// The service could not be reached
    #[error("connection to {service} failed: {message}")]
    Connection {
        service: &'static str,
        message: String,
    },

    /// The service answered with a non-success status
    #[error("{service} API error {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// JSON parsing failed
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was well-formed but not what the call expects
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ArrError {
    /// Whether this is a request timeout (the only class the movies run retries)
    pub fn is_timeout(&self) -> bool {
        match self {
            ArrError::Timeout { .. } => true,
            ArrError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error is transient
    ///
    /// Retries on timeouts, connection failures, rate limiting and 5xx
    /// responses. Client errors (4xx) are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ArrError::Timeout { .. } | ArrError::Connection { .. } => true,
            ArrError::Api { status, .. } => *status == 429 || *status >= 500,
            ArrError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            _ => false,
        }
    }
}

/// Result type for catalog gateway operations
pub type ArrResult<T> = Result<T, ArrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err = ArrError::Timeout {
            service: "Radarr",
            path: "/movie".to_string(),
        };
        assert!(err.is_timeout());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_connection_is_retryable_but_not_timeout() {
        let err = ArrError::Connection {
            service: "Sonarr",
            message: "refused".to_string(),
        };
        assert!(!err.is_timeout());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_api_status_classification() {
        let server_error = ArrError::Api {
            service: "Sonarr",
            status: 503,
            message: String::new(),
        };
        let not_found = ArrError::Api {
            service: "Sonarr",
            status: 404,
            message: String::new(),
        };
        assert!(server_error.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!server_error.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = ArrError::Api {
            service: "Radarr",
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Radarr API error 401: Unauthorized");
    }
}
