//! Inventory fetch error types.

use std::fmt;
use std::time::Duration;

/// Coarse classification of a failed refresh, for whoever supervises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The upstream did not answer within the configured bound.
    ConnectTimeout,
    /// Any other transport or HTTP failure.
    ConnectionFailed,
    /// The refresh itself broke (panicked or was torn down).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConnectTimeout => f.write_str("connect timeout"),
            ErrorKind::ConnectionFailed => f.write_str("connection failed"),
            ErrorKind::Unexpected => f.write_str("unexpected"),
        }
    }
}

/// Errors that can occur when fetching the inventory.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// No response within the timeout
    #[error("connection timeout while connecting to inventory API ({timeout:?})")]
    ConnectTimeout { timeout: Duration },

    /// Transport failure (DNS, refused, reset, ...)
    #[error("connection error while connecting to inventory API: {message}")]
    Connection { message: String },

    /// API returned a non-success status
    #[error("inventory API error {status}")]
    Status { status: u16 },

    /// Response body is not JSON
    #[error("inventory response is not JSON: {message}")]
    Body { message: String },

    /// Reading a local inventory file failed
    #[error("cannot read inventory file: {message}")]
    File { message: String },
}

impl FetchError {
    /// Classify a reqwest failure, quoting `timeout` when it timed out.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::ConnectTimeout { timeout }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Connection {
                message: err.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::ConnectTimeout { .. } => ErrorKind::ConnectTimeout,
            FetchError::Connection { .. }
            | FetchError::Status { .. }
            | FetchError::Body { .. }
            | FetchError::File { .. } => ErrorKind::ConnectionFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_quotes_configured_bound() {
        let err = FetchError::ConnectTimeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "connection timeout while connecting to inventory API (10s)"
        );
        assert_eq!(err.kind(), ErrorKind::ConnectTimeout);
    }

    #[test]
    fn everything_else_is_connection_failed() {
        let errors = [
            FetchError::Connection {
                message: "dns error".into(),
            },
            FetchError::Status { status: 503 },
            FetchError::Body {
                message: "expected value".into(),
            },
            FetchError::File {
                message: "not found".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::ConnectionFailed, "{err}");
        }
    }

    #[test]
    fn error_display() {
        let err = FetchError::Status { status: 503 };
        assert_eq!(err.to_string(), "inventory API error 503");

        assert_eq!(ErrorKind::ConnectTimeout.to_string(), "connect timeout");
        assert_eq!(ErrorKind::ConnectionFailed.to_string(), "connection failed");
        assert_eq!(ErrorKind::Unexpected.to_string(), "unexpected");
    }
}
