//! Unified error type for the Codeep SDK.
//!
//! Every fallible call in this crate returns [`crate::Result`], and every
//! failure is one of the variants below. Callers branch on the variant; the
//! message is ready to surface as-is.
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Authentication` | Credentials missing, wrong, or expired (401 on auth endpoints) |
//! | `Authorization` | Authenticated but not permitted (403) |
//! | `QuotaExceeded` | Daily quota exhausted (429 on the quota endpoint) |
//! | `Task` | The task itself failed, or finished without a result |
//! | `TaskTimeout` | Polling hit the deadline before a terminal status |
//! | `Api` | Any other non-2xx response, with status and server detail |
//! | `Network` | Transport failure below HTTP (DNS, refused, timed out) |
//! | `Validation` | Input rejected locally, before any request was sent |

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Error type covering every failure the SDK can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed: the token is missing, invalid, or expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The caller is authenticated but not allowed to perform the action.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The daily quota is exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The task reached the failed state, or completed without a result.
    #[error("task error: {0}")]
    Task(String),

    /// Polling exceeded the caller-supplied deadline before the task
    /// reached a terminal status.
    #[error("task {task_id} did not complete within {} seconds", .timeout.as_secs())]
    TaskTimeout { task_id: String, timeout: Duration },

    /// Non-2xx response not covered by a more specific variant.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Parsed JSON error body, when the server sent one.
        details: Option<Value>,
    },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Caller-supplied input was rejected before sending anything.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn task(msg: impl Into<String>) -> Self {
        Error::Task(msg.into())
    }

    /// HTTP status associated with this error, where one applies.
    ///
    /// The auth-flavored variants report their canonical status even though
    /// they do not store one; `Network`, `Task`, `TaskTimeout` and
    /// `Validation` have no status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication(_) => Some(401),
            Error::Authorization(_) => Some(403),
            Error::QuotaExceeded(_) => Some(429),
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured detail mirrored from the server's JSON error body, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// True for task-level failures, including the timeout subtype.
    pub fn is_task_error(&self) -> bool {
        matches!(self, Error::Task(_) | Error::TaskTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_messages() {
        let err = Error::Authentication("token expired".to_string());
        assert_eq!(err.to_string(), "authentication failed: token expired");

        let err = Error::QuotaExceeded("daily limit reached".to_string());
        assert_eq!(err.to_string(), "quota exceeded: daily limit reached");

        let err = Error::Api {
            status: 500,
            message: "internal error".to_string(),
            details: None,
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): internal error");
    }

    #[test]
    fn test_timeout_display_includes_task_and_deadline() {
        let err = Error::TaskTimeout {
            task_id: "task_123".to_string(),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(
            err.to_string(),
            "task task_123 did not complete within 300 seconds"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::Authentication("x".to_string()).status_code(),
            Some(401)
        );
        assert_eq!(Error::Authorization("x".to_string()).status_code(), Some(403));
        assert_eq!(
            Error::QuotaExceeded("x".to_string()).status_code(),
            Some(429)
        );
        assert_eq!(
            Error::Api {
                status: 404,
                message: "missing".to_string(),
                details: None,
            }
            .status_code(),
            Some(404)
        );
        assert_eq!(Error::Task("x".to_string()).status_code(), None);
        assert_eq!(Error::Validation("x".to_string()).status_code(), None);
    }

    #[test]
    fn test_details_only_on_api_errors() {
        let err = Error::Api {
            status: 422,
            message: "bad field".to_string(),
            details: Some(json!({"field": "email"})),
        };
        assert_eq!(err.details(), Some(&json!({"field": "email"})));
        assert_eq!(Error::Task("x".to_string()).details(), None);
    }

    #[test]
    fn test_timeout_counts_as_task_error() {
        let timeout = Error::TaskTimeout {
            task_id: "t".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(timeout.is_task_error());
        assert!(Error::Task("x".to_string()).is_task_error());
        assert!(!Error::Validation("x".to_string()).is_task_error());
    }
}
