//! HTTP session shared by every manager bound to one client.
//!
//! The session owns the base URL, the pooled `reqwest` client, and the
//! current bearer token. Issuing a request takes a point-in-time snapshot
//! of the token; swapping the token mid-flight affects only requests built
//! after the swap.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// Request header carrying the client-generated correlation id.
pub const REQUEST_ID_HEADER: &str = "x-codeep-request-id";

/// Environment variable overriding the per-request HTTP timeout (seconds).
pub const ENV_HTTP_TIMEOUT: &str = "CODEEP_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Which typed error a non-2xx status maps to depends on the endpoint
/// class: a 401 on login is an authentication failure, a 401 elsewhere is
/// just an API error; 429 means quota exhaustion only on the quota
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorScope {
    /// Auth endpoints: 401 maps to `Error::Authentication`.
    Auth,
    /// Quota endpoints: as `Auth`, plus 429 maps to `Error::QuotaExceeded`.
    Quota,
    /// Everything else: 401 and 429 stay `Error::Api`.
    General,
}

/// Shared HTTP state: base URL, connection pool, bearer token.
pub struct Session {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl Session {
    /// Build a session for `base_url`.
    ///
    /// The URL must parse as an absolute URL; a malformed one fails here,
    /// before any request is sent. The per-request timeout defaults to 30
    /// seconds and can be overridden via `CODEEP_HTTP_TIMEOUT_SECS`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::validation(format!("invalid base URL {base_url:?}: {e}")))?;

        let timeout_secs = std::env::var(ENV_HTTP_TIMEOUT)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    /// Base URL this session issues requests against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a bearer token; attached to every request built afterwards.
    ///
    /// Requests already in flight keep the token they were built with, so
    /// swapping tokens while requests are outstanding is safe but those
    /// requests will not pick up the new one.
    pub fn set_token(&self, token: impl Into<String>) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
    }

    /// Drop the stored token; subsequent requests carry no auth header.
    pub fn clear_token(&self) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// The currently stored token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Issue a request and return the raw response.
    ///
    /// Transport failures (the request never produced a response) map to
    /// [`Error::Network`]. Status handling is the caller's job, usually via
    /// [`Session::check`].
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(&str, String)]>,
    ) -> Result<Response> {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        request = request.header(REQUEST_ID_HEADER, request_id.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(query) = query {
            request = request.query(query);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!(
                method = %method,
                path,
                request_id = request_id.as_str(),
                error = %e,
                "codeep request failed to send"
            );
            Error::Network(e)
        })?;

        if response.status().is_success() {
            debug!(
                method = %method,
                path,
                http_status = response.status().as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id.as_str(),
                "codeep request completed"
            );
        } else {
            warn!(
                method = %method,
                path,
                http_status = response.status().as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id.as_str(),
                "codeep request failed"
            );
        }

        Ok(response)
    }

    /// Pass a 2xx response through; map anything else to the typed error
    /// for `scope`, consuming the response body for detail.
    pub(crate) async fn check(response: Response, scope: ErrorScope) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::api_error(response, scope).await)
    }

    async fn api_error(response: Response, scope: ErrorScope) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let details: Option<Value> = serde_json::from_str(&body).ok();
        let message = details
            .as_ref()
            .and_then(extract_server_message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body.clone()
                }
            });

        match (status.as_u16(), scope) {
            (401, ErrorScope::Auth | ErrorScope::Quota) => Error::Authentication(message),
            (403, _) => Error::Authorization(message),
            (429, ErrorScope::Quota) => Error::QuotaExceeded(message),
            (code, _) => Error::Api {
                status: code,
                message,
                details,
            },
        }
    }

    /// Decode a response body into `T`.
    ///
    /// A body that does not match the expected shape is a server contract
    /// violation and maps to [`Error::Api`] carrying the decode failure; a
    /// connection dropped mid-body maps to [`Error::Network`].
    pub(crate) async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Network)?;
        serde_json::from_str(&body).map_err(|e| Error::Api {
            status,
            message: format!("response body did not match the expected shape: {e}"),
            details: serde_json::from_str(&body).ok(),
        })
    }

    /// Send, check the status for `scope`, and decode the body. This is
    /// the common path for every endpoint except quota validation.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(&str, String)]>,
        scope: ErrorScope,
    ) -> Result<T> {
        let response = self.send(method, path, body, query).await?;
        let response = Self::check(response, scope).await?;
        Self::json_body(response).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

/// Best-effort extraction of a human-readable message from a JSON error
/// body. Servers in the wild use `error`, `message`, or `detail`, sometimes
/// nested one level.
fn extract_server_message(details: &Value) -> Option<String> {
    for key in ["error", "message", "detail"] {
        match details.get(key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Object(inner)) => {
                if let Some(Value::String(s)) = inner.get("message") {
                    return Some(s.clone());
                }
            }
            _ => {}
        }
    }
    None
}

/// Reject blank required inputs before any request is built.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_strips_trailing_slash() {
        let session = Session::new("http://localhost:5001/").unwrap();
        assert_eq!(session.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_session_rejects_malformed_url() {
        let err = Session::new("not a url").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_token_snapshot_set_and_clear() {
        let session = Session::new("http://localhost:5001").unwrap();
        assert_eq!(session.token(), None);
        session.set_token("abc");
        assert_eq!(session.token(), Some("abc".to_string()));
        session.clear_token();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_extract_server_message_flat_keys() {
        assert_eq!(
            extract_server_message(&json!({"error": "bad token"})),
            Some("bad token".to_string())
        );
        assert_eq!(
            extract_server_message(&json!({"message": "nope"})),
            Some("nope".to_string())
        );
        assert_eq!(
            extract_server_message(&json!({"detail": "missing"})),
            Some("missing".to_string())
        );
    }

    #[test]
    fn test_extract_server_message_nested_error_object() {
        let body = json!({"error": {"message": "quota exhausted", "code": 429}});
        assert_eq!(
            extract_server_message(&body),
            Some("quota exhausted".to_string())
        );
    }

    #[test]
    fn test_extract_server_message_none_for_unrelated_shapes() {
        assert_eq!(extract_server_message(&json!({"status": "down"})), None);
        assert_eq!(extract_server_message(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("x", "field").is_ok());
        let err = require_non_empty("   ", "prompt").unwrap_err();
        assert!(err.to_string().contains("prompt"));
    }
}
