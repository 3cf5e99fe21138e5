//! Authentication endpoints: registration, login, identity, and quota.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::transport::{require_non_empty, ErrorScope, Session};
use crate::types::{LoginResponse, Quota, QuotaValidation, RegisterResponse, User};
use crate::Result;

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

/// Client for the `/auth` endpoints.
///
/// Usually reached through [`crate::CodeepClient`], which shares one
/// session between this and the task client so a login here authenticates
/// task calls too.
#[derive(Clone)]
pub struct AuthClient {
    session: Arc<Session>,
}

impl AuthClient {
    /// Standalone auth client with its own session.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            session: Arc::new(Session::new(config.base_url())?),
        })
    }

    /// Auth client over an existing shared session.
    pub fn with_session(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Register a new user account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        require_non_empty(username, "username")?;
        require_non_empty(email, "email")?;
        require_non_empty(password, "password")?;

        let body = json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.session
            .request_json(Method::POST, "/auth/register", Some(&body), None, ErrorScope::Auth)
            .await
    }

    /// Log in and store the returned access token on the session.
    ///
    /// After this succeeds, every request on the same session (including
    /// task calls made through a shared facade) carries the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        require_non_empty(username, "username")?;
        require_non_empty(password, "password")?;

        let body = json!({
            "username": username,
            "password": password,
        });
        let login: LoginResponse = self
            .session
            .request_json(Method::POST, "/auth/login", Some(&body), None, ErrorScope::Auth)
            .await?;
        self.session.set_token(login.access_token.clone());
        debug!(username, "session authenticated");
        Ok(login)
    }

    /// Manually install a bearer token, e.g. one restored from storage.
    pub fn set_token(&self, token: impl Into<String>) {
        self.session.set_token(token);
    }

    /// Drop the stored token, returning the session to anonymous.
    pub fn clear_token(&self) {
        self.session.clear_token();
    }

    /// The currently authenticated user.
    pub async fn get_current_user(&self) -> Result<User> {
        let envelope: UserEnvelope = self
            .session
            .request_json(Method::GET, "/auth/me", None, None, ErrorScope::Auth)
            .await?;
        Ok(envelope.user)
    }

    /// Quota counters for the authenticated user.
    ///
    /// A 429 here means the quota is already exhausted and maps to
    /// [`crate::Error::QuotaExceeded`].
    pub async fn get_quota(&self) -> Result<Quota> {
        self.session
            .request_json(Method::GET, "/auth/quota", None, None, ErrorScope::Quota)
            .await
    }

    /// Check whether quota remains, without treating exhaustion as an
    /// error.
    ///
    /// This is the one endpoint where a 429 is a normal return: the
    /// response body is decoded and handed back with `exceeded` set, so
    /// pre-flight checks can branch on quota state instead of catching
    /// errors. Every other non-2xx status still maps to an error.
    pub async fn validate_quota(&self) -> Result<QuotaValidation> {
        let response = self
            .session
            .send(Method::GET, "/auth/quota/validate", None, None)
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let mut validation: QuotaValidation = Session::json_body(response).await?;
            validation.exceeded = true;
            return Ok(validation);
        }

        let response = Session::check(response, ErrorScope::Quota).await?;
        Session::json_body(response).await
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.session.base_url())
            .finish()
    }
}
