//! The main entry point composing auth, tasks, dashboards, and the
//! language-model adapter over one shared session.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Method;
use serde_json::Value;

use crate::auth::AuthClient;
use crate::config::{self, Config};
use crate::llm::CodeepLlm;
use crate::tasks::TaskClient;
use crate::transport::{ErrorScope, Session};
use crate::types::{LoginResponse, Quota, QuotaValidation, RegisterResponse, Task, User};
use crate::Result;

/// Default trailing-day window for [`CodeepClient::get_usage_analytics`].
pub const DEFAULT_USAGE_DAYS: u32 = 30;

/// Filters for the paginated task-history endpoint.
///
/// Defaults to the first page of twenty with no filters; chain the
/// builder methods to narrow the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHistoryQuery {
    pub page: u32,
    pub per_page: u32,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for TaskHistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            status: None,
            from: None,
            to: None,
        }
    }
}

impl TaskHistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Only tasks in the given status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Inclusive lower bound on creation date (`YYYY-MM-DD`).
    pub fn from_date(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Inclusive upper bound on creation date (`YYYY-MM-DD`).
    pub fn to_date(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(from) = &self.from {
            query.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            query.push(("to", to.clone()));
        }
        query
    }
}

/// Main client for the Codeep AI API.
///
/// One client owns one [`Session`] (base URL plus bearer token) shared by
/// its auth and task managers, so a single login authenticates everything.
/// Every manager operation is re-exposed here; applications that only need
/// one subsystem can reach the managers through [`auth`](Self::auth) and
/// [`tasks`](Self::tasks).
pub struct CodeepClient {
    session: Arc<Session>,
    auth: AuthClient,
    tasks: TaskClient,
    llm: OnceCell<CodeepLlm>,
}

impl CodeepClient {
    /// Client over the process-default configuration (see
    /// [`config::init`]), falling back to the environment variables.
    pub fn new() -> Result<Self> {
        Self::with_config(&config::default_config())
    }

    /// Client over an explicit configuration.
    pub fn with_config(config: &Config) -> Result<Self> {
        Self::with_base_url(config.base_url())
    }

    /// Client pointed directly at a base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let session = Arc::new(Session::new(base_url)?);
        Ok(Self {
            auth: AuthClient::with_session(Arc::clone(&session)),
            tasks: TaskClient::with_session(Arc::clone(&session)),
            session,
            llm: OnceCell::new(),
        })
    }

    /// Base URL this client issues requests against.
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// The auth manager sharing this client's session.
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The task manager sharing this client's session.
    pub fn tasks(&self) -> &TaskClient {
        &self.tasks
    }

    /// The language-model adapter bound to this client's task manager.
    ///
    /// Created on first access with default parameters and memoized; every
    /// later call returns the same instance. For custom parameters, build a
    /// [`CodeepLlm`] over [`tasks`](Self::tasks) directly.
    pub fn llm(&self) -> &CodeepLlm {
        self.llm.get_or_init(|| CodeepLlm::new(self.tasks.clone()))
    }

    // Auth operations.

    /// Register a new user account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        self.auth.register(username, email, password).await
    }

    /// Log in and store the access token for all subsequent calls.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        self.auth.login(username, password).await
    }

    /// Manually install a bearer token, e.g. one restored from storage.
    pub fn set_token(&self, token: impl Into<String>) {
        self.auth.set_token(token);
    }

    /// Drop the stored token, returning the client to anonymous.
    pub fn clear_token(&self) {
        self.auth.clear_token();
    }

    /// The currently authenticated user.
    pub async fn get_current_user(&self) -> Result<User> {
        self.auth.get_current_user().await
    }

    /// Quota counters for the authenticated user.
    pub async fn get_quota(&self) -> Result<Quota> {
        self.auth.get_quota().await
    }

    /// Check remaining quota; exhaustion is a normal return, not an error.
    pub async fn validate_quota(&self) -> Result<QuotaValidation> {
        self.auth.validate_quota().await
    }

    // Task operations.

    /// Submit a new task.
    pub async fn create_task(&self, prompt: &str, toolset: Option<&[String]>) -> Result<Task> {
        self.tasks.create_task(prompt, toolset).await
    }

    /// All tasks owned by the authenticated user.
    pub async fn get_user_tasks(&self) -> Result<Vec<Task>> {
        self.tasks.get_user_tasks().await
    }

    /// Fetch a single task by id.
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.tasks.get_task(task_id).await
    }

    /// Update a task with server-defined fields.
    pub async fn update_task(&self, task_id: &str, fields: Value) -> Result<Task> {
        self.tasks.update_task(task_id, fields).await
    }

    /// Delete a task.
    pub async fn delete_task(&self, task_id: &str) -> Result<Value> {
        self.tasks.delete_task(task_id).await
    }

    /// Detailed results for a task.
    pub async fn get_task_results(&self, task_id: &str) -> Result<Value> {
        self.tasks.get_task_results(task_id).await
    }

    /// Current processing-queue statistics.
    pub async fn get_queue_status(&self) -> Result<Value> {
        self.tasks.get_queue_status().await
    }

    /// Poll a task until it reaches a terminal status.
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Task> {
        self.tasks
            .wait_for_completion(task_id, timeout, poll_interval)
            .await
    }

    // Dashboard operations. These surfaces evolve server-side, so their
    // payloads are returned as raw JSON rather than pinned into structs.

    /// Aggregate dashboard statistics for the authenticated user.
    pub async fn get_dashboard_stats(&self) -> Result<Value> {
        self.session
            .request_json(Method::GET, "/dashboard/stats", None, None, ErrorScope::General)
            .await
    }

    /// Paginated task history with optional status and date filters.
    pub async fn get_task_history(&self, query: &TaskHistoryQuery) -> Result<Value> {
        self.session
            .request_json(
                Method::GET,
                "/dashboard/tasks/history",
                None,
                Some(&query.to_query()),
                ErrorScope::General,
            )
            .await
    }

    /// Usage analytics over a trailing window of `days` days
    /// (commonly [`DEFAULT_USAGE_DAYS`]).
    pub async fn get_usage_analytics(&self, days: u32) -> Result<Value> {
        let query = [("days", days.to_string())];
        self.session
            .request_json(Method::GET, "/dashboard/usage", None, Some(&query), ErrorScope::General)
            .await
    }

    /// Service health probe. Requires no authentication.
    pub async fn health_check(&self) -> Result<Value> {
        self.session
            .request_json(Method::GET, "/health", None, None, ErrorScope::General)
            .await
    }
}

impl std::fmt::Debug for CodeepClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeepClient")
            .field("base_url", &self.session.base_url())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query_defaults() {
        let query = TaskHistoryQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 20);
        assert_eq!(
            query.to_query(),
            vec![("page", "1".to_string()), ("per_page", "20".to_string())]
        );
    }

    #[test]
    fn test_history_query_builder_appends_filters_in_order() {
        let query = TaskHistoryQuery::new()
            .page(3)
            .per_page(50)
            .status("completed")
            .from_date("2024-01-01")
            .to_date("2024-12-31");
        assert_eq!(
            query.to_query(),
            vec![
                ("page", "3".to_string()),
                ("per_page", "50".to_string()),
                ("status", "completed".to_string()),
                ("from", "2024-01-01".to_string()),
                ("to", "2024-12-31".to_string()),
            ]
        );
    }

    #[test]
    fn test_with_config_uses_environment_url() {
        let client = CodeepClient::with_config(&Config::development()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = CodeepClient::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn test_llm_is_memoized() {
        let client = CodeepClient::with_config(&Config::development()).unwrap();
        let first = client.llm() as *const CodeepLlm;
        let second = client.llm() as *const CodeepLlm;
        assert_eq!(first, second);
    }
}
