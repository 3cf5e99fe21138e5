//! Task endpoints: creation, inspection, updates, and completion polling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::transport::{require_non_empty, ErrorScope, Session};
use crate::types::Task;
use crate::{Error, Result};

/// Default deadline for [`TaskClient::wait_for_completion`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Deserialize)]
struct TaskListEnvelope {
    tasks: Vec<Task>,
}

/// Client for the `/tasks` endpoints.
///
/// Cloning is cheap and clones share the session (and therefore the
/// token); the language-model adapter holds one this way.
#[derive(Clone)]
pub struct TaskClient {
    session: Arc<Session>,
}

impl TaskClient {
    /// Standalone task client with its own session.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            session: Arc::new(Session::new(config.base_url())?),
        })
    }

    /// Task client over an existing shared session.
    pub fn with_session(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Submit a new task.
    ///
    /// An empty toolset is omitted from the request entirely rather than
    /// sent as `[]`; the server may treat absent and empty differently.
    /// Toolset order is preserved as given.
    pub async fn create_task(&self, prompt: &str, toolset: Option<&[String]>) -> Result<Task> {
        require_non_empty(prompt, "prompt")?;
        let body = create_task_body(prompt, toolset);
        let envelope: TaskEnvelope = self
            .session
            .request_json(Method::POST, "/tasks/tasks", Some(&body), None, ErrorScope::General)
            .await?;
        debug!(task_id = envelope.task.task_id.as_str(), "task created");
        Ok(envelope.task)
    }

    /// All tasks owned by the authenticated user, in server order.
    pub async fn get_user_tasks(&self) -> Result<Vec<Task>> {
        let envelope: TaskListEnvelope = self
            .session
            .request_json(Method::GET, "/tasks/tasks", None, None, ErrorScope::General)
            .await?;
        Ok(envelope.tasks)
    }

    /// Fetch a single task by id.
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        require_non_empty(task_id, "task_id")?;
        let envelope: TaskEnvelope = self
            .session
            .request_json(
                Method::GET,
                &format!("/tasks/tasks/{task_id}"),
                None,
                None,
                ErrorScope::General,
            )
            .await?;
        Ok(envelope.task)
    }

    /// Update a task.
    ///
    /// `fields` is passed through verbatim; which fields are updatable is
    /// owned by the server, not encoded here.
    pub async fn update_task(&self, task_id: &str, fields: Value) -> Result<Task> {
        require_non_empty(task_id, "task_id")?;
        let envelope: TaskEnvelope = self
            .session
            .request_json(
                Method::PUT,
                &format!("/tasks/tasks/{task_id}"),
                Some(&fields),
                None,
                ErrorScope::General,
            )
            .await?;
        Ok(envelope.task)
    }

    /// Delete a task, returning the server's acknowledgement as-is.
    pub async fn delete_task(&self, task_id: &str) -> Result<Value> {
        require_non_empty(task_id, "task_id")?;
        self.session
            .request_json(
                Method::DELETE,
                &format!("/tasks/tasks/{task_id}"),
                None,
                None,
                ErrorScope::General,
            )
            .await
    }

    /// Detailed results for a task, richer than [`Task::result`].
    pub async fn get_task_results(&self, task_id: &str) -> Result<Value> {
        require_non_empty(task_id, "task_id")?;
        self.session
            .request_json(
                Method::GET,
                &format!("/tasks/tasks/{task_id}/results"),
                None,
                None,
                ErrorScope::General,
            )
            .await
    }

    /// Current processing-queue statistics.
    pub async fn get_queue_status(&self) -> Result<Value> {
        self.session
            .request_json(Method::GET, "/tasks/queue/status", None, None, ErrorScope::General)
            .await
    }

    /// Poll `task_id` until it reaches a terminal status.
    ///
    /// Returns the task as soon as a poll observes `completed` or `failed`.
    /// A failed task is a successful return here, not an error; callers
    /// inspect the status. Unrecognized statuses keep polling. The deadline
    /// is checked between polls only, so the wall-clock overrun can exceed
    /// `timeout` by up to one `poll_interval`.
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Task> {
        require_non_empty(task_id, "task_id")?;
        let start = Instant::now();
        while start.elapsed() < timeout {
            let task = self.get_task(task_id).await?;
            debug!(task_id, status = %task.status, "polled task");
            if task.status.is_terminal() {
                return Ok(task);
            }
            tokio::time::sleep(poll_interval).await;
        }
        Err(Error::TaskTimeout {
            task_id: task_id.to_string(),
            timeout,
        })
    }
}

impl std::fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskClient")
            .field("base_url", &self.session.base_url())
            .finish()
    }
}

fn create_task_body(prompt: &str, toolset: Option<&[String]>) -> Value {
    let mut body = json!({ "prompt": prompt });
    if let Some(toolset) = toolset {
        if !toolset.is_empty() {
            body["toolset"] = json!(toolset);
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_body_omits_missing_toolset() {
        let body = create_task_body("do the thing", None);
        assert_eq!(body, json!({"prompt": "do the thing"}));
        assert!(body.get("toolset").is_none());
    }

    #[test]
    fn test_create_task_body_omits_empty_toolset() {
        let body = create_task_body("do the thing", Some(&[]));
        assert!(body.get("toolset").is_none());
    }

    #[test]
    fn test_create_task_body_preserves_toolset_order() {
        let toolset = vec![
            "web_search".to_string(),
            "code_executor".to_string(),
            "file_reader".to_string(),
        ];
        let body = create_task_body("do the thing", Some(&toolset));
        assert_eq!(
            body,
            json!({
                "prompt": "do the thing",
                "toolset": ["web_search", "code_executor", "file_reader"],
            })
        );
    }
}
