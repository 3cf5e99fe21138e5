//! Typed records mirroring the Codeep API's JSON payloads.
//!
//! Each record corresponds to exactly one server response shape. The client
//! never synthesizes fields or merges data across responses: what the
//! server sent is what the caller gets.

use serde::{Deserialize, Serialize};

/// A registered Codeep user.
///
/// Snapshots are immutable on the client side; re-fetch to observe changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub api_key: String,
    pub daily_limit: i64,
    pub created_at: String,
}

/// Lifecycle state of a task, as reported by the server.
///
/// The full set of statuses is owned by the server. Anything this client
/// does not recognize is carried verbatim in [`TaskStatus::Other`] and
/// treated as still in progress, so new server states never break polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    /// A status string this client version does not know about.
    Other(String),
}

impl TaskStatus {
    /// The server's exact status string.
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Other(s) => s.as_str(),
        }
    }

    /// Terminal statuses stop the polling loop. Everything else, including
    /// unrecognized statuses, keeps polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => TaskStatus::Pending,
            "running" => TaskStatus::Running,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TaskStatus::from(s.as_str()))
    }
}

/// A unit of asynchronous work submitted to the Codeep service.
///
/// Tasks are created by the client but mutated only by the server; the
/// client observes progress by re-fetching and replacing its local copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub user_id: i64,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolset: Option<Vec<String>>,
    pub status: TaskStatus,
    /// Final output. Present once the task completed successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Server-side failure description. Present once the task failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Per-user quota counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub daily_limit: i64,
    pub used_today: i64,
    pub remaining: i64,
}

/// Outcome of a quota validation check.
///
/// Unlike every other endpoint, a 429 here is a normal value with
/// `exceeded` set rather than an error, so callers can branch on quota
/// state without error handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaValidation {
    /// Derived from the HTTP status by the client: true on a 429 response.
    #[serde(skip)]
    pub exceeded: bool,
    #[serde(default)]
    pub remaining: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a successful registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// Response to a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}
