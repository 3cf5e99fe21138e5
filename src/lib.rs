//! # codeep-rs
//!
//! Rust client SDK for the Codeep AI task execution API.
//!
//! Codeep runs prompts as server-side tasks: a client submits a prompt
//! (optionally with a toolset), the server queues and executes it, and the
//! client polls until a terminal status. This crate wraps that lifecycle
//! behind a single [`CodeepClient`] and additionally adapts it to the
//! completion-style [`LanguageModel`] interface that LLM orchestration
//! frameworks expect.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`CodeepClient`] facade composing everything below |
//! | [`auth`] | Registration, login, identity, quota |
//! | [`tasks`] | Task CRUD and completion polling |
//! | [`llm`] | [`LanguageModel`] trait and the [`CodeepLlm`] adapter |
//! | [`config`] | Environment selection and base URLs |
//! | [`transport`] | Shared HTTP session and error mapping |
//! | [`types`] | Typed records for the API's JSON payloads |
//! | [`error`] | The crate-wide [`Error`] enum |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use codeep_rs::{CodeepClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> codeep_rs::Result<()> {
//!     let client = CodeepClient::with_config(&Config::development())?;
//!     client.login("demo", "secret").await?;
//!
//!     let task = client
//!         .create_task("Summarize the quarterly report", None)
//!         .await?;
//!     let done = client
//!         .wait_for_completion(&task.task_id, Duration::from_secs(300), Duration::from_secs(5))
//!         .await?;
//!     println!("{:?}", done.result);
//!     Ok(())
//! }
//! ```
//!
//! Or drive it as a plain completion model:
//!
//! ```rust,no_run
//! use codeep_rs::{CodeepClient, Config, LanguageModel};
//!
//! #[tokio::main]
//! async fn main() -> codeep_rs::Result<()> {
//!     let client = CodeepClient::with_config(&Config::development())?;
//!     client.login("demo", "secret").await?;
//!
//!     let text = client.llm().call("Write a haiku about queues", None).await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every fallible call returns [`Result`] with the crate-wide [`Error`]:
//! authentication, authorization, and quota failures get their own
//! variants, task failures and polling timeouts theirs, and everything
//! else surfaces as [`Error::Api`] with the HTTP status and server detail.
//! The one deliberate exception is
//! [`validate_quota`](CodeepClient::validate_quota), which reports an
//! exhausted quota as a normal return value.
//!
//! The crate emits [`tracing`] events (one per request, with a generated
//! correlation id) and installs no subscriber; applications choose their
//! own.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod tasks;
pub mod transport;
pub mod types;

pub use auth::AuthClient;
pub use client::{CodeepClient, TaskHistoryQuery, DEFAULT_USAGE_DAYS};
pub use config::Config;
pub use error::Error;
pub use llm::{CodeepLlm, Generation, GenerationChunk, LanguageModel, LlmParams};
pub use tasks::{TaskClient, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
pub use transport::Session;
pub use types::{
    LoginResponse, Quota, QuotaValidation, RegisterResponse, Task, TaskStatus, User,
};

use std::pin::Pin;

use futures::Stream;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Pinned boxed stream, used by the pseudo-streaming generation call.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Minimal imports for application code.
pub mod prelude {
    pub use crate::client::{CodeepClient, TaskHistoryQuery};
    pub use crate::config::Config;
    pub use crate::llm::{CodeepLlm, LanguageModel};
    pub use crate::types::{Task, TaskStatus, User};
    pub use crate::{Error, Result};
}
