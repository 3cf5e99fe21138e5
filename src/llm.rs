//! Language-model adapter over the task API.
//!
//! Orchestration frameworks expect a single-prompt completion interface.
//! [`CodeepLlm`] provides one by creating a task per prompt and blocking on
//! the completion poll, so remote task execution plugs into pipelines that
//! know nothing about tasks.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use tracing::warn;

use crate::tasks::{TaskClient, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use crate::types::TaskStatus;
use crate::{BoxStream, Error, Result};

/// One completed generation in a batch result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Generation {
    pub text: String,
}

/// One chunk of a (pseudo-)streamed generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationChunk {
    pub text: String,
}

/// Identifying parameters of a model, for caller-side caching and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmParams {
    pub model_name: String,
    pub toolset: Option<Vec<String>>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// The single-prompt completion convention expected by orchestration
/// frameworks.
///
/// [`call`](LanguageModel::call) is the strict entry point: it returns an
/// error when the backing generation fails. The provided
/// [`generate`](LanguageModel::generate) and
/// [`stream`](LanguageModel::stream) keep the convention's lenient defaults
/// instead: a failed prompt becomes an empty generation so one bad prompt
/// never aborts a batch, and a failed stream yields a single empty chunk
/// rather than an error. Callers relying on per-prompt error detail should
/// use `call` directly.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short identifier for the model kind.
    fn llm_type(&self) -> &str;

    /// Complete a single prompt, truncating at stop sequences.
    async fn call(&self, prompt: &str, stop: Option<&[String]>) -> Result<String>;

    /// Complete several prompts sequentially, one generation per prompt.
    ///
    /// Output order matches input order. A failed prompt is logged and
    /// replaced by an empty generation; the rest of the batch proceeds.
    async fn generate(&self, prompts: &[String], stop: Option<&[String]>) -> Vec<Generation> {
        let mut generations = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            match self.call(prompt, stop).await {
                Ok(text) => generations.push(Generation { text }),
                Err(error) => {
                    warn!(%error, "batch prompt failed; substituting empty generation");
                    generations.push(Generation::default());
                }
            }
        }
        generations
    }

    /// Pseudo-stream a completion as a single chunk.
    ///
    /// The backing service has no incremental output: nothing happens until
    /// the stream is first polled, then the whole completion arrives as one
    /// chunk. A failed generation yields a single empty chunk.
    fn stream<'a>(
        &'a self,
        prompt: &'a str,
        stop: Option<&'a [String]>,
    ) -> BoxStream<'a, GenerationChunk> {
        Box::pin(stream::once(async move {
            match self.call(prompt, stop).await {
                Ok(text) => GenerationChunk { text },
                Err(error) => {
                    warn!(%error, "streamed prompt failed; yielding empty chunk");
                    GenerationChunk::default()
                }
            }
        }))
    }
}

/// Completion-style model backed by Codeep tasks.
///
/// Each `call` creates one task (with this adapter's toolset), polls it to
/// completion, and returns its result text.
pub struct CodeepLlm {
    client: TaskClient,
    model_name: String,
    toolset: Option<Vec<String>>,
    timeout: Duration,
    poll_interval: Duration,
}

impl CodeepLlm {
    /// Adapter over `client` with the default model label and timings.
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            model_name: "codeep-ai".to_string(),
            toolset: None,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the model label reported in identifying params.
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Toolset attached to every task this adapter creates.
    pub fn with_toolset(mut self, toolset: Vec<String>) -> Self {
        self.toolset = Some(toolset);
        self
    }

    /// Deadline for each completion poll.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay between completion polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Parameters identifying this adapter instance.
    pub fn identifying_params(&self) -> LlmParams {
        LlmParams {
            model_name: self.model_name.clone(),
            toolset: self.toolset.clone(),
            timeout: self.timeout,
            poll_interval: self.poll_interval,
        }
    }
}

#[async_trait]
impl LanguageModel for CodeepLlm {
    fn llm_type(&self) -> &str {
        "codeep_ai"
    }

    async fn call(&self, prompt: &str, stop: Option<&[String]>) -> Result<String> {
        let task = self
            .client
            .create_task(prompt, self.toolset.as_deref())
            .await?;
        let completed = self
            .client
            .wait_for_completion(&task.task_id, self.timeout, self.poll_interval)
            .await?;

        if completed.status == TaskStatus::Failed {
            let message = completed
                .error_message
                .unwrap_or_else(|| "task failed".to_string());
            return Err(Error::task(message));
        }

        let mut text = completed
            .result
            .ok_or_else(|| Error::task("task completed but no result returned"))?;
        if let Some(stop) = stop {
            apply_stop_sequences(&mut text, stop);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for CodeepLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeepLlm")
            .field("model_name", &self.model_name)
            .field("toolset", &self.toolset)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Truncate `text` at the first occurrence of a stop sequence, scanning the
/// stop list in caller order.
///
/// The scan commits to the first listed sequence present anywhere in the
/// text, even when a later-listed sequence occurs earlier in the text;
/// callers encode priority by list order. Empty sequences are ignored.
fn apply_stop_sequences(text: &mut String, stop: &[String]) {
    for sequence in stop {
        if sequence.is_empty() {
            continue;
        }
        if let Some(index) = text.find(sequence.as_str()) {
            text.truncate(index);
            break;
        }
    }
}
