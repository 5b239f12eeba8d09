//! Bounded-concurrency call gateway (§4.5 "Bounded concurrency",
//! "Retry policy", "Template-driven calls", "Task-name dispatch").
//!
//! Grounded in `original_source/src/utils/llm/client.py`: a module-level
//! semaphore gates every call regardless of mode; `call_llm_json` retries
//! on parse failure only, preserving the call mode; `call_llm_with_task_name`
//! resolves a mode via the task table before delegating down the same
//! template → json chain.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::config::{BackendConfig, CallMode, TaskModeTable};
use crate::error::LlmError;
use crate::log::CallLog;
use crate::parse::parse_json_object;
use crate::template::render_template;
use crate::transport::Transport;

const DEFAULT_MAX_CONCURRENT_CALLS: usize = 10;

/// Coordinates every LLM call made during a tick: enforces the process-wide
/// concurrency cap, resolves call modes, retries on parse failure, and
/// records each call to the rolling log.
pub struct Dispatcher {
    transport: Transport,
    config: BackendConfig,
    modes: TaskModeTable,
    semaphore: Arc<Semaphore>,
    log: Option<CallLog>,
}

impl Dispatcher {
    /// Build a dispatcher with the default concurrency cap of 10 permits.
    #[must_use]
    pub fn new(config: BackendConfig, modes: TaskModeTable, log: Option<CallLog>) -> Self {
        Self::with_max_concurrent_calls(config, modes, log, DEFAULT_MAX_CONCURRENT_CALLS)
    }

    /// Build a dispatcher with an explicit concurrency cap.
    #[must_use]
    pub fn with_max_concurrent_calls(
        config: BackendConfig,
        modes: TaskModeTable,
        log: Option<CallLog>,
        max_concurrent_calls: usize,
    ) -> Self {
        Self {
            transport: Transport::new(config.clone()),
            config,
            modes,
            semaphore: Arc::new(Semaphore::new(max_concurrent_calls)),
            log,
        }
    }

    /// Send `prompt` under `mode`, holding one concurrency permit for the
    /// duration of the call.
    ///
    /// # Errors
    ///
    /// Propagates any [`LlmError`] from the transport.
    pub async fn call_llm(&self, prompt: &str, mode: CallMode) -> Result<String, LlmError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed while the dispatcher is alive");

        let model = self.config.model_for(mode);
        let started = Instant::now();
        let response = self.transport.complete(model, prompt).await?;
        let elapsed = started.elapsed();

        if let Some(log) = &self.log {
            log.record(model, prompt, &response, elapsed);
        }

        Ok(response)
    }

    /// Call the LLM and parse its response as a JSON object, retrying on
    /// parse failure up to `max_retries` additional times.
    ///
    /// # Errors
    ///
    /// Returns the transport error immediately if the call itself fails.
    /// Returns the last [`LlmError::Parse`] if every attempt fails to parse.
    pub async fn call_llm_json(
        &self,
        prompt: &str,
        mode: CallMode,
        max_retries: u32,
    ) -> Result<serde_json::Value, LlmError> {
        let mut last_parse_error = None;
        for attempt in 0..=max_retries {
            let response = self.call_llm(prompt, mode).await?;
            match parse_json_object(&response) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(attempt, max_retries, "LLM response failed to parse as JSON");
                    last_parse_error = Some(err);
                }
            }
        }
        Err(last_parse_error.unwrap_or_else(|| LlmError::Parse(String::new())))
    }

    /// Render `template_text` against `info_map` and dispatch the result
    /// through [`Self::call_llm_json`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Template`] if rendering fails, or the underlying
    /// call/parse error otherwise.
    pub async fn call_llm_with_template(
        &self,
        template_text: &str,
        info_map: &serde_json::Value,
        mode: CallMode,
        max_retries: u32,
    ) -> Result<serde_json::Value, LlmError> {
        let prompt = render_template(template_text, info_map)?;
        self.call_llm_json(&prompt, mode, max_retries).await
    }

    /// Resolve `task_name` to a call mode via the task table, then
    /// delegate to [`Self::call_llm_with_template`].
    ///
    /// # Errors
    ///
    /// See [`Self::call_llm_with_template`].
    pub async fn call_llm_with_task_name(
        &self,
        task_name: &str,
        template_text: &str,
        info_map: &serde_json::Value,
        max_retries: u32,
    ) -> Result<serde_json::Value, LlmError> {
        let mode = self.modes.resolve(task_name);
        self.call_llm_with_template(template_text, info_map, mode, max_retries).await
    }
}
