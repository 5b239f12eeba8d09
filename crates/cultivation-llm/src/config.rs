//! LLM dispatch configuration: backend endpoint, call modes, and the
//! task-name to mode table (§4.5 "Call modes").
//!
//! Grounded in `original_source/src/utils/llm/config.py`'s `LLMConfig` /
//! `get_task_mode`: a task resolves to a mode via a fine-grained table unless
//! a global override forces every task to one mode.

use std::collections::BTreeMap;

use crate::error::LlmError;

/// The call modes a decision can be dispatched under, plus `llm.mode`'s
/// `"default"` setting, which asks for no process-wide override at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    /// The full-capability model.
    Normal,
    /// A cheaper, faster model for routine decisions.
    Fast,
    /// `llm.mode: default` -- resolve each task from [`TaskModeTable`]'s
    /// per-task-name table instead of forcing one mode everywhere.
    Default,
}

impl CallMode {
    /// The global override this value asks for: `None` for
    /// [`CallMode::Default`], `Some(self)` for an actual mode.
    #[must_use]
    pub fn as_override(self) -> Option<Self> {
        match self {
            Self::Default => None,
            mode => Some(mode),
        }
    }
}

/// Endpoint and model configuration for the single OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base API URL, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier used under [`CallMode::Normal`].
    pub normal_model: String,
    /// Model identifier used under [`CallMode::Fast`].
    pub fast_model: String,
}

impl BackendConfig {
    /// The model name to use for a given call mode.
    #[must_use]
    pub fn model_for(&self, mode: CallMode) -> &str {
        match mode {
            CallMode::Normal | CallMode::Default => &self.normal_model,
            CallMode::Fast => &self.fast_model,
        }
    }
}

/// Resolves a task name to a [`CallMode`], honoring a global override.
///
/// When `global_override` is set, every task dispatches under that mode
/// regardless of the per-task table. Otherwise a task absent from
/// `task_modes` defaults to [`CallMode::Normal`].
#[derive(Debug, Clone, Default)]
pub struct TaskModeTable {
    task_modes: BTreeMap<String, CallMode>,
    global_override: Option<CallMode>,
}

impl TaskModeTable {
    /// Build a table from a task→mode map with no global override.
    #[must_use]
    pub fn new(task_modes: BTreeMap<String, CallMode>) -> Self {
        Self { task_modes, global_override: None }
    }

    /// Force every task to resolve to `mode`, ignoring the per-task table.
    pub fn set_global_override(&mut self, mode: Option<CallMode>) {
        self.global_override = mode;
    }

    /// Resolve the mode for `task_name`.
    #[must_use]
    pub fn resolve(&self, task_name: &str) -> CallMode {
        if let Some(mode) = self.global_override {
            return mode;
        }
        self.task_modes.get(task_name).copied().unwrap_or(CallMode::Normal)
    }
}

/// Load backend configuration from environment variables.
///
/// Required: `LLM_API_URL`, `LLM_API_KEY`, `LLM_NORMAL_MODEL`.
/// Optional: `LLM_FAST_MODEL` (defaults to `LLM_NORMAL_MODEL`'s value).
///
/// # Errors
///
/// Returns [`LlmError::Config`] if a required variable is missing.
pub fn backend_config_from_env() -> Result<BackendConfig, LlmError> {
    let api_url = env_var("LLM_API_URL")?;
    let api_key = env_var("LLM_API_KEY")?;
    let normal_model = env_var("LLM_NORMAL_MODEL")?;
    let fast_model = std::env::var("LLM_FAST_MODEL").unwrap_or_else(|_| normal_model.clone());

    Ok(BackendConfig { api_url, api_key, normal_model, fast_model })
}

fn env_var(name: &str) -> Result<String, LlmError> {
    std::env::var(name).map_err(|e| LlmError::Config(format!("missing required env var {name}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn task_table_resolves_known_task() {
        let mut modes = BTreeMap::new();
        modes.insert(String::from("nickname"), CallMode::Fast);
        let table = TaskModeTable::new(modes);
        assert_eq!(table.resolve("nickname"), CallMode::Fast);
    }

    #[test]
    fn task_table_defaults_to_normal_for_unknown_task() {
        let table = TaskModeTable::new(BTreeMap::new());
        assert_eq!(table.resolve("unknown_task"), CallMode::Normal);
    }

    #[test]
    fn global_override_wins_over_task_table() {
        let mut modes = BTreeMap::new();
        modes.insert(String::from("nickname"), CallMode::Fast);
        let mut table = TaskModeTable::new(modes);
        table.set_global_override(Some(CallMode::Normal));
        assert_eq!(table.resolve("nickname"), CallMode::Normal);
    }

    #[test]
    fn mode_default_parses_and_asks_for_no_override() {
        let mode: CallMode = serde_json::from_str("\"default\"").expect("parses");
        assert_eq!(mode, CallMode::Default);
        assert_eq!(mode.as_override(), None);
        assert_eq!(CallMode::Fast.as_override(), Some(CallMode::Fast));
    }

    #[test]
    fn model_for_selects_by_mode() {
        let config = BackendConfig {
            api_url: String::from("https://api.example.com/v1"),
            api_key: String::from("key"),
            normal_model: String::from("big-model"),
            fast_model: String::from("small-model"),
        };
        assert_eq!(config.model_for(CallMode::Normal), "big-model");
        assert_eq!(config.model_for(CallMode::Fast), "small-model");
    }
}
