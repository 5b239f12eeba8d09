//! Bounded-concurrency LLM dispatch gateway (C6).
//!
//! Every agent decision that needs a model call goes through a
//! [`Dispatcher`]: it resolves a call mode, renders a prompt template,
//! sends the request over the shared [`Transport`], tolerantly parses the
//! response back into a JSON object, and retries on parse failure.
//! Concurrency is capped by a single process-wide semaphore so a tick with
//! hundreds of agents deciding at once never floods the upstream provider.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod log;
pub mod parse;
pub mod template;
pub mod transport;

pub use config::{backend_config_from_env, BackendConfig, CallMode, TaskModeTable};
pub use dispatch::Dispatcher;
pub use error::LlmError;
pub use log::CallLog;
pub use template::render_template;
pub use transport::Transport;
