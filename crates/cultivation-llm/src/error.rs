//! Error types for LLM dispatch.

/// Errors that can occur while dispatching a decision to an LLM backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The backend rejected the API key (HTTP 401).
    #[error("invalid API key")]
    InvalidApiKey,
    /// The backend denied access to the requested resource (HTTP 403).
    #[error("access denied")]
    AccessDenied,
    /// The configured endpoint does not exist (HTTP 404).
    #[error("endpoint not found")]
    EndpointNotFound,
    /// The request exceeded the transport timeout.
    #[error("timeout")]
    Timeout,
    /// The server could not be reached at all.
    #[error("cannot reach server")]
    ConnectionFailed,
    /// Any other transport-level failure, carrying the backend's raw message.
    #[error("LLM backend error: {0}")]
    Backend(String),
    /// The response text could not be parsed into a JSON object after every
    /// retry, carrying the first 500 characters of the last raw response.
    #[error("response parse error: could not extract a JSON object from: {0}")]
    Parse(String),
    /// A prompt template failed to render.
    #[error("template render error: {0}")]
    Template(String),
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
