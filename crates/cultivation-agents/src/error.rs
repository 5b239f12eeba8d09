//! Error types for the `cultivation-agents` crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! This module defines the error hierarchy used across agent creation,
//! plan-queue/runtime operations, inventory, and relation bookkeeping.

use cultivation_types::AgentId;

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Attempted to remove more of a resource than the agent holds.
    #[error("insufficient resource: wanted {requested} of {resource:?} but only have {available}")]
    InsufficientResource {
        /// The resource type being removed.
        resource: cultivation_types::Resource,
        /// The quantity the caller attempted to remove.
        requested: u64,
        /// The quantity the agent actually holds.
        available: u64,
    },

    /// An arithmetic overflow occurred during a runtime computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// Agent with the given ID was not found.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Agent name already exists.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// The named action has no registered capability record.
    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    /// An action's precondition check failed at promotion time.
    #[error("action cannot start: {0}")]
    CannotStart(String),
}
