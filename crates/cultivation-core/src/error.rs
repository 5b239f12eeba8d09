//! Error types for the `cultivation-core` crate (§7).
//!
//! Follows a prior per-crate convention: one `thiserror`-derived enum
//! per concern, with `#[from]` wrapping the crates it composes, exactly as
//! `emergence-core::tick::TickError` wraps `ClockError`/`AgentError`/
//! `WorldError`/`DecisionError`.

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors that can occur while running a single tick of the simulator.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The clock could not advance.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// An agent operation failed during the tick.
    #[error("agent error: {0}")]
    Agent(#[from] cultivation_agents::AgentError),

    /// A world-state operation failed during the tick.
    #[error("world error: {0}")]
    World(#[from] cultivation_world::WorldError),
}

/// Errors that can occur during startup (§4 "C13 Configuration & Startup").
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The seed population could not be created.
    #[error("agent error: {0}")]
    Agent(#[from] cultivation_agents::AgentError),

    /// The world could not be constructed from static data.
    #[error("world error: {0}")]
    World(#[from] cultivation_world::WorldError),
}
