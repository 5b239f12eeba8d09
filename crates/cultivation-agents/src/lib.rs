//! Agent state, actions, and per-agent scheduling for the cultivation
//! simulation.
//!
//! This crate is the logic layer for agents: everything that operates on
//! [`cultivation_types::Agent`] state without touching persistence or the
//! tick loop itself. It sits between `cultivation-types` (data structures)
//! and `cultivation-core` (clock, tick phases, gathering, save/restore).
//!
//! # Modules
//!
//! - [`actions`] -- Action catalog, capability registry, and per-type state
//!   ([`actions::ActionKind`], [`actions::ActionInstance`]).
//! - [`agent`] -- Agent creation and management ([`AgentManager`]).
//! - [`effects`] -- Effect-source merge into an agent's cached effect map.
//! - [`error`] -- Error types for all agent operations ([`AgentError`]).
//! - [`inventory`] -- Inventory resource bookkeeping.
//! - [`relations`] -- Mirrored pairwise relationship adjustment.
//! - [`runtime`] -- Per-agent action scheduler ([`runtime::AgentRuntime`]).

pub mod actions;
pub mod agent;
pub mod effects;
pub mod error;
pub mod inventory;
pub mod relations;
pub mod runtime;

#[cfg(test)]
mod test_support;

pub use agent::{set_user_long_term_objective, AgentManager, ChildAgentParams};
pub use effects::recompute_agent_effects;
pub use error::AgentError;
pub use runtime::AgentRuntime;
