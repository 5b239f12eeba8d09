//! Shared type definitions for the cultivation-world simulation.
//!
//! This crate is the single source of truth for plain, serializable domain
//! data: ids, enums, the world's entity structs, and the decision/plan
//! records that flow between the LLM dispatch layer and the agent runtime.
//! It intentionally holds no behavior beyond small pure helpers on these
//! types -- the action contract, the tick engine, and the effect merge logic
//! live in their own crates and depend on this one.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers.
//! - [`enums`] -- Enumeration types (realm, resources, action status, sex).
//! - [`structs`] -- Core entity structs (agent, region, event, sect, phenomenon).
//! - [`actions`] -- Decision-chain records produced by an LLM call or user command.

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;

pub use actions::{DecidedAction, DecisionChain};
pub use enums::{ActionStatus, Element, ObjectiveOrigin, Realm, Resource, Sex};
pub use ids::{AgentId, EventId, LocationId, RouteId, RuleId, SectId};
pub use structs::{
    ActionPlan, ActionResultRecord, Agent, EffectMap, EffectValue, Event, Nickname, Objective,
    Personality, Region, RegionKind, Relation, Route, Sect, TemporaryEffect, Tile,
    WorldPhenomenon, AGENT_EVENT_RING_CAPACITY,
};
