//! Geography, resources, and environment for the cultivation-world simulation.
//!
//! This crate models the physical world: regions as a directed weighted
//! graph, a tile grid assigning each cell to exactly one region, and the
//! season derivation used by world-drift formulas.
//!
//! # Modules
//!
//! - [`environment`] -- Season derivation from the month counter.
//! - [`error`] -- Error types for world-graph operations.
//! - [`static_data`] -- Read-only reference tables the core queries by id.
//! - [`starting_world`] -- A small default starting map.
//! - [`world_map`] -- The world graph: regions as nodes, routes as edges,
//!   with neighbor queries and the cultivate-region ownership rule.

pub mod environment;
pub mod error;
pub mod static_data;
pub mod starting_world;
pub mod world_map;

pub use environment::{Season, season_for_month};
pub use error::WorldError;
pub use starting_world::{StartingRegionIds, create_starting_world};
pub use static_data::{StaticDataTables, StaticRow, StaticTable};
pub use world_map::WorldMap;
