//! Error types for the `cultivation-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use cultivation_types::{AgentId, LocationId, RouteId};

/// Errors that can occur during world-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A region was not found in the world graph.
    #[error("region not found: {0}")]
    RegionNotFound(LocationId),

    /// A route was not found in the world graph.
    #[error("route not found: {0}")]
    RouteNotFound(RouteId),

    /// No route exists between the specified regions.
    #[error("no route from {from} to {to}")]
    NoRouteBetween {
        /// Origin region.
        from: LocationId,
        /// Destination region.
        to: LocationId,
    },

    /// A duplicate entity was inserted where uniqueness is required.
    #[error("duplicate region id: {0}")]
    DuplicateRegion(LocationId),

    /// A duplicate route was inserted where uniqueness is required.
    #[error("duplicate route id: {0}")]
    DuplicateRoute(RouteId),

    /// A route referenced an endpoint that does not exist.
    #[error("route endpoint not found: {0}")]
    RouteEndpointNotFound(LocationId),

    /// The cultivate region is already hosted by a different agent.
    #[error("region {region} is already hosted by {current_host}")]
    RegionAlreadyHosted {
        /// The contested region.
        region: LocationId,
        /// The agent currently hosting it.
        current_host: AgentId,
    },

    /// A grid coordinate falls outside the map's configured bounds.
    #[error("position ({x}, {y}) is out of bounds")]
    OutOfBounds {
        /// Attempted x coordinate.
        x: u32,
        /// Attempted y coordinate.
        y: u32,
    },
}
