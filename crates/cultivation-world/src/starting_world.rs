//! Default starting world map.
//!
//! Builds a small region graph with one representative of each
//! [`RegionKind`]: a normal hunting ground, a cultivate spirit vein, a city,
//! and a sect territory, connected by routes, plus a tile grid covering
//! them. Content (names, resource ids) is illustrative; the shapes are what
//! the contract needs.

use cultivation_types::{Element, LocationId, Region, RegionKind, Route, RouteId, SectId, Tile};

use crate::error::WorldError;
use crate::world_map::WorldMap;

/// The ids of the regions created by [`create_starting_world`], so callers
/// can place agents without re-deriving them.
#[derive(Debug, Clone, Copy)]
pub struct StartingRegionIds {
    /// A normal region with huntable and harvestable resources.
    pub greenwood: LocationId,
    /// A cultivate region hosting at most one agent.
    pub spirit_vein: LocationId,
    /// A city region with a store and prosperity.
    pub port_town: LocationId,
    /// A sect-owned region.
    pub azure_peak: LocationId,
}

/// Build a four-region starting map on an 8x8 grid.
pub fn create_starting_world(sect: SectId) -> Result<(WorldMap, StartingRegionIds), WorldError> {
    let mut map = WorldMap::new(8, 8);

    let ids = StartingRegionIds {
        greenwood: LocationId::new(),
        spirit_vein: LocationId::new(),
        port_town: LocationId::new(),
        azure_peak: LocationId::new(),
    };

    map.add_region(Region {
        id: ids.greenwood,
        name: String::from("Greenwood"),
        kind: RegionKind::Normal { huntable: vec![1, 2], harvestable: vec![10, 11], mineable: vec![20] },
    })?;
    map.add_region(Region {
        id: ids.spirit_vein,
        name: String::from("Spirit Vein"),
        kind: RegionKind::Cultivate { host: None, element: Element::Wood, density: 5 },
    })?;
    map.add_region(Region {
        id: ids.port_town,
        name: String::from("Port Town"),
        kind: RegionKind::City { store_items: vec![100, 101], prosperity: 40 },
    })?;
    map.add_region(Region {
        id: ids.azure_peak,
        name: String::from("Azure Peak"),
        kind: RegionKind::Sect { sect },
    })?;

    for (from, to) in [
        (ids.greenwood, ids.spirit_vein),
        (ids.spirit_vein, ids.greenwood),
        (ids.greenwood, ids.port_town),
        (ids.port_town, ids.greenwood),
        (ids.port_town, ids.azure_peak),
        (ids.azure_peak, ids.port_town),
    ] {
        map.add_route(Route { id: RouteId::new(), from, to, travel_cost_months: 1 })?;
    }

    for x in 0..4 {
        for y in 0..4 {
            map.place_tile(Tile { x, y, region: ids.greenwood })?;
        }
    }
    for x in 4..8 {
        for y in 0..4 {
            map.place_tile(Tile { x, y, region: ids.port_town })?;
        }
    }
    for x in 0..4 {
        for y in 4..8 {
            map.place_tile(Tile { x, y, region: ids.spirit_vein })?;
        }
    }
    for x in 4..8 {
        for y in 4..8 {
            map.place_tile(Tile { x, y, region: ids.azure_peak })?;
        }
    }

    Ok((map, ids))
}
