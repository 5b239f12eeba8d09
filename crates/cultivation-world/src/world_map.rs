//! World graph: regions as nodes, routes as weighted directed edges, plus a
//! rectangular tile grid mapping every `(x, y)` cell to exactly one region.

use std::collections::BTreeMap;

use cultivation_types::{AgentId, LocationId, Region, RegionKind, Route, RouteId, Tile};

use crate::error::WorldError;

/// Owns the world's geography: regions, routes between them, and the tile
/// grid that assigns every cell to exactly one region (§3 "Region & Tile").
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    regions: BTreeMap<LocationId, Region>,
    routes: BTreeMap<RouteId, Route>,
    outbound: BTreeMap<LocationId, Vec<RouteId>>,
    tiles: BTreeMap<(u32, u32), LocationId>,
    width: u32,
    height: u32,
}

impl WorldMap {
    /// Create an empty map with the given grid dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Grid width.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` lies within the configured grid bounds.
    pub const fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Register a region. Errors on a duplicate id.
    pub fn add_region(&mut self, region: Region) -> Result<(), WorldError> {
        if self.regions.contains_key(&region.id) {
            return Err(WorldError::DuplicateRegion(region.id));
        }
        self.outbound.insert(region.id, Vec::new());
        self.regions.insert(region.id, region);
        Ok(())
    }

    /// Assign a grid cell to a region. Errors if out of bounds or the region
    /// is unknown.
    pub fn place_tile(&mut self, tile: Tile) -> Result<(), WorldError> {
        if !self.in_bounds(tile.x, tile.y) {
            return Err(WorldError::OutOfBounds { x: tile.x, y: tile.y });
        }
        if !self.regions.contains_key(&tile.region) {
            return Err(WorldError::RegionNotFound(tile.region));
        }
        self.tiles.insert((tile.x, tile.y), tile.region);
        Ok(())
    }

    /// Look up the region owning a grid cell.
    pub fn region_at(&self, x: u32, y: u32) -> Option<LocationId> {
        self.tiles.get(&(x, y)).copied()
    }

    /// Register a directed route. Errors on duplicate id or unknown endpoints.
    pub fn add_route(&mut self, route: Route) -> Result<(), WorldError> {
        if self.routes.contains_key(&route.id) {
            return Err(WorldError::DuplicateRoute(route.id));
        }
        if !self.regions.contains_key(&route.from) {
            return Err(WorldError::RouteEndpointNotFound(route.from));
        }
        if !self.regions.contains_key(&route.to) {
            return Err(WorldError::RouteEndpointNotFound(route.to));
        }
        self.outbound.entry(route.from).or_default().push(route.id);
        self.routes.insert(route.id, route);
        Ok(())
    }

    /// Immutable access to a region.
    pub fn region(&self, id: LocationId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Mutable access to a region.
    pub fn region_mut(&mut self, id: LocationId) -> Option<&mut Region> {
        self.regions.get_mut(&id)
    }

    /// Iterate all regions in stable (`BTreeMap`) id order -- the ordering
    /// guarantee §5 requires to survive save/load.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Iterate all regions mutably in stable id order.
    pub fn regions_mut(&mut self) -> impl Iterator<Item = &mut Region> {
        self.regions.values_mut()
    }

    /// Neighboring regions reachable by one direct route.
    pub fn neighbors(&self, from: LocationId) -> Vec<LocationId> {
        self.outbound
            .get(&from)
            .into_iter()
            .flatten()
            .filter_map(|route_id| self.routes.get(route_id))
            .map(|route| route.to)
            .collect()
    }

    /// Look up a route by id.
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Find the first direct route between two regions, if one exists.
    pub fn route_between(&self, from: LocationId, to: LocationId) -> Option<&Route> {
        self.outbound
            .get(&from)
            .into_iter()
            .flatten()
            .filter_map(|route_id| self.routes.get(route_id))
            .find(|route| route.to == to)
    }

    /// Attempt to set the host of a cultivate region.
    ///
    /// Errors if the region is not a cultivate region, does not exist, or is
    /// already hosted by a different agent.
    pub fn claim_cultivate_region(
        &mut self,
        region_id: LocationId,
        agent: AgentId,
    ) -> Result<(), WorldError> {
        let region = self.regions.get_mut(&region_id).ok_or(WorldError::RegionNotFound(region_id))?;
        if let RegionKind::Cultivate { host, .. } = &mut region.kind {
            match *host {
                Some(existing) if existing != agent => {
                    Err(WorldError::RegionAlreadyHosted { region: region_id, current_host: existing })
                }
                _ => {
                    *host = Some(agent);
                    Ok(())
                }
            }
        } else {
            Err(WorldError::RegionNotFound(region_id))
        }
    }

    /// Release a cultivate region's host, if any.
    pub fn release_cultivate_region(&mut self, region_id: LocationId) {
        if let Some(region) = self.regions.get_mut(&region_id) {
            if let RegionKind::Cultivate { host, .. } = &mut region.kind {
                *host = None;
            }
        }
    }

    /// Apply the per-tick prosperity drift of §4.7 phase 3: every city region
    /// below full prosperity gains one point, clamped to 100.
    pub fn drift_prosperity(&mut self) {
        for region in self.regions.values_mut() {
            if matches!(region.kind, RegionKind::City { .. }) {
                region.apply_prosperity_delta(1);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use cultivation_types::Element;

    fn normal_region(id: LocationId) -> Region {
        Region {
            id,
            name: String::from("Greenwood"),
            kind: RegionKind::Normal { huntable: vec![1], harvestable: vec![2], mineable: Vec::new() },
        }
    }

    #[test]
    fn add_region_rejects_duplicate() {
        let mut map = WorldMap::new(10, 10);
        let id = LocationId::new();
        assert!(map.add_region(normal_region(id)).is_ok());
        assert!(map.add_region(normal_region(id)).is_err());
    }

    #[test]
    fn place_tile_rejects_out_of_bounds() {
        let mut map = WorldMap::new(4, 4);
        let id = LocationId::new();
        map.add_region(normal_region(id)).expect("region insert");
        let err = map.place_tile(Tile { x: 10, y: 10, region: id });
        assert!(err.is_err());
    }

    #[test]
    fn route_between_finds_direct_edge() {
        let mut map = WorldMap::new(10, 10);
        let a = LocationId::new();
        let b = LocationId::new();
        map.add_region(normal_region(a)).expect("region a");
        map.add_region(normal_region(b)).expect("region b");
        map.add_route(Route { id: RouteId::new(), from: a, to: b, travel_cost_months: 1 })
            .expect("route insert");
        assert!(map.route_between(a, b).is_some());
        assert!(map.route_between(b, a).is_none());
    }

    #[test]
    fn cultivate_region_claim_and_release() {
        let mut map = WorldMap::new(10, 10);
        let id = LocationId::new();
        map.add_region(Region {
            id,
            name: String::from("Spirit Vein"),
            kind: RegionKind::Cultivate { host: None, element: Element::Wood, density: 5 },
        })
        .expect("region insert");

        let agent = AgentId::new();
        assert!(map.claim_cultivate_region(id, agent).is_ok());
        // Re-claiming by the same agent is a no-op success.
        assert!(map.claim_cultivate_region(id, agent).is_ok());

        let other = AgentId::new();
        assert!(map.claim_cultivate_region(id, other).is_err());

        map.release_cultivate_region(id);
        assert!(map.claim_cultivate_region(id, other).is_ok());
    }

    #[test]
    fn prosperity_drift_increments_city_regions() {
        let mut map = WorldMap::new(10, 10);
        let id = LocationId::new();
        map.add_region(Region {
            id,
            name: String::from("Port Town"),
            kind: RegionKind::City { store_items: Vec::new(), prosperity: 50 },
        })
        .expect("region insert");

        map.drift_prosperity();
        if let Some(region) = map.region(id) {
            if let RegionKind::City { prosperity, .. } = region.kind {
                assert_eq!(prosperity, 51);
            }
        }
    }
}
