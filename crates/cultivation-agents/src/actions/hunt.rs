//! `Hunt`: a Timed action that accumulates beast materials from a region's
//! huntable population (§4.2 "Timed"; worked example 1).
//!
//! Grounded in `original_source`'s hunting task: an agent commits to a region
//! for a fixed number of months, rolls a small material yield each tick it
//! runs, and banks the total at `finish`.

use cultivation_types::{ActionStatus, Agent, Event, EventId, RegionKind, Resource};
use rand::Rng;

use crate::inventory;

use super::context::ActionContext;
use super::duration::effective_duration;

/// Base duration before any `duration_reduction` effect is applied.
pub const BASE_DURATION_MONTHS: u64 = 6;

/// Execution state for a running `Hunt`.
#[derive(Debug, Clone)]
pub struct HuntState {
    /// Month the hunt began.
    pub start_month: u64,
    /// Total duration after `duration_reduction` has been applied.
    pub duration_months: u64,
    /// Beast material banked so far this run.
    pub accumulated: u64,
}

/// Whether `agent`'s current region has any huntable population.
pub fn can_start(agent: &Agent, world: &cultivation_world::WorldMap) -> (bool, String) {
    match world.region(agent.location) {
        Some(region) => match &region.kind {
            RegionKind::Normal { huntable, .. } if !huntable.is_empty() => (true, String::new()),
            RegionKind::Normal { .. } => (false, String::from("no huntable population in this region")),
            _ => (false, String::from("region has no wilderness to hunt")),
        },
        None => (false, String::from("agent is not in a known region")),
    }
}

/// Commit `agent` to a hunt, rolling its effective duration once up front.
pub fn start(agent: &Agent, ctx: &ActionContext<'_>) -> HuntState {
    HuntState {
        start_month: ctx.clock,
        duration_months: effective_duration(BASE_DURATION_MONTHS, &agent.cached_effects),
        accumulated: 0,
    }
}

impl HuntState {
    /// Roll this tick's yield and report whether the hunt has run its course.
    pub fn step(&mut self, ctx: &mut ActionContext<'_>) -> ActionStatus {
        let roll = ctx.rng.random_range(1..=3_u64);
        self.accumulated = self.accumulated.saturating_add(roll);

        let elapsed = ctx.clock.saturating_sub(self.start_month);
        if elapsed >= self.duration_months.saturating_sub(1) {
            ActionStatus::Completed
        } else {
            ActionStatus::Running
        }
    }

    /// Bank the accumulated yield and report the hunt's outcome.
    pub fn finish(&self, agent: &mut Agent, clock: u64) -> Vec<Event> {
        let amount = self.accumulated.max(1);
        // Inventory is a plain bounded counter; overflow here would mean the
        // agent already holds close to u64::MAX beast material, never
        // reachable in practice, so the result is simply dropped rather than
        // surfaced as a hunt failure.
        let _ = inventory::add_resource(&mut agent.inventory, Resource::BeastMaterial, amount);

        vec![Event {
            id: EventId::new(),
            month_stamp: clock,
            content: format!("{} returns from the hunt with {amount} units of beast material", agent.name),
            related_agent_ids: vec![agent.id],
            is_major: false,
            is_story: false,
        }]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use cultivation_types::{LocationId, Region, Tile};
    use cultivation_world::WorldMap;
    use rand::SeedableRng;

    use super::*;
    use crate::test_support::make_agent;

    fn huntable_world() -> (WorldMap, LocationId) {
        let mut world = WorldMap::new(4, 4);
        let region = LocationId::new();
        world
            .add_region(Region {
                id: region,
                name: String::from("Greenwood"),
                kind: RegionKind::Normal { huntable: vec![1], harvestable: Vec::new(), mineable: Vec::new() },
            })
            .expect("add region");
        world.place_tile(Tile { x: 0, y: 0, region }).expect("place tile");
        (world, region)
    }

    #[test]
    fn can_start_requires_huntable_population() {
        let (world, region) = huntable_world();
        let mut agent = make_agent();
        agent.location = region;
        assert!(can_start(&agent, &world).0);

        let mut dispatcher_world = WorldMap::new(1, 1);
        let empty_region = LocationId::new();
        dispatcher_world
            .add_region(Region {
                id: empty_region,
                name: String::from("Barren"),
                kind: RegionKind::Normal { huntable: Vec::new(), harvestable: Vec::new(), mineable: Vec::new() },
            })
            .expect("add region");
        agent.location = empty_region;
        assert!(!can_start(&agent, &dispatcher_world).0);
    }

    #[test]
    fn completes_after_duration_elapses() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut world = WorldMap::new(4, 4);
        let mut ctx = ActionContext { world: &mut world, clock: 100, rng: &mut rng, dispatcher: std::sync::Arc::new(test_dispatcher()) };

        let mut state = HuntState { start_month: 100, duration_months: 6, accumulated: 0 };
        for month in 101..105 {
            ctx.clock = month;
            assert_eq!(state.step(&mut ctx), ActionStatus::Running);
        }
        ctx.clock = 105;
        assert_eq!(state.step(&mut ctx), ActionStatus::Completed);
        assert!(state.accumulated >= 1);
    }

    #[test]
    fn finish_grants_at_least_one_unit() {
        let state = HuntState { start_month: 100, duration_months: 6, accumulated: 0 };
        let mut agent = make_agent();
        let events = state.finish(&mut agent, 106);
        assert_eq!(events.len(), 1);
        assert_eq!(agent.inventory.get(&Resource::BeastMaterial).copied(), Some(1));
    }

    fn test_dispatcher() -> cultivation_llm::Dispatcher {
        let config = cultivation_llm::BackendConfig {
            api_url: String::from("https://example.invalid"),
            api_key: String::from("key"),
            normal_model: String::from("model"),
            fast_model: String::from("model"),
        };
        cultivation_llm::Dispatcher::new(config, cultivation_llm::TaskModeTable::new(std::collections::BTreeMap::new()), None)
    }
}
