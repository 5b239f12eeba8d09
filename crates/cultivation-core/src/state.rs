//! World-level simulation state, owned by the tick engine (§3 "Ownership").
//!
//! Bundles the clock, the world graph, every living and historical agent,
//! their per-agent runtimes, sects, the active world phenomenon, and the
//! process-wide event log into one value the tick engine and gathering
//! engine both operate on.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use cultivation_agents::actions::context::ActionContext;
use cultivation_agents::AgentRuntime;
use cultivation_events::EventLog;
use cultivation_types::{Agent, AgentId, Sect, SectId, WorldPhenomenon};
use cultivation_world::WorldMap;

use crate::clock::WorldClock;

/// Everything the tick engine and gathering engine read and mutate.
pub struct SimulationState {
    /// The monotonic month counter.
    pub clock: WorldClock,
    /// Regions, routes, and tile grid.
    pub map: WorldMap,
    /// Every agent ever created, living or historical.
    pub agents: BTreeMap<AgentId, Agent>,
    /// Per-agent action scheduler state, held apart from [`Agent`] itself.
    pub runtimes: BTreeMap<AgentId, AgentRuntime>,
    /// Registered sects.
    pub sects: BTreeMap<SectId, Sect>,
    /// The currently active world phenomenon, if any.
    pub phenomenon: Option<WorldPhenomenon>,
    /// The process-wide append-only event log.
    pub events: EventLog,
    /// Shared RNG for every probabilistic outcome in the tick and gathering
    /// engines.
    pub rng: StdRng,
    /// Bounded-concurrency LLM dispatch gateway, cloned into each
    /// [`ActionContext`] built for an agent's turn.
    pub dispatcher: Arc<cultivation_llm::Dispatcher>,
}

impl SimulationState {
    /// Build an empty world state seeded from an explicit RNG seed (for
    /// reproducible tests; production startup should seed from OS entropy).
    #[must_use]
    pub fn new(map: WorldMap, dispatcher: Arc<cultivation_llm::Dispatcher>, rng_seed: u64) -> Self {
        Self {
            clock: WorldClock::new(),
            map,
            agents: BTreeMap::new(),
            runtimes: BTreeMap::new(),
            sects: BTreeMap::new(),
            phenomenon: None,
            events: EventLog::new(),
            rng: StdRng::seed_from_u64(rng_seed),
            dispatcher,
        }
    }

    /// Borrow `agent_id` and, if `target_id` is given, `target_id` too, out
    /// of [`Self::agents`] for the duration of `f`, along with a freshly
    /// built [`ActionContext`] and the agent's runtime -- then put
    /// everything back.
    ///
    /// `BTreeMap` cannot yield two disjoint `&mut` entries from one borrow,
    /// so this removes both out of the map, runs `f`, and reinserts; the
    /// common workaround for double mutable borrows into one map.
    /// Returns `None` if `agent_id` is not present.
    pub fn with_agent_and_target<R>(
        &mut self,
        agent_id: AgentId,
        target_id: Option<AgentId>,
        f: impl FnOnce(&mut Agent, Option<&mut Agent>, &mut ActionContext<'_>, &mut AgentRuntime) -> R,
    ) -> Option<R> {
        let mut agent = self.agents.remove(&agent_id)?;
        let mut target = target_id.and_then(|id| self.agents.remove(&id));
        let mut runtime = self.runtimes.remove(&agent_id).unwrap_or_default();

        let mut ctx = ActionContext {
            world: &mut self.map,
            clock: self.clock.now(),
            rng: &mut self.rng,
            dispatcher: Arc::clone(&self.dispatcher),
        };

        let result = f(&mut agent, target.as_mut(), &mut ctx, &mut runtime);

        self.runtimes.insert(agent_id, runtime);
        self.agents.insert(agent_id, agent);
        if let (Some(target_id), Some(target)) = (target_id, target) {
            self.agents.insert(target_id, target);
        }
        Some(result)
    }
}
