//! Seed population spawner (§6 "GeneratingAvatars", `game.init_npc_num`).
//!
//! At simulation start the spawner creates `init_npc_num` seed agents with
//! random names and personalities, spread evenly across the starting
//! regions. Narrowed to initial population only: mid-simulation agent
//! injection through an operator endpoint or population auto-recovery is
//! out of scope here.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;

use cultivation_agents::{AgentError, AgentManager};
use cultivation_types::{Agent, AgentId, LocationId, Personality, Sex};

/// Name pool the spawner draws from without replacement.
const NAME_POOL: &[&str] = &[
    "Wei", "Lin", "Feng", "Jian", "Mei", "Qing", "Tao", "Xue", "Yun", "Zhen", "Bo", "Chen", "Dao",
    "Er", "Fa", "Gui", "Hua", "Jin", "Kun", "Li", "Ning", "Ping", "Rui", "Shan", "Tian", "Wu",
    "Xin", "Yan", "Zi", "An",
];

/// Seed population defaults when `game.init_npc_num` is unset or zero.
pub const DEFAULT_INIT_NPC_NUM: u32 = 8;

/// Every lifespan-eligible mortal starting lifespan, in months (§4.6).
pub const DEFAULT_STARTING_LIFESPAN_MONTHS: u64 = 80 * 12;

/// Create `count` seed agents with random personalities, cycling through
/// `locations` so the population starts evenly spread.
///
/// # Errors
///
/// Returns [`AgentError::DuplicateName`] if [`NAME_POOL`] runs out of unused
/// names before `count` agents have been created.
pub fn spawn_seed_population(
    manager: &mut AgentManager,
    rng: &mut impl Rng,
    count: u32,
    locations: &[LocationId],
) -> Result<BTreeMap<AgentId, Agent>, AgentError> {
    let mut agents = BTreeMap::new();
    if locations.is_empty() {
        return Ok(agents);
    }

    for index in 0..count {
        let name = seed_name(rng, index);
        let sex = if rng.random_bool(0.5) { Sex::Male } else { Sex::Female };
        let personality = random_personality(rng);
        let location = locations[usize::try_from(index).unwrap_or(0) % locations.len()];

        let agent = manager.create_seed_agent(
            name,
            sex,
            personality,
            location,
            0,
            DEFAULT_STARTING_LIFESPAN_MONTHS,
            BTreeMap::new(),
        )?;
        agents.insert(agent.id, agent);
    }

    Ok(agents)
}

fn seed_name(rng: &mut impl Rng, index: u32) -> String {
    NAME_POOL.get(usize::try_from(index).unwrap_or(usize::MAX)).map_or_else(
        || format!("Seedling-{index}"),
        |base| if rng.random_bool(0.1) { format!("{base}-{index}") } else { (*base).to_owned() },
    )
}

fn random_personality<R: Rng + ?Sized>(rng: &mut R) -> Personality {
    let trait_value = |rng: &mut R| Decimal::new(rng.random_range(-50..=50), 2);
    Personality {
        curiosity: trait_value(rng),
        cooperation: trait_value(rng),
        aggression: trait_value(rng),
        risk_tolerance: trait_value(rng),
        industriousness: trait_value(rng),
        sociability: trait_value(rng),
        honesty: trait_value(rng),
        loyalty: trait_value(rng),
    }
}
