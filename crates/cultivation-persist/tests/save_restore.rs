//! Scenario 6 (§8): save/restore preserves an agent's in-flight action
//! exactly, including its `start_month` and duration, across a save/load
//! round trip.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use cultivation_agents::actions::retreat::RetreatState;
use cultivation_agents::actions::ActionInstance;
use cultivation_agents::{AgentManager, AgentRuntime};
use cultivation_core::state::SimulationState;
use cultivation_llm::{BackendConfig, Dispatcher, TaskModeTable};
use cultivation_types::{LocationId, Personality, Region, RegionKind, Sex};
use cultivation_world::WorldMap;
use rust_decimal::Decimal;

fn dispatcher() -> Arc<Dispatcher> {
    let backend =
        BackendConfig { api_url: String::new(), api_key: String::new(), normal_model: String::new(), fast_model: String::new() };
    Arc::new(Dispatcher::new(backend, TaskModeTable::new(std::collections::BTreeMap::new()), None))
}

fn test_personality() -> Personality {
    Personality {
        curiosity: Decimal::ZERO,
        cooperation: Decimal::ZERO,
        aggression: Decimal::ZERO,
        risk_tolerance: Decimal::ZERO,
        industriousness: Decimal::ZERO,
        sociability: Decimal::ZERO,
        honesty: Decimal::ZERO,
        loyalty: Decimal::ZERO,
    }
}

#[test]
fn mid_retreat_action_survives_a_save_load_round_trip() {
    let mut map = WorldMap::new(2, 2);
    let location = LocationId::new();
    map.add_region(Region { id: location, name: String::from("Azure Peak"), kind: RegionKind::Sect { sect: cultivation_types::SectId::new() } })
        .expect("add region");

    let mut state = SimulationState::new(map, dispatcher(), 7);
    let mut manager = AgentManager::new();
    let agent = manager
        .create_seed_agent(String::from("Recluse"), Sex::Male, test_personality(), location, 0, 1200, std::collections::BTreeMap::new())
        .expect("seed agent");
    let agent_id = agent.id;
    state.agents.insert(agent_id, agent);
    state.clock = cultivation_core::clock::WorldClock::from_months(215);

    let mut runtime = AgentRuntime::new();
    runtime.restore_current_action(ActionInstance::Retreat(RetreatState { start_month: 200, duration_months: 36 }));
    state.runtimes.insert(agent_id, runtime);

    let save = cultivation_persist::save(&state, "en", chrono::Utc::now());

    let mut fresh_map = WorldMap::new(2, 2);
    fresh_map
        .add_region(Region { id: location, name: String::from("Azure Peak"), kind: RegionKind::Sect { sect: cultivation_types::SectId::new() } })
        .expect("add region");
    let mut restored = SimulationState::new(fresh_map, dispatcher(), 7);
    let language_switch_needed = cultivation_persist::restore(&mut restored, &save, "en").expect("restore succeeds");
    assert!(!language_switch_needed, "save and restore both use en");

    let running = restored.runtimes.get(&agent_id).and_then(AgentRuntime::current_action).expect("action restored");
    match running {
        ActionInstance::Retreat(state) => {
            assert_eq!(state.start_month, 200);
            assert_eq!(state.duration_months, 36);
        }
        _ => panic!("expected a restored Retreat"),
    }

    // 20 more months: clock 215 + 19 = 234 still running, +20 = 235 completes
    // (elapsed >= duration_months - 1, i.e. 35 >= 35).
    let still_running = {
        let Some(action) = restored.runtimes.get(&agent_id).and_then(AgentRuntime::current_action) else {
            panic!("action missing")
        };
        match action {
            ActionInstance::Retreat(state) => state.step(234),
            _ => panic!("expected Retreat"),
        }
    };
    assert_eq!(still_running, cultivation_types::ActionStatus::Running);

    let completed = {
        let Some(action) = restored.runtimes.get(&agent_id).and_then(AgentRuntime::current_action) else {
            panic!("action missing")
        };
        match action {
            ActionInstance::Retreat(state) => state.step(235),
            _ => panic!("expected Retreat"),
        }
    };
    assert_eq!(completed, cultivation_types::ActionStatus::Completed);
}
