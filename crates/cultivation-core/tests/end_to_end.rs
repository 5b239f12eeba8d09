//! Cross-crate end-to-end scenarios spanning the action contract, the agent
//! runtime, and the tick engine together (§8).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use cultivation_agents::AgentManager;
use cultivation_core::config::GameConfig;
use cultivation_core::gathering::{Gathering, SectTeaching};
use cultivation_core::state::SimulationState;
use cultivation_core::tick::run_tick;
use cultivation_llm::{BackendConfig, Dispatcher, TaskModeTable};
use cultivation_types::{ActionPlan, LocationId, Realm, RegionKind, Region, Sect};
use cultivation_world::WorldMap;

fn dispatcher() -> Arc<Dispatcher> {
    let backend =
        BackendConfig { api_url: String::new(), api_key: String::new(), normal_model: String::new(), fast_model: String::new() };
    Arc::new(Dispatcher::new(backend, TaskModeTable::new(std::collections::BTreeMap::new()), None))
}

fn wilderness_world() -> (WorldMap, LocationId) {
    let mut map = WorldMap::new(2, 2);
    let location = LocationId::new();
    map.add_region(Region {
        id: location,
        name: String::from("Greenwood"),
        kind: RegionKind::Normal { huntable: vec![1], harvestable: vec![], mineable: vec![] },
    })
    .expect("add region");
    (map, location)
}

/// Scenario 1: a timed `Hunt` completes after its effective duration, then
/// the next plan in the queue is promoted.
#[test]
fn timed_hunt_action_completes_and_promotes_next_plan() {
    let (map, location) = wilderness_world();
    let mut state = SimulationState::new(map, dispatcher(), 100);
    let mut manager = AgentManager::new();
    let mut agent = manager
        .create_seed_agent(String::from("Hunter"), cultivation_types::Sex::Female, test_personality(), location, 0, 1200, std::collections::BTreeMap::new())
        .expect("seed agent");
    agent.plan_queue.push_back(ActionPlan {
        action_name: String::from("Hunt"),
        params: serde_json::Value::Null,
        priority: 0,
        expiry_month: None,
        max_retries: 0,
        attempted_count: 0,
    });
    agent.plan_queue.push_back(ActionPlan {
        action_name: String::from("Hunt"),
        params: serde_json::Value::Null,
        priority: -1,
        expiry_month: None,
        max_retries: 0,
        attempted_count: 0,
    });
    let agent_id = agent.id;
    state.agents.insert(agent_id, agent);

    let game = GameConfig::default();
    let mut gatherings: Vec<Box<dyn Gathering>> = Vec::new();

    let mut completion_event_seen = false;
    for _ in 0..10 {
        let summary = run_tick(&mut state, &game, &mut gatherings).expect("tick runs");
        if summary.events.iter().any(|event| event.related_agent_ids.contains(&agent_id)) {
            completion_event_seen = true;
        }
    }
    assert!(completion_event_seen, "hunt should emit a completion event within its duration");

    let runtime_is_running_second_hunt =
        state.runtimes.get(&agent_id).and_then(cultivation_agents::AgentRuntime::current_action).is_some();
    assert!(runtime_is_running_second_hunt, "second queued Hunt should have been promoted");
}

/// Scenario 4: a sect-teaching gathering selects a teacher and grants
/// experience to the remaining living members.
#[test]
fn sect_teaching_grants_experience_to_students() {
    let (map, location) = wilderness_world();
    let mut state = SimulationState::new(map, dispatcher(), 42);
    let mut manager = AgentManager::new();

    let sect_id = cultivation_types::SectId::new();
    state.sects.insert(
        sect_id,
        Sect { id: sect_id, name: String::from("Azure Peak"), members: std::collections::BTreeSet::new(), element: cultivation_types::Element::Metal },
    );

    let mut member_ids = Vec::new();
    for (name, realm) in [("Teacher", Realm::NascentSoul), ("StudentA", Realm::Mortal), ("StudentB", Realm::Mortal)] {
        let mut agent = manager
            .create_seed_agent(String::from(name), cultivation_types::Sex::Male, test_personality(), location, 0, 1200, std::collections::BTreeMap::new())
            .expect("seed agent");
        agent.realm = realm;
        agent.sect = Some(sect_id);
        member_ids.push(agent.id);
        state.agents.insert(agent.id, agent);
    }
    if let Some(sect) = state.sects.get_mut(&sect_id) {
        sect.members.extend(member_ids.iter().copied());
    }

    let mut game = GameConfig::default();
    game.gathering.sect_teaching_prob = 1.0;
    let mut gatherings: Vec<Box<dyn Gathering>> = vec![Box::new(SectTeaching::new())];

    let summary = run_tick(&mut state, &game, &mut gatherings).expect("tick runs");

    let student_exp_events =
        summary.events.iter().filter(|event| member_ids.iter().any(|id| event.related_agent_ids.contains(id))).count();
    assert!(student_exp_events > 0, "sect teaching should emit at least one event involving its members");
    let total_experience: u64 = member_ids.iter().filter_map(|id| state.agents.get(id)).map(|agent| agent.experience).sum();
    assert!(total_experience > 0, "at least one student should have gained experience");
}

/// Scenario 2: a resolved `Escape` preempts the fleeing agent's runtime and
/// promotes its follow-up plan in the same tick, rather than leaving it idle
/// until the next one.
#[test]
fn resolved_escape_promotes_its_follow_up_plan_same_tick() {
    let (map, location) = wilderness_world();
    let mut state = SimulationState::new(map, dispatcher(), 3);
    let mut manager = AgentManager::new();

    let mut fugitive = manager
        .create_seed_agent(String::from("Fugitive"), cultivation_types::Sex::Female, test_personality(), location, 0, 1200, std::collections::BTreeMap::new())
        .expect("seed agent");
    fugitive.cached_effects.insert(
        String::from("escape_rate"),
        cultivation_types::EffectValue::Number(rust_decimal::Decimal::ONE),
    );
    let fugitive_id = fugitive.id;

    let pursuer = manager
        .create_seed_agent(String::from("Pursuer"), cultivation_types::Sex::Male, test_personality(), location, 0, 1200, std::collections::BTreeMap::new())
        .expect("seed agent");
    let pursuer_id = pursuer.id;

    state.agents.insert(fugitive_id, fugitive);
    state.agents.insert(pursuer_id, pursuer);

    let mut runtime = cultivation_agents::AgentRuntime::new();
    runtime.restore_current_action(cultivation_agents::actions::ActionInstance::Escape(
        cultivation_agents::actions::escape::EscapeState { target: pursuer_id },
    ));
    state.runtimes.insert(fugitive_id, runtime);

    let game = GameConfig::default();
    let mut gatherings: Vec<Box<dyn Gathering>> = Vec::new();
    let summary = run_tick(&mut state, &game, &mut gatherings).expect("tick runs");

    assert!(
        summary.events.iter().any(|event| event.related_agent_ids.contains(&fugitive_id)),
        "escape resolution should emit an event"
    );

    let running = state.runtimes.get(&fugitive_id).and_then(cultivation_agents::AgentRuntime::current_action);
    match running {
        Some(cultivation_agents::actions::ActionInstance::MoveAwayFromAvatar(move_state)) => {
            assert_eq!(move_state.target, pursuer_id);
        }
        Some(other) => panic!("expected a promoted MoveAwayFromAvatar, got {}", other.kind().name()),
        None => panic!("expected a promoted MoveAwayFromAvatar, but the agent is idle"),
    }
}

fn test_personality() -> cultivation_types::Personality {
    use rust_decimal::Decimal;
    cultivation_types::Personality {
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
