//! Building and applying [`SaveFile`] snapshots (§4.10).

use cultivation_agents::actions::{ActionInstance, ActionKind};
use cultivation_agents::AgentRuntime;
use cultivation_types::RegionKind;
use cultivation_core::state::SimulationState;

use crate::error::PersistError;
use crate::save_file::{ActionSnapshot, AvatarSnapshot, RegionSnapshot, SaveFile, SaveMeta, SimulatorSnapshot, SAVE_FORMAT_VERSION};

/// Build a [`SaveFile`] capturing `state` as of right now.
///
/// `save_time` is passed in rather than sampled internally, since neither
/// the tick engine nor this crate may call the system clock directly
/// (callers that need reproducible tests pass a fixed value; production
/// callers pass `chrono::Utc::now()`).
#[must_use]
pub fn save(state: &SimulationState, language: &str, save_time: chrono::DateTime<chrono::Utc>) -> SaveFile {
    let world = state
        .map
        .regions()
        .map(|region| match &region.kind {
            RegionKind::City { prosperity, .. } => {
                RegionSnapshot { id: region.id, prosperity: Some(*prosperity), host: None, is_cultivate: false }
            }
            RegionKind::Cultivate { host, .. } => RegionSnapshot { id: region.id, prosperity: None, host: *host, is_cultivate: true },
            RegionKind::Normal { .. } | RegionKind::Sect { .. } => {
                RegionSnapshot { id: region.id, prosperity: None, host: None, is_cultivate: false }
            }
        })
        .collect();

    let avatars = state
        .agents
        .values()
        .map(|agent| {
            let current_action = state.runtimes.get(&agent.id).and_then(AgentRuntime::current_action).map(action_snapshot);
            AvatarSnapshot { agent: agent.clone(), current_action }
        })
        .collect();

    let events: Vec<_> = state.events.all().to_vec();
    let event_count = events.len();

    SaveFile {
        meta: SaveMeta {
            version: SAVE_FORMAT_VERSION,
            save_time,
            game_time: state.clock.now(),
            language: language.to_owned(),
            events_db: None,
            event_count,
        },
        world,
        avatars,
        events,
        simulator: SimulatorSnapshot {
            clock_months: state.clock.now(),
            sects: state.sects.values().cloned().collect(),
            phenomenon: state.phenomenon,
        },
    }
}

fn action_snapshot(instance: &ActionInstance) -> ActionSnapshot {
    ActionSnapshot {
        action_class_name: instance.kind().name().to_owned(),
        params: serde_json::Value::Null,
        status: String::from("running"),
        custom_save_data: instance.get_save_data(),
    }
}

/// Apply a [`SaveFile`] onto `state`, overwriting its agents, runtimes,
/// sects, phenomenon, clock, event log, and region mutable state.
///
/// `state.map` must already hold the same region ids the save file was
/// written against (i.e. built by the same static-data/startup step); this
/// only overlays the saved mutable deltas, it does not rebuild topology
/// (§4.10, §1 "map file format" out of scope).
///
/// Every restored action is left `RUNNING` with no in-flight LLM task
/// (§4.10: "any in-flight LLM task is *discarded*; it will be re-issued on
/// next `step`").
///
/// `current_language` is the language the caller is about to run narration
/// in (typically `config.system.language`). Returns `true` when
/// `save.meta.language` differs from it, meaning the caller must switch
/// languages before finalizing the load (§4.10: "loading a save whose
/// language tag differs from current triggers a language switch before
/// finalization"); this function only detects the mismatch, it does not
/// perform the switch.
///
/// # Errors
///
/// Returns [`PersistError::UnrestorableAction`] if an avatar's saved
/// `current_action` names an unknown action kind or malformed save data.
pub fn restore(state: &mut SimulationState, save: &SaveFile, current_language: &str) -> Result<bool, PersistError> {
    for region_snapshot in &save.world {
        let Some(region) = state.map.region_mut(region_snapshot.id) else { continue };
        match &mut region.kind {
            RegionKind::City { prosperity, .. } => {
                if let Some(saved_prosperity) = region_snapshot.prosperity {
                    *prosperity = saved_prosperity;
                }
            }
            RegionKind::Cultivate { host, .. } if region_snapshot.is_cultivate => {
                *host = region_snapshot.host;
            }
            RegionKind::Normal { .. } | RegionKind::Cultivate { .. } | RegionKind::Sect { .. } => {}
        }
    }

    state.agents.clear();
    state.runtimes.clear();
    for avatar in &save.avatars {
        let agent_id = avatar.agent.id;
        state.agents.insert(agent_id, avatar.agent.clone());

        if let Some(action) = &avatar.current_action {
            let kind = ActionKind::by_name(&action.action_class_name).ok_or_else(|| PersistError::UnrestorableAction {
                agent_id,
                action_class_name: action.action_class_name.clone(),
            })?;
            let instance = ActionInstance::load_save_data(kind, &action.custom_save_data).ok_or_else(|| {
                PersistError::UnrestorableAction { agent_id, action_class_name: action.action_class_name.clone() }
            })?;
            let mut runtime = AgentRuntime::new();
            runtime.restore_current_action(instance);
            state.runtimes.insert(agent_id, runtime);
        }
    }

    state.sects.clear();
    for sect in &save.simulator.sects {
        state.sects.insert(sect.id, sect.clone());
    }
    state.phenomenon = save.simulator.phenomenon;
    state.clock = cultivation_core::clock::WorldClock::from_months(save.simulator.clock_months);

    state.events = cultivation_events::EventLog::new();
    state.events.record_batch(save.events.clone());

    Ok(save.meta.language != current_language)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use cultivation_llm::{BackendConfig, Dispatcher, TaskModeTable};
    use cultivation_types::{Element, LocationId, Region, Sex};
    use cultivation_world::WorldMap;

    use super::*;

    fn dispatcher() -> Arc<Dispatcher> {
        let backend =
            BackendConfig { api_url: String::new(), api_key: String::new(), normal_model: String::new(), fast_model: String::new() };
        Arc::new(Dispatcher::new(backend, TaskModeTable::new(BTreeMap::new()), None))
    }

    fn map_with_cultivate_region() -> (WorldMap, LocationId) {
        let mut map = WorldMap::new(4, 4);
        let id = LocationId::new();
        map.add_region(Region {
            id,
            name: String::from("Spirit Vein"),
            kind: RegionKind::Cultivate { host: None, element: Element::Wood, density: 5 },
        })
        .expect("region insert");
        (map, id)
    }

    #[test]
    fn save_then_restore_preserves_cultivate_host() {
        let (map, region_id) = map_with_cultivate_region();
        let mut state = SimulationState::new(map, dispatcher(), 1);

        let mut manager = cultivation_agents::AgentManager::new();
        let agent = manager
            .create_seed_agent(String::from("Wei"), Sex::Male, test_personality(), region_id, 0, 1200, BTreeMap::new())
            .expect("agent creates");
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);
        state.map.claim_cultivate_region(region_id, agent_id).expect("claims");

        let save_file = save(&state, "en", chrono::Utc::now());

        let (fresh_map, _) = map_with_cultivate_region();
        let mut restored_state = SimulationState::new(fresh_map, dispatcher(), 1);
        let language_switch_needed = restore(&mut restored_state, &save_file, "en").expect("restores");

        assert!(!language_switch_needed);
        assert_eq!(restored_state.agents.len(), 1);
        match restored_state.map.region(region_id).expect("region exists").kind {
            RegionKind::Cultivate { host, .. } => assert_eq!(host, Some(agent_id)),
            _ => panic!("region kind changed"),
        }
    }

    #[test]
    fn restore_rejects_unknown_action_class_name() {
        let (map, region_id) = map_with_cultivate_region();
        let mut state = SimulationState::new(map, dispatcher(), 2);
        let mut manager = cultivation_agents::AgentManager::new();
        let agent = manager
            .create_seed_agent(String::from("Lin"), Sex::Female, test_personality(), region_id, 0, 1200, BTreeMap::new())
            .expect("agent creates");
        let agent_id = agent.id;

        let mut save_file = save(&state, "en", chrono::Utc::now());
        save_file.avatars.push(AvatarSnapshot {
            agent,
            current_action: Some(ActionSnapshot {
                action_class_name: String::from("NotARealAction"),
                params: serde_json::Value::Null,
                status: String::from("running"),
                custom_save_data: serde_json::json!({}),
            }),
        });

        let err = restore(&mut state, &save_file, "en").expect_err("rejects unknown action");
        assert!(matches!(err, PersistError::UnrestorableAction { agent_id: id, .. } if id == agent_id));
    }

    #[test]
    fn restore_reports_a_language_switch_when_the_save_tag_differs() {
        let (map, _) = map_with_cultivate_region();
        let state = SimulationState::new(map, dispatcher(), 3);
        let save_file = save(&state, "zh", chrono::Utc::now());

        let (fresh_map, _) = map_with_cultivate_region();
        let mut restored_state = SimulationState::new(fresh_map, dispatcher(), 3);

        let switch_needed = restore(&mut restored_state, &save_file, "en").expect("restores");
        assert!(switch_needed, "save was written in zh, current is en");

        let no_switch_needed = restore(&mut restored_state, &save_file, "zh").expect("restores");
        assert!(!no_switch_needed, "save and current language both zh");
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
}
