//! World engine binary for the cultivation-fiction simulator.
//!
//! Entry point wiring together configuration, startup, and the tick loop.
//! Loads configuration, builds the starting world and seed population, then
//! drives [`cultivation_core::tick::run_tick`] until a bounded tick count
//! (or the process is interrupted) and writes a final save file.
//!
//! # Startup sequence (§6 "Initialization state machine")
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `cultivation-config.yaml`
//! 3. Create the starting world and register its sect
//! 4. Spawn the seed population (`game.init_npc_num` agents)
//! 5. Sanity-check the configured LLM backend
//! 6. Run the tick loop
//! 7. Write a save file and log the result

mod error;
mod spawner;

use std::path::Path;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cultivation_agents::AgentManager;
use cultivation_core::config::SimulationConfig;
use cultivation_core::gathering::{Gathering, SectTeaching};
use cultivation_core::init_state::InitState;
use cultivation_core::state::SimulationState;
use cultivation_core::tick::run_tick;
use cultivation_llm::{BackendConfig, CallMode, Dispatcher, TaskModeTable};
use cultivation_types::{Sect, SectId};
use cultivation_world::starting_world::create_starting_world;

use crate::error::EngineError;

/// Number of ticks the engine runs before writing a save file and exiting,
/// absent any external stop signal (there is no operator control surface
/// here; §1 "Out of scope: ... the HTTP/WebSocket server").
const DEFAULT_TICK_BUDGET: u64 = 120;

/// Application entry point for the world engine.
///
/// # Errors
///
/// Returns an error if configuration, startup, or the tick loop fails.
#[tokio::main]
#[allow(clippy::unused_async)] // tick actions call tokio::spawn; needs an active runtime, not an await here.
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("cultivation-engine starting");

    let mut init = InitState::new();
    init.request();

    let config = load_config()?;
    info!(sect_num = config.game.sect_num, init_npc_num = config.game.init_npc_num, "configuration loaded");
    init.advance(); // ScanningAssets -> LoadingMap

    let sect_id = SectId::new();
    let (world, region_ids) = create_starting_world(sect_id).map_err(cultivation_core::error::StartupError::from)?;
    info!(regions = 4, "starting world created");
    init.advance(); // LoadingMap -> ProcessingHistory
    init.advance(); // ProcessingHistory -> InitializingSects

    let dispatcher = build_dispatcher(&config);
    let rng_seed: u64 = rand::rng().random();

    let mut state = SimulationState::new(world, Arc::new(dispatcher), rng_seed);
    state.sects.insert(
        sect_id,
        Sect {
            id: sect_id,
            name: String::from("Azure Peak Sect"),
            members: std::collections::BTreeSet::new(),
            element: cultivation_types::Element::Metal,
        },
    );

    let mut manager = AgentManager::new();
    let locations = [region_ids.greenwood, region_ids.spirit_vein, region_ids.port_town, region_ids.azure_peak];
    let npc_count = if config.game.init_npc_num == 0 { spawner::DEFAULT_INIT_NPC_NUM } else { config.game.init_npc_num };
    let mut seed_rng = rand::rngs::StdRng::seed_from_u64(rng_seed);
    let seeded = spawner::spawn_seed_population(&mut manager, &mut seed_rng, npc_count, &locations)
        .map_err(cultivation_core::error::StartupError::from)?;
    info!(count = seeded.len(), "seed population spawned");
    state.agents = seeded;
    enroll_sect_residents(&mut state, sect_id, region_ids.azure_peak);
    init.advance(); // InitializingSects -> GeneratingAvatars

    check_llm_backend(&config);
    init.advance(); // GeneratingAvatars -> CheckingLlm
    init.advance(); // CheckingLlm -> GeneratingInitialEvents
    init.finish();
    info!(percentage = init.percentage(), "startup complete, entering tick loop");

    let mut gatherings: Vec<Box<dyn Gathering>> = vec![Box::new(SectTeaching::new())];

    let mut total_events = 0usize;
    for tick_number in 1..=DEFAULT_TICK_BUDGET {
        let summary = run_tick(&mut state, &config.game, &mut gatherings)?;
        total_events = total_events.saturating_add(summary.events.len());
        if tick_number % 12 == 0 {
            info!(tick = tick_number, month = summary.month, population = state.agents.len(), "tick checkpoint");
        }
    }

    info!(total_ticks = DEFAULT_TICK_BUDGET, total_events, population = state.agents.len(), "tick loop finished");

    write_save_file(&state, &config)?;

    info!("cultivation-engine shutdown complete");
    Ok(())
}

/// Load the main simulation configuration from `cultivation-config.yaml`,
/// falling back to defaults when the file is absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("cultivation-config.yaml");
    if config_path.exists() {
        Ok(SimulationConfig::load(config_path, None)?)
    } else {
        info!("config file not found, using defaults");
        Ok(SimulationConfig::parse("{}")?)
    }
}

/// Enroll every seed agent starting at `home_region` into `sect_id`, so the
/// sect-teaching gathering has eligible members from tick one.
fn enroll_sect_residents(state: &mut SimulationState, sect_id: SectId, home_region: cultivation_types::LocationId) {
    let resident_ids: Vec<_> =
        state.agents.values().filter(|agent| agent.location == home_region).map(|agent| agent.id).collect();
    for agent_id in &resident_ids {
        if let Some(agent) = state.agents.get_mut(agent_id) {
            agent.sect = Some(sect_id);
        }
    }
    if let Some(sect) = state.sects.get_mut(&sect_id) {
        sect.members.extend(resident_ids);
    }
}

fn build_dispatcher(config: &SimulationConfig) -> Dispatcher {
    let backend = BackendConfig {
        api_url: config.llm.base_url.clone(),
        api_key: config.llm.key.clone(),
        normal_model: config.llm.model_name.clone(),
        fast_model: config.llm.fast_model_name.clone(),
    };
    Dispatcher::new(backend, build_task_modes(config), None)
}

/// Build the task-mode table, applying `llm.mode` (§4.5) as the process-wide
/// global override. `llm.mode: default` (i.e. [`CallMode::Default`]) asks
/// for no override at all, leaving per-task resolution to `llm.default_modes`.
fn build_task_modes(config: &SimulationConfig) -> TaskModeTable {
    let mut task_modes = TaskModeTable::new(config.llm.default_modes.clone());
    task_modes.set_global_override(config.llm.mode.and_then(CallMode::as_override));
    task_modes
}

/// Phase 5 sanity check (§6 "`CheckingLlm`"): confirm an LLM backend is
/// configured at all. This is a local configuration check, not a live
/// network call -- the dispatcher has no reachability probe, and issuing a
/// real request here would make startup depend on network conditions.
fn check_llm_backend(config: &SimulationConfig) {
    if config.llm.base_url.is_empty() {
        tracing::warn!("no llm.base_url configured; LLM-backed actions will fail when dispatched");
    } else {
        info!(base_url = config.llm.base_url, "llm backend configured");
    }
}

fn write_save_file(state: &SimulationState, config: &SimulationConfig) -> Result<(), EngineError> {
    let save = cultivation_persist::save(state, &config.system.language, chrono::Utc::now());
    let saves_dir = if config.paths.saves.is_empty() { "saves" } else { config.paths.saves.as_str() };
    std::fs::create_dir_all(saves_dir).map_err(cultivation_persist::PersistError::from)?;
    let path = Path::new(saves_dir).join("autosave.json");
    cultivation_persist::io::write_to_path(&save, &path)?;
    info!(path = %path.display(), "save file written");
    Ok(())
}
