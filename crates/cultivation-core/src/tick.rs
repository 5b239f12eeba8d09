//! Simulator tick engine: the ten ordered phases of §4.7.
//!
//! Phases 1-2 must complete for every agent before phase 3 runs; phases
//! within one tick observe each other's effects; the clock advances last.
//! Grounded in the `emergence-core/src/tick.rs` `run_tick` pattern
//! phase-ordering structure and its borrow-checker-safe precomputation idiom
//! (collect immutable reads into owned buffers before taking `&mut`
//! borrows); [`crate::state::SimulationState::with_agent_and_target`] plays
//! the same role here that a prior owned-buffer collection does.

use rand::Rng as _;

use cultivation_types::{AgentId, Event, EventId, RegionKind};

use crate::config::GameConfig;
use crate::error::TickError;
use crate::gathering::Gathering;
use crate::state::SimulationState;

/// Age, in months, at which a mortal becomes a candidate for promotion
/// (§4.7 phase 5). Grounded in `original_source`'s
/// `MortalManager.get_awakening_candidates` default (`min_age=16` years).
pub const AWAKENING_AGE_MONTHS: u64 = 16 * 12;

/// Events and bookkeeping produced by one call to [`run_tick`].
#[derive(Debug, Default)]
pub struct TickSummary {
    /// Every event emitted by any phase this tick, in phase order.
    pub events: Vec<Event>,
    /// Agents who died of old age this tick.
    pub deaths: Vec<AgentId>,
    /// Living mortals who have crossed the awakening age threshold.
    /// Eligibility only; creating a new cultivator from one is a decision
    /// the caller makes outside the tick engine (§4.7 phase 5 "not mandatory").
    pub awakening_candidates: Vec<AgentId>,
    /// Agents eligible for a nickname-generation LLM call this tick
    /// (§4.8); issuing the call is the decision loop's concern (C6).
    pub nickname_candidates: Vec<AgentId>,
    /// Agents whose long-term objective needs to be (re)generated this tick
    /// (§4.8); issuing the call and writing the result back is the decision
    /// loop's concern (C6).
    pub objective_candidates: Vec<AgentId>,
    /// Month the tick advanced to.
    pub month: u64,
}

/// Run one full tick: all ten phases of §4.7, in order.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows.
pub fn run_tick(
    state: &mut SimulationState,
    game: &GameConfig,
    gatherings: &mut [Box<dyn Gathering>],
) -> Result<TickSummary, TickError> {
    let mut summary = TickSummary::default();

    phase_resolve_promotions(state, &mut summary);
    phase_advance_actions(state, &mut summary);
    phase_resource_drift(state);
    phase_aging_and_mortality(state, &mut summary);
    phase_mortal_promotion(state, &mut summary);
    phase_world_phenomena(state);
    phase_gatherings(state, &game.gathering, gatherings, &mut summary);
    phase_random_world_events(state, &game.world_events, &mut summary);
    summary.nickname_candidates = phase_nickname_eligibility(state, &game.nickname);
    summary.objective_candidates = phase_objective_refresh(state);

    summary.month = state.clock.advance_one_month()?;

    for event in &summary.events {
        state.events.record(event.clone());
    }

    Ok(summary)
}

/// Live agent ids, in stable iteration order (`BTreeMap` keys are sorted by
/// id, satisfying §5's "iteration order of the agent container is stable").
fn live_agent_ids(state: &SimulationState) -> Vec<AgentId> {
    state.agents.iter().filter(|(_, agent)| agent.alive).map(|(id, _)| *id).collect()
}

fn plan_target_id(plan: &cultivation_types::ActionPlan) -> Option<AgentId> {
    plan.params.get("target").and_then(|value| serde_json::from_value(value.clone()).ok())
}

fn resolve_plan_target(agent: &cultivation_types::Agent, clock: u64) -> Option<AgentId> {
    agent
        .plan_queue
        .iter()
        .filter(|plan| !plan.is_expired(clock))
        .max_by_key(|plan| plan.priority)
        .and_then(plan_target_id)
}

/// Phase 1: for each live agent with no running action, attempt to promote
/// its next plan.
fn phase_resolve_promotions(state: &mut SimulationState, summary: &mut TickSummary) {
    for agent_id in live_agent_ids(state) {
        let is_idle = state.runtimes.get(&agent_id).is_none_or(cultivation_agents::AgentRuntime::is_idle);
        if !is_idle {
            continue;
        }

        let target_id = state.agents.get(&agent_id).and_then(|agent| resolve_plan_target(agent, state.clock.now()));

        let event = state.with_agent_and_target(agent_id, target_id, |agent, target, ctx, runtime| {
            runtime.promote_next_plan(agent, target.map(|t| &*t), ctx)
        });
        if let Some(Some(event)) = event {
            summary.events.push(event);
        }
    }
}

/// Phase 2: advance every live agent's running action one step.
fn phase_advance_actions(state: &mut SimulationState, summary: &mut TickSummary) {
    for agent_id in live_agent_ids(state) {
        if state.runtimes.get(&agent_id).is_none_or(cultivation_agents::AgentRuntime::is_idle) {
            continue;
        }
        let target_id = state
            .runtimes
            .get(&agent_id)
            .and_then(cultivation_agents::AgentRuntime::current_action)
            .and_then(cultivation_agents::actions::ActionInstance::target_id);

        let result =
            state.with_agent_and_target(agent_id, target_id, |agent, target, ctx, runtime| runtime.advance(agent, target, ctx));
        let Some(result) = result else { continue };
        summary.events.extend(result.events);
        install_suggested_next(state, agent_id, result.suggested_next, result.suggested_next_owner, summary);
    }
}

/// Enqueue and immediately promote a terminal action's follow-up plan, if
/// any, on whichever agent owns it (§8 scenario 2 "Preemption via Escape").
///
/// The owner is usually the acting agent itself (`Escape` is self-directed),
/// but `Attack`'s resolution hands the follow-up to the target who gave the
/// feedback, not to the attacker whose action just settled -- `owner`
/// defaults to `acting_agent_id` only when the action didn't say otherwise.
fn install_suggested_next(
    state: &mut SimulationState,
    acting_agent_id: AgentId,
    plan: Option<cultivation_types::ActionPlan>,
    owner: Option<AgentId>,
    summary: &mut TickSummary,
) {
    let Some(plan) = plan else { return };
    let owner_id = owner.unwrap_or(acting_agent_id);
    let next_target_id = plan_target_id(&plan);

    state.with_agent_and_target(owner_id, next_target_id, |agent, _, _, runtime| {
        runtime.preempt(agent);
        agent.plan_queue.push_back(plan);
    });
    let event = state.with_agent_and_target(owner_id, next_target_id, |agent, target, ctx, runtime| {
        runtime.promote_next_plan(agent, target.map(|t| &*t), ctx)
    });
    if let Some(Some(event)) = event {
        summary.events.push(event);
    }
}

/// Phase 3: city regions below full prosperity gain one point.
fn phase_resource_drift(state: &mut SimulationState) {
    state.map.drift_prosperity();
}

/// Phase 4: age every living agent by one month; mark the overage dead and
/// free any cultivate region they hosted.
fn phase_aging_and_mortality(state: &mut SimulationState, summary: &mut TickSummary) {
    let clock = state.clock.now();
    let mut died = Vec::new();

    for agent in state.agents.values_mut() {
        if !agent.alive {
            continue;
        }
        agent.age_months = agent.age_months.saturating_add(1);
        if agent.age_months >= agent.max_lifespan_months {
            agent.alive = false;
            agent.died_at_month = Some(clock);
            died.push(agent.id);
        }
    }

    for agent_id in died {
        let hosted_region = state
            .map
            .regions()
            .find(|region| matches!(region.kind, RegionKind::Cultivate { host: Some(host), .. } if host == agent_id))
            .map(|region| region.id);
        if let Some(region_id) = hosted_region {
            state.map.release_cultivate_region(region_id);
        }

        let name = state.agents.get(&agent_id).map_or_else(String::new, |agent| agent.name.clone());
        summary.events.push(Event {
            id: EventId::new(),
            month_stamp: clock,
            content: format!("{name} has died of old age."),
            related_agent_ids: vec![agent_id],
            is_major: true,
            is_story: false,
        });
        summary.deaths.push(agent_id);
    }
}

/// Phase 5: mortals past the awakening age threshold become eligible
/// candidates for future agent creation; creating one is not mandatory.
fn phase_mortal_promotion(state: &SimulationState, summary: &mut TickSummary) {
    summary.awakening_candidates = state
        .agents
        .values()
        .filter(|agent| {
            agent.alive && agent.realm == cultivation_types::Realm::Mortal && agent.age_months >= AWAKENING_AGE_MONTHS
        })
        .map(|agent| agent.id)
        .collect();
}

/// Phase 6: rotate the active world phenomenon if none is active or the
/// current one expired.
///
/// `StaticRow` carries no rarity weight (§1 "concrete content of individual
/// action types" is out of scope), and static data is not yet threaded into
/// [`SimulationState`] (startup/C13 wiring), so there is nothing to rotate
/// to; this phase is a no-op placeholder until that wiring lands.
fn phase_world_phenomena(state: &mut SimulationState) {
    let clock = state.clock.now();
    let still_active = state.phenomenon.is_some_and(|phenomenon| phenomenon.is_active_at(clock));
    if still_active {
        return;
    }
    state.phenomenon = None;
}

/// Phase 7: run every registered gathering whose `is_start` rolls true.
fn phase_gatherings(
    state: &mut SimulationState,
    config: &crate::config::GatheringConfig,
    gatherings: &mut [Box<dyn Gathering>],
    summary: &mut TickSummary,
) {
    for gathering in gatherings.iter_mut() {
        if gathering.is_start(state, config) {
            summary.events.extend(gathering.execute(state, config));
        }
    }
}

/// Phase 8: roll configured fortune/misfortune probabilities for every
/// agent whose current action allows world events.
fn phase_random_world_events(state: &mut SimulationState, config: &crate::config::WorldEventsConfig, summary: &mut TickSummary) {
    let clock = state.clock.now();
    for agent_id in live_agent_ids(state) {
        let allows_world_events = state
            .runtimes
            .get(&agent_id)
            .and_then(cultivation_agents::AgentRuntime::current_action)
            .map_or(true, |action| action.kind().capability().allow_world_events);
        if !allows_world_events {
            continue;
        }

        if state.rng.random_bool(config.fortune_prob.clamp(0.0, 1.0)) {
            if let Some(agent) = state.agents.get_mut(&agent_id) {
                let _ =
                    cultivation_agents::inventory::add_resource(&mut agent.inventory, cultivation_types::Resource::SpiritStone, 10);
                summary.events.push(Event {
                    id: EventId::new(),
                    month_stamp: clock,
                    content: format!("{} stumbles upon a cache of spirit stones.", agent.name),
                    related_agent_ids: vec![agent_id],
                    is_major: false,
                    is_story: false,
                });
            }
        } else if state.rng.random_bool(config.misfortune_prob.clamp(0.0, 1.0)) {
            if let Some(agent) = state.agents.get_mut(&agent_id) {
                let _ = cultivation_agents::inventory::remove_resource(
                    &mut agent.inventory,
                    cultivation_types::Resource::SpiritStone,
                    5,
                );
                summary.events.push(Event {
                    id: EventId::new(),
                    month_stamp: clock,
                    content: format!("{} loses resources to a passing bandit.", agent.name),
                    related_agent_ids: vec![agent_id],
                    is_major: false,
                    is_story: false,
                });
            }
        }
    }
}

/// Phase 9: which agents are eligible for a nickname this tick (§4.8).
/// Issuing the LLM call and writing the result back is the decision loop's
/// concern; this phase only determines eligibility.
fn phase_nickname_eligibility(state: &SimulationState, thresholds: &crate::config::NicknameConfig) -> Vec<AgentId> {
    let clock_year = state.clock.year();
    state
        .agents
        .values()
        .filter(|agent| agent.alive)
        .filter(|agent| nickname_eligible(agent, state, clock_year, thresholds))
        .map(|agent| agent.id)
        .collect()
}

/// Which living agents need their long-term objective (re)generated this
/// tick, per the policy in §4.8:
/// - absent: always regenerate;
/// - `origin=user`: never auto-regenerate;
/// - `origin=llm`, objective age < 5 years: skip;
/// - `origin=llm`, objective age ≥ 10 years: always regenerate;
/// - otherwise: regenerate with probability `(age−5)/5 × 0.9 + 0.1`.
fn phase_objective_refresh(state: &mut SimulationState) -> Vec<AgentId> {
    let clock_year = state.clock.year();
    let agent_ids: Vec<_> = state.agents.values().filter(|agent| agent.alive).map(|agent| agent.id).collect();

    let mut due = Vec::new();
    for agent_id in agent_ids {
        let Some(agent) = state.agents.get(&agent_id) else { continue };
        match &agent.long_term_objective {
            None => due.push(agent_id),
            Some(objective) if objective.origin == cultivation_types::ObjectiveOrigin::User => {}
            Some(objective) => {
                let age_years = clock_year.saturating_sub(u64::from(objective.created_year));
                if objective_due_for_refresh(age_years, &mut state.rng) {
                    due.push(agent_id);
                }
            }
        }
    }
    due
}

fn objective_due_for_refresh(age_years: u64, rng: &mut impl rand::Rng) -> bool {
    if age_years < 5 {
        return false;
    }
    if age_years >= 10 {
        return true;
    }
    #[allow(clippy::cast_precision_loss)]
    let probability = (age_years.saturating_sub(5) as f64 / 5.0).mul_add(0.9, 0.1);
    rng.random_bool(probability.clamp(0.0, 1.0))
}

/// §4.8 "Nickname eligibility": no nickname yet, or the current one is at
/// least ten calendar years old, and the agent has accumulated enough major
/// and minor events.
fn nickname_eligible(
    agent: &cultivation_types::Agent,
    state: &SimulationState,
    clock_year: u64,
    thresholds: &crate::config::NicknameConfig,
) -> bool {
    let age_ok = agent
        .nickname
        .as_ref()
        .is_none_or(|nickname| clock_year.saturating_sub(u64::from(nickname.created_year)) >= 10);
    if !age_ok {
        return false;
    }

    let (major_count, minor_count) = state.events.by_agent(agent.id).fold((0_u32, 0_u32), |(major, minor), event| {
        if event.is_major {
            (major.saturating_add(1), minor)
        } else {
            (major, minor.saturating_add(1))
        }
    });

    major_count >= thresholds.major_event_threshold && minor_count >= thresholds.minor_event_threshold
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;
    use rust_decimal::Decimal;

    use cultivation_llm::{BackendConfig, Dispatcher, TaskModeTable};
    use cultivation_types::{Agent, Personality, Sex};
    use cultivation_world::WorldMap;

    use super::*;
    use crate::config::GameConfig;

    fn dispatcher() -> Arc<Dispatcher> {
        let backend =
            BackendConfig { api_url: String::new(), api_key: String::new(), normal_model: String::new(), fast_model: String::new() };
        Arc::new(Dispatcher::new(backend, TaskModeTable::new(std::collections::BTreeMap::new()), None))
    }

    fn make_agent(location: cultivation_types::LocationId) -> Agent {
        Agent {
            id: AgentId::new(),
            name: String::from("Test Agent"),
            sex: Sex::Female,
            age_months: 0,
            max_lifespan_months: 100,
            realm: cultivation_types::Realm::Mortal,
            level: 0,
            experience: 0,
            position: (0, 0),
            weapon: None,
            auxiliary: None,
            technique: None,
            spirit_animal: None,
            inventory: std::collections::BTreeMap::new(),
            sect: None,
            relations: std::collections::BTreeMap::new(),
            known_regions: std::collections::BTreeSet::new(),
            location,
            short_term_objective: None,
            long_term_objective: None,
            nickname: None,
            event_ring: std::collections::VecDeque::new(),
            plan_queue: std::collections::VecDeque::new(),
            temporary_effects: Vec::new(),
            cached_effects: cultivation_types::EffectMap::new(),
            effects_version: 0,
            thinking: String::new(),
            cooldowns: std::collections::BTreeMap::new(),
            alive: true,
            born_at_month: 0,
            died_at_month: None,
            generation: 0,
            parent_a: None,
            parent_b: None,
            personality: Personality {
                curiosity: Decimal::ZERO,
                cooperation: Decimal::ZERO,
                aggression: Decimal::ZERO,
                risk_tolerance: Decimal::ZERO,
                industriousness: Decimal::ZERO,
                sociability: Decimal::ZERO,
                honesty: Decimal::ZERO,
                loyalty: Decimal::ZERO,
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_world_tick_advances_clock_and_stays_quiet() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 1);
        let game = GameConfig::default();
        let mut gatherings: Vec<Box<dyn Gathering>> = Vec::new();

        let summary = run_tick(&mut state, &game, &mut gatherings).expect("tick runs");
        assert_eq!(summary.month, 1);
        assert!(summary.deaths.is_empty());
    }

    #[test]
    fn agent_past_lifespan_dies_during_aging_phase() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 2);
        let location = cultivation_types::LocationId::new();
        let mut agent = make_agent(location);
        agent.age_months = 99;
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let game = GameConfig::default();
        let mut gatherings: Vec<Box<dyn Gathering>> = Vec::new();
        let summary = run_tick(&mut state, &game, &mut gatherings).expect("tick runs");

        assert_eq!(summary.deaths, vec![agent_id]);
        assert!(!state.agents.get(&agent_id).expect("still present").alive);
    }

    #[test]
    fn young_mortal_is_not_an_awakening_candidate() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 3);
        let location = cultivation_types::LocationId::new();
        let mut agent = make_agent(location);
        agent.age_months = 10;
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let mut summary = TickSummary::default();
        phase_mortal_promotion(&state, &mut summary);
        assert!(!summary.awakening_candidates.contains(&agent_id));
    }

    #[test]
    fn mortal_past_awakening_age_is_a_candidate() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 4);
        let location = cultivation_types::LocationId::new();
        let mut agent = make_agent(location);
        agent.age_months = AWAKENING_AGE_MONTHS;
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let mut summary = TickSummary::default();
        phase_mortal_promotion(&state, &mut summary);
        assert!(summary.awakening_candidates.contains(&agent_id));
    }

    #[test]
    fn agent_with_no_objective_is_always_due() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 5);
        let agent = make_agent(cultivation_types::LocationId::new());
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let due = phase_objective_refresh(&mut state);
        assert!(due.contains(&agent_id));
    }

    #[test]
    fn user_objective_is_never_auto_regenerated() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 6);
        state.clock = crate::clock::WorldClock::from_months(20 * 12);
        let mut agent = make_agent(cultivation_types::LocationId::new());
        agent.long_term_objective = Some(cultivation_types::Objective {
            text: String::from("unify the sects"),
            origin: cultivation_types::ObjectiveOrigin::User,
            created_year: 1,
        });
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let due = phase_objective_refresh(&mut state);
        assert!(!due.contains(&agent_id));
    }

    #[test]
    fn fresh_llm_objective_is_skipped() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 7);
        state.clock = crate::clock::WorldClock::from_months(3 * 12);
        let mut agent = make_agent(cultivation_types::LocationId::new());
        agent.long_term_objective = Some(cultivation_types::Objective {
            text: String::from("master a new technique"),
            origin: cultivation_types::ObjectiveOrigin::Llm,
            created_year: 1,
        });
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let due = phase_objective_refresh(&mut state);
        assert!(!due.contains(&agent_id));
    }

    #[test]
    fn decade_old_llm_objective_is_forced_to_refresh() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 8);
        state.clock = crate::clock::WorldClock::from_months(20 * 12);
        let mut agent = make_agent(cultivation_types::LocationId::new());
        agent.long_term_objective = Some(cultivation_types::Objective {
            text: String::from("ascend to the next realm"),
            origin: cultivation_types::ObjectiveOrigin::Llm,
            created_year: 1,
        });
        let agent_id = agent.id;
        state.agents.insert(agent_id, agent);

        let due = phase_objective_refresh(&mut state);
        assert!(due.contains(&agent_id));
    }

    #[test]
    fn objective_refresh_probability_matches_the_age_boundary_cases() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        assert!(!objective_due_for_refresh(4, &mut rng));
        assert!(objective_due_for_refresh(10, &mut rng));
        assert!(objective_due_for_refresh(15, &mut rng));
    }

    #[test]
    fn suggested_next_with_no_owner_lands_on_the_acting_agent() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 9);
        let location = cultivation_types::LocationId::new();
        let actor = make_agent(location);
        let actor_id = actor.id;
        state.agents.insert(actor_id, actor);

        let plan = cultivation_types::ActionPlan {
            action_name: String::from("MoveAwayFromAvatar"),
            params: serde_json::Value::Null,
            priority: i32::MAX,
            expiry_month: None,
            max_retries: 0,
            attempted_count: 0,
        };
        let mut summary = TickSummary::default();
        install_suggested_next(&mut state, actor_id, Some(plan), None, &mut summary);

        assert!(state.runtimes.get(&actor_id).is_some_and(|runtime| !runtime.is_idle()));
    }

    #[test]
    fn suggested_next_with_an_explicit_owner_lands_on_the_target_not_the_actor() {
        let map = WorldMap::new(4, 4);
        let mut state = SimulationState::new(map, dispatcher(), 10);
        let location = cultivation_types::LocationId::new();
        let actor = make_agent(location);
        let actor_id = actor.id;
        let owner = make_agent(location);
        let owner_id = owner.id;
        state.agents.insert(actor_id, actor);
        state.agents.insert(owner_id, owner);

        let plan = cultivation_types::ActionPlan {
            action_name: String::from("MoveAwayFromAvatar"),
            params: serde_json::json!({ "target": actor_id }),
            priority: i32::MAX,
            expiry_month: None,
            max_retries: 0,
            attempted_count: 0,
        };
        let mut summary = TickSummary::default();
        install_suggested_next(&mut state, actor_id, Some(plan), Some(owner_id), &mut summary);

        assert!(
            state.runtimes.get(&actor_id).is_none_or(cultivation_agents::AgentRuntime::is_idle),
            "the acting agent must stay untouched when the follow-up is owned by someone else"
        );
        let running = state.runtimes.get(&owner_id).and_then(cultivation_agents::AgentRuntime::current_action);
        match running {
            Some(cultivation_agents::actions::ActionInstance::MoveAwayFromAvatar(move_state)) => {
                assert_eq!(move_state.target, actor_id);
            }
            _ => panic!("expected the owner to have the follow-up plan promoted"),
        }
    }
}
