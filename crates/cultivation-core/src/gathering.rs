//! Gathering engine (§4.9 "Gathering Engine (C9)").
//!
//! A gathering is a registered type exposing `is_start`, `related_agents`,
//! `info`, and `execute`; `execute` runs synchronously within one tick.
//! Grounded directly in `original_source/src/classes/gathering/sect_teaching.py`'s
//! `SectTeachingConference`: per-sect independent trigger rolls, teacher =
//! highest `(realm, level)` member, experience grant as a uniform fraction of
//! the next-level requirement, and technique epiphany gated on a base
//! probability plus the student's own `extra_epiphany_probability` effect.
//! The experience-grant and epiphany-probability formulas are free functions
//! taking explicit inputs, in the style of `emergence-world/src/structure.rs`'s
//! `compute_repair_cost`/`compute_salvage`, rather than methods on a God object.

use rand::Rng as _;
use rust_decimal::prelude::ToPrimitive as _;
use rust_decimal::Decimal;

use cultivation_types::{AgentId, EffectValue, Event, EventId, Realm, SectId};

use crate::config::GatheringConfig;
use crate::state::SimulationState;

/// Effect key a student's `extra_epiphany_probability` is read from (§4.9).
pub const EXTRA_EPIPHANY_PROBABILITY_KEY: &str = "extra_epiphany_probability";

/// A registered gathering type (§4.9).
pub trait Gathering {
    /// Roll for whether this gathering starts this tick, and remember its
    /// target (if any) for the subsequent `related_agents`/`info`/`execute`
    /// calls within the same tick.
    fn is_start(&mut self, state: &mut SimulationState, config: &GatheringConfig) -> bool;

    /// Every agent this gathering would touch, were it to run now.
    fn related_agents(&self, state: &SimulationState) -> Vec<AgentId>;

    /// A short human-readable description of the pending gathering.
    fn info(&self, state: &SimulationState) -> String;

    /// Run the gathering, mutating `state` and returning the events it
    /// produced. Clears whatever target `is_start` selected.
    fn execute(&mut self, state: &mut SimulationState, config: &GatheringConfig) -> Vec<Event>;
}

/// Sect-teaching: the highest-realm living member of an eligible sect
/// instructs the rest, granting experience and a chance of technique
/// epiphany.
#[derive(Debug, Default)]
pub struct SectTeaching {
    target_sect: Option<SectId>,
}

impl SectTeaching {
    /// Build an idle sect-teaching gathering with no pending target.
    #[must_use]
    pub const fn new() -> Self {
        Self { target_sect: None }
    }
}

impl Gathering for SectTeaching {
    fn is_start(&mut self, state: &mut SimulationState, config: &GatheringConfig) -> bool {
        self.target_sect = None;

        let mut eligible: Vec<SectId> = state
            .sects
            .values()
            .filter(|sect| living_members(state, sect.id).count() >= 2)
            .map(|sect| sect.id)
            .collect();
        if eligible.is_empty() {
            return false;
        }

        // `original_source`'s own shuffle-then-roll is replicated here with
        // ascending-id order rather than an actual in-place shuffle: the
        // trigger check is order-independent, so the draw order only
        // affects which sect wins when several roll true in the same tick.
        eligible.sort_unstable();

        for sect_id in eligible {
            if state.rng.random_bool(config.sect_teaching_prob.clamp(0.0, 1.0)) {
                self.target_sect = Some(sect_id);
                return true;
            }
        }
        false
    }

    fn related_agents(&self, state: &SimulationState) -> Vec<AgentId> {
        self.target_sect.map_or_else(Vec::new, |sect_id| living_members(state, sect_id).collect())
    }

    fn info(&self, state: &SimulationState) -> String {
        let sect_name = self
            .target_sect
            .and_then(|id| state.sects.get(&id))
            .map_or_else(|| String::from("an unnamed sect"), |sect| sect.name.clone());
        format!("{sect_name} convenes a sect-teaching conference")
    }

    fn execute(&mut self, state: &mut SimulationState, config: &GatheringConfig) -> Vec<Event> {
        let Some(sect_id) = self.target_sect.take() else {
            return Vec::new();
        };

        let mut members: Vec<AgentId> = living_members(state, sect_id).collect();
        members.sort_by_key(|id| {
            state.agents.get(id).map_or((Realm::Mortal, 0), |agent| (agent.realm, agent.level))
        });
        members.reverse();
        if members.len() < 2 {
            return Vec::new();
        }

        let Some((&teacher_id, student_ids)) = members.split_first() else {
            return Vec::new();
        };
        let clock = state.clock.now();
        let teacher_technique = state.agents.get(&teacher_id).and_then(|agent| agent.technique.clone());

        let mut events = Vec::new();
        let mut exp_gains: Vec<(AgentId, u64)> = Vec::new();
        let mut epiphany_students: Vec<AgentId> = Vec::new();

        for &student_id in student_ids {
            let Some(student) = state.agents.get_mut(&student_id) else { continue };

            let requirement = next_level_requirement(student.realm, student.level);
            let ratio: f64 = state.rng.random_range(0.1..0.3);
            let exp_gain = scale_experience(requirement, ratio);
            student.experience = student.experience.saturating_add(exp_gain);
            exp_gains.push((student_id, exp_gain));

            if let Some(teacher_technique) = &teacher_technique {
                if student.technique.as_ref() != Some(teacher_technique) {
                    let extra = extra_epiphany_probability(student);
                    let prob = (config.base_epiphany_prob + extra).clamp(0.0, 1.0);
                    if state.rng.random_bool(prob) {
                        student.technique = Some(teacher_technique.clone());
                        student.bump_effects_version();
                        epiphany_students.push(student_id);
                    }
                }
            }
        }

        let teacher_name = state.agents.get(&teacher_id).map_or_else(String::new, |agent| agent.name.clone());
        let sect_name = state.sects.get(&sect_id).map_or_else(String::new, |sect| sect.name.clone());
        let student_names: Vec<String> =
            student_ids.iter().filter_map(|id| state.agents.get(id)).map(|agent| agent.name.clone()).collect();

        events.push(Event {
            id: EventId::new(),
            month_stamp: clock,
            content: format!(
                "{sect_name} holds a teaching conference: {teacher_name} instructs {}",
                student_names.join(", ")
            ),
            related_agent_ids: members.clone(),
            is_major: false,
            is_story: false,
        });

        for (student_id, exp) in &exp_gains {
            if let Some(student) = state.agents.get(student_id) {
                events.push(Event {
                    id: EventId::new(),
                    month_stamp: clock,
                    content: format!("{} gains {exp} experience from the teaching", student.name),
                    related_agent_ids: vec![*student_id],
                    is_major: false,
                    is_story: false,
                });
            }
        }

        let story = if epiphany_students.is_empty() {
            format!("{teacher_name} shares the fundamentals of the path with {sect_name}'s younger disciples.")
        } else {
            let names: Vec<String> =
                epiphany_students.iter().filter_map(|id| state.agents.get(id)).map(|a| a.name.clone()).collect();
            format!(
                "{teacher_name}'s teaching strikes a chord; {} grasp the technique in a flash of insight.",
                names.join(", ")
            )
        };
        events.push(Event {
            id: EventId::new(),
            month_stamp: clock,
            content: story,
            related_agent_ids: members,
            is_major: false,
            is_story: true,
        });

        events
    }
}

fn living_members(state: &SimulationState, sect_id: SectId) -> impl Iterator<Item = AgentId> + '_ {
    state
        .sects
        .get(&sect_id)
        .into_iter()
        .flat_map(|sect| sect.members.iter().copied())
        .filter(move |id| state.agents.get(id).is_some_and(|agent| agent.alive))
}

/// Experience required to reach the next level from `(realm, level)`.
///
/// `original_source` derives this from a richer per-realm curve not present
/// in this crate's static-data model (§1 "Out of scope: ... concrete content
/// of individual action types"); this is a simple monotonic stand-in with
/// the same shape (scales with realm tier and level).
#[must_use]
pub fn next_level_requirement(realm: Realm, level: u32) -> u64 {
    let realm_scale = u64::from(realm.index()).saturating_add(1).saturating_mul(100);
    realm_scale.saturating_add(u64::from(level).saturating_mul(20))
}

/// Scale a base experience requirement by a `[0.0, 1.0]` ratio, as the
/// sect-teaching exp grant does (`ratio ∈ [0.1, 0.3]` per §4.9).
#[must_use]
pub fn scale_experience(requirement: u64, ratio: f64) -> u64 {
    let requirement = Decimal::from(requirement);
    let ratio = Decimal::try_from(ratio.clamp(0.0, 1.0)).unwrap_or_default();
    (requirement * ratio).to_u64().unwrap_or(0)
}

fn extra_epiphany_probability(agent: &cultivation_types::Agent) -> f64 {
    match agent.cached_effects.get(EXTRA_EPIPHANY_PROBABILITY_KEY) {
        Some(EffectValue::Number(value)) => value.to_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}
