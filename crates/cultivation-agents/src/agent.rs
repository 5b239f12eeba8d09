//! Agent creation and management.
//!
//! The [`AgentManager`] constructs new agents -- seed agents at world
//! genesis, child agents via reproduction -- and enforces name uniqueness
//! across the population.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::Utc;
use cultivation_types::{Agent, AgentId, EffectMap, LocationId, Personality, Resource, Sex};

use crate::error::AgentError;

/// Parameters for creating a child agent via reproduction.
#[derive(Debug, Clone)]
pub struct ChildAgentParams {
    /// Display name for the child (must be unique).
    pub name: String,
    /// Biological sex of the child (randomly assigned by caller).
    pub sex: Sex,
    /// Blended personality (caller is responsible for blending + mutation).
    pub personality: Personality,
    /// ID of the first parent.
    pub parent_a: AgentId,
    /// ID of the second parent.
    pub parent_b: AgentId,
    /// Generation number of the first parent.
    pub parent_a_generation: u32,
    /// Generation number of the second parent.
    pub parent_b_generation: u32,
    /// Location where the child is born.
    pub location: LocationId,
    /// Month the child enters the simulation.
    pub born_at_month: u64,
    /// Maximum lifespan in months assigned to the child.
    pub max_lifespan_months: u64,
}

/// Creates and tracks agents for the simulation.
///
/// Enforces name uniqueness and provides factory methods for both seed
/// agents (generation 0) and child agents (reproduced).
#[derive(Debug, Default)]
pub struct AgentManager {
    names_in_use: BTreeSet<String>,
}

impl AgentManager {
    /// Create a new empty agent manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a seed agent (generation 0, no parents).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] if the name is already taken.
    #[allow(clippy::too_many_arguments)]
    pub fn create_seed_agent(
        &mut self,
        name: String,
        sex: Sex,
        personality: Personality,
        location: LocationId,
        born_at_month: u64,
        max_lifespan_months: u64,
        starting_inventory: BTreeMap<Resource, u64>,
    ) -> Result<Agent, AgentError> {
        if self.names_in_use.contains(&name) {
            return Err(AgentError::DuplicateName(name));
        }
        self.names_in_use.insert(name.clone());

        Ok(Agent {
            id: AgentId::new(),
            name,
            sex,
            age_months: 0,
            max_lifespan_months,
            realm: cultivation_types::Realm::Mortal,
            level: 0,
            experience: 0,
            position: (0, 0),
            weapon: None,
            auxiliary: None,
            technique: None,
            spirit_animal: None,
            inventory: starting_inventory,
            sect: None,
            relations: BTreeMap::new(),
            known_regions: BTreeSet::from([location]),
            location,
            short_term_objective: None,
            long_term_objective: None,
            nickname: None,
            event_ring: VecDeque::new(),
            plan_queue: VecDeque::new(),
            temporary_effects: Vec::new(),
            cached_effects: EffectMap::new(),
            effects_version: 0,
            thinking: String::new(),
            cooldowns: BTreeMap::new(),
            alive: true,
            born_at_month,
            died_at_month: None,
            generation: 0,
            parent_a: None,
            parent_b: None,
            personality,
            created_at: Utc::now(),
        })
    }

    /// Create a child agent from two parents.
    ///
    /// The child's generation is `max(parent_a, parent_b) + 1`; it starts at
    /// the parents' location with no inventory and no known regions beyond
    /// that location.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] if the name is already taken, or
    /// [`AgentError::ArithmeticOverflow`] if the generation counter overflows.
    pub fn create_child_agent(&mut self, params: &ChildAgentParams) -> Result<Agent, AgentError> {
        if self.names_in_use.contains(&params.name) {
            return Err(AgentError::DuplicateName(params.name.clone()));
        }
        self.names_in_use.insert(params.name.clone());

        let max_parent_gen = params.parent_a_generation.max(params.parent_b_generation);
        let generation = max_parent_gen
            .checked_add(1)
            .ok_or_else(|| AgentError::ArithmeticOverflow { context: String::from("generation increment overflow") })?;

        Ok(Agent {
            id: AgentId::new(),
            name: params.name.clone(),
            sex: params.sex,
            age_months: 0,
            max_lifespan_months: params.max_lifespan_months,
            realm: cultivation_types::Realm::Mortal,
            level: 0,
            experience: 0,
            position: (0, 0),
            weapon: None,
            auxiliary: None,
            technique: None,
            spirit_animal: None,
            inventory: BTreeMap::new(),
            sect: None,
            relations: BTreeMap::new(),
            known_regions: BTreeSet::from([params.location]),
            location: params.location,
            short_term_objective: None,
            long_term_objective: None,
            nickname: None,
            event_ring: VecDeque::new(),
            plan_queue: VecDeque::new(),
            temporary_effects: Vec::new(),
            cached_effects: EffectMap::new(),
            effects_version: 0,
            thinking: String::new(),
            cooldowns: BTreeMap::new(),
            alive: true,
            born_at_month: params.born_at_month,
            died_at_month: None,
            generation,
            parent_a: Some(params.parent_a),
            parent_b: Some(params.parent_b),
            personality: params.personality.clone(),
            created_at: Utc::now(),
        })
    }

    /// Release a name back to the pool (e.g. after an agent's death record is archived).
    ///
    /// Returns `true` if the name was in use and is now released.
    pub fn release_name(&mut self, name: &str) -> bool {
        self.names_in_use.remove(name)
    }

    /// Check whether a name is currently in use.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }
}

/// Set a user-authored long-term objective on `agent` (§4.8).
///
/// A user objective is never auto-regenerated, and setting one also clears
/// the agent's short-term objective and plan queue, since both were written
/// in service of whatever the previous long-term objective was.
pub fn set_user_long_term_objective(agent: &mut Agent, text: String, created_year: u32) {
    agent.long_term_objective =
        Some(cultivation_types::Objective { text, origin: cultivation_types::ObjectiveOrigin::User, created_year });
    agent.short_term_objective = None;
    agent.plan_queue.clear();
}
