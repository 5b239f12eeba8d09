//! Shared test-only agent builder.
//!
//! [`Agent`] carries two dozen fields; every action test module needs a
//! throwaway instance, so this keeps the full literal in one place instead of
//! copy-pasted across `hunt.rs`, `retreat.rs`, `movement.rs`, etc.
#![cfg(test)]
#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rust_decimal::Decimal;

use cultivation_types::{
    Agent, AgentId, EffectMap, LocationId, Personality, Realm, Sex,
};

pub fn make_agent_at(position: (u32, u32)) -> Agent {
    Agent {
        id: AgentId::new(),
        name: String::from("Test"),
        sex: Sex::Female,
        age_months: 0,
        max_lifespan_months: 1200,
        realm: Realm::Mortal,
        level: 0,
        experience: 0,
        position,
        weapon: None,
        auxiliary: None,
        technique: None,
        spirit_animal: None,
        inventory: BTreeMap::new(),
        sect: None,
        relations: BTreeMap::new(),
        known_regions: BTreeSet::new(),
        location: LocationId::new(),
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

pub fn make_agent() -> Agent {
    make_agent_at((0, 0))
}
