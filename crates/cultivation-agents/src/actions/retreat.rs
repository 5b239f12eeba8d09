//! `Retreat`: a Timed action representing closed-door cultivation, resolving
//! to success or failure at `finish` per a realm-scaled success rate (§4.2
//! "Timed"; worked example 6).
//!
//! Grounded in `original_source`'s retreat/breakthrough task: duration is
//! rolled once at `start` within a fixed range, and the success formula
//! `0.5 - realm_index*0.1 + extra_retreat_success_rate` is evaluated once at
//! `finish`, clamped to `[0.1, 1.0]`.

use rand::Rng;
use rust_decimal::Decimal;

use cultivation_types::{ActionStatus, Agent, EffectValue, Event, EventId};

use super::context::ActionContext;
use super::duration::effective_duration;

/// Inclusive range a retreat's base duration is drawn from at `start`.
pub const DURATION_RANGE_MONTHS: std::ops::RangeInclusive<u64> = 24..=48;

/// Execution state for a running `Retreat`.
#[derive(Debug, Clone)]
pub struct RetreatState {
    /// Month the retreat began.
    pub start_month: u64,
    /// Total duration, rolled once at `start` and reduced by effects.
    pub duration_months: u64,
}

/// Retreat has no world precondition beyond the agent being free to act;
/// the runtime's cooldown decorator and plan-queue checks cover the rest.
pub fn can_start(_agent: &Agent) -> (bool, String) {
    (true, String::new())
}

/// Commit `agent` to a retreat, rolling its duration once up front.
pub fn start(agent: &Agent, ctx: &mut ActionContext<'_>) -> RetreatState {
    let base = ctx.rng.random_range(DURATION_RANGE_MONTHS);
    RetreatState { start_month: ctx.clock, duration_months: effective_duration(base, &agent.cached_effects) }
}

impl RetreatState {
    /// Report whether the rolled duration has elapsed.
    pub fn step(&self, clock: u64) -> ActionStatus {
        let elapsed = clock.saturating_sub(self.start_month);
        if elapsed >= self.duration_months.saturating_sub(1) {
            ActionStatus::Completed
        } else {
            ActionStatus::Running
        }
    }

    /// Roll the breakthrough check and report the retreat's outcome.
    pub fn finish(&self, agent: &mut Agent, clock: u64, ctx: &mut ActionContext<'_>) -> Vec<Event> {
        let extra = match agent.cached_effects.get("extra_retreat_success_rate") {
            Some(EffectValue::Number(value)) => *value,
            _ => Decimal::ZERO,
        };
        let base_rate = Decimal::new(5, 1) - Decimal::from(agent.realm.index()) * Decimal::new(1, 1);
        let success_rate = (base_rate + extra).clamp(Decimal::new(1, 1), Decimal::ONE);

        let roll: f64 = ctx.rng.random_range(0.0..1.0);
        let threshold = success_rate.to_string().parse::<f64>().unwrap_or(0.0);
        let succeeded = roll < threshold;

        let content = if succeeded {
            agent.experience = agent.experience.saturating_add(100);
            format!("{} emerges from retreat with a breakthrough in understanding", agent.name)
        } else {
            format!("{} emerges from retreat having made no progress", agent.name)
        };

        vec![Event {
            id: EventId::new(),
            month_stamp: clock,
            content,
            related_agent_ids: vec![agent.id],
            is_major: succeeded,
            is_story: false,
        }]
    }
}
