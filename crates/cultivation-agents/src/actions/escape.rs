//! `Escape`: an Instant reactive action an agent runs against whoever it is
//! fleeing, resolving on its first (only) `step` into either a successful
//! getaway or a forced counter-attack (§4.2 "Instant"; worked example 2).
//!
//! The chosen follow-up is carried on [`ActionResultRecord::suggested_next`]
//! rather than called back into the runtime directly, keeping `actions` free
//! of any dependency on `runtime` (which depends on `actions`, not the
//! reverse). The runtime enqueues and immediately promotes it, producing the
//! start event the protocol in §4.6 expects.

use rand::Rng;
use rust_decimal::Decimal;

use cultivation_types::{ActionPlan, ActionResultRecord, Agent, AgentId, EffectValue, Event, EventId};

use super::context::ActionContext;

/// Fallback chance of a successful getaway when the agent carries no
/// `escape_rate` effect of its own.
const DEFAULT_ESCAPE_RATE: f64 = 0.5;

/// Execution state for a running `Escape`.
#[derive(Debug, Clone, Copy)]
pub struct EscapeState {
    /// Whoever the agent is fleeing.
    pub target: AgentId,
}

/// Pure precondition check: an agent cannot flee from itself.
pub fn can_start(agent: &Agent, target: AgentId) -> (bool, String) {
    if target == agent.id {
        (false, String::from("cannot escape from oneself"))
    } else {
        (true, String::new())
    }
}

impl EscapeState {
    /// Roll against the agent's `escape_rate` effect and resolve into a
    /// follow-up plan: a clean getaway, or being forced to fight back.
    pub fn step(&self, agent: &Agent, clock: u64, ctx: &mut ActionContext<'_>) -> ActionResultRecord {
        let escape_rate = match agent.cached_effects.get("escape_rate") {
            Some(EffectValue::Number(value)) => decimal_to_f64(*value),
            _ => DEFAULT_ESCAPE_RATE,
        };

        let roll: f64 = ctx.rng.random_range(0.0..1.0);
        let escaped = roll < escape_rate;

        let (next_action, content) = if escaped {
            (String::from("MoveAwayFromAvatar"), format!("{} slips away", agent.name))
        } else {
            (String::from("Attack"), format!("{} fails to escape and is forced to fight", agent.name))
        };

        let event = Event {
            id: EventId::new(),
            month_stamp: clock,
            content,
            related_agent_ids: vec![agent.id, self.target],
            is_major: false,
            is_story: false,
        };

        let suggested_next = ActionPlan {
            action_name: next_action,
            params: serde_json::json!({ "target": self.target }),
            priority: i32::MAX,
            expiry_month: None,
            max_retries: 0,
            attempted_count: 0,
        };

        ActionResultRecord {
            status: cultivation_types::ActionStatus::Completed,
            events: vec![event],
            payload: Some(serde_json::json!({ "escaped": escaped })),
            suggested_next: Some(suggested_next),
            suggested_next_owner: None,
        }
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(DEFAULT_ESCAPE_RATE)
}
