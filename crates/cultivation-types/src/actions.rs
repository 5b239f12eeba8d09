//! Decision-to-plan conversion types.
//!
//! An LLM decision (or a user command) produces a chain of one or more
//! `(action_name, params)` pairs plus narration text; this is turned into
//! [`crate::structs::ActionPlan`] entries by
//! `cultivation_agents::runtime::AgentRuntime::load_decide_result_chain`.

use serde::{Deserialize, Serialize};

/// One link of a decided action chain: the action to enqueue and its params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecidedAction {
    /// Name the action is registered under (§4.3).
    pub action_name: String,
    /// Opaque parameter bag, interpreted by the named action type.
    pub params: serde_json::Value,
}

/// The full result of one decision cycle for a single agent: a chain of
/// actions to enqueue, the rationale behind them, and an optional refreshed
/// short-term objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionChain {
    /// Actions to enqueue, in priority order.
    pub plans: Vec<DecidedAction>,
    /// Free-form rationale, copied onto the agent's `thinking` field.
    pub thinking: String,
    /// Replacement short-term objective text, if the decision set one.
    pub short_term_objective: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn decision_chain_roundtrips_through_json() {
        let chain = DecisionChain {
            plans: vec![DecidedAction {
                action_name: String::from("Hunt"),
                params: serde_json::json!({"region": "forest"}),
            }],
            thinking: String::from("Food stores are low."),
            short_term_objective: Some(String::from("Gather food")),
        };
        let encoded = serde_json::to_string(&chain).unwrap_or_default();
        let decoded: DecisionChain = serde_json::from_str(&encoded).unwrap_or(DecisionChain {
            plans: Vec::new(),
            thinking: String::new(),
            short_term_objective: None,
        });
        assert_eq!(decoded.plans.len(), 1);
    }
}
