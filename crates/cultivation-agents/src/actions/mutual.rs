//! Mutual two-party actions: `Attack` and `Conversation` (§4.6).
//!
//! Both share one shape: `start` optionally announces, `step` dispatches an
//! LLM call describing both sides and a declared feedback list, and once the
//! call resolves, `settle_feedback` maps the target's chosen feedback onto
//! zero or more new plans. Only the feedback vocabulary and whether `start`
//! announces differ between the two, so both are driven by one [`MutualState`]
//! parameterized on [`MutualKind`], in the same spirit as a prior
//! single `LlmBackend` enum covering multiple call-shape variants.

use std::future::Future as _;
use std::sync::Arc;

use tokio::task::JoinHandle;

use cultivation_types::{
    ActionPlan, ActionResultRecord, ActionStatus, Agent, AgentId, Event, EventId,
};

use cultivation_llm::LlmError;

use super::context::ActionContext;

/// Which mutual action this instance is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutualKind {
    /// A hostile confrontation; the target may accept, reject, flee, or fight back.
    Attack,
    /// A friendly exchange; the target may talk or reject.
    Conversation,
}

impl MutualKind {
    /// Registered action name this kind corresponds to.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Conversation => "Conversation",
        }
    }

    /// Feedback options offered to the target, per §4.6's worked examples.
    pub const fn feedback_options(self) -> &'static [&'static str] {
        match self {
            Self::Attack => &["Accept", "Reject", "Escape", "Attack"],
            Self::Conversation => &["Talk", "Reject"],
        }
    }

    /// Whether `start` emits an announcement event visible to both sides.
    /// Conversation's initiation is silent (§4.6 "Conversation sub-variant").
    pub const fn announces_on_start(self) -> bool {
        matches!(self, Self::Attack)
    }

    fn task_name(self) -> &'static str {
        match self {
            Self::Attack => "mutual_attack",
            Self::Conversation => "mutual_conversation",
        }
    }

    fn prompt_template(self) -> &'static str {
        match self {
            Self::Attack => {
                "{{ initiator_name }} attacks {{ target_name }}.\n\
                 Initiator: {{ avatar_infos }}\n\
                 World: {{ world_info }}\n\
                 Respond with a JSON object: {\"thinking\": \"...\", \"feedback\": one of {{ feedback_options }} }."
            }
            Self::Conversation => {
                "{{ initiator_name }} starts a conversation with {{ target_name }}.\n\
                 Initiator: {{ avatar_infos }}\n\
                 World: {{ world_info }}\n\
                 Respond with a JSON object: {\"thinking\": \"...\", \"feedback\": one of {{ feedback_options }}, \"conversation_content\": \"...\" }."
            }
        }
    }
}

/// The target's parsed response, once the in-flight call resolves.
struct Resolution {
    thinking: String,
    feedback: String,
    conversation_content: Option<String>,
}

/// Execution state for a running `Attack` or `Conversation`.
pub struct MutualState {
    /// Which mutual action this is.
    pub kind: MutualKind,
    /// The other party in the exchange.
    pub target: AgentId,
    /// Month the exchange began.
    pub start_month: u64,
    pending: Option<JoinHandle<Result<serde_json::Value, LlmError>>>,
    settled: bool,
}

/// Pure precondition check: target must exist, be alive, not be the
/// initiator, and share the initiator's location.
pub fn can_start(agent: &Agent, target: Option<&Agent>) -> (bool, String) {
    let Some(target) = target else {
        return (false, String::from("target not found"));
    };
    if target.id == agent.id {
        return (false, String::from("cannot target oneself"));
    }
    if !target.alive {
        return (false, String::from("target is not alive"));
    }
    if target.location != agent.location {
        return (false, String::from("target is out of interaction range"));
    }
    (true, String::new())
}

/// Commit `agent` to a mutual exchange with `target`, announcing it if
/// `kind` calls for one.
pub fn start(kind: MutualKind, agent: &Agent, target: &Agent, clock: u64) -> (MutualState, Option<Event>) {
    let state = MutualState { kind, target: target.id, start_month: clock, pending: None, settled: false };
    let event = kind.announces_on_start().then(|| Event {
        id: EventId::new(),
        month_stamp: clock,
        content: format!("{} confronts {}", agent.name, target.name),
        related_agent_ids: vec![agent.id, target.id],
        is_major: kind == MutualKind::Attack,
        is_story: false,
    });
    (state, event)
}

impl MutualState {
    /// Rebuild a running `Attack`/`Conversation` from save data (§4.10):
    /// the in-flight LLM call is never persisted, so a restored instance
    /// always starts idle and re-dispatches on its next `step`.
    pub const fn restored(kind: MutualKind, target: AgentId, start_month: u64) -> Self {
        Self { kind, target, start_month, pending: None, settled: false }
    }

    /// Dispatch on first call, poll thereafter. Never awaits the call
    /// itself, only the already-finished handle (§4.2 "must not block").
    pub fn step(&mut self, agent: &Agent, target: &mut Agent, ctx: &mut ActionContext<'_>) -> ActionResultRecord {
        if self.settled {
            return ActionResultRecord::terminal(ActionStatus::Completed, Vec::new());
        }

        let Some(handle) = &self.pending else {
            self.spawn_call(agent, target, ctx.dispatcher.clone());
            return ActionResultRecord::running();
        };

        if !handle.is_finished() {
            return ActionResultRecord::running();
        }

        let Some(handle) = self.pending.take() else {
            return ActionResultRecord::running();
        };

        match futures_now_or_never(handle) {
            Some(Ok(Ok(value))) => self.settle(value, agent, target, ctx.clock),
            Some(Ok(Err(_)) | Err(_)) => {
                // The call itself failed (transport/parse exhausted retries);
                // treat as a silent Reject so the exchange still terminates.
                self.settled = true;
                ActionResultRecord::terminal(ActionStatus::Completed, Vec::new())
            }
            None => ActionResultRecord::running(),
        }
    }

    fn spawn_call(&mut self, agent: &Agent, target: &Agent, dispatcher: Arc<cultivation_llm::Dispatcher>) {
        let kind = self.kind;
        let task_name = kind.task_name().to_owned();
        let template = kind.prompt_template().to_owned();
        let info_map = serde_json::json!({
            "initiator_name": agent.name,
            "target_name": target.name,
            "avatar_infos": { "name": agent.name, "realm": agent.realm.index() },
            "world_info": { "month": self.start_month },
            "feedback_options": kind.feedback_options(),
        });

        self.pending = Some(tokio::spawn(async move {
            dispatcher.call_llm_with_task_name(&task_name, &template, &info_map, 1).await
        }));
    }

    fn settle(&mut self, value: serde_json::Value, agent: &Agent, target: &mut Agent, clock: u64) -> ActionResultRecord {
        self.settled = true;
        let resolution = parse_resolution(&value);
        target.thinking.clone_from(&resolution.thinking);

        let mut events = Vec::new();
        let mut suggested_next = None;
        let mut suggested_next_owner = None;

        match self.kind {
            MutualKind::Conversation => {
                if let Some(content) = &resolution.conversation_content {
                    events.push(Event {
                        id: EventId::new(),
                        month_stamp: clock,
                        content: content.clone(),
                        related_agent_ids: vec![agent.id, target.id],
                        is_major: false,
                        is_story: true,
                    });
                }
            }
            MutualKind::Attack => match resolution.feedback.as_str() {
                "Accept" => {}
                "Reject" => events.push(reject_event(agent, target, clock)),
                "Escape" | "Attack" | "MoveAway" => {
                    suggested_next = Some(ActionPlan {
                        action_name: resolution.feedback.clone(),
                        params: serde_json::json!({ "target": agent.id }),
                        priority: i32::MAX,
                        expiry_month: None,
                        max_retries: 0,
                        attempted_count: 0,
                    });
                    // The follow-up belongs to the target, who gave this
                    // feedback, not to the attacker whose action is settling.
                    suggested_next_owner = Some(target.id);
                }
                _ => {}
            },
        }

        let mut result = ActionResultRecord::terminal(ActionStatus::Completed, events);
        result.suggested_next = suggested_next;
        result.suggested_next_owner = suggested_next_owner;
        result.payload = Some(serde_json::json!({ "thinking": resolution.thinking }));
        result
    }

    /// No-op: every event is already produced by `step` (§4.6 step 4).
    pub fn finish(&self) -> Vec<Event> {
        Vec::new()
    }
}

fn reject_event(agent: &Agent, target: &Agent, clock: u64) -> Event {
    Event {
        id: EventId::new(),
        month_stamp: clock,
        content: format!("{} rejects {}", target.name, agent.name),
        related_agent_ids: vec![agent.id, target.id],
        is_major: false,
        is_story: false,
    }
}

fn parse_resolution(value: &serde_json::Value) -> Resolution {
    Resolution {
        thinking: value.get("thinking").and_then(serde_json::Value::as_str).unwrap_or_default().to_owned(),
        feedback: value.get("feedback").and_then(serde_json::Value::as_str).unwrap_or("Reject").to_owned(),
        conversation_content: value.get("conversation_content").and_then(serde_json::Value::as_str).map(ToOwned::to_owned),
    }
}

/// Poll an already-`is_finished` handle without blocking. A finished
/// `JoinHandle` resolves on its very first poll, so this never actually
/// suspends; it exists only so `step` stays a plain synchronous function
/// callable from the tick loop without its own executor.
fn futures_now_or_never<T>(mut handle: JoinHandle<T>) -> Option<Result<T, tokio::task::JoinError>> {
    use std::task::{Context, Poll};

    let waker = std::task::Waker::noop();
    let mut cx = Context::from_waker(waker);
    match std::pin::Pin::new(&mut handle).poll(&mut cx) {
        Poll::Ready(result) => Some(result),
        Poll::Pending => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn attack_announces_but_conversation_does_not() {
        assert!(MutualKind::Attack.announces_on_start());
        assert!(!MutualKind::Conversation.announces_on_start());
    }

    #[test]
    fn can_start_rejects_self_target() {
        let agent = crate::test_support::make_agent();
        assert!(!can_start(&agent, Some(&agent)).0);
    }

    #[test]
    fn can_start_rejects_dead_target() {
        let agent = crate::test_support::make_agent();
        let mut target = crate::test_support::make_agent();
        target.location = agent.location;
        target.alive = false;
        assert!(!can_start(&agent, Some(&target)).0);
    }

    #[test]
    fn can_start_rejects_out_of_range_target() {
        let agent = crate::test_support::make_agent();
        let target = crate::test_support::make_agent();
        assert!(!can_start(&agent, Some(&target)).0);
    }

    #[test]
    fn can_start_accepts_living_colocated_target() {
        let agent = crate::test_support::make_agent();
        let mut target = crate::test_support::make_agent();
        target.location = agent.location;
        assert!(can_start(&agent, Some(&target)).0);
    }

    #[test]
    fn parse_resolution_defaults_missing_feedback_to_reject() {
        let resolution = parse_resolution(&serde_json::json!({"thinking": "hm"}));
        assert_eq!(resolution.feedback, "Reject");
    }

    #[test]
    fn settle_conversation_emits_story_event_to_both_sides() {
        let agent = crate::test_support::make_agent();
        let mut target = crate::test_support::make_agent();
        target.location = agent.location;
        let mut state = MutualState { kind: MutualKind::Conversation, target: target.id, start_month: 1, pending: None, settled: false };

        let result = state.settle(serde_json::json!({"thinking": "curious", "feedback": "Talk", "conversation_content": "Well met."}), &agent, &mut target, 2);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].content, "Well met.");
        assert_eq!(result.events[0].related_agent_ids, vec![agent.id, target.id]);
    }

    #[test]
    fn settle_attack_escape_feedback_suggests_escape_plan() {
        let agent = crate::test_support::make_agent();
        let mut target = crate::test_support::make_agent();
        target.location = agent.location;
        let mut state = MutualState { kind: MutualKind::Attack, target: target.id, start_month: 1, pending: None, settled: false };

        let result = state.settle(serde_json::json!({"thinking": "afraid", "feedback": "Escape"}), &agent, &mut target, 2);
        let next = result.suggested_next.expect("follow-up plan");
        assert_eq!(next.action_name, "Escape");
        assert_eq!(
            result.suggested_next_owner,
            Some(target.id),
            "the follow-up belongs to the target who gave the feedback, not the attacker"
        );
    }

    #[test]
    fn settle_attack_reject_feedback_emits_reject_event_only() {
        let agent = crate::test_support::make_agent();
        let mut target = crate::test_support::make_agent();
        target.location = agent.location;
        let mut state = MutualState { kind: MutualKind::Attack, target: target.id, start_month: 1, pending: None, settled: false };

        let result = state.settle(serde_json::json!({"thinking": "defiant", "feedback": "Reject"}), &agent, &mut target, 2);
        assert_eq!(result.events.len(), 1);
        assert!(result.suggested_next.is_none());
    }
}
