//! Per-agent action runtime (§4.4 "Agent Runtime").
//!
//! One [`AgentRuntime`] per living agent, held externally keyed by
//! [`AgentId`] (never embedded in [`Agent`] itself, per its doc comment) so
//! that the population map and the runtime map can be borrowed
//! independently when an action needs to touch both an initiator and a
//! target. Mirrors a prior separation of `Agent` (data) from its
//! per-agent scheduler state in `emergence-agents/src/runtime.rs`.

use cultivation_types::{
    ActionPlan, ActionResultRecord, ActionStatus, Agent, Event, Objective,
};

use crate::actions::context::ActionContext;
use crate::actions::capability::ActionCapability;
use crate::actions::{ActionInstance, ActionKind};

/// A currently-running action and the static facts about its type, cached
/// at promotion time so `advance` never has to re-look the type up.
pub struct RunningAction {
    /// The action's own execution state.
    pub instance: ActionInstance,
    /// Static capability record looked up when this action was promoted.
    pub capability: ActionCapability,
}

/// Scheduler state for a single agent: at most one running action plus the
/// bookkeeping needed to promote the next one.
///
/// Invariant: whenever `current_action` is `Some`, the agent's last
/// `advance` result was [`ActionStatus::Running`] -- a terminal result
/// always clears it in the same call that observed it.
#[derive(Default)]
pub struct AgentRuntime {
    current_action: Option<RunningAction>,
}

impl AgentRuntime {
    /// Build an idle runtime with no running action.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently running action, if any.
    pub const fn current_action(&self) -> Option<&ActionInstance> {
        match &self.current_action {
            Some(running) => Some(&running.instance),
            None => None,
        }
    }

    /// Whether this agent has no action currently running.
    pub const fn is_idle(&self) -> bool {
        self.current_action.is_none()
    }

    /// Pop the highest-priority eligible plan off `agent.plan_queue` and
    /// promote it to `current_action`, returning its start event if any.
    ///
    /// A plan whose `can_start` fails has its `attempted_count` bumped and
    /// is requeued if retries remain, else dropped with a failure event.
    /// `can_start` truth holds only at the moment of this call; a later
    /// world change can still make `step` fail. Expired plans are dropped
    /// silently, before retry bookkeeping is touched.
    pub fn promote_next_plan(
        &mut self,
        agent: &mut Agent,
        target: Option<&Agent>,
        ctx: &mut ActionContext<'_>,
    ) -> Option<Event> {
        if self.current_action.is_some() {
            return None;
        }

        loop {
            let index = highest_priority_index(&agent.plan_queue)?;
            let plan = &agent.plan_queue[index];

            if plan.is_expired(ctx.clock) {
                agent.plan_queue.remove(index);
                continue;
            }

            let Some(kind) = ActionKind::by_name(&plan.action_name) else {
                agent.plan_queue.remove(index);
                continue;
            };

            let (ok, reason) = kind.can_start(agent, target, ctx.world);
            if !ok {
                let mut plan = agent.plan_queue.remove(index)?;
                plan.attempted_count = plan.attempted_count.saturating_add(1);
                if plan.retries_exhausted() {
                    return Some(failure_event(agent, &plan.action_name, &reason, ctx.clock));
                }
                agent.plan_queue.push_back(plan);
                continue;
            }

            let plan = agent.plan_queue.remove(index)?;
            let Some((instance, event)) = kind.start(agent, target, ctx) else {
                // Not actually schedulable (e.g. a chunk primitive slipped
                // into the queue); drop it rather than loop forever.
                continue;
            };
            self.current_action = Some(RunningAction { instance, capability: kind.capability() });
            return event;
        }
    }

    /// Drive the running action one tick forward. Clears `current_action`
    /// and records its cooldown the moment the result is terminal.
    pub fn advance(&mut self, agent: &mut Agent, target: Option<&mut Agent>, ctx: &mut ActionContext<'_>) -> ActionResultRecord {
        let Some(running) = &mut self.current_action else {
            return ActionResultRecord::terminal(ActionStatus::Completed, Vec::new());
        };

        let result = running.instance.step(agent, target, ctx);
        if result.status.is_terminal() {
            if let Some(cooldown_months) = running.capability.cooldown_months {
                let end_month = ctx.clock;
                agent.cooldowns.insert(running.capability.name.clone(), end_month.saturating_add(cooldown_months));
            }
            self.current_action = None;
        }
        result
    }

    /// Install a running action rebuilt from save data (§4.10), leaving it
    /// in `RUNNING` state. Any in-flight LLM task the original instance held
    /// was already discarded by [`ActionInstance::load_save_data`]; the next
    /// `advance` re-dispatches it.
    pub fn restore_current_action(&mut self, instance: ActionInstance) {
        let capability = instance.kind().capability();
        self.current_action = Some(RunningAction { instance, capability });
    }

    /// Force-cancel the running action without calling `finish`, and drop
    /// every queued plan (§4.4 "`preempt`: force-cancel").
    pub fn preempt(&mut self, agent: &mut Agent) {
        self.current_action = None;
        agent.plan_queue.clear();
    }

    /// Replace or extend the plan queue from an LLM decision's plan chain,
    /// recording its rationale and (optionally) short-term goal.
    pub fn load_decide_result_chain(
        &mut self,
        agent: &mut Agent,
        plans: Vec<ActionPlan>,
        thinking: String,
        short_goal: Option<Objective>,
        prepend: bool,
    ) {
        agent.thinking = thinking;
        if let Some(goal) = short_goal {
            agent.short_term_objective = Some(goal);
        }
        if prepend {
            for plan in plans.into_iter().rev() {
                agent.plan_queue.push_front(plan);
            }
        } else {
            agent.plan_queue.extend(plans);
        }
    }

    /// Drop every queued plan without touching the running action.
    pub fn clear_plans(&self, agent: &mut Agent) {
        agent.plan_queue.clear();
    }
}

fn highest_priority_index(queue: &std::collections::VecDeque<ActionPlan>) -> Option<usize> {
    queue
        .iter()
        .enumerate()
        .max_by_key(|(_, plan)| plan.priority)
        .map(|(index, _)| index)
}

fn failure_event(agent: &Agent, action_name: &str, reason: &str, clock: u64) -> Event {
    Event {
        id: cultivation_types::EventId::new(),
        month_stamp: clock,
        content: format!("{} could not start {action_name}: {reason}", agent.name),
        related_agent_ids: vec![agent.id],
        is_major: false,
        is_story: false,
    }
}
