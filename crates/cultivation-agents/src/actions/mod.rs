//! Action catalog and unified instance dispatch (§4.2, §4.3).
//!
//! [`ActionKind`] is the process-wide catalog of action types, each with a
//! static [`ActionCapability`] looked up through [`ActionRegistry`].
//! [`ActionInstance`] wraps whichever state struct a running action actually
//! needs, giving the runtime one enum to `step`/`finish` regardless of which
//! action type promoted it, mirroring a prior single `Action` enum in
//! `emergence-agents/src/actions/mod.rs` that matches over per-type payloads
//! rather than using a trait object.

pub mod capability;
pub mod context;
pub mod duration;
pub mod escape;
pub mod hunt;
pub mod movement;
pub mod mutual;
pub mod registry;
pub mod retreat;

use cultivation_types::{ActionResultRecord, ActionStatus, Agent, Event};

use capability::ActionCapability;
use context::ActionContext;

/// Every action type the simulator knows about, including the
/// [`Self::MoveToDirection`] chunk primitive kept in the registry for
/// documentation purposes even though it is never directly promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// Timed action: gather resources at the current location.
    Hunt,
    /// Timed action: closed-door cultivation toward a breakthrough.
    Retreat,
    /// Instant action: step one tile away from a target each turn.
    MoveAwayFromAvatar,
    /// Chunk primitive underlying the other movement actions.
    MoveToDirection,
    /// Instant action: flee a target, with a chance of failure.
    Escape,
    /// Mutual action: a hostile confrontation with a target.
    Attack,
    /// Mutual action: a friendly exchange with a target.
    Conversation,
}

impl ActionKind {
    /// Every action kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Hunt,
        Self::Retreat,
        Self::MoveAwayFromAvatar,
        Self::MoveToDirection,
        Self::Escape,
        Self::Attack,
        Self::Conversation,
    ];

    /// Registered action name, as it appears in an [`cultivation_types::ActionPlan`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hunt => "Hunt",
            Self::Retreat => "Retreat",
            Self::MoveAwayFromAvatar => "MoveAwayFromAvatar",
            Self::MoveToDirection => "MoveToDirection",
            Self::Escape => "Escape",
            Self::Attack => "Attack",
            Self::Conversation => "Conversation",
        }
    }

    /// Look a kind up by its registered name.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether this kind needs a target agent to `can_start`/`start`.
    pub const fn requires_target(self) -> bool {
        matches!(self, Self::MoveAwayFromAvatar | Self::Escape | Self::Attack | Self::Conversation)
    }

    /// Static capability record for this kind (§4.3 registry).
    pub fn capability(self) -> ActionCapability {
        match self {
            Self::Hunt => ActionCapability {
                name: self.name().to_owned(),
                is_major: false,
                allow_gathering: false,
                allow_world_events: true,
                selectable: true,
                cooldown_months: None,
            },
            Self::Retreat => ActionCapability {
                name: self.name().to_owned(),
                is_major: true,
                allow_gathering: false,
                allow_world_events: false,
                selectable: true,
                cooldown_months: Some(6),
            },
            Self::MoveAwayFromAvatar => ActionCapability {
                name: self.name().to_owned(),
                is_major: false,
                allow_gathering: false,
                allow_world_events: true,
                selectable: true,
                cooldown_months: None,
            },
            Self::MoveToDirection => ActionCapability {
                name: self.name().to_owned(),
                is_major: false,
                allow_gathering: false,
                allow_world_events: false,
                selectable: false,
                cooldown_months: None,
            },
            Self::Escape => ActionCapability {
                name: self.name().to_owned(),
                is_major: false,
                allow_gathering: false,
                allow_world_events: false,
                selectable: true,
                cooldown_months: None,
            },
            Self::Attack => ActionCapability {
                name: self.name().to_owned(),
                is_major: true,
                allow_gathering: false,
                allow_world_events: false,
                selectable: true,
                cooldown_months: None,
            },
            Self::Conversation => ActionCapability {
                name: self.name().to_owned(),
                is_major: false,
                allow_gathering: true,
                allow_world_events: true,
                selectable: true,
                cooldown_months: Some(1),
            },
        }
    }

    /// Pure precondition check (§4.2 "`can_start`: pure, no mutation").
    pub fn can_start(self, agent: &Agent, target: Option<&Agent>, world: &cultivation_world::WorldMap) -> (bool, String) {
        match self {
            Self::Hunt => hunt::can_start(agent, world),
            Self::Retreat => retreat::can_start(agent),
            Self::MoveAwayFromAvatar | Self::MoveToDirection => (true, String::new()),
            Self::Escape => match target {
                Some(target) => escape::can_start(agent, target.id),
                None => (false, String::from("escape requires a target")),
            },
            Self::Attack | Self::Conversation => mutual::can_start(agent, target),
        }
    }

    /// One-shot side effect producing the running instance and an optional
    /// start event (§4.2 "`start`: one-shot side effect").
    ///
    /// Returns `None` for [`Self::MoveToDirection`]: it is a chunk
    /// primitive, never schedulable as a plan in its own right.
    pub fn start(self, agent: &Agent, target: Option<&Agent>, ctx: &mut ActionContext<'_>) -> Option<(ActionInstance, Option<Event>)> {
        match self {
            Self::Hunt => Some((ActionInstance::Hunt(hunt::start(agent, ctx)), None)),
            Self::Retreat => Some((ActionInstance::Retreat(retreat::start(agent, ctx)), None)),
            Self::MoveAwayFromAvatar => {
                let target_id = target.map_or(agent.id, |target| target.id);
                Some((ActionInstance::MoveAwayFromAvatar(movement::MoveAwayFromAvatarState { target: target_id }), None))
            }
            Self::MoveToDirection => None,
            Self::Escape => {
                let target_id = target.map_or(agent.id, |target| target.id);
                Some((ActionInstance::Escape(escape::EscapeState { target: target_id }), None))
            }
            Self::Attack => {
                let target = target?;
                let (state, event) = mutual::start(mutual::MutualKind::Attack, agent, target, ctx.clock);
                Some((ActionInstance::Mutual(state), event))
            }
            Self::Conversation => {
                let target = target?;
                let (state, event) = mutual::start(mutual::MutualKind::Conversation, agent, target, ctx.clock);
                Some((ActionInstance::Mutual(state), event))
            }
        }
    }
}

/// Running state for an action that has been started, unified so the
/// runtime can drive any action type through one `step`/`finish` pair.
pub enum ActionInstance {
    /// A running `Hunt`.
    Hunt(hunt::HuntState),
    /// A running `Retreat`.
    Retreat(retreat::RetreatState),
    /// A running `MoveAwayFromAvatar`.
    MoveAwayFromAvatar(movement::MoveAwayFromAvatarState),
    /// A running `Escape`.
    Escape(escape::EscapeState),
    /// A running `Attack` or `Conversation`.
    Mutual(mutual::MutualState),
}

impl ActionInstance {
    /// The action kind this instance is an execution of.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Hunt(_) => ActionKind::Hunt,
            Self::Retreat(_) => ActionKind::Retreat,
            Self::MoveAwayFromAvatar(_) => ActionKind::MoveAwayFromAvatar,
            Self::Escape(_) => ActionKind::Escape,
            Self::Mutual(state) => match state.kind {
                mutual::MutualKind::Attack => ActionKind::Attack,
                mutual::MutualKind::Conversation => ActionKind::Conversation,
            },
        }
    }

    /// The other agent this instance is running against, if any.
    ///
    /// The tick engine uses this to know which agent to borrow as `target`
    /// before calling [`Self::step`].
    pub const fn target_id(&self) -> Option<cultivation_types::AgentId> {
        match self {
            Self::MoveAwayFromAvatar(state) => Some(state.target),
            Self::Escape(state) => Some(state.target),
            Self::Mutual(state) => Some(state.target),
            Self::Hunt(_) | Self::Retreat(_) => None,
        }
    }

    /// Execution state in the shape a save file stores under an agent's
    /// `current_action.custom_save_data` (§4.10): only what `load_save_data`
    /// needs to rebuild an equivalent instance, never the in-flight LLM
    /// handle of a running [`mutual::MutualState`].
    #[must_use]
    pub fn get_save_data(&self) -> serde_json::Value {
        match self {
            Self::Hunt(state) => serde_json::json!({
                "start_month": state.start_month,
                "duration_months": state.duration_months,
                "accumulated": state.accumulated,
            }),
            Self::Retreat(state) => serde_json::json!({
                "start_month": state.start_month,
                "duration_months": state.duration_months,
            }),
            Self::MoveAwayFromAvatar(state) => serde_json::json!({ "target": state.target }),
            Self::Escape(state) => serde_json::json!({ "target": state.target }),
            Self::Mutual(state) => serde_json::json!({
                "kind": match state.kind {
                    mutual::MutualKind::Attack => "attack",
                    mutual::MutualKind::Conversation => "conversation",
                },
                "target": state.target,
                "start_month": state.start_month,
            }),
        }
    }

    /// Rebuild an instance of `kind` from [`Self::get_save_data`]'s output.
    /// Returns `None` if the data doesn't match the shape `kind` expects.
    #[must_use]
    pub fn load_save_data(kind: ActionKind, data: &serde_json::Value) -> Option<Self> {
        match kind {
            ActionKind::Hunt => Some(Self::Hunt(hunt::HuntState {
                start_month: data.get("start_month")?.as_u64()?,
                duration_months: data.get("duration_months")?.as_u64()?,
                accumulated: data.get("accumulated")?.as_u64()?,
            })),
            ActionKind::Retreat => Some(Self::Retreat(retreat::RetreatState {
                start_month: data.get("start_month")?.as_u64()?,
                duration_months: data.get("duration_months")?.as_u64()?,
            })),
            ActionKind::MoveAwayFromAvatar => {
                let target = serde_json::from_value(data.get("target")?.clone()).ok()?;
                Some(Self::MoveAwayFromAvatar(movement::MoveAwayFromAvatarState { target }))
            }
            ActionKind::Escape => {
                let target = serde_json::from_value(data.get("target")?.clone()).ok()?;
                Some(Self::Escape(escape::EscapeState { target }))
            }
            ActionKind::Attack | ActionKind::Conversation => {
                let target = serde_json::from_value(data.get("target")?.clone()).ok()?;
                let start_month = data.get("start_month")?.as_u64()?;
                let mutual_kind =
                    if matches!(kind, ActionKind::Attack) { mutual::MutualKind::Attack } else { mutual::MutualKind::Conversation };
                Some(Self::Mutual(mutual::MutualState::restored(mutual_kind, target, start_month)))
            }
            ActionKind::MoveToDirection => None,
        }
    }

    /// Re-entrant per-tick advance (§4.2 "`step`: re-entrant per tick").
    ///
    /// For Timed and Instant (non-mutual) variants, a transition into a
    /// terminal status immediately folds in that variant's `finish` events
    /// in the same call, so the runtime never has to remember "did I
    /// already finish this one" across ticks; mutual variants already
    /// return their terminal events directly from their own `step`.
    pub fn step(&mut self, agent: &mut Agent, target: Option<&mut Agent>, ctx: &mut ActionContext<'_>) -> ActionResultRecord {
        match self {
            Self::Hunt(state) => {
                let status = state.step(ctx);
                if status.is_terminal() {
                    let events = state.finish(agent, ctx.clock);
                    ActionResultRecord::terminal(status, events)
                } else {
                    ActionResultRecord::running()
                }
            }
            Self::Retreat(state) => {
                let status = state.step(ctx.clock);
                if status.is_terminal() {
                    let events = state.finish(agent, ctx.clock, ctx);
                    ActionResultRecord::terminal(status, events)
                } else {
                    ActionResultRecord::running()
                }
            }
            Self::MoveAwayFromAvatar(state) => {
                let target_position = target.map_or(agent.position, |target| target.position);
                let status = state.step(agent, target_position, ctx);
                debug_assert_eq!(status, ActionStatus::Completed);
                ActionResultRecord::terminal(status, vec![movement::arrival_event(agent, ctx.clock)])
            }
            Self::Escape(state) => state.step(agent, ctx.clock, ctx),
            Self::Mutual(state) => match target {
                Some(target) => state.step(agent, target, ctx),
                None => ActionResultRecord::terminal(ActionStatus::Cancelled, Vec::new()),
            },
        }
    }

    /// Cooldown-decorator bookkeeping key (§4.2 "Cooldown decorator").
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }
}
