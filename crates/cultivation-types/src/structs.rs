//! Core entity structs for the cultivation-world simulation.
//!
//! Agent identity and mutable runtime state are kept as one [`Agent`] record
//! (the source treats these as a single object); the *currently running*
//! action instance is deliberately not part of this struct -- it owns a
//! capability record and possibly a live async handle, neither of which is
//! plain, serializable data, so it is tracked alongside the agent by
//! `cultivation-agents::runtime` instead.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{ActionStatus, Element, ObjectiveOrigin, Realm, Resource, Sex};
use crate::ids::{AgentId, EventId, LocationId, RouteId, SectId};

/// Maximum number of event ids retained in an agent's own ring buffer before
/// the oldest entries are dropped. The durable log lives in the event store;
/// this buffer is a recency window for quick per-agent lookups.
pub const AGENT_EVENT_RING_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// Immutable personality vector assigned at agent creation.
///
/// Each trait is a [`Decimal`] in the range 0.0 to 1.0. Personality is one of
/// the effect sources merged by the effect cache (§4.11) and never changes
/// over the agent's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Likelihood to explore, try new things, and learn from observation.
    pub curiosity: Decimal,
    /// Preference for collaboration versus solo action.
    pub cooperation: Decimal,
    /// Tendency toward conflict, competition, and dominance.
    pub aggression: Decimal,
    /// Willingness to take uncertain actions.
    pub risk_tolerance: Decimal,
    /// Preference for productive work versus rest or leisure.
    pub industriousness: Decimal,
    /// Desire for interaction versus solitude.
    pub sociability: Decimal,
    /// Tendency toward truthful communication.
    pub honesty: Decimal,
    /// Tendency to remain committed to relationships and obligations.
    pub loyalty: Decimal,
}

// ---------------------------------------------------------------------------
// Effects (§4.11 Effect Merge)
// ---------------------------------------------------------------------------

/// A single contribution from one effect source, merged by
/// `cultivation_agents::effects::merge_effects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectValue {
    /// A numeric modifier; merged additively across sources.
    Number(Decimal),
    /// A boolean flag; merged with logical OR across sources.
    Flag(bool),
    /// A set of tags (e.g. `legal_actions`); merged by set union.
    Tags(BTreeSet<String>),
}

/// A flat key-to-value effect contribution from one source.
pub type EffectMap = BTreeMap<String, EffectValue>;

/// A time-bounded effect applied to an agent (e.g. a phenomenon blessing, a
/// technique buff picked up mid-tick).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    /// Human-readable tag identifying where this effect came from.
    pub source: String,
    /// The effect contribution itself.
    pub effects: EffectMap,
    /// Month this effect became active.
    pub start_month: u64,
    /// How many months the effect remains active for.
    pub duration_months: u64,
}

impl TemporaryEffect {
    /// Whether this effect's `[start, start+duration)` window contains `clock`.
    #[allow(clippy::missing_const_for_fn)]
    pub fn active_at(&self, clock: u64) -> bool {
        clock >= self.start_month && clock < self.start_month.saturating_add(self.duration_months)
    }
}

// ---------------------------------------------------------------------------
// Objectives & nicknames (§4.8)
// ---------------------------------------------------------------------------

/// A short- or long-term goal assigned to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Free-form description of the goal.
    pub text: String,
    /// Whether a user or the LLM set this objective.
    pub origin: ObjectiveOrigin,
    /// Calendar year (per the clock's year decomposition) the objective was set.
    pub created_year: u32,
}

/// An earned nickname, with the narrative reason and the year it was granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nickname {
    /// The nickname text itself.
    pub text: String,
    /// Narrative justification generated alongside the nickname.
    pub reason: String,
    /// Calendar year the nickname was granted.
    pub created_year: u32,
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

/// One side of a mirrored relationship between two agents.
///
/// Relations are always two mirrored entries (§3 "Ownership"); mutating one
/// side without the other is a bug, never a valid intermediate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Relation {
    /// Signed affinity score; sign and magnitude are narrative content, not
    /// contract, but the field itself is part of the relation record.
    pub affinity: i32,
    /// Free-form relationship tags (e.g. "rival", "dao-companion", "enemy").
    pub tags: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Action plan (C3 data; the live ActionInstance lives in cultivation-agents)
// ---------------------------------------------------------------------------

/// A not-yet-promoted action request sitting in an agent's plan queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Name the action is registered under (§4.3).
    pub action_name: String,
    /// Opaque parameter bag, interpreted by the named action type.
    pub params: serde_json::Value,
    /// Higher values are promoted first.
    pub priority: i32,
    /// If set, a plan still queued once `clock > expiry_month` is dropped
    /// without ever being attempted.
    pub expiry_month: Option<u64>,
    /// Maximum number of `can_start` failures tolerated before the plan is
    /// dropped and a failure event synthesized.
    pub max_retries: u32,
    /// Number of `can_start` failures observed so far.
    pub attempted_count: u32,
}

impl ActionPlan {
    /// Whether this plan should be silently dropped without being attempted.
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_expired(&self, clock: u64) -> bool {
        self.expiry_month.is_some_and(|expiry| clock > expiry)
    }

    /// Whether this plan has exhausted its retry budget.
    #[allow(clippy::missing_const_for_fn)]
    pub fn retries_exhausted(&self) -> bool {
        self.attempted_count >= self.max_retries
    }
}

/// The outcome of one `step` invocation (§3 "ActionResult").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResultRecord {
    /// Terminal or in-progress status.
    pub status: ActionStatus,
    /// Events produced by this single `step` call.
    pub events: Vec<Event>,
    /// Optional structured payload (e.g. accumulated materials).
    pub payload: Option<serde_json::Value>,
    /// A plan the action wants enqueued immediately after it finishes.
    pub suggested_next: Option<ActionPlan>,
    /// Whose plan queue `suggested_next` belongs on. `None` means the
    /// acting agent itself (e.g. `Escape`'s self-directed follow-up);
    /// `Some(id)` names the other party (e.g. `Attack`'s resolution builds
    /// a plan for the target who gave feedback, not for the attacker).
    pub suggested_next_owner: Option<AgentId>,
}

impl ActionResultRecord {
    /// Build a `RUNNING` result carrying no events.
    #[allow(clippy::missing_const_for_fn)]
    pub fn running() -> Self {
        Self { status: ActionStatus::Running, events: Vec::new(), payload: None, suggested_next: None, suggested_next_owner: None }
    }

    /// Build a terminal result from a status and an event list.
    #[allow(clippy::missing_const_for_fn)]
    pub fn terminal(status: ActionStatus, events: Vec<Event>) -> Self {
        Self { status, events, payload: None, suggested_next: None, suggested_next_owner: None }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A simulated character: identity, demographics, cultivation progress,
/// position, inventory, social links, objectives, and scheduling state.
///
/// See §3 "Agent" for the authoritative invariants:
/// - at most one action "running" at any instant (enforced by
///   `cultivation_agents::runtime::AgentRuntime`, which is keyed 1:1 by
///   [`AgentId`] alongside this struct);
/// - `position` is always inside map bounds;
/// - `cached_effects` equals the merge of all declared effect sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identity.
    pub id: AgentId,
    /// Display name, unique among living and historical agents.
    pub name: String,
    /// Biological sex.
    pub sex: Sex,
    /// Age in months since birth.
    pub age_months: u64,
    /// Maximum lifespan in months; crossing this marks the agent dead (§4.7 phase 4).
    pub max_lifespan_months: u64,
    /// Cultivation tier.
    pub realm: Realm,
    /// Level within the current realm.
    pub level: u32,
    /// Accumulated experience within the current level.
    pub experience: u64,
    /// Position on the rectangular grid.
    pub position: (u32, u32),
    /// Equipped weapon, if any (effect source).
    pub weapon: Option<String>,
    /// Equipped auxiliary item, if any (effect source).
    pub auxiliary: Option<String>,
    /// Known technique, if any (effect source).
    pub technique: Option<String>,
    /// Bonded spirit animal, if any (effect source).
    pub spirit_animal: Option<String>,
    /// Held materials and currency.
    pub inventory: BTreeMap<Resource, u64>,
    /// Sect membership, if any.
    pub sect: Option<SectId>,
    /// Mirrored relationship records keyed by peer.
    pub relations: BTreeMap<AgentId, Relation>,
    /// Regions this agent has discovered.
    pub known_regions: BTreeSet<LocationId>,
    /// Current location.
    pub location: LocationId,
    /// Short-term objective, replaced freely by decisions.
    pub short_term_objective: Option<Objective>,
    /// Long-term objective, refreshed per the policy in §4.8.
    pub long_term_objective: Option<Objective>,
    /// Earned nickname, if any.
    pub nickname: Option<Nickname>,
    /// Recency window of this agent's own event ids, capped at
    /// [`AGENT_EVENT_RING_CAPACITY`].
    pub event_ring: VecDeque<EventId>,
    /// Plans not yet promoted to a running action.
    pub plan_queue: VecDeque<ActionPlan>,
    /// Active time-bounded effect contributions.
    pub temporary_effects: Vec<TemporaryEffect>,
    /// Cached merge of all effect sources; recomputed on any source mutation
    /// or once per tick for temporary-effect window expiry.
    pub cached_effects: EffectMap,
    /// Monotonically increasing counter bumped by any mutation to an effect
    /// source; compared against the version the cache was built from.
    pub effects_version: u64,
    /// Free-form rationale text from the agent's last LLM decision.
    pub thinking: String,
    /// Per-action-type cooldown tracking (§4.2 "Cooldown decorator"):
    /// action name to the month its last run ended.
    pub cooldowns: BTreeMap<String, u64>,
    /// Whether this agent is alive.
    pub alive: bool,
    /// Month this agent entered the simulation.
    pub born_at_month: u64,
    /// Month this agent died, if it has.
    pub died_at_month: Option<u64>,
    /// Generation number: 0 for seed agents, `max(parent generations) + 1`
    /// for reproduced agents.
    pub generation: u32,
    /// First parent, if reproduced.
    pub parent_a: Option<AgentId>,
    /// Second parent, if reproduced.
    pub parent_b: Option<AgentId>,
    /// Immutable personality vector.
    pub personality: Personality,
    /// Creation timestamp (wall-clock, for save-file bookkeeping only).
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Push an event id onto the recency ring, dropping the oldest if full.
    pub fn remember_event(&mut self, event_id: EventId) {
        if self.event_ring.len() >= AGENT_EVENT_RING_CAPACITY {
            self.event_ring.pop_front();
        }
        self.event_ring.push_back(event_id);
    }

    /// Bump the effect version counter, invalidating the cached merge.
    pub fn bump_effects_version(&mut self) {
        self.effects_version = self.effects_version.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Event log (C10)
// ---------------------------------------------------------------------------

/// An immutable, append-only log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identity.
    pub id: EventId,
    /// Month this event was produced.
    pub month_stamp: u64,
    /// Natural-language description (already localized by the caller).
    pub content: String,
    /// Agents this event pertains to.
    pub related_agent_ids: Vec<AgentId>,
    /// Whether this event counts toward long-term-memory gates (nickname
    /// eligibility, etc.).
    pub is_major: bool,
    /// Whether this event is narrated prose (vs. a mechanical summary line).
    pub is_story: bool,
}

// ---------------------------------------------------------------------------
// Region & Tile (C2)
// ---------------------------------------------------------------------------

/// The kind-specific data carried by a [`Region`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    /// An ordinary region with huntable/harvestable/mineable resource ids.
    Normal {
        /// Static-data ids of huntable species present here.
        huntable: Vec<u32>,
        /// Static-data ids of harvestable plants present here.
        harvestable: Vec<u32>,
        /// Static-data ids of mineable lodes present here.
        mineable: Vec<u32>,
    },
    /// A region ownable by at most one living agent, typed by an essence
    /// element.
    Cultivate {
        /// Current host, if any. Invariant: either `None` or a living agent
        /// currently located in this region (§3).
        host: Option<AgentId>,
        /// Dominant essence element.
        element: Element,
        /// Qi density, scaling cultivation speed for the host.
        density: u32,
    },
    /// A settlement with a store and a prosperity value.
    City {
        /// Static-data item ids available for purchase.
        store_items: Vec<u32>,
        /// Prosperity in `[0, 100]`.
        prosperity: u8,
    },
    /// A region owned by a sect.
    Sect {
        /// Owning sect.
        sect: SectId,
    },
}

/// A named region of the world map (a node in the route graph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identity.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Kind-specific data.
    pub kind: RegionKind,
}

impl Region {
    /// Clamp a prosperity delta into `[0, 100]`, mutating in place.
    ///
    /// No-op for region kinds other than [`RegionKind::City`].
    pub fn apply_prosperity_delta(&mut self, delta: i16) {
        if let RegionKind::City { prosperity, .. } = &mut self.kind {
            let current = i16::from(*prosperity);
            let updated = current.saturating_add(delta).clamp(0, 100);
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            {
                *prosperity = updated as u8;
            }
        }
    }
}

/// A route edge connecting two regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Stable identity.
    pub id: RouteId,
    /// Origin region.
    pub from: LocationId,
    /// Destination region.
    pub to: LocationId,
    /// Base travel cost in months.
    pub travel_cost_months: u32,
}

/// A single grid cell, belonging to exactly one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Grid x coordinate.
    pub x: u32,
    /// Grid y coordinate.
    pub y: u32,
    /// Owning region.
    pub region: LocationId,
}

// ---------------------------------------------------------------------------
// Sects and phenomena
// ---------------------------------------------------------------------------

/// A social group of agents sharing a cultivation lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sect {
    /// Stable identity.
    pub id: SectId,
    /// Display name.
    pub name: String,
    /// Current membership.
    pub members: BTreeSet<AgentId>,
    /// Dominant essence element, used by gathering selection weighting.
    pub element: Element,
}

/// A world-wide modifier active for a bounded duration (§3 "WorldPhenomenon").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldPhenomenon {
    /// Static-data id of the chosen celestial phenomenon.
    pub phenomenon_id: u32,
    /// Month the phenomenon became active.
    pub start_month: u64,
    /// How many years the phenomenon remains active for.
    pub duration_years: u32,
}

impl WorldPhenomenon {
    /// Whether this phenomenon is still active at `clock`.
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_active_at(&self, clock: u64) -> bool {
        let duration_months = u64::from(self.duration_years).saturating_mul(12);
        clock < self.start_month.saturating_add(duration_months)
    }
}
