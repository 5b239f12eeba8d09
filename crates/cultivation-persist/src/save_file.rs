//! The save file's on-disk shape (§4.10, §6 "Save file").
//!
//! `{meta:{version, save_time, game_time, language, events_db, event_count},
//! world:{...}, avatars:[...], events:[...], simulator:{...}}`, exactly the
//! object §6 names. Grounded in a prior
//! `emergence-db/src/snapshot_store.rs` snapshot concept, reshaped from a
//! Postgres-backed store into a single JSON document per §6's
//! "Save file" sentence (persistence here means one process's save file,
//! not a shared database).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cultivation_types::{AgentId, Agent, Event, LocationId, Sect, WorldPhenomenon};

/// Current save format version. Bump whenever [`SaveFile`]'s shape changes
/// in a way that breaks reading an older file.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// A complete, self-contained simulation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    /// Load-time metadata, consulted before the rest of the file is read.
    pub meta: SaveMeta,
    /// Every region's mutable state (§4.10: "prosperity, host references").
    /// Static topology (routes, tiles, huntable/harvestable ids) is not
    /// persisted here; it is rebuilt from the same static world-building
    /// step startup uses, then these deltas are overlaid onto it.
    pub world: Vec<RegionSnapshot>,
    /// Every living and historical agent, with in-flight action state.
    pub avatars: Vec<AvatarSnapshot>,
    /// The event log, in recorded order.
    pub events: Vec<Event>,
    /// Clock, sects, and the active world phenomenon.
    pub simulator: SimulatorSnapshot,
}

/// Load-time-consulted metadata (§4.10: "Language tag is stored in
/// metadata... Loading a save whose language tag differs from current
/// triggers a language switch before finalization").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMeta {
    /// The [`SAVE_FORMAT_VERSION`] this file was written with.
    pub version: u32,
    /// Wall-clock time the save was written.
    pub save_time: DateTime<Utc>,
    /// In-world month count at save time.
    pub game_time: u64,
    /// Language tag narration was generated in.
    pub language: String,
    /// Path to a separate events database, if events live outside this
    /// file (§6: "Events may live in a separate file referenced by
    /// `events_db`"). `None` when `events` below is the full log.
    pub events_db: Option<String>,
    /// Number of events in [`SaveFile::events`] (or, when `events_db` is
    /// set, the number that file holds).
    pub event_count: usize,
}

/// A region's mutable state at save time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionSnapshot {
    /// The region this snapshot applies to.
    pub id: LocationId,
    /// Prosperity at save time, for city regions only.
    pub prosperity: Option<u8>,
    /// Host at save time, for cultivate regions only (`Some(None)` would be
    /// ambiguous with "not a cultivate region", so this is `None` for both;
    /// restoring a cultivate region with no host sets it explicitly below).
    pub host: Option<AgentId>,
    /// Whether this region is a cultivate region at all -- needed to tell
    /// "cultivate region with no host" apart from "not a cultivate region".
    pub is_cultivate: bool,
}

/// One agent's full state, plus its in-flight action if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    /// The agent's full data-model state.
    pub agent: Agent,
    /// The running action, if the agent had one (§4.10: "{action_class_name,
    /// params, status, custom_save_data}").
    pub current_action: Option<ActionSnapshot>,
}

/// A running action's save data, in the shape §4.10 names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSnapshot {
    /// The action's registered name (`ActionKind::name()`).
    pub action_class_name: String,
    /// Plan parameters the action was started with. Always empty: this
    /// crate's action contract takes its parameters through `start`, not
    /// through a carried-along params blob, so there is nothing to save
    /// here beyond `custom_save_data`.
    pub params: serde_json::Value,
    /// Always `"running"`: only running actions are ever snapshotted (an
    /// idle agent has no `current_action` to save).
    pub status: String,
    /// The action type's own execution state (§4.2 "Save hooks").
    pub custom_save_data: serde_json::Value,
}

/// Clock, sects, and world phenomenon at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorSnapshot {
    /// Month count at save time.
    pub clock_months: u64,
    /// Every registered sect.
    pub sects: Vec<Sect>,
    /// The active world phenomenon, if any.
    pub phenomenon: Option<WorldPhenomenon>,
}
