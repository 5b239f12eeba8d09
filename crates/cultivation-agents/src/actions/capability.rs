//! Action class-level declarations (§4.2 "Action class-level declarations").
//!
//! The registry (§4.3) holds one [`ActionCapability`] per action type rather
//! than a trait object, so it stays plain data: trivially cloneable, easy to
//! snapshot in tests, with no `dyn` indirection for something that never
//! needs polymorphic dispatch on its own.

use serde::{Deserialize, Serialize};

/// Static metadata about an action type, independent of any particular
/// instance or agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCapability {
    /// The action type's registered name (matches [`super::ActionKind::name`]).
    pub name: String,
    /// Whether events this action produces default to major.
    pub is_major: bool,
    /// Whether an agent running this action can be drafted into a gathering.
    pub allow_gathering: bool,
    /// Whether random world events can perturb an agent running this action.
    pub allow_world_events: bool,
    /// Whether this action type is directly selectable by AI decisions
    /// ("actual") as opposed to a chunk/helper primitive.
    pub selectable: bool,
    /// Cooldown in months after `finish`, if any (§4.2 "Cooldown decorator").
    pub cooldown_months: Option<u64>,
}
