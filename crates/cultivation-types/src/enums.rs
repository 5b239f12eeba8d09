//! Enumeration types for the cultivation-world simulation.

use serde::{Deserialize, Serialize};

/// Biological sex of an agent, used by reproduction and naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    /// Female.
    Female,
    /// Male.
    Male,
}

/// A coarse cultivation tier, ordered low to high.
///
/// Scaling formulas (retreat success rate, hunt eligibility, gathering
/// teacher selection) key off the ordinal position of this enum, exposed via
/// [`Realm::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Realm {
    /// No cultivation; an ordinary mortal.
    Mortal,
    /// Qi Condensation: first stage of cultivation.
    QiCondensation,
    /// Foundation Establishment.
    FoundationEstablishment,
    /// Golden Core.
    GoldenCore,
    /// Nascent Soul.
    NascentSoul,
    /// Spirit Severing.
    SpiritSevering,
}

impl Realm {
    /// Zero-based ordinal used by numeric scaling formulas.
    #[allow(clippy::missing_const_for_fn)]
    pub fn index(self) -> u32 {
        match self {
            Self::Mortal => 0,
            Self::QiCondensation => 1,
            Self::FoundationEstablishment => 2,
            Self::GoldenCore => 3,
            Self::NascentSoul => 4,
            Self::SpiritSevering => 5,
        }
    }
}

/// A material or currency resource an agent can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Spirit stones, the common currency.
    SpiritStone,
    /// Raw herbs gathered from the wild, used in alchemy.
    Herb,
    /// Beast materials obtained from hunting (pelts, cores, bones).
    BeastMaterial,
    /// Ore mined from a region, refined into weapons and tools.
    Ore,
    /// A completed elixir.
    Elixir,
    /// A written cultivation manual or technique scroll.
    TechniqueManual,
}

/// Origin tag for an agent's short- or long-term objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveOrigin {
    /// Set directly by a user/operator command; never auto-regenerated.
    User,
    /// Generated by an LLM decision; subject to the refresh policy of §4.8.
    Llm,
}

/// Outcome of one `step` invocation on an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Still in progress; call `step` again next tick.
    Running,
    /// Finished successfully; `finish` will be invoked once.
    Completed,
    /// Finished unsuccessfully; `finish` will be invoked once.
    Failed,
    /// Cancelled by an external preemption; `finish` is never invoked.
    Cancelled,
    /// Interrupted mid-flight by world state (e.g. target died); `finish` is
    /// invoked once.
    Interrupted,
}

impl ActionStatus {
    /// Whether this status ends the action's lifetime on the agent.
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// The essence element a cultivate region is typed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    /// Metal-aspected qi.
    Metal,
    /// Wood-aspected qi.
    Wood,
    /// Water-aspected qi.
    Water,
    /// Fire-aspected qi.
    Fire,
    /// Earth-aspected qi.
    Earth,
}
