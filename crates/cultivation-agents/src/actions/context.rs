//! Shared context threaded through every action contract call (§4.2).
//!
//! Bundles the handful of things an action may need beyond the agent it is
//! running on: the world map, the current month, a shared RNG, and the LLM
//! dispatcher for mutual/LLM-backed actions. Grounded in a prior
//! `ValidationContext` shape (`emergence-agents/src/actions/validation.rs`):
//! one plain struct assembled by the caller rather than a trait object.

use std::sync::Arc;

use rand::rngs::StdRng;

use cultivation_world::WorldMap;

/// Everything an action's `can_start`/`start`/`step`/`finish` may read or
/// mutate beyond the agent(s) directly involved.
pub struct ActionContext<'a> {
    /// The world graph and region state.
    pub world: &'a mut WorldMap,
    /// The current simulation month.
    pub clock: u64,
    /// Shared RNG for probabilistic outcomes (retreat success, escape rolls).
    pub rng: &'a mut StdRng,
    /// Bounded-concurrency LLM dispatch gateway, used only by mutual actions.
    ///
    /// Held as an `Arc` rather than a borrow: mutual actions hand it to a
    /// `tokio::spawn`ed task so `step` can return `RUNNING` without awaiting
    /// the call (§4.2 "LLM-backed: `step` must not block").
    pub dispatcher: Arc<cultivation_llm::Dispatcher>,
}
