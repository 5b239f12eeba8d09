//! Movement actions and their shared single-step primitive (§4.2 "Chunk").
//!
//! [`step_one_tile`] is the chunk primitive: it advances an agent by one grid
//! cell and re-derives `location` from the tile it lands on. Both schedulable
//! movement actions ([`MoveAwayFromAvatarState`], [`MoveToDirectionState`])
//! call it once per `step`; [`MoveToDirectionState`] also doubles as the
//! literal chunk type so the registry (§4.3) has a capability record for it,
//! even though nothing ever promotes it directly.

use cultivation_types::{Agent, ActionStatus, Event, EventId};
use cultivation_world::WorldMap;

use super::context::ActionContext;

/// Move `agent` by one grid cell toward `(dx, dy)` (each clamped to
/// `{-1, 0, 1}`), then resync `location` from the tile landed on.
///
/// No-ops (returns `false`) if the destination is out of bounds or not
/// assigned to any region.
pub fn step_one_tile(agent: &mut Agent, dx: i32, dy: i32, world: &WorldMap) -> bool {
    let dx = dx.clamp(-1, 1);
    let dy = dy.clamp(-1, 1);
    let (x, y) = agent.position;
    let Some(new_x) = x.checked_add_signed(dx) else { return false };
    let Some(new_y) = y.checked_add_signed(dy) else { return false };
    if !world.in_bounds(new_x, new_y) {
        return false;
    }
    let Some(region) = world.region_at(new_x, new_y) else { return false };

    agent.position = (new_x, new_y);
    agent.location = region;
    true
}

fn toward(from: (u32, u32), to: (u32, u32)) -> (i32, i32) {
    let dx = i64::from(to.0) - i64::from(from.0);
    let dy = i64::from(to.1) - i64::from(from.1);
    (signum(dx), signum(dy))
}

fn signum(value: i64) -> i32 {
    match value.cmp(&0) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Execution state for `MoveAwayFromAvatar(target)`: each tick, steps one
/// tile directly away from the target's position at the time of the call.
#[derive(Debug, Clone)]
pub struct MoveAwayFromAvatarState {
    /// Whoever the agent is putting distance between itself and.
    pub target: cultivation_types::AgentId,
}

impl MoveAwayFromAvatarState {
    /// Step one tile directly away from `target_position`.
    pub fn step(&self, agent: &mut Agent, target_position: (u32, u32), ctx: &mut ActionContext<'_>) -> ActionStatus {
        let (toward_dx, toward_dy) = toward(agent.position, target_position);
        let moved = step_one_tile(agent, -toward_dx, -toward_dy, ctx.world);
        if moved {
            ActionStatus::Completed
        } else {
            // Already at a map edge in the fleeing direction; one failed step
            // still counts as having put distance between them this tick.
            ActionStatus::Completed
        }
    }
}

/// Execution state for the chunk primitive `MoveToDirection(dx, dy)`.
/// Never promoted on its own; other actions call [`step_one_tile`] directly.
#[derive(Debug, Clone, Copy)]
pub struct MoveToDirectionState {
    /// Column delta, clamped to `{-1, 0, 1}` by [`step_one_tile`].
    pub dx: i32,
    /// Row delta, clamped to `{-1, 0, 1}` by [`step_one_tile`].
    pub dy: i32,
}

impl MoveToDirectionState {
    /// Step one tile in the `(dx, dy)` direction this was built with.
    pub fn step(&self, agent: &mut Agent, ctx: &mut ActionContext<'_>) -> ActionStatus {
        step_one_tile(agent, self.dx, self.dy, ctx.world);
        ActionStatus::Completed
    }
}

/// Build the completion event for a movement action once it finishes.
pub fn arrival_event(agent: &Agent, clock: u64) -> Event {
    Event {
        id: EventId::new(),
        month_stamp: clock,
        content: format!("{} moved to a new position", agent.name),
        related_agent_ids: vec![agent.id],
        is_major: false,
        is_story: false,
    }
}
