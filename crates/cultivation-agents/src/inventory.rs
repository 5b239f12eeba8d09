//! Inventory operations over an agent's resource map.
//!
//! Items are owned by their holders (§3); this module provides checked
//! addition and removal so a location-derived windfall or a trade can never
//! silently overflow or underflow an agent's `BTreeMap<Resource, u64>`.

use std::collections::BTreeMap;

use cultivation_types::Resource;

use crate::error::AgentError;

/// Compute the total quantity held across all resource kinds.
///
/// Returns `None` on `u64` overflow.
pub fn total_quantity(inventory: &BTreeMap<Resource, u64>) -> Option<u64> {
    let mut total: u64 = 0;
    for qty in inventory.values() {
        total = total.checked_add(*qty)?;
    }
    Some(total)
}

/// Check whether the inventory holds at least `amount` of `resource`.
pub fn has_resource(inventory: &BTreeMap<Resource, u64>, resource: Resource, amount: u64) -> bool {
    inventory.get(&resource).copied().unwrap_or(0) >= amount
}

/// Add `amount` units of `resource` to the inventory.
///
/// # Errors
///
/// Returns [`AgentError::ArithmeticOverflow`] if the resulting quantity would
/// overflow `u64`.
pub fn add_resource(
    inventory: &mut BTreeMap<Resource, u64>,
    resource: Resource,
    amount: u64,
) -> Result<(), AgentError> {
    let entry = inventory.entry(resource).or_insert(0);
    *entry = entry.checked_add(amount).ok_or_else(|| AgentError::ArithmeticOverflow {
        context: String::from("inventory resource quantity overflow"),
    })?;
    Ok(())
}

/// Remove `amount` units of `resource` from the inventory.
///
/// Removes the key entirely if the remaining quantity reaches zero.
///
/// # Errors
///
/// Returns [`AgentError::InsufficientResource`] if the agent does not hold
/// enough of `resource`.
pub fn remove_resource(
    inventory: &mut BTreeMap<Resource, u64>,
    resource: Resource,
    amount: u64,
) -> Result<(), AgentError> {
    let current = inventory.get(&resource).copied().unwrap_or(0);
    if current < amount {
        return Err(AgentError::InsufficientResource { resource, requested: amount, available: current });
    }

    let remaining = current - amount;
    if remaining == 0 {
        inventory.remove(&resource);
    } else {
        inventory.insert(resource, remaining);
    }
    Ok(())
}

/// Drain all resources from the inventory, returning them as a new map.
///
/// Used when an agent dies and their held materials drop at their location.
pub fn drain_all(inventory: &mut BTreeMap<Resource, u64>) -> BTreeMap<Resource, u64> {
    core::mem::take(inventory)
}
