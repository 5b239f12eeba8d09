//! Process-wide action type registry (§4.3 "Action Registry").
//!
//! Built once at startup by iterating [`ActionKind::ALL`]; registration order
//! never affects semantics since lookups are by name through a `BTreeMap`.

use std::collections::BTreeMap;

use super::capability::ActionCapability;
use super::ActionKind;

/// Name-to-capability map for every registered action type.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    by_name: BTreeMap<String, ActionCapability>,
}

impl ActionRegistry {
    /// Build the registry from every known [`ActionKind`].
    #[must_use]
    pub fn build() -> Self {
        let mut by_name = BTreeMap::new();
        for kind in ActionKind::ALL {
            let capability = kind.capability();
            by_name.insert(capability.name.clone(), capability);
        }
        Self { by_name }
    }

    /// Every registered action type, in name order.
    pub fn all(&self) -> impl Iterator<Item = &ActionCapability> {
        self.by_name.values()
    }

    /// Only the types directly selectable by AI decisions, excluding
    /// chunk/helper primitives such as [`ActionKind::MoveToDirection`].
    pub fn actual_only(&self) -> impl Iterator<Item = &ActionCapability> {
        self.by_name.values().filter(|capability| capability.selectable)
    }

    /// Look up a capability record by its registered name.
    pub fn by_name(&self, name: &str) -> Option<&ActionCapability> {
        self.by_name.get(name)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_every_action_kind() {
        let registry = ActionRegistry::build();
        assert_eq!(registry.all().count(), ActionKind::ALL.len());
    }

    #[test]
    fn actual_only_excludes_chunk_primitives() {
        let registry = ActionRegistry::build();
        assert!(registry.by_name("MoveToDirection").is_some());
        assert!(registry.actual_only().all(|cap| cap.name != "MoveToDirection"));
    }

    #[test]
    fn by_name_is_case_sensitive_exact_match() {
        let registry = ActionRegistry::build();
        assert!(registry.by_name("Hunt").is_some());
        assert!(registry.by_name("hunt").is_none());
    }

    #[test]
    fn registration_order_does_not_affect_lookup() {
        let a = ActionRegistry::build();
        let b = ActionRegistry::build();
        assert_eq!(a.all().map(|c| c.name.clone()).collect::<Vec<_>>(), b.all().map(|c| c.name.clone()).collect::<Vec<_>>());
    }
}
