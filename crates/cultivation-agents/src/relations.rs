//! Mirrored two-party relation writes.
//!
//! Cross-agent relations are two mirrored entries, each owned by one side
//! (§3 "Ownership"): agent A's `relations` map holds A's view of B, and
//! agent B's own `relations` map holds the mirror. Since the tick loop is
//! single-threaded, no intermediate state is ever observable, but callers
//! must still route every relation change through [`adjust_mutual_affinity`]
//! or [`tag_mutual_relation`] rather than touching one side's map only.

use cultivation_types::{AgentId, Relation};

/// Apply a symmetric affinity delta to both sides of an `a`/`b` relation.
///
/// `a_relations` is agent `a`'s own relations map (keyed by peer); `b_id` is
/// the peer id for the entry being adjusted within it, and vice versa for
/// `b_relations`/`a_id`.
pub fn adjust_mutual_affinity(
    a_relations: &mut std::collections::BTreeMap<AgentId, Relation>,
    b_id: AgentId,
    b_relations: &mut std::collections::BTreeMap<AgentId, Relation>,
    a_id: AgentId,
    delta: i32,
) {
    let a_side = a_relations.entry(b_id).or_default();
    a_side.affinity = a_side.affinity.saturating_add(delta);
    let b_side = b_relations.entry(a_id).or_default();
    b_side.affinity = b_side.affinity.saturating_add(delta);
}

/// Add a tag to both sides of an `a`/`b` relation.
pub fn tag_mutual_relation(
    a_relations: &mut std::collections::BTreeMap<AgentId, Relation>,
    b_id: AgentId,
    b_relations: &mut std::collections::BTreeMap<AgentId, Relation>,
    a_id: AgentId,
    tag: &str,
) {
    a_relations.entry(b_id).or_default().tags.insert(tag.to_owned());
    b_relations.entry(a_id).or_default().tags.insert(tag.to_owned());
}
