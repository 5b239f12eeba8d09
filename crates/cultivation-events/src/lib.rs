//! Durable, queryable per-agent event stream with major/minor classification
//! and duplicate suppression (§4 "C10 Event Log").
//!
//! Every agent already carries its own bounded event ring
//! (`Agent::event_ring`, see `cultivation_types::AGENT_EVENT_RING_CAPACITY`);
//! this crate is the process-wide append-only log that outlives any one
//! agent's ring, and the single gate every event passes through before being
//! recorded anywhere. Grounded in the `emergence-db::event_store` pattern
//! batch-insert shape (`EventStore::batch_insert`), reshaped from a
//! `PostgreSQL`-backed store to a single-process, in-memory log: persistence
//! here means one process's save file (§4.10), not a shared database.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;

use cultivation_types::{AgentId, Event};

/// Default capacity of the duplicate-suppression cache.
const DEFAULT_DEDUP_CAPACITY: usize = 4096;

/// Key an event's identity is deduplicated on: `(month_stamp, content hash,
/// sorted related agent ids)` (§9 "LRU duplicate-event suppression").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    month_stamp: u64,
    content_hash: u64,
    related_agent_ids: Vec<AgentId>,
}

fn dedup_key(event: &Event) -> DedupKey {
    let mut related_agent_ids = event.related_agent_ids.clone();
    related_agent_ids.sort_unstable();

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    event.content.hash(&mut hasher);

    DedupKey { month_stamp: event.month_stamp, content_hash: hasher.finish(), related_agent_ids }
}

/// The process-wide event log.
///
/// Holds every event ever recorded, in insertion order, plus a small index
/// from agent to the positions of events mentioning it so per-agent queries
/// don't scan the whole log.
pub struct EventLog {
    events: Vec<Event>,
    by_agent: BTreeMap<AgentId, Vec<usize>>,
    dedup: LruCache<DedupKey, ()>,
}

impl EventLog {
    /// Build an empty log with the default duplicate-suppression window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dedup_capacity(DEFAULT_DEDUP_CAPACITY)
    }

    /// Build an empty log with an explicit duplicate-suppression window
    /// size. A capacity of zero still suppresses exact repeats within the
    /// same call, since the cache always holds at least one entry.
    #[must_use]
    pub fn with_dedup_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self { events: Vec::new(), by_agent: BTreeMap::new(), dedup: LruCache::new(capacity) }
    }

    /// Record `event` unless an event with the same `(month_stamp, content,
    /// sorted related_agent_ids)` key was recorded within the
    /// duplicate-suppression window. Returns whether it was actually kept.
    pub fn record(&mut self, event: Event) -> bool {
        let key = dedup_key(&event);
        if self.dedup.put(key, ()).is_some() {
            return false;
        }

        let index = self.events.len();
        for agent_id in &event.related_agent_ids {
            self.by_agent.entry(*agent_id).or_default().push(index);
        }
        self.events.push(event);
        true
    }

    /// Record a batch of events in order, returning how many were kept
    /// after duplicate suppression.
    pub fn record_batch(&mut self, events: impl IntoIterator<Item = Event>) -> usize {
        events.into_iter().filter(|event| self.record(event.clone())).count()
    }

    /// Every event recorded so far, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Every event mentioning `agent_id`, in insertion order.
    pub fn by_agent(&self, agent_id: AgentId) -> impl Iterator<Item = &Event> {
        self.by_agent.get(&agent_id).into_iter().flatten().filter_map(|&index| self.events.get(index))
    }

    /// Every major event recorded so far, in insertion order.
    pub fn major_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|event| event.is_major)
    }

    /// Total number of events recorded (after duplicate suppression).
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
