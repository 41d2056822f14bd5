//! Per-value event timelines and their rollup up the taxonomy.

use std::collections::{HashMap, HashSet};

use stats_core::models::{Entry, TaxonomyKind, TimelineEntry};

use crate::taxonomy::TaxonomyTree;

/// Events per value name. Each list is in insertion order, not date order.
pub type TimelineMap = HashMap<String, Vec<TimelineEntry>>;

/// Group `entries` into one event list per value, preserving input order.
pub fn get_timeline_distribution(entries: &[Entry]) -> TimelineMap {
    let mut map = TimelineMap::new();
    for entry in entries {
        map.entry(entry.value.clone())
            .or_default()
            .push(TimelineEntry::from(entry));
    }
    map
}

/// Roll `flat` timelines up the `kind` taxonomy.
///
/// Every node of `kind` gets its own events (looked up by node name)
/// followed by the events of its subtree, depth first with children in
/// stored order. Only non-empty unions are stored, keyed by node name.
/// Names in `flat` that the taxonomy does not know are passed through
/// unless a node already produced that key.
pub fn aggregate_timeline_data(
    flat: &TimelineMap,
    taxonomy: &TaxonomyTree,
    kind: TaxonomyKind,
) -> TimelineMap {
    let mut walker = EventRollup::new(flat, taxonomy);
    let mut result = TimelineMap::new();

    for node in taxonomy.nodes().filter(|n| n.taxonomy == kind) {
        let events = walker.collect(&node.id);
        if !events.is_empty() {
            result.insert(node.name.clone(), events);
        }
    }

    for (name, events) in flat {
        if !taxonomy.contains_name(name) {
            result
                .entry(name.clone())
                .or_insert_with(|| events.clone());
        }
    }

    result
}

/// Return a chronologically sorted copy of `events`.
///
/// The sort is stable, so same-day events keep their insertion order.
pub fn sorted_chronologically(events: &[TimelineEntry]) -> Vec<TimelineEntry> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.date);
    sorted
}

/// Depth-first subtree walk with a per-call memo keyed by node id.
struct EventRollup<'a> {
    flat: &'a TimelineMap,
    taxonomy: &'a TaxonomyTree,
    memo: HashMap<String, Vec<TimelineEntry>>,
    visiting: HashSet<String>,
}

impl<'a> EventRollup<'a> {
    fn new(flat: &'a TimelineMap, taxonomy: &'a TaxonomyTree) -> Self {
        Self {
            flat,
            taxonomy,
            memo: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    fn collect(&mut self, id: &str) -> Vec<TimelineEntry> {
        if let Some(hit) = self.memo.get(id) {
            return hit.clone();
        }
        let taxonomy = self.taxonomy;
        let Some(node) = taxonomy.get(id) else {
            return Vec::new();
        };
        // A node already on the current path means a parent cycle.
        if !self.visiting.insert(id.to_string()) {
            return Vec::new();
        }

        let mut events = self.flat.get(&node.name).cloned().unwrap_or_default();
        for child in &node.children {
            events.extend(self.collect(child));
        }

        self.visiting.remove(id);
        self.memo.insert(id.to_string(), events.clone());
        events
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
