//! Taxonomy-aware statistics with progressive disclosure.
//!
//! A node's row counts its own entries plus those of every descendant,
//! matched to flat stats by node name. Roots are built up front; children
//! are built on demand when a row is expanded.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use stats_core::models::{HierarchicalStatEntry, StatEntry, TaxonomyKind, TaxonomyNode};
use stats_core::time_utils::calculate_metadata;

use crate::taxonomy::TaxonomyTree;

/// Rolled-up rows for every root of `kind`, largest count first.
///
/// Roots whose subtree has no entries are left out.
pub fn build_hierarchical_stats(
    flat_stats: &[StatEntry],
    taxonomy: &TaxonomyTree,
    kind: TaxonomyKind,
    reference: NaiveDate,
) -> Vec<HierarchicalStatEntry> {
    let mut rollup = DateRollup::new(flat_stats, taxonomy);
    let rows = taxonomy
        .roots_of(kind)
        .filter_map(|node| rollup.row(node, None, reference))
        .collect();
    sort_by_count(rows)
}

/// Rolled-up rows for the direct children of `parent_id`, largest count first.
///
/// Each child still counts its whole subtree. Unknown ids yield no rows.
pub fn get_child_stats(
    parent_id: &str,
    flat_stats: &[StatEntry],
    taxonomy: &TaxonomyTree,
    reference: NaiveDate,
) -> Vec<HierarchicalStatEntry> {
    let Some(children) = taxonomy.children_of(parent_id) else {
        return Vec::new();
    };
    let mut rollup = DateRollup::new(flat_stats, taxonomy);
    let rows = children
        .filter_map(|node| rollup.row(node, Some(parent_id), reference))
        .collect();
    sort_by_count(rows)
}

/// Flatten the `kind` hierarchy into table order.
///
/// Emits each root row and, whenever a row's id is in `expanded`, splices
/// its child rows right after it, recursively. Depth on each row tells the
/// renderer how far to indent.
pub fn flatten_hierarchy(
    flat_stats: &[StatEntry],
    taxonomy: &TaxonomyTree,
    kind: TaxonomyKind,
    expanded: &HashSet<String>,
    reference: NaiveDate,
) -> Vec<HierarchicalStatEntry> {
    let mut out = Vec::new();
    for row in build_hierarchical_stats(flat_stats, taxonomy, kind, reference) {
        push_expanded(row, flat_stats, taxonomy, expanded, reference, &mut out);
    }
    out
}

// Roots have no parent, so a walk down from them never meets a parent cycle.
fn push_expanded(
    row: HierarchicalStatEntry,
    flat_stats: &[StatEntry],
    taxonomy: &TaxonomyTree,
    expanded: &HashSet<String>,
    reference: NaiveDate,
    out: &mut Vec<HierarchicalStatEntry>,
) {
    let id = row.id.clone();
    out.push(row);

    if !expanded.contains(&id) {
        return;
    }
    for child in get_child_stats(&id, flat_stats, taxonomy, reference) {
        push_expanded(child, flat_stats, taxonomy, expanded, reference, out);
    }
}

fn sort_by_count(mut rows: Vec<HierarchicalStatEntry>) -> Vec<HierarchicalStatEntry> {
    rows.sort_by(|a, b| b.stat.count.cmp(&a.stat.count));
    rows
}

// ── DateRollup ────────────────────────────────────────────────────────────────

/// Collects the dates of a node and all of its descendants.
///
/// Results are memoised per node id for the lifetime of one call.
struct DateRollup<'a> {
    by_name: HashMap<&'a str, &'a [NaiveDate]>,
    taxonomy: &'a TaxonomyTree,
    memo: HashMap<String, Vec<NaiveDate>>,
    visiting: HashSet<String>,
}

impl<'a> DateRollup<'a> {
    fn new(flat_stats: &'a [StatEntry], taxonomy: &'a TaxonomyTree) -> Self {
        let mut by_name = HashMap::new();
        for stat in flat_stats {
            by_name.entry(stat.name.as_str()).or_insert(stat.dates());
        }
        Self {
            by_name,
            taxonomy,
            memo: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    fn row(
        &mut self,
        node: &TaxonomyNode,
        parent_id: Option<&str>,
        reference: NaiveDate,
    ) -> Option<HierarchicalStatEntry> {
        let dates = self.collect(&node.id);
        if dates.is_empty() {
            return None;
        }
        let meta = calculate_metadata(&dates, reference);
        Some(HierarchicalStatEntry {
            stat: StatEntry {
                name: node.name.clone(),
                count: dates.len(),
                last_entry: meta.last_entry,
                frequency: meta.frequency,
                raw_dates: Some(dates),
            },
            id: node.id.clone(),
            depth: node.depth,
            has_children: node.has_children(),
            parent_id: parent_id.map(str::to_string),
        })
    }

    fn collect(&mut self, id: &str) -> Vec<NaiveDate> {
        if let Some(hit) = self.memo.get(id) {
            return hit.clone();
        }
        let taxonomy = self.taxonomy;
        let Some(node) = taxonomy.get(id) else {
            return Vec::new();
        };
        if !self.visiting.insert(id.to_string()) {
            return Vec::new();
        }

        let mut dates = self
            .by_name
            .get(node.name.as_str())
            .map(|d| d.to_vec())
            .unwrap_or_default();
        for child in &node.children {
            dates.extend(self.collect(child));
        }

        self.visiting.remove(id);
        self.memo.insert(id.to_string(), dates.clone());
        dates
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
