//! Taxonomy hierarchy export parsing and the read-only [`TaxonomyTree`].
//!
//! The export is comma-delimited with `"`-quoted fields and a header row.
//! Columns: taxonomy(0), term id(1), parent term id(3), name(5), slug(6),
//! depth(7), materialised path(8).

use std::collections::HashMap;

use csv::ReaderBuilder;
use stats_core::models::{TaxonomyKind, TaxonomyNode};
use tracing::{debug, warn};

/// Rows with fewer fields than this are skipped.
pub const MIN_TAXONOMY_FIELDS: usize = 9;

const TAXONOMY_COL: usize = 0;
const TERM_ID_COL: usize = 1;
const PARENT_COL: usize = 3;
const NAME_COL: usize = 5;
const SLUG_COL: usize = 6;
const DEPTH_COL: usize = 7;
const PATH_COL: usize = 8;

// ── TaxonomyTree ──────────────────────────────────────────────────────────────

/// A forest of category and geo nodes.
///
/// Nodes live in an arena in export row order; `index` maps ids to arena
/// slots. Built once by [`TaxonomyTree::from_nodes`] and never mutated after.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTree {
    nodes: Vec<TaxonomyNode>,
    index: HashMap<String, usize>,
    roots: Vec<String>,
    name_to_id: HashMap<String, String>,
}

impl TaxonomyTree {
    /// Link `nodes` into a forest.
    ///
    /// A repeated id replaces the earlier node in place. Each node is then
    /// appended to its parent's `children` in row order; a parent id that
    /// resolves to nothing leaves the node unlinked. Roots are the nodes
    /// without a parent id.
    pub fn from_nodes(nodes: Vec<TaxonomyNode>) -> Self {
        let mut tree = TaxonomyTree::default();

        for node in nodes {
            tree.name_to_id.insert(node.name.clone(), node.id.clone());
            match tree.index.get(&node.id) {
                Some(&slot) => tree.nodes[slot] = node,
                None => {
                    tree.index.insert(node.id.clone(), tree.nodes.len());
                    tree.nodes.push(node);
                }
            }
        }

        let mut dangling = 0usize;
        for i in 0..tree.nodes.len() {
            let Some(parent_id) = tree.nodes[i].parent_id.clone() else {
                tree.roots.push(tree.nodes[i].id.clone());
                continue;
            };
            match tree.index.get(&parent_id) {
                Some(&slot) => {
                    let child_id = tree.nodes[i].id.clone();
                    tree.nodes[slot].children.push(child_id);
                }
                None => dangling += 1,
            }
        }

        if dangling > 0 {
            debug!("{} taxonomy nodes reference a missing parent", dangling);
        }

        tree
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// All nodes in export row order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes.iter()
    }

    /// Root ids in export row order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Root nodes of one taxonomy.
    pub fn roots_of(&self, kind: TaxonomyKind) -> impl Iterator<Item = &TaxonomyNode> {
        self.roots
            .iter()
            .filter_map(|id| self.get(id))
            .filter(move |node| node.taxonomy == kind)
    }

    /// Direct children of `id`, or `None` when `id` is unknown.
    pub fn children_of(&self, id: &str) -> Option<impl Iterator<Item = &TaxonomyNode>> {
        let node = self.get(id)?;
        Some(node.children.iter().filter_map(|child| self.get(child)))
    }

    /// Node id registered for a display name. The last row with a given
    /// name wins, across both taxonomies.
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse the taxonomy export text into a [`TaxonomyTree`].
///
/// Short rows and rows with an unknown taxonomy type are skipped. A parent
/// term id of `0` or `NULL` marks a root.
pub fn parse_taxonomy_tree(text: &str) -> TaxonomyTree {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut nodes = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable taxonomy row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if record.len() < MIN_TAXONOMY_FIELDS {
            skipped += 1;
            continue;
        }

        let field = |col: usize| record[col].trim().trim_matches('"').to_string();

        let Some(kind) = TaxonomyKind::parse(&field(TAXONOMY_COL)) else {
            skipped += 1;
            continue;
        };

        let term_id = field(TERM_ID_COL);
        let parent_term = field(PARENT_COL);
        let parent_id = match parent_term.as_str() {
            "0" | "NULL" | "" => None,
            other => Some(TaxonomyNode::make_id(kind, other)),
        };

        nodes.push(TaxonomyNode {
            id: TaxonomyNode::make_id(kind, &term_id),
            name: field(NAME_COL),
            slug: field(SLUG_COL),
            depth: field(DEPTH_COL).parse().unwrap_or(0),
            parent_id,
            children: Vec::new(),
            taxonomy: kind,
            path: field(PATH_COL),
        });
    }

    let tree = TaxonomyTree::from_nodes(nodes);
    debug!(
        "Parsed taxonomy: {} nodes, {} roots, {} rows skipped",
        tree.len(),
        tree.roots().len(),
        skipped
    );
    tree
}

// ── Tests ─────────────────────────────────────────────────────────────────────
