//! Top-level pipeline: article and taxonomy text in, dashboard report out.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use stats_core::models::{Entry, HierarchicalStatEntry, StatEntry, TaxonomyKind};
use tracing::debug;

use crate::aggregator::{calculate_stats, calculate_stats_with_reference};
use crate::hierarchy::{build_hierarchical_stats, flatten_hierarchy};
use crate::reader::{parse_articles, unique_article_count, ParsedExport};
use crate::taxonomy::{parse_taxonomy_tree, TaxonomyTree};
use crate::timeline::{aggregate_timeline_data, get_timeline_distribution, TimelineMap};

// ── Options ───────────────────────────────────────────────────────────────────

/// Caller-controlled knobs for [`analyze_export`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Keep only entries at least as recent as the N-th newest entry date.
    /// `None` or `Some(0)` keeps everything.
    pub last_entries: Option<usize>,
    /// Reference for "time ago" phrases. Defaults to the newest date of each
    /// entry list.
    pub reference_date: Option<NaiveDate>,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Everything the dashboard needs from one export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub categories: Vec<StatEntry>,
    pub geos: Vec<StatEntry>,
    pub templates: Vec<StatEntry>,
    /// Data rows in the (filtered) export, without title deduplication.
    pub total_articles: usize,
    /// Distinct article titles in the (filtered) export.
    pub unique_articles: usize,
    /// `None` when no usable taxonomy was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_categories: Option<Vec<HierarchicalStatEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_geos: Option<Vec<HierarchicalStatEntry>>,
    #[serde(skip)]
    pub category_timeline: TimelineMap,
    #[serde(skip)]
    pub geo_timeline: TimelineMap,
    #[serde(skip)]
    pub template_timeline: TimelineMap,
    /// Newest entry date across all lists, or the caller's override.
    pub reference_date: Option<NaiveDate>,
    #[serde(skip)]
    pub taxonomy: Option<TaxonomyTree>,
    #[serde(skip)]
    reference_override: Option<NaiveDate>,
}

impl DashboardReport {
    /// Flat stats for one taxonomy.
    pub fn stats_for(&self, kind: TaxonomyKind) -> &[StatEntry] {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Geo => &self.geos,
        }
    }

    /// Hierarchical table rows for `kind` with the given nodes expanded.
    ///
    /// Returns `None` when the report was built without a taxonomy.
    pub fn expanded_rows(
        &self,
        kind: TaxonomyKind,
        expanded: &HashSet<String>,
    ) -> Option<Vec<HierarchicalStatEntry>> {
        let taxonomy = self.taxonomy.as_ref()?;
        let stats = self.stats_for(kind);
        let Some(reference) = self.reference_override.or_else(|| latest_stat_date(stats)) else {
            return Some(Vec::new());
        };
        Some(flatten_hierarchy(stats, taxonomy, kind, expanded, reference))
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the full pipeline over the two source texts.
///
/// 1. Parse the article export (and the taxonomy, when given).
/// 2. Apply the "last N entries" filter.
/// 3. Compute flat stats and timelines per entry list.
/// 4. Roll categories and geos up the taxonomy when it has any nodes.
///
/// Never fails: malformed rows are dropped and an unusable taxonomy simply
/// disables the hierarchical sections.
pub fn analyze_export(
    articles_text: &str,
    taxonomy_text: Option<&str>,
    options: &AnalysisOptions,
) -> DashboardReport {
    let parse_start = std::time::Instant::now();
    let mut export = parse_articles(articles_text);
    let taxonomy = taxonomy_text
        .map(parse_taxonomy_tree)
        .filter(|tree| !tree.is_empty());
    debug!(
        "Parsed sources in {:.3}s (taxonomy: {})",
        parse_start.elapsed().as_secs_f64(),
        taxonomy.as_ref().map_or(0, TaxonomyTree::len)
    );

    if let Some(n) = options.last_entries.filter(|&n| n > 0) {
        export = filter_last_entries(&export, n);
    }

    let stats_start = std::time::Instant::now();
    let stats = |entries: &[Entry]| match options.reference_date {
        Some(reference) => calculate_stats_with_reference(entries, reference),
        None => calculate_stats(entries),
    };
    let categories = stats(&export.categories);
    let geos = stats(&export.geos);
    let templates = stats(&export.templates);

    let mut category_timeline = get_timeline_distribution(&export.categories);
    let mut geo_timeline = get_timeline_distribution(&export.geos);
    let template_timeline = get_timeline_distribution(&export.templates);

    let mut hierarchical_categories = None;
    let mut hierarchical_geos = None;
    if let Some(tree) = &taxonomy {
        let rollup = |stats: &[StatEntry], kind: TaxonomyKind| {
            options
                .reference_date
                .or_else(|| latest_stat_date(stats))
                .map(|reference| build_hierarchical_stats(stats, tree, kind, reference))
                .unwrap_or_default()
        };
        hierarchical_categories = Some(rollup(&categories, TaxonomyKind::Category));
        hierarchical_geos = Some(rollup(&geos, TaxonomyKind::Geo));
        category_timeline = aggregate_timeline_data(&category_timeline, tree, TaxonomyKind::Category);
        geo_timeline = aggregate_timeline_data(&geo_timeline, tree, TaxonomyKind::Geo);
    }
    debug!(
        "Aggregated {} categories, {} geos, {} templates in {:.3}s",
        categories.len(),
        geos.len(),
        templates.len(),
        stats_start.elapsed().as_secs_f64()
    );

    DashboardReport {
        categories,
        geos,
        templates,
        total_articles: export.total_articles,
        unique_articles: unique_article_count(&export.articles),
        hierarchical_categories,
        hierarchical_geos,
        category_timeline,
        geo_timeline,
        template_timeline,
        reference_date: options.reference_date.or_else(|| export.latest_date()),
        taxonomy,
        reference_override: options.reference_date,
    }
}

/// Keep only entries and articles dated on or after the `n`-th newest date.
///
/// The cutoff is taken from the category, geo and template dates pooled
/// together, so one article can occupy up to three of the `n` slots. The
/// unique-article count of the result is deduplicated by title and may
/// therefore be well below `n`. Every entry on the cutoff day is kept.
///
/// `total_articles` keeps its raw-row meaning: only dated rows older than
/// the cutoff are subtracted, whether or not they carry a template.
pub fn filter_last_entries(export: &ParsedExport, n: usize) -> ParsedExport {
    let mut dates: Vec<NaiveDate> = export.all_entries().map(|e| e.date).collect();
    if n == 0 || dates.is_empty() {
        return export.clone();
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));
    let cutoff = dates[n.min(dates.len()) - 1];

    let keep = |entries: &[Entry]| -> Vec<Entry> {
        entries.iter().filter(|e| e.date >= cutoff).cloned().collect()
    };
    let articles: Vec<_> = export
        .articles
        .iter()
        .filter(|a| a.date >= cutoff)
        .cloned()
        .collect();
    let row_dates: Vec<_> = export
        .row_dates
        .iter()
        .copied()
        .filter(|date| *date >= cutoff)
        .collect();
    // Rows without a usable date were never subject to the cutoff.
    let dropped_rows = export.row_dates.len() - row_dates.len();

    ParsedExport {
        categories: keep(&export.categories),
        geos: keep(&export.geos),
        templates: keep(&export.templates),
        articles,
        total_articles: export.total_articles - dropped_rows,
        row_dates,
    }
}

fn latest_stat_date(stats: &[StatEntry]) -> Option<NaiveDate> {
    stats.iter().flat_map(|s| s.dates().iter().copied()).max()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
