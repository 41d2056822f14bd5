//! Text and JSON rendering of a [`DashboardReport`].

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use stats_core::formatting::{format_count, share_percent, truncate_name};
use stats_core::models::{HierarchicalStatEntry, StatEntry, TaxonomyKind};
use stats_core::time_utils::format_date;
use stats_data::analysis::DashboardReport;
use stats_data::timeline::{sorted_chronologically, TimelineMap};

const RULE_WIDTH: usize = 88;
const NAME_WIDTH: usize = 45;
const INDENT: &str = "  ";

// ── Flat view ─────────────────────────────────────────────────────────────────

/// One table per entry list plus a summary, as the dashboard tabs show them.
pub fn render_flat(report: &DashboardReport) -> String {
    let mut out = String::new();
    render_table(&mut out, "CATEGORY STATISTICS", &report.categories);
    render_table(&mut out, "GEO STATISTICS", &report.geos);
    render_table(&mut out, "TEMPLATE STATISTICS", &report.templates);
    render_summary(&mut out, report);
    out
}

fn render_table(out: &mut String, title: &str, stats: &[StatEntry]) {
    let total: usize = stats.iter().map(|s| s.count).sum();

    banner(out, title);
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>8} {:>6} {:<14} {:<16}",
        "Name", "Count", "Share", "Last Entry", "Frequency"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for stat in stats {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:>8} {:>5.1}% {:<14} {:<16}",
            truncate_name(&stat.name, NAME_WIDTH),
            format_count(stat.count),
            share_percent(stat.count, total),
            stat.last_entry,
            stat.frequency
        );
    }
}

fn render_summary(out: &mut String, report: &DashboardReport) {
    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "Total articles: {}", format_count(report.total_articles));
    let _ = writeln!(out, "Unique articles: {}", format_count(report.unique_articles));
    let _ = writeln!(out, "Total unique categories: {}", report.categories.len());
    let _ = writeln!(out, "Total unique geo locations: {}", report.geos.len());
    let _ = writeln!(out, "Total unique templates: {}", report.templates.len());
    if let Some(reference) = report.reference_date {
        let _ = writeln!(out, "Reference date: {}", format_date(reference));
    }
}

// ── Hierarchical view ─────────────────────────────────────────────────────────

/// Indented category and geo trees with the given nodes expanded.
///
/// Falls back to the flat tables when the report carries no taxonomy.
pub fn render_hierarchical(report: &DashboardReport, expanded: &HashSet<String>) -> String {
    let (Some(categories), Some(geos)) = (
        report.expanded_rows(TaxonomyKind::Category, expanded),
        report.expanded_rows(TaxonomyKind::Geo, expanded),
    ) else {
        return render_flat(report);
    };

    let mut out = String::new();
    render_tree(&mut out, "CATEGORY HIERARCHY", &categories, expanded);
    render_tree(&mut out, "GEO HIERARCHY", &geos, expanded);
    render_table(&mut out, "TEMPLATE STATISTICS", &report.templates);
    render_summary(&mut out, report);
    out
}

fn render_tree(
    out: &mut String,
    title: &str,
    rows: &[HierarchicalStatEntry],
    expanded: &HashSet<String>,
) {
    banner(out, title);
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>8} {:<14} {:<16} {}",
        "Name", "Count", "Last Entry", "Frequency", "Id"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:>8} {:<14} {:<16} {}",
            tree_label(row, expanded),
            format_count(row.stat.count),
            row.stat.last_entry,
            row.stat.frequency,
            row.id
        );
    }
}

/// Indentation by depth, a `+`/`-` marker for collapsed/expanded parents.
fn tree_label(row: &HierarchicalStatEntry, expanded: &HashSet<String>) -> String {
    let marker = match (row.has_children, expanded.contains(&row.id)) {
        (false, _) => " ",
        (true, false) => "+",
        (true, true) => "-",
    };
    let indent = INDENT.repeat(row.depth as usize);
    let room = NAME_WIDTH.saturating_sub(indent.len() + 2);
    format!("{}{} {}", indent, marker, truncate_name(&row.stat.name, room))
}

// ── Timeline view ─────────────────────────────────────────────────────────────

/// Event count and date span for every timeline, largest first.
pub fn render_timelines(report: &DashboardReport) -> String {
    let mut out = String::new();
    render_timeline(&mut out, "CATEGORY TIMELINE", &report.category_timeline);
    render_timeline(&mut out, "GEO TIMELINE", &report.geo_timeline);
    render_timeline(&mut out, "TEMPLATE TIMELINE", &report.template_timeline);
    out
}

fn render_timeline(out: &mut String, title: &str, map: &TimelineMap) {
    banner(out, title);
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>8} {:<12} {:<12}",
        "Name", "Events", "First", "Last"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for row in timeline_summaries(map) {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:>8} {:<12} {:<12}",
            truncate_name(&row.name, NAME_WIDTH),
            format_count(row.events),
            row.first,
            row.last
        );
    }
}

/// Compact per-name description of one timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSummary {
    pub name: String,
    pub events: usize,
    pub first: String,
    pub last: String,
}

/// Summaries sorted by event count (descending), then name.
pub fn timeline_summaries(map: &TimelineMap) -> Vec<TimelineSummary> {
    let mut rows: Vec<TimelineSummary> = map
        .iter()
        .filter_map(|(name, events)| {
            let sorted = sorted_chronologically(events);
            let (first, last) = (sorted.first()?, sorted.last()?);
            Some(TimelineSummary {
                name: name.clone(),
                events: sorted.len(),
                first: format_date(first.date),
                last: format_date(last.date),
            })
        })
        .collect();
    rows.sort_by(|a, b| b.events.cmp(&a.events).then_with(|| a.name.cmp(&b.name)));
    rows
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HierarchicalJson<'a> {
    categories: Vec<HierarchicalStatEntry>,
    geos: Vec<HierarchicalStatEntry>,
    templates: &'a [StatEntry],
    total_articles: usize,
    unique_articles: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineJson {
    categories: Vec<TimelineSummary>,
    geos: Vec<TimelineSummary>,
    templates: Vec<TimelineSummary>,
}

/// Pretty JSON for `view`. Unknown views render the full report.
pub fn render_json(
    report: &DashboardReport,
    view: &str,
    expanded: &HashSet<String>,
) -> serde_json::Result<String> {
    match view {
        "hierarchical" => {
            let rows = report
                .expanded_rows(TaxonomyKind::Category, expanded)
                .zip(report.expanded_rows(TaxonomyKind::Geo, expanded));
            match rows {
                Some((categories, geos)) => serde_json::to_string_pretty(&HierarchicalJson {
                    categories,
                    geos,
                    templates: &report.templates,
                    total_articles: report.total_articles,
                    unique_articles: report.unique_articles,
                }),
                None => serde_json::to_string_pretty(report),
            }
        }
        "timeline" => serde_json::to_string_pretty(&TimelineJson {
            categories: timeline_summaries(&report.category_timeline),
            geos: timeline_summaries(&report.geo_timeline),
            templates: timeline_summaries(&report.template_timeline),
        }),
        _ => serde_json::to_string_pretty(report),
    }
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, " {}", title);
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
}

// ── Tests ──────────────────────────────────────────────────────────────────────
