//! Flat per-value statistics: count, last-entry recency and frequency.

use std::collections::HashMap;

use chrono::NaiveDate;
use stats_core::models::{Entry, StatEntry};
use stats_core::time_utils::calculate_metadata;

/// Group `entries` by value and compute one [`StatEntry`] per group.
///
/// Recency is measured against a single reference date shared by every
/// group: the latest date in the whole entry list. Results are sorted by
/// count, descending; equal counts keep first-encounter order.
pub fn calculate_stats(entries: &[Entry]) -> Vec<StatEntry> {
    let Some(reference) = entries.iter().map(|e| e.date).max() else {
        return Vec::new();
    };
    calculate_stats_with_reference(entries, reference)
}

/// Same as [`calculate_stats`] with an explicit reference date.
pub fn calculate_stats_with_reference(entries: &[Entry], reference: NaiveDate) -> Vec<StatEntry> {
    let groups = group_dates(entries);

    let mut stats: Vec<StatEntry> = groups
        .into_iter()
        .map(|(name, dates)| {
            let meta = calculate_metadata(&dates, reference);
            StatEntry {
                name: name.to_string(),
                count: dates.len(),
                last_entry: meta.last_entry,
                frequency: meta.frequency,
                raw_dates: Some(dates),
            }
        })
        .collect();

    // `sort_by` is stable, which keeps encounter order among equal counts.
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// Sum of `count` across `stats`.
pub fn total_count(stats: &[StatEntry]) -> usize {
    stats.iter().map(|s| s.count).sum()
}

/// Dates per value, in first-encounter order of the values.
fn group_dates(entries: &[Entry]) -> Vec<(&str, Vec<NaiveDate>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<NaiveDate>)> = Vec::new();

    for entry in entries {
        let slot = *slots.entry(entry.value.as_str()).or_insert_with(|| {
            groups.push((entry.value.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(entry.date);
    }

    groups
}

// ── Tests ─────────────────────────────────────────────────────────────────────
