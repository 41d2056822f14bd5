/// Render `count unit`, appending `s` to the unit unless `count` is exactly 1.
///
/// # Examples
///
/// ```
/// use stats_core::formatting::pluralize;
///
/// assert_eq!(pluralize(1, "day"), "1 day");
/// assert_eq!(pluralize(3, "week"), "3 weeks");
/// assert_eq!(pluralize(0, "hour"), "0 hours");
/// ```
pub fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Format an entry count with thousands separators.
///
/// # Examples
///
/// ```
/// use stats_core::formatting::format_count;
///
/// assert_eq!(format_count(7), "7");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Shorten `name` to at most `max_chars` characters, ending in `...` when cut.
///
/// Counts characters, not bytes, so accented category names are never split
/// mid code point.
///
/// # Examples
///
/// ```
/// use stats_core::formatting::truncate_name;
///
/// assert_eq!(truncate_name("Sport", 10), "Sport");
/// assert_eq!(truncate_name("Cronaca nazionale", 10), "Cronaca...");
/// ```
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = name.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Calculate `(part / whole) * 100`, rounded to one decimal place.
///
/// Returns `0.0` if `whole` is zero.
pub fn share_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
