//! Naive calendar-date helpers: parsing export dates and rendering
//! "time ago" / "every N days" phrases.
//!
//! All arithmetic is wall-clock local with no timezone conversion. Month and
//! year lengths are the fixed 30 and 365 days the dashboard has always shown.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::formatting::pluralize;
use crate::models::EntryMetadata;

/// Placeholder shown when a phrase cannot be derived.
pub const NOT_AVAILABLE: &str = "N/A";

const HOURS_PER_DAY: i64 = 24;
const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("regex is valid"))
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse the leading `YYYY-MM-DD` (or `YYYY-M-D`) token of `text`.
///
/// Anything after the first whitespace (typically `HH:MM:SS`) is ignored.
/// Returns `None` for empty, non-numeric or out-of-range input.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stats_core::time_utils::parse_date;
///
/// assert_eq!(parse_date("2023-06-01 10:15:00"), NaiveDate::from_ymd_opt(2023, 6, 1));
/// assert_eq!(parse_date("2023-6-1"), NaiveDate::from_ymd_opt(2023, 6, 1));
/// assert_eq!(parse_date("NULL"), None);
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let token = text.split_whitespace().next()?;
    let caps = date_pattern().captures(token)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The latest date in `dates`, if any.
pub fn latest_date<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> Option<NaiveDate> {
    dates.into_iter().copied().max()
}

// ── Relative time ─────────────────────────────────────────────────────────────

/// Describe how long before `reference` the instant `at` lies.
///
/// Picks the coarsest unit that is at least one: years (365 days), months
/// (30 days), weeks, days, and finally hours. Anything under a day is shown
/// in hours with a floor of one, so a zero or negative gap reads
/// `"1 hour ago"`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stats_core::time_utils::{format_relative_time, start_of_day};
///
/// let day = start_of_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// assert_eq!(format_relative_time(day, day), "1 hour ago");
/// assert_eq!(format_relative_time(day, day + chrono::Duration::days(400)), "1 year ago");
/// ```
pub fn format_relative_time(at: NaiveDateTime, reference: NaiveDateTime) -> String {
    let hours = (reference - at).num_hours();
    let days = hours / HOURS_PER_DAY;
    let weeks = days / DAYS_PER_WEEK;
    let months = days / DAYS_PER_MONTH;
    let years = days / DAYS_PER_YEAR;

    let (value, unit) = if years > 0 {
        (years, "year")
    } else if months > 0 {
        (months, "month")
    } else if weeks > 0 {
        (weeks, "week")
    } else if days > 0 {
        (days, "day")
    } else {
        (hours.max(1), "hour")
    };

    format!("{} ago", pluralize(value, unit))
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Derive the "last entry" and "frequency" phrases for a set of dates.
///
/// * `last_entry` is the latest date relative to `reference`.
/// * `frequency` is the mean gap between consecutive sorted dates, shown in
///   whole hours below one day and whole days otherwise. It stays `"N/A"`
///   with fewer than two dates or when every date is the same day.
pub fn calculate_metadata(dates: &[NaiveDate], reference: NaiveDate) -> EntryMetadata {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();

    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return EntryMetadata {
            last_entry: NOT_AVAILABLE.to_string(),
            frequency: NOT_AVAILABLE.to_string(),
        };
    };

    let last_entry = format_relative_time(start_of_day(last), start_of_day(reference));

    let span_days = (last - first).num_days();
    let frequency = if sorted.len() < 2 || span_days <= 0 {
        NOT_AVAILABLE.to_string()
    } else {
        let avg_days = span_days as f64 / (sorted.len() - 1) as f64;
        if avg_days < 1.0 {
            let hours = ((avg_days * HOURS_PER_DAY as f64).round() as i64).max(1);
            format!("every {}", pluralize(hours, "hour"))
        } else {
            format!("every {}", pluralize(avg_days.round() as i64, "day"))
        }
    };

    EntryMetadata {
        last_entry,
        frequency,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ago(days: i64) -> String {
        let reference = start_of_day(d(2024, 1, 1));
        format_relative_time(reference - Duration::days(days), reference)
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_plain() {
        assert_eq!(parse_date("2023-01-01"), Some(d(2023, 1, 1)));
    }

    #[test]
    fn test_parse_date_ignores_time_of_day() {
        assert_eq!(parse_date("2023-06-01 23:59:59"), Some(d(2023, 6, 1)));
    }

    #[test]
    fn test_parse_date_single_digit_components() {
        assert_eq!(parse_date("2023-6-1"), Some(d(2023, 6, 1)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("NULL"), None);
        assert_eq!(parse_date("2023/01/01"), None);
        assert_eq!(parse_date("20x3-01-01"), None);
        assert_eq!(parse_date("2023-01"), None);
    }

    #[test]
    fn test_parse_date_rejects_out_of_range() {
        assert_eq!(parse_date("2023-13-01"), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }

    #[test]
    fn test_parse_date_round_trips_through_format() {
        for text in ["2020-02-29", "1999-12-31", "2024-01-01", "2023-07-15"] {
            let date = parse_date(text).unwrap();
            assert_eq!(format_date(date), text);
        }
    }

    // ── format_relative_time ─────────────────────────────────────────────────

    #[test]
    fn test_relative_time_zero_elapsed_is_one_hour() {
        assert_eq!(ago(0), "1 hour ago");
    }

    #[test]
    fn test_relative_time_future_is_one_hour() {
        assert_eq!(ago(-3), "1 hour ago");
    }

    #[test]
    fn test_relative_time_hours() {
        let reference = start_of_day(d(2024, 1, 1));
        assert_eq!(
            format_relative_time(reference - Duration::hours(5), reference),
            "5 hours ago"
        );
        assert_eq!(
            format_relative_time(reference - Duration::minutes(90), reference),
            "1 hour ago"
        );
    }

    #[test]
    fn test_relative_time_days() {
        assert_eq!(ago(1), "1 day ago");
        assert_eq!(ago(6), "6 days ago");
    }

    #[test]
    fn test_relative_time_weeks() {
        assert_eq!(ago(7), "1 week ago");
        assert_eq!(ago(29), "4 weeks ago");
    }

    #[test]
    fn test_relative_time_months() {
        assert_eq!(ago(30), "1 month ago");
        assert_eq!(ago(45), "1 month ago");
        assert_eq!(ago(364), "12 months ago");
    }

    #[test]
    fn test_relative_time_years_use_fixed_divisor() {
        assert_eq!(ago(365), "1 year ago");
        assert_eq!(ago(400), "1 year ago");
        assert_eq!(ago(730), "2 years ago");
    }

    // ── calculate_metadata ───────────────────────────────────────────────────

    #[test]
    fn test_metadata_empty() {
        let meta = calculate_metadata(&[], d(2024, 1, 1));
        assert_eq!(meta.last_entry, "N/A");
        assert_eq!(meta.frequency, "N/A");
    }

    #[test]
    fn test_metadata_single_date() {
        let meta = calculate_metadata(&[d(2023, 12, 29)], d(2024, 1, 1));
        assert_eq!(meta.last_entry, "3 days ago");
        assert_eq!(meta.frequency, "N/A");
    }

    #[test]
    fn test_metadata_same_day_has_no_frequency() {
        let meta = calculate_metadata(&[d(2024, 1, 1), d(2024, 1, 1)], d(2024, 1, 1));
        assert_eq!(meta.last_entry, "1 hour ago");
        assert_eq!(meta.frequency, "N/A");
    }

    #[test]
    fn test_metadata_frequency_in_days() {
        // Unsorted on purpose: gaps of 2 and 4 days average to 3.
        let dates = [d(2024, 1, 7), d(2024, 1, 1), d(2024, 1, 3)];
        let meta = calculate_metadata(&dates, d(2024, 1, 7));
        assert_eq!(meta.frequency, "every 3 days");
        assert_eq!(meta.last_entry, "1 hour ago");
    }

    #[test]
    fn test_metadata_frequency_singular_day() {
        let dates = [d(2024, 1, 1), d(2024, 1, 2)];
        let meta = calculate_metadata(&dates, d(2024, 1, 2));
        assert_eq!(meta.frequency, "every 1 day");
    }

    #[test]
    fn test_metadata_frequency_rounds_days() {
        // 5 days over 2 gaps = 2.5 days, rounds half away from zero.
        let dates = [d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 6)];
        let meta = calculate_metadata(&dates, d(2024, 1, 6));
        assert_eq!(meta.frequency, "every 3 days");
    }

    #[test]
    fn test_metadata_frequency_in_hours() {
        // 1 day over 3 gaps = 8 hours.
        let dates = [d(2024, 1, 1), d(2024, 1, 1), d(2024, 1, 1), d(2024, 1, 2)];
        let meta = calculate_metadata(&dates, d(2024, 1, 2));
        assert_eq!(meta.frequency, "every 8 hours");
    }

    #[test]
    fn test_metadata_frequency_hours_floor_at_one() {
        // 24 hours over 59 gaps rounds to 0; the phrase never drops below 1.
        let mut dates = vec![d(2024, 1, 1); 30];
        dates.extend(vec![d(2024, 1, 2); 30]);
        let meta = calculate_metadata(&dates, d(2024, 1, 2));
        assert_eq!(meta.frequency, "every 1 hour");
    }

    #[test]
    fn test_metadata_last_entry_uses_reference() {
        let dates = [d(2023, 1, 1), d(2023, 11, 2)];
        let meta = calculate_metadata(&dates, d(2024, 1, 1));
        assert_eq!(meta.last_entry, "2 months ago");
    }

    // ── latest_date ──────────────────────────────────────────────────────────

    #[test]
    fn test_latest_date() {
        let dates = [d(2023, 5, 1), d(2024, 2, 1), d(2023, 12, 1)];
        assert_eq!(latest_date(&dates), Some(d(2024, 2, 1)));
        assert_eq!(latest_date(&[]), None);
    }
}
