//! Article export loading and row parsing.
//!
//! The export is semicolon-delimited with a header row and at least ten
//! columns per row. Fields are split verbatim: the export never quotes.

use std::path::Path;

use csv::ReaderBuilder;
use stats_core::error::{Result, StatsError};
use stats_core::models::{Article, Entry};
use stats_core::time_utils::parse_date;
use tracing::{debug, warn};

/// Rows with fewer fields than this are skipped.
pub const MIN_ARTICLE_FIELDS: usize = 10;

const TITLE_COL: usize = 1;
const DATE_COL: usize = 2;
const TEMPLATE_COL: usize = 3;
const CATEGORY_COL: usize = 6;
const GEO_COL: usize = 8;

const TEMPLATE_PREFIX: &str = "templates/post-";
const TEMPLATE_SUFFIX: &str = ".php";

/// Value the export uses for an unset column.
const NULL_MARKER: &str = "NULL";

// ── ParsedExport ──────────────────────────────────────────────────────────────

/// Everything extracted from one article export.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub categories: Vec<Entry>,
    pub geos: Vec<Entry>,
    pub templates: Vec<Entry>,
    /// One article per valid row that carries a template.
    pub articles: Vec<Article>,
    /// Data rows in the export (header excluded), valid or not, with no
    /// deduplication by title.
    pub total_articles: usize,
    /// Date of every row that parsed, with or without a template.
    pub row_dates: Vec<chrono::NaiveDate>,
}

impl ParsedExport {
    /// Latest entry date across all three entry lists.
    pub fn latest_date(&self) -> Option<chrono::NaiveDate> {
        self.all_entries().map(|e| e.date).max()
    }

    /// Category, geo and template entries chained together.
    pub fn all_entries(&self) -> impl Iterator<Item = &Entry> {
        self.categories
            .iter()
            .chain(self.geos.iter())
            .chain(self.templates.iter())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a whole source file into memory.
pub fn load_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the article export into typed entry lists.
///
/// Rows that are too short or whose date cannot be parsed are dropped as a
/// whole. `NULL` or empty category/geo/template values are treated as absent.
pub fn parse_articles(text: &str) -> ParsedExport {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut export = ParsedExport::default();
    let mut skipped = 0usize;

    for result in reader.records() {
        export.total_articles += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable article row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if record.len() < MIN_ARTICLE_FIELDS {
            skipped += 1;
            continue;
        }

        let Some(date) = parse_date(&record[DATE_COL]) else {
            skipped += 1;
            continue;
        };
        export.row_dates.push(date);
        let title = &record[TITLE_COL];
        let category = present(&record[CATEGORY_COL]);
        let geo = present(&record[GEO_COL]);
        let template = present(&record[TEMPLATE_COL]).map(clean_template);

        if let Some(category) = category {
            export.categories.push(Entry::new(category, date, title));
        }
        if let Some(geo) = geo {
            export.geos.push(Entry::new(geo, date, title));
        }
        if let Some(template) = template {
            export
                .templates
                .push(Entry::new(template.clone(), date, title));
            export.articles.push(Article {
                title: title.to_string(),
                date,
                template,
                category: category.map(str::to_string),
                geo: geo.map(str::to_string),
            });
        }
    }

    debug!(
        "Parsed {} article rows ({} skipped): {} category, {} geo, {} template entries",
        export.total_articles,
        skipped,
        export.categories.len(),
        export.geos.len(),
        export.templates.len()
    );

    export
}

/// Strip the `templates/post-` prefix and `.php` suffix from a template path.
///
/// Values without them are returned unchanged.
pub fn clean_template(raw: &str) -> String {
    let name = raw.strip_prefix(TEMPLATE_PREFIX).unwrap_or(raw);
    let name = name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name);
    name.to_string()
}

/// Number of distinct titles among `articles`.
pub fn unique_article_count(articles: &[Article]) -> usize {
    articles
        .iter()
        .map(|a| a.title.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn present(field: &str) -> Option<&str> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed == NULL_MARKER {
        None
    } else {
        Some(trimmed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "id;titolo;data_pubblicazione;template_articolo;autore;stato;category;tag;geo;url";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn export(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    // ── clean_template ────────────────────────────────────────────────────────

    #[test]
    fn test_clean_template_strips_prefix_and_suffix() {
        assert_eq!(clean_template("templates/post-news.php"), "news");
    }

    #[test]
    fn test_clean_template_leaves_plain_names() {
        assert_eq!(clean_template("tpl"), "tpl");
    }

    #[test]
    fn test_clean_template_partial_match() {
        assert_eq!(clean_template("templates/post-gallery"), "gallery");
        assert_eq!(clean_template("video.php"), "video");
    }

    // ── parse_articles ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_full_row() {
        let text = export(&[
            "1;Derby day;2024-03-01 18:30:00;templates/post-news.php;ann;publish;Sport;x;Milano;/a",
        ]);
        let parsed = parse_articles(&text);

        assert_eq!(parsed.total_articles, 1);
        assert_eq!(parsed.categories, vec![Entry::new("Sport", d(2024, 3, 1), "Derby day")]);
        assert_eq!(parsed.geos, vec![Entry::new("Milano", d(2024, 3, 1), "Derby day")]);
        assert_eq!(parsed.templates, vec![Entry::new("news", d(2024, 3, 1), "Derby day")]);
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].category.as_deref(), Some("Sport"));
        assert_eq!(parsed.articles[0].geo.as_deref(), Some("Milano"));
    }

    #[test]
    fn test_parse_null_and_empty_are_absent() {
        let text = export(&[
            "1;A;2024-03-01;news;;;NULL;;;",
            "2;B;2024-03-02;NULL;;;;;NULL;",
        ]);
        let parsed = parse_articles(&text);

        assert!(parsed.categories.is_empty());
        assert!(parsed.geos.is_empty());
        assert_eq!(parsed.templates.len(), 1);
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].title, "A");
    }

    #[test]
    fn test_parse_skips_short_rows() {
        let text = export(&["1;Short;2024-03-01;news;;;Sport;;Roma", "2;Ok;2024-03-01;news;;;;;;"]);
        let parsed = parse_articles(&text);

        assert_eq!(parsed.total_articles, 2);
        assert!(parsed.categories.is_empty());
        assert_eq!(parsed.templates.len(), 1);
        assert_eq!(parsed.templates[0].title, "Ok");
        assert_eq!(parsed.row_dates.len(), 1);
    }

    #[test]
    fn test_parse_skips_bad_dates_entirely() {
        let text = export(&["1;Undated;not-a-date;news;;;Sport;;Roma;"]);
        let parsed = parse_articles(&text);

        assert_eq!(parsed.total_articles, 1);
        assert!(parsed.all_entries().next().is_none());
        assert!(parsed.articles.is_empty());
    }

    #[test]
    fn test_parse_header_only() {
        let parsed = parse_articles(HEADER);
        assert_eq!(parsed.total_articles, 0);
        assert!(parsed.articles.is_empty());
    }

    #[test]
    fn test_parse_empty_text() {
        let parsed = parse_articles("");
        assert_eq!(parsed.total_articles, 0);
        assert_eq!(parsed.latest_date(), None);
    }

    #[test]
    fn test_parse_quotes_are_literal() {
        let text = export(&["1;\"Quoted; title\";2024-03-01;news;;;Sport;;Roma;"]);
        let parsed = parse_articles(&text);

        // The semicolon inside quotes still splits, shifting the date column.
        assert!(parsed.articles.is_empty());
    }

    #[test]
    fn test_total_articles_counts_duplicate_titles() {
        let text = export(&[
            "1;Same;2024-03-01;news;;;Sport;;;",
            "2;Same;2024-03-02;news;;;Sport;;;",
        ]);
        let parsed = parse_articles(&text);

        assert_eq!(parsed.total_articles, 2);
        assert_eq!(unique_article_count(&parsed.articles), 1);
    }

    #[test]
    fn test_latest_date_spans_all_lists() {
        let text = export(&[
            "1;A;2024-01-01;;;;Sport;;;",
            "2;B;2024-05-01;;;;;;Roma;",
            "3;C;2024-02-01;news;;;;;;",
        ]);
        let parsed = parse_articles(&text);
        assert_eq!(parsed.latest_date(), Some(d(2024, 5, 1)));
    }

    // ── load_text ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_text_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, HEADER).unwrap();
        assert_eq!(load_text(&path).unwrap(), HEADER);
    }

    #[test]
    fn test_load_text_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_text(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, StatsError::FileRead { .. }));
    }
}
