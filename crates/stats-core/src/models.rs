use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which taxonomy a node or an entry list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    /// Editorial categories (`category` column of the export).
    Category,
    /// Geographic tags (`geo` column of the export).
    Geo,
}

impl TaxonomyKind {
    /// Parse the taxonomy column of the hierarchy export.
    ///
    /// Returns `None` for anything other than `category` or `geo`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "category" => Some(Self::Category),
            "geo" => Some(Self::Geo),
            _ => None,
        }
    }

    /// The lowercase identifier used as the node-id namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Geo => "geo",
        }
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fact linking a categorical value to a dated article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The category, geo or cleaned template name.
    pub value: String,
    /// Publication date of the article.
    pub date: NaiveDate,
    /// Article title.
    pub title: String,
}

impl Entry {
    pub fn new(value: impl Into<String>, date: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            date,
            title: title.into(),
        }
    }
}

/// One parsed row of the article export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub date: NaiveDate,
    /// Template name with the `templates/post-` prefix and `.php` suffix removed.
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
}

/// Recency and frequency phrases derived from a set of dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// e.g. `"3 days ago"`, or `"N/A"` for an empty date set.
    pub last_entry: String,
    /// e.g. `"every 2 days"`, or `"N/A"` when it cannot be derived.
    pub frequency: String,
}

/// Aggregated result for one categorical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub name: String,
    /// Number of entries sharing `name`.
    pub count: usize,
    pub last_entry: String,
    pub frequency: String,
    /// Every entry date for `name`, kept so that taxonomy rollups can
    /// re-derive recency. When present, `raw_dates.len() == count`.
    #[serde(skip)]
    pub raw_dates: Option<Vec<NaiveDate>>,
}

impl StatEntry {
    /// Dates backing this entry, or an empty slice when they were not kept.
    pub fn dates(&self) -> &[NaiveDate] {
        self.raw_dates.as_deref().unwrap_or(&[])
    }
}

/// A taxonomy node merged with the statistics of itself and all of its
/// descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalStatEntry {
    #[serde(flatten)]
    pub stat: StatEntry,
    pub id: String,
    pub depth: u32,
    pub has_children: bool,
    pub parent_id: Option<String>,
}

/// One category or geo term from the taxonomy export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    /// `"{taxonomy}-{term_id}"`, unique across both taxonomies.
    pub id: String,
    pub name: String,
    pub slug: String,
    /// 0 for roots.
    pub depth: u32,
    pub parent_id: Option<String>,
    /// Child ids in export row order.
    pub children: Vec<String>,
    pub taxonomy: TaxonomyKind,
    /// Materialised path as exported, e.g. `"europe/italy/rome"`.
    pub path: String,
}

impl TaxonomyNode {
    /// Build the namespaced node id for a term of `kind`.
    pub fn make_id(kind: TaxonomyKind, term_id: &str) -> String {
        format!("{}-{}", kind, term_id)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One dated event on a timeline chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub title: String,
}

impl From<&Entry> for TimelineEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            date: entry.date,
            title: entry.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_taxonomy_kind_parse() {
        assert_eq!(TaxonomyKind::parse("category"), Some(TaxonomyKind::Category));
        assert_eq!(TaxonomyKind::parse(" geo "), Some(TaxonomyKind::Geo));
        assert_eq!(TaxonomyKind::parse("post_tag"), None);
        assert_eq!(TaxonomyKind::Geo.to_string(), "geo");
    }

    #[test]
    fn test_taxonomy_node_make_id() {
        assert_eq!(TaxonomyNode::make_id(TaxonomyKind::Category, "42"), "category-42");
        assert_eq!(TaxonomyNode::make_id(TaxonomyKind::Geo, "7"), "geo-7");
    }

    #[test]
    fn test_stat_entry_dates_without_raw() {
        let stat = StatEntry {
            name: "Sport".to_string(),
            count: 0,
            last_entry: "N/A".to_string(),
            frequency: "N/A".to_string(),
            raw_dates: None,
        };
        assert!(stat.dates().is_empty());
    }

    #[test]
    fn test_stat_entry_json_omits_raw_dates() {
        let stat = StatEntry {
            name: "news".to_string(),
            count: 1,
            last_entry: "1 hour ago".to_string(),
            frequency: "N/A".to_string(),
            raw_dates: Some(vec![d(2023, 6, 1)]),
        };
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["name"], "news");
        assert_eq!(json["lastEntry"], "1 hour ago");
        assert!(json.get("rawDates").is_none());
    }

    #[test]
    fn test_hierarchical_entry_json_is_flat() {
        let row = HierarchicalStatEntry {
            stat: StatEntry {
                name: "Europe".to_string(),
                count: 8,
                last_entry: "2 days ago".to_string(),
                frequency: "every 1 day".to_string(),
                raw_dates: None,
            },
            id: "geo-10".to_string(),
            depth: 0,
            has_children: true,
            parent_id: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["count"], 8);
        assert_eq!(json["hasChildren"], true);
        assert!(json["parentId"].is_null());
    }

    #[test]
    fn test_timeline_entry_from_entry() {
        let entry = Entry::new("Sport", d(2024, 3, 1), "Derby day");
        let event = TimelineEntry::from(&entry);
        assert_eq!(event.date, d(2024, 3, 1));
        assert_eq!(event.title, "Derby day");
    }
}
