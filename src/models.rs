//! Data models shared across the pipeline.
//!
//! - [`Detection`]: classification of one URL against the source registry
//! - [`ParsedUrlEntry`]: one reviewable row of a batch parse
//! - [`CollectedRecord`]: a normalized product or article
//! - [`RssItem`] / [`Feed`]: transient feed structures
//!
//! Types crossing into the UI or task system serialize with camelCase field
//! names, which is what those collaborators expect.

use crate::sources::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A single item: a product detail page or an article.
    Product,
    /// A storefront, channel or listing page.
    Shop,
    /// Explicitly submitted as part of a batch.
    Batch,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intent::Product => "product",
            Intent::Shop => "shop",
            Intent::Batch => "batch",
        })
    }
}

/// Result of classifying one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// `None` only when the URL is invalid.
    pub source: Option<SourceId>,
    pub confidence: f32,
    pub normalized_url: String,
    pub is_valid: bool,
    pub item_id: Option<String>,
    pub shop_id: Option<String>,
    pub error: Option<String>,
    pub suggestion: Option<String>,
}

impl Detection {
    pub fn invalid(url: &str, error: impl Into<String>) -> Self {
        Self {
            source: None,
            confidence: 0.0,
            normalized_url: url.trim().to_string(),
            is_valid: false,
            item_id: None,
            shop_id: None,
            error: Some(error.into()),
            suggestion: Some("Check that the link is complete and starts with http:// or https://".into()),
        }
    }
}

/// One row of a batch parse, editable before collection starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUrlEntry {
    pub id: String,
    pub original_url: String,
    pub normalized_url: String,
    pub platform: Option<SourceId>,
    pub intent: Intent,
    pub confidence: f32,
    pub item_id: Option<String>,
    pub shop_id: Option<String>,
    pub is_valid: bool,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Article,
    Product,
}

/// Review state of a collected record. The engine only ever creates drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

/// What the extractor saw, kept for debugging selector drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub html: String,
    /// Field name to the raw value that was extracted for it.
    pub fields: BTreeMap<String, String>,
}

/// A normalized product or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedRecord {
    pub id: String,
    pub task_id: String,
    pub kind: RecordKind,
    pub source: SourceId,
    pub url: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: Option<Author>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    /// Absolute URLs in document order.
    pub images: Vec<String>,
    pub price: Option<String>,
    /// Minutes.
    pub reading_time: u32,
    pub raw: RawSnapshot,
    pub status: WorkflowStatus,
    pub collected_at: DateTime<Utc>,
}

/// One `<item>` (or Atom `<entry>`) from a feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RssItem {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub pub_date: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

/// Channel metadata plus the items that parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub link: String,
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PublishedAt,
    CollectedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort records in place. The sort is stable: records that compare equal keep
/// their relative order. Records without a publish date sort last in either
/// order.
pub fn sort_records(records: &mut [CollectedRecord], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| match key {
        SortKey::PublishedAt => match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => directed(x.cmp(&y), order),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::CollectedAt => directed(a.collected_at.cmp(&b.collected_at), order),
        SortKey::Title => directed(a.title.cmp(&b.title), order),
    });
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, title: &str, published: Option<i64>) -> CollectedRecord {
        CollectedRecord {
            id: id.to_string(),
            task_id: "task-1".to_string(),
            kind: RecordKind::Article,
            source: SourceId::Custom,
            url: format!("https://example.com/{}", id),
            title: title.to_string(),
            slug: String::new(),
            content: String::new(),
            excerpt: String::new(),
            author: None,
            published_at: published.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            tags: BTreeSet::new(),
            keywords: vec![],
            category: None,
            featured_image: None,
            images: vec![],
            price: None,
            reading_time: 1,
            raw: RawSnapshot::default(),
            status: WorkflowStatus::Draft,
            collected_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn test_intent_serialization() {
        assert_eq!(serde_json::to_string(&Intent::Shop).unwrap(), "\"shop\"");
        let intent: Intent = serde_json::from_str("\"batch\"").unwrap();
        assert_eq!(intent, Intent::Batch);
    }

    #[test]
    fn test_workflow_status_default_is_draft() {
        assert_eq!(WorkflowStatus::default(), WorkflowStatus::Draft);
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::PendingReview).unwrap(),
            "\"pending_review\""
        );
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_string(&record("a", "T", Some(10))).unwrap();
        assert!(json.contains("\"taskId\":\"task-1\""));
        assert!(json.contains("\"readingTime\":1"));
        assert!(json.contains("\"source\":\"custom\""));
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut records = vec![
            record("a", "Same", Some(100)),
            record("b", "Same", Some(100)),
            record("c", "Same", Some(100)),
        ];
        sort_records(&mut records, SortKey::PublishedAt, SortOrder::Desc);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        sort_records(&mut records, SortKey::Title, SortOrder::Asc);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_publish_date_puts_undated_last() {
        let mut records = vec![
            record("undated", "x", None),
            record("old", "x", Some(10)),
            record("new", "x", Some(20)),
        ];
        sort_records(&mut records, SortKey::PublishedAt, SortOrder::Desc);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "undated"]);

        sort_records(&mut records, SortKey::PublishedAt, SortOrder::Asc);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["old", "new", "undated"]);
    }

    #[test]
    fn test_invalid_detection_has_no_source() {
        let detection = Detection::invalid("  nope ", "Invalid URL");
        assert!(!detection.is_valid);
        assert_eq!(detection.source, None);
        assert_eq!(detection.confidence, 0.0);
        assert_eq!(detection.normalized_url, "nope");
    }
}
