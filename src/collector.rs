//! Single-URL, feed and batch collection.
//!
//! The collector is where fetch and extraction failures turn into results.
//! Every public entry point returns an envelope ([`CollectOutcome`],
//! [`FeedOutcome`]) instead of an error: a failure carries its classified
//! [`FailureKind`] and human guidance, and never aborts the surrounding batch
//! or feed.
//!
//! | Entry point | Record kind | Source |
//! |-------------|-------------|--------|
//! | [`Collector::parse_news_article`] | article | detected from the URL |
//! | [`Collector::parse_product`] | product | detected from the URL |
//! | [`Collector::parse_rss_feed`] | article per item | each item's link, else the feed |
//! | [`Collector::collect_batch`] | by source kind | the reviewed batch rows |

use crate::config::CollectorConfig;
use crate::detect::{detect_with, looks_like_feed};
use crate::error::{ExtractError, FailureKind, FeedError, FetchError};
use crate::extract::{plain_text, text, validate, FieldExtractor};
use crate::fetch::{PageSource, Throttle};
use crate::models::{
    Author, CollectedRecord, Intent, ParsedUrlEntry, RawSnapshot, RecordKind, RssItem,
    WorkflowStatus,
};
use crate::normalize::fetch_target;
use crate::rss::parse_feed;
use crate::sources::{registry, SourceConfig, SourceId, SourceKind, SourceRegistry};
use crate::utils::{generate_id, slugify};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Result of collecting one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectOutcome {
    Success {
        record: Box<CollectedRecord>,
        warnings: Vec<String>,
    },
    Failure {
        error: String,
        kind: FailureKind,
        warnings: Vec<String>,
    },
}

impl CollectOutcome {
    fn failure(error: impl ToString, kind: FailureKind, warnings: Vec<String>) -> Self {
        CollectOutcome::Failure {
            error: error.to_string(),
            kind,
            warnings,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CollectOutcome::Success { .. })
    }

    pub fn record(&self) -> Option<&CollectedRecord> {
        match self {
            CollectOutcome::Success { record, .. } => Some(record.as_ref()),
            CollectOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CollectOutcome::Success { .. } => None,
            CollectOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Result of collecting a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedOutcome {
    Success {
        feed_title: String,
        /// Records in feed order.
        items: Vec<CollectedRecord>,
        /// Items that produced no record at all.
        skipped: usize,
        warnings: Vec<String>,
    },
    Failure {
        error: String,
        kind: FailureKind,
        warnings: Vec<String>,
    },
}

impl FeedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FeedOutcome::Success { .. })
    }
}

/// Result for one row of a reviewed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchItemOutcome {
    Page {
        entry_id: String,
        outcome: CollectOutcome,
    },
    Feed {
        entry_id: String,
        outcome: FeedOutcome,
    },
    Skipped {
        entry_id: String,
        reason: String,
    },
}

/// Collection totals for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub collected: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Failure counts keyed by classified reason.
    pub failures_by_kind: BTreeMap<String, usize>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: &[BatchItemOutcome]) -> Self {
        let mut report = BatchReport::default();
        let mut fail = |kind: FailureKind| {
            let key = serde_json::to_value(kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("{:?}", kind));
            *report.failures_by_kind.entry(key).or_default() += 1;
        };
        let mut collected = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for outcome in outcomes {
            match outcome {
                BatchItemOutcome::Page { outcome, .. } => match outcome.failure_kind() {
                    None => collected += 1,
                    Some(kind) => {
                        failed += 1;
                        fail(kind);
                    }
                },
                BatchItemOutcome::Feed { outcome, .. } => match outcome {
                    FeedOutcome::Success { items, .. } => collected += items.len(),
                    FeedOutcome::Failure { kind, .. } => {
                        failed += 1;
                        fail(*kind);
                    }
                },
                BatchItemOutcome::Skipped { .. } => skipped += 1,
            }
        }
        report.collected = collected;
        report.failed = failed;
        report.skipped = skipped;
        report
    }
}

/// Guidance attached to a failure so a reviewer knows what to try next.
fn guidance(kind: FailureKind) -> Vec<String> {
    let hints: &[&str] = match kind {
        FailureKind::InvalidUrl => &["Check that the link is complete and starts with http:// or https://"],
        FailureKind::Blocked => &[
            "The site is rejecting automated requests",
            "Retry later or collect this page manually",
        ],
        FailureKind::NotFound => &["The page may have been removed; check that the link is still live"],
        FailureKind::RateLimited => &["Too many requests to this site; retry after a pause"],
        FailureKind::Timeout | FailureKind::Network => &["Network problem; retrying later may succeed"],
        FailureKind::Http => &["The site returned an unexpected response"],
        FailureKind::Extraction => &[
            "Page structure may differ from the configured selectors",
            "The page may require login or render its content with JavaScript",
        ],
        FailureKind::Feed => &["The feed may be empty or not a valid RSS/Atom document"],
        FailureKind::Environment => &["The HTML parser is unavailable in this environment"],
    };
    hints.iter().map(|h| h.to_string()).collect()
}

fn fetch_failure(err: FetchError) -> CollectOutcome {
    let kind = err.kind();
    CollectOutcome::failure(err, kind, guidance(kind))
}

fn extract_failure(err: ExtractError) -> CollectOutcome {
    let kind = err.kind();
    CollectOutcome::failure(err, kind, guidance(kind))
}

/// Non-blocking notes about a successful record.
fn soft_warnings(record: &CollectedRecord) -> Vec<String> {
    let mut warnings = Vec::new();
    if record.source == SourceId::Custom {
        warnings.push("Collected with generic rules; review the extracted fields".to_string());
    }
    if record.published_at.is_none() && record.kind == RecordKind::Article {
        warnings.push("No publish date found".to_string());
    }
    if record.kind == RecordKind::Product && record.price.is_none() {
        warnings.push("No price found".to_string());
    }
    warnings
}

/// Fetches, extracts and validates pages for one collection task.
pub struct Collector<F> {
    fetcher: F,
    extractor: FieldExtractor,
    registry: &'static SourceRegistry,
    throttle: Option<Throttle>,
    config: CollectorConfig,
}

impl<F> Collector<F>
where
    F: PageSource,
{
    /// # Errors
    ///
    /// [`ExtractError::ParserUnavailable`] when the HTML parser fails its
    /// startup check.
    pub fn new(fetcher: F, config: CollectorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            fetcher,
            extractor: FieldExtractor::new()?,
            registry: registry(),
            throttle: Some(Throttle::new(config.request_delay())),
            config,
        })
    }

    /// Disable per-source request spacing.
    pub fn unthrottled(mut self) -> Self {
        self.throttle = None;
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    async fn fetch(&self, url: &str, source: &SourceConfig) -> Result<String, FetchError> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire(source).await;
        }
        self.fetcher.fetch(url, source).await
    }

    /// Collect `url` as a news article.
    #[instrument(level = "info", skip(self))]
    pub async fn parse_news_article(&self, url: &str, task_id: &str) -> CollectOutcome {
        self.collect_page(url, task_id, RecordKind::Article, None).await
    }

    /// Collect `url` as a product detail page.
    #[instrument(level = "info", skip(self))]
    pub async fn parse_product(&self, url: &str, task_id: &str) -> CollectOutcome {
        self.collect_page(url, task_id, RecordKind::Product, None).await
    }

    /// `platform` overrides the detected source, as set by a batch reviewer.
    /// The page is requested with its own query string; the record is keyed
    /// by the normalized URL.
    async fn collect_page(
        &self,
        url: &str,
        task_id: &str,
        kind: RecordKind,
        platform: Option<SourceId>,
    ) -> CollectOutcome {
        let t0 = Instant::now();
        let detection = detect_with(self.registry, url);
        if !detection.is_valid {
            let error = detection.error.unwrap_or_else(|| format!("Invalid URL: '{}'", url));
            return CollectOutcome::failure(error, FailureKind::InvalidUrl, guidance(FailureKind::InvalidUrl));
        }
        let source = self
            .registry
            .config_or_custom(platform.or(detection.source).unwrap_or(SourceId::Custom));
        let target = fetch_target(url).unwrap_or_else(|| detection.normalized_url.clone());

        let html = match self.fetch(&target, source).await {
            Ok(html) => html,
            Err(e) => return fetch_failure(e),
        };
        let record = self
            .extractor
            .extract(&html, &detection.normalized_url, source, kind, task_id);

        match validate(&record) {
            Ok(()) => {
                let warnings = soft_warnings(&record);
                info!(
                    source = %source.id,
                    title = %record.title,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Collected page"
                );
                CollectOutcome::Success {
                    record: Box::new(record),
                    warnings,
                }
            }
            Err(e) => {
                warn!(source = %source.id, url = %detection.normalized_url, error = %e, "Extraction rejected page");
                extract_failure(e)
            }
        }
    }

    /// Collect every item of the feed at `url`.
    ///
    /// Items with a link are fetched and extracted like articles; when that
    /// fails, or there is no link, a minimal record is built from the feed's
    /// own title, description, author and date. Items run with bounded
    /// concurrency and come back in feed order.
    #[instrument(level = "info", skip(self))]
    pub async fn parse_rss_feed(&self, url: &str, task_id: &str) -> FeedOutcome {
        let t0 = Instant::now();
        let detection = detect_with(self.registry, url);
        if !detection.is_valid {
            let kind = FailureKind::InvalidUrl;
            return FeedOutcome::Failure {
                error: detection.error.unwrap_or_else(|| format!("Invalid URL: '{}'", url)),
                kind,
                warnings: guidance(kind),
            };
        }
        let feed_source = self.registry.config_or_custom(SourceId::Rss);

        let target = fetch_target(url).unwrap_or_else(|| detection.normalized_url.clone());
        let parsed = match self.fetch(&target, feed_source).await {
            Ok(body) => parse_feed(&body, self.config.max_feed_items),
            Err(e) => Err(FeedError::from(e)),
        };
        let feed = match parsed {
            Ok(feed) => feed,
            Err(e) => {
                let kind = e.kind();
                warn!(url = %detection.normalized_url, error = %e, "Feed collection failed");
                return FeedOutcome::Failure {
                    error: e.to_string(),
                    kind,
                    warnings: guidance(kind),
                };
            }
        };

        let total = feed.items.len();
        let feed_url = detection.normalized_url.clone();
        let results: Vec<(Option<CollectedRecord>, Option<String>)> = stream::iter(feed.items)
            .map(|item| self.collect_feed_item(item, &feed_url, task_id))
            .buffered(self.config.feed_concurrency.max(1))
            .collect()
            .await;

        let mut items = Vec::with_capacity(total);
        let mut warnings = Vec::new();
        let mut skipped = 0;
        for (record, warning) in results {
            warnings.extend(warning);
            match record {
                Some(record) => items.push(record),
                None => skipped += 1,
            }
        }

        info!(
            feed = %feed.title,
            total,
            collected = items.len(),
            skipped,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Collected feed"
        );
        FeedOutcome::Success {
            feed_title: feed.title,
            items,
            skipped,
            warnings,
        }
    }

    /// Returns the record (if any) and a warning describing a degraded path.
    async fn collect_feed_item(
        &self,
        item: RssItem,
        feed_url: &str,
        task_id: &str,
    ) -> (Option<CollectedRecord>, Option<String>) {
        let Some(link) = item.link.clone() else {
            return (record_from_item(&item, feed_url, task_id), None);
        };

        match self.collect_page(&link, task_id, RecordKind::Article, None).await {
            CollectOutcome::Success { record, .. } => (Some(enrich_from_item(*record, &item)), None),
            CollectOutcome::Failure { error, .. } => {
                warn!(%link, %error, "Feed item extraction failed; using feed content");
                let record = record_from_item(&item, feed_url, task_id);
                let warning = match &record {
                    Some(_) => format!("{}: used feed summary ({})", link, error),
                    None => format!("{}: skipped ({})", link, error),
                };
                (record, Some(warning))
            }
        }
    }

    /// Collect every valid row of a reviewed batch.
    ///
    /// Commerce rows are collected as products, feed rows (and feed-shaped
    /// paths on news sites) as feeds, and all other rows as articles. Listing
    /// rows (shops, channels) and invalid rows are skipped. A reviewer's
    /// platform override decides which selectors apply. Rows run concurrently
    /// up to `batch_concurrency`; the per-source throttle still spaces
    /// requests to the same site.
    #[instrument(level = "info", skip_all, fields(entries = entries.len()))]
    pub async fn collect_batch(&self, entries: &[ParsedUrlEntry], task_id: &str) -> Vec<BatchItemOutcome> {
        let outcomes: Vec<BatchItemOutcome> = stream::iter(entries)
            .map(|entry| self.collect_entry(entry, task_id))
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let report = BatchReport::from_outcomes(&outcomes);
        info!(
            collected = report.collected,
            failed = report.failed,
            skipped = report.skipped,
            "Batch collection finished"
        );
        outcomes
    }

    async fn collect_entry(&self, entry: &ParsedUrlEntry, task_id: &str) -> BatchItemOutcome {
        let entry_id = entry.id.clone();
        if !entry.is_valid {
            return BatchItemOutcome::Skipped {
                entry_id,
                reason: entry.error.clone().unwrap_or_else(|| "Invalid URL".to_string()),
            };
        }
        let source_kind = entry
            .platform
            .map(|p| self.registry.config_or_custom(p).kind)
            .unwrap_or(SourceKind::Custom);

        let feed_shaped = Url::parse(&entry.normalized_url).is_ok_and(|u| looks_like_feed(&u));
        if source_kind == SourceKind::Feed || (source_kind == SourceKind::News && feed_shaped) {
            let outcome = self.parse_rss_feed(&entry.original_url, task_id).await;
            return BatchItemOutcome::Feed { entry_id, outcome };
        }
        if entry.intent == Intent::Shop {
            debug!(url = %entry.normalized_url, "Skipping listing page");
            return BatchItemOutcome::Skipped {
                entry_id,
                reason: "Listing pages are classified but not collected".to_string(),
            };
        }
        let kind = match source_kind {
            SourceKind::Commerce => RecordKind::Product,
            _ => RecordKind::Article,
        };
        let outcome = self
            .collect_page(&entry.original_url, task_id, kind, entry.platform)
            .await;
        BatchItemOutcome::Page { entry_id, outcome }
    }
}

/// Fill fields the page did not provide from the feed item.
fn enrich_from_item(mut record: CollectedRecord, item: &RssItem) -> CollectedRecord {
    if record.published_at.is_none() {
        record.published_at = item.pub_date.as_deref().and_then(text::parse_date);
    }
    if record.author.is_none() {
        record.author = item.author.clone().map(|name| Author {
            name,
            avatar: None,
            bio: None,
        });
    }
    if record.tags.is_empty() {
        record.tags = item.categories.iter().cloned().collect();
    }
    record
}

/// Minimal article built from the feed's own fields. `None` when the item has
/// no usable title.
pub fn record_from_item(item: &RssItem, feed_url: &str, task_id: &str) -> Option<CollectedRecord> {
    let title = plain_text(&item.title);
    if title.is_empty() {
        return None;
    }
    let body = plain_text(&item.description);
    let mut fields = BTreeMap::new();
    fields.insert("title".to_string(), item.title.clone());
    fields.insert("description".to_string(), item.description.clone());
    if let Some(date) = &item.pub_date {
        fields.insert("pubDate".to_string(), date.clone());
    }

    Some(CollectedRecord {
        id: generate_id("article"),
        task_id: task_id.to_string(),
        kind: RecordKind::Article,
        source: SourceId::Rss,
        url: item.link.clone().unwrap_or_else(|| feed_url.to_string()),
        slug: slugify(&title),
        excerpt: text::summarize(&body),
        keywords: text::keywords(&title, &body),
        reading_time: text::reading_time(&body),
        content: item.description.clone(),
        author: item.author.clone().map(|name| Author {
            name,
            avatar: None,
            bio: None,
        }),
        published_at: item.pub_date.as_deref().and_then(text::parse_date),
        tags: item.categories.iter().cloned().collect(),
        category: item.categories.first().cloned(),
        featured_image: None,
        images: Vec::new(),
        price: None,
        raw: RawSnapshot {
            html: String::new(),
            fields,
        },
        status: WorkflowStatus::Draft,
        collected_at: Utc::now(),
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned bodies by URL.
    struct Canned(HashMap<String, Result<String, u16>>);

    impl PageSource for Canned {
        async fn fetch(&self, url: &str, _source: &SourceConfig) -> Result<String, FetchError> {
            match self.0.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::from_status(*status)),
                None => Err(FetchError::from_status(404)),
            }
        }
    }

    fn article(title: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head><body><article><p>{}</p></article></body></html>",
            "Plenty of body text to clear every minimum length threshold. ".repeat(4)
        )
    }

    /// Serves one article for every URL and remembers what was requested.
    #[derive(Default)]
    struct Recording(std::sync::Mutex<Vec<(String, SourceId)>>);

    impl PageSource for Recording {
        async fn fetch(&self, url: &str, source: &SourceConfig) -> Result<String, FetchError> {
            self.0.lock().unwrap().push((url.to_string(), source.id));
            Ok(article("Recorded").replace("<article>", "<article><h1>Recorded</h1>"))
        }
    }

    fn recording() -> Collector<Recording> {
        Collector::new(Recording::default(), CollectorConfig::default())
            .unwrap()
            .unthrottled()
    }

    fn requested(c: &Collector<Recording>) -> Vec<(String, SourceId)> {
        c.fetcher.0.lock().unwrap().clone()
    }

    fn collector(pages: Vec<(&str, Result<String, u16>)>) -> Collector<Canned> {
        let pages = pages.into_iter().map(|(u, b)| (u.to_string(), b)).collect();
        Collector::new(Canned(pages), CollectorConfig::default())
            .unwrap()
            .unthrottled()
    }

    #[tokio::test]
    async fn test_article_success_envelope() {
        let c = collector(vec![("https://blog.example.com/a", Ok(article("Hello")))]);
        let outcome = c.parse_news_article("https://blog.example.com/a", "t1").await;
        let record = outcome.record().expect("success");
        assert_eq!(record.title, "Hello");
        assert_eq!(record.kind, RecordKind::Article);
        assert_eq!(record.source, SourceId::Custom);
        match outcome {
            CollectOutcome::Success { warnings, .. } => {
                assert!(warnings.iter().any(|w| w.contains("generic rules")));
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_blocked_page_is_classified() {
        let c = collector(vec![("https://blog.example.com/b", Err(403))]);
        let outcome = c.parse_news_article("https://blog.example.com/b", "t1").await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Blocked));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "blocked");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_fetch() {
        let c = collector(vec![]);
        let outcome = c.parse_product("not a url", "t1").await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidUrl));
    }

    #[tokio::test]
    async fn test_thin_page_is_extraction_failure_with_guidance() {
        let thin = "<html><head><title>Login</title></head><body><p>Please sign in.</p></body></html>";
        let c = collector(vec![("https://blog.example.com/c", Ok(thin.to_string()))]);
        let outcome = c.parse_news_article("https://blog.example.com/c", "t1").await;
        match outcome {
            CollectOutcome::Failure { kind, warnings, .. } => {
                assert_eq!(kind, FailureKind::Extraction);
                assert!(warnings.iter().any(|w| w.contains("login")));
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_feed_items_fall_back_to_feed_content() {
        let feed = r#"<rss><channel><title>F</title>
            <item><title>Full</title><link>https://blog.example.com/full</link></item>
            <item><title>Gone</title><link>https://blog.example.com/gone</link>
                  <description>Summary from the feed</description>
                  <category>misc</category></item>
            <item><title>No link</title><description>Only feed text</description></item>
        </channel></rss>"#;
        let c = collector(vec![
            ("https://blog.example.com/feed", Ok(feed.to_string())),
            ("https://blog.example.com/full", Ok(article("Full page"))),
        ]);
        let outcome = c.parse_rss_feed("https://blog.example.com/feed", "t2").await;
        let FeedOutcome::Success { items, skipped, warnings, feed_title } = outcome else {
            panic!("expected success");
        };
        assert_eq!(feed_title, "F");
        assert_eq!(skipped, 0);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Full page");
        assert_eq!(items[1].title, "Gone");
        assert_eq!(items[1].source, SourceId::Rss);
        assert_eq!(items[1].url, "https://blog.example.com/gone");
        assert!(items[1].tags.contains("misc"));
        assert_eq!(items[2].url, "https://blog.example.com/feed");
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_feed_fetch_failure_is_classified() {
        let c = collector(vec![("https://blog.example.com/rss", Err(429))]);
        let outcome = c.parse_rss_feed("https://blog.example.com/rss", "t").await;
        match outcome {
            FeedOutcome::Failure { kind, .. } => assert_eq!(kind, FailureKind::RateLimited),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_collect_batch_routes_by_kind() {
        let text = "https://blog.example.com/a\nhttps://shop123.taobao.com/\nnot a url";
        let parsed = crate::batch::parse_batch(text);
        let c = collector(vec![("https://blog.example.com/a", Ok(article("A")))]);
        let outcomes = c.collect_batch(&parsed.entries, "t3").await;
        assert_eq!(outcomes.len(), 3);
        let report = BatchReport::from_outcomes(&outcomes);
        assert_eq!(report.collected, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_page_is_requested_with_its_query_string() {
        let c = recording();
        let first = c.parse_news_article("https://blog.example.com/index.php?p=42", "t").await;
        let second = c
            .parse_news_article("news.example.cn/show.php?aid=1001&utm_source=x#comments", "t")
            .await;

        let urls: Vec<String> = requested(&c).into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            [
                "https://blog.example.com/index.php?p=42",
                "https://news.example.cn/show.php?aid=1001&utm_source=x",
            ]
        );
        assert_eq!(first.record().unwrap().url, "https://blog.example.com/index.php");
        assert_eq!(second.record().unwrap().url, "https://news.example.cn/show.php");
    }

    #[tokio::test]
    async fn test_batch_uses_original_url_and_platform_override() {
        let parsed = crate::batch::parse_batch("https://blog.example.com/read.php?aid=7");
        let id = parsed.entries[0].id.clone();
        let patch = crate::batch::EntryPatch {
            platform: Some(SourceId::Sina),
            ..Default::default()
        };
        let entries = crate::batch::update_entry(&parsed.entries, &id, &patch);

        let c = recording();
        let outcomes = c.collect_batch(&entries, "t").await;
        assert!(matches!(&outcomes[0], BatchItemOutcome::Page { outcome, .. } if outcome.is_success()));
        assert_eq!(
            requested(&c),
            [("https://blog.example.com/read.php?aid=7".to_string(), SourceId::Sina)]
        );
    }

    #[tokio::test]
    async fn test_feed_path_on_news_domain_is_collected_as_feed() {
        let feed = r#"<rss><channel><title>36Kr</title>
            <item><title>Flash</title><description>Feed-only summary text</description></item>
        </channel></rss>"#;
        let parsed = crate::batch::parse_batch("https://36kr.com/feed");
        assert_eq!(parsed.entries[0].platform, Some(SourceId::Kr36));

        let c = collector(vec![("https://36kr.com/feed", Ok(feed.to_string()))]);
        let outcomes = c.collect_batch(&parsed.entries, "t").await;
        match &outcomes[0] {
            BatchItemOutcome::Feed { outcome: FeedOutcome::Success { items, .. }, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "Flash");
            }
            other => panic!("expected feed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_record_from_item_requires_title() {
        let item = RssItem {
            title: "  ".to_string(),
            link: None,
            description: "desc".to_string(),
            ..RssItem::default()
        };
        assert!(record_from_item(&item, "https://f", "t").is_none());

        let item = RssItem {
            title: "<b>Bold</b> title".to_string(),
            pub_date: Some("2024-05-01 08:00".to_string()),
            ..item
        };
        let record = record_from_item(&item, "https://f", "t").unwrap();
        assert_eq!(record.title, "Bold title");
        assert_eq!(record.slug, "bold-title");
        assert!(record.published_at.is_some());
    }
}
