//! Rule-based field extraction from fetched HTML.
//!
//! Every field is read with the same ordered-fallback rule: walk the source's
//! selector list in order and take the first element whose value qualifies.
//! "Value" depends on the element:
//!
//! | Element | Value |
//! |---------|-------|
//! | `<meta>` | `content` attribute |
//! | `<img>` | `src`, then `data-src` / `data-original` |
//! | `<time>` | `datetime` attribute, then text |
//! | anything else | whitespace-collapsed text |
//!
//! Content gets extra treatment. Each candidate element is cleaned (remove
//! selectors, and script/style/comment stripping when the source asks for it),
//! optionally flattened to plain text, and rejected when shorter than the
//! source's minimum so the next selector gets a chance. When no selector
//! qualifies, a generic pass concatenates prose from paragraph-like tags.
//!
//! Extraction itself never fails; whether the result is good enough to keep
//! is decided by [`validate`].

pub mod clean;
pub mod text;

use crate::error::ExtractError;
use crate::models::{Author, CollectedRecord, RawSnapshot, RecordKind, WorkflowStatus};
use crate::sources::SourceConfig;
use crate::utils::{collapse_whitespace, generate_id, slugify, truncate_chars};
use chrono::Utc;
use clean::Cleaner;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};
use url::Url;

/// Minimum title length, in characters, for a record to be kept.
pub const MIN_TITLE_CHARS: usize = 1;
/// Minimum plain-text content length, in characters, for a record to be kept.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Paragraph-like fragments shorter than this are ignored by the generic pass.
const GENERIC_FRAGMENT_CHARS: usize = 20;
/// The generic pass accepts a group once its combined text reaches this.
const GENERIC_MIN_CHARS: usize = 100;
const GENERIC_GROUPS: &[&str] = &[
    "p",
    "div[class*='content'], div[class*='article'], div[class*='text']",
];

const MAX_AUTHOR_CHARS: usize = 80;
const MAX_RAW_FIELD_CHARS: usize = 2_000;

/// Extracts [`CollectedRecord`]s from HTML according to a [`SourceConfig`].
pub struct FieldExtractor {
    generic_groups: Vec<Selector>,
}

impl FieldExtractor {
    /// Build an extractor, checking that the HTML parser and selector engine
    /// work in this environment.
    ///
    /// # Errors
    ///
    /// [`ExtractError::ParserUnavailable`] when the self-check fails. Callers
    /// should surface this as an environment problem rather than a per-page
    /// extraction failure.
    pub fn new() -> Result<Self, ExtractError> {
        let generic_groups = GENERIC_GROUPS
            .iter()
            .map(|s| {
                Selector::parse(s)
                    .map_err(|e| ExtractError::ParserUnavailable(format!("selector '{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sample = Html::parse_document("<html><body><p id=\"check\">ready</p></body></html>");
        let check_selector = Selector::parse("p#check")
            .map_err(|e| ExtractError::ParserUnavailable(e.to_string()))?;
        let ready = sample
            .select(&check_selector)
            .next()
            .is_some_and(|el| el.text().collect::<String>() == "ready");
        if !ready {
            return Err(ExtractError::ParserUnavailable(
                "HTML parser self-check failed".to_string(),
            ));
        }

        Ok(Self { generic_groups })
    }

    /// Extract a record from `html` fetched from `url`.
    ///
    /// # Arguments
    ///
    /// * `html` - Page body
    /// * `url` - Page URL, used for image resolution and stored on the record
    /// * `source` - Selector lists and cleaning rules to apply
    /// * `kind` - Whether the page is an article or a product
    /// * `task_id` - Collection task the record belongs to
    #[instrument(level = "debug", skip(self, html, source), fields(source = %source.id, bytes = html.len()))]
    pub fn extract(
        &self,
        html: &str,
        url: &str,
        source: &SourceConfig,
        kind: RecordKind,
        task_id: &str,
    ) -> CollectedRecord {
        let document = Html::parse_document(html);
        let base = Url::parse(url).ok();
        let selectors = &source.selectors;
        let mut raw_fields = BTreeMap::new();

        let title = first_value(&document, selectors.title, |v| (!v.is_empty()).then_some(v))
            .unwrap_or_default();
        raw_fields.insert("title".to_string(), title.clone());

        let (content, plain) = self.content(&document, source);
        raw_fields.insert(
            "content".to_string(),
            truncate_chars(&content, MAX_RAW_FIELD_CHARS).to_string(),
        );

        let excerpt = first_value(&document, selectors.excerpt, |v| (!v.is_empty()).then_some(v));
        if let Some(excerpt) = &excerpt {
            raw_fields.insert("excerpt".to_string(), excerpt.clone());
        }
        let excerpt = excerpt.unwrap_or_else(|| text::summarize(&plain));

        let author = first_value(&document, selectors.author, |v| {
            let name = v.trim_start_matches("作者：").trim_start_matches("By ").trim().to_string();
            (!name.is_empty()).then(|| truncate_chars(&name, MAX_AUTHOR_CHARS).to_string())
        });
        if let Some(name) = &author {
            raw_fields.insert("author".to_string(), name.clone());
        }

        let published_at = first_value(&document, selectors.publish_date, |v| {
            text::parse_date(&v).map(|dt| (v, dt))
        })
        .map(|(raw, dt)| {
            raw_fields.insert("publishDate".to_string(), raw);
            dt
        });

        let tags = tags(&document, selectors.tags);
        if !tags.is_empty() {
            raw_fields.insert("tags".to_string(), tags.iter().cloned().collect::<Vec<_>>().join(","));
        }

        let category = first_value(&document, selectors.category, |v| (!v.is_empty()).then_some(v));
        let images = images(&document, selectors.images, base.as_ref());
        let featured_image = first_value(&document, selectors.featured_image, |v| {
            text::resolve_url(base.as_ref(), &v)
        })
        .or_else(|| images.first().cloned());
        let price = first_value(&document, selectors.price, |v| (!v.is_empty()).then_some(v));
        if let Some(price) = &price {
            raw_fields.insert("price".to_string(), price.clone());
        }

        debug!(
            title = %title,
            content_chars = plain.chars().count(),
            images = images.len(),
            has_date = published_at.is_some(),
            "Extracted fields"
        );

        CollectedRecord {
            id: generate_id(match kind {
                RecordKind::Article => "article",
                RecordKind::Product => "product",
            }),
            task_id: task_id.to_string(),
            kind,
            source: source.id,
            url: url.to_string(),
            slug: slugify(&title),
            keywords: text::keywords(&title, &plain),
            reading_time: text::reading_time(&plain),
            title,
            content,
            excerpt,
            author: author.map(|name| Author {
                name,
                avatar: None,
                bio: None,
            }),
            published_at,
            tags,
            category,
            featured_image,
            images,
            price,
            raw: RawSnapshot {
                html: html.to_string(),
                fields: raw_fields,
            },
            status: WorkflowStatus::Draft,
            collected_at: Utc::now(),
        }
    }

    /// Returns the content as stored on the record and its plain-text form.
    fn content(&self, document: &Html, source: &SourceConfig) -> (String, String) {
        let rules = &source.cleaning;
        let cleaner = Cleaner::new(rules.remove, rules.clean_html);

        for raw_selector in source.selectors.content {
            let Some(selector) = parse_selector(raw_selector) else {
                continue;
            };
            for element in document.select(&selector) {
                let cleaned = cleaner.clean(element);
                if cleaned.text_len() < rules.min_content_length {
                    continue;
                }
                let stored = if rules.plain_text {
                    cleaned.text.clone()
                } else {
                    cleaned.html
                };
                return (
                    truncate_chars(&stored, rules.max_content_length).to_string(),
                    truncate_chars(&cleaned.text, rules.max_content_length).to_string(),
                );
            }
        }

        debug!(source = %source.id, "No content selector qualified; trying generic extraction");
        let text = self.generic_content(document);
        let text = truncate_chars(&text, rules.max_content_length).to_string();
        (text.clone(), text)
    }

    fn generic_content(&self, document: &Html) -> String {
        for group in &self.generic_groups {
            let mut parts = Vec::new();
            let mut total = 0;
            for element in document.select(group) {
                let fragment = collapse_whitespace(&element.text().collect::<String>());
                let len = fragment.chars().count();
                if len <= GENERIC_FRAGMENT_CHARS {
                    continue;
                }
                total += len;
                parts.push(fragment);
                if total >= GENERIC_MIN_CHARS {
                    break;
                }
            }
            if !parts.is_empty() {
                return parts.join("\n\n");
            }
        }
        String::new()
    }
}

/// Check a record against the minimum title and content lengths.
pub fn validate(record: &CollectedRecord) -> Result<(), ExtractError> {
    if record.title.trim().chars().count() < MIN_TITLE_CHARS {
        return Err(ExtractError::EmptyTitle);
    }
    let content_chars = plain_text(&record.content).chars().count();
    if content_chars < MIN_CONTENT_CHARS {
        return Err(ExtractError::ContentTooShort(content_chars));
    }
    Ok(())
}

/// Text of an HTML fragment, whitespace-collapsed. Plain text passes through.
pub fn plain_text(fragment: &str) -> String {
    if !fragment.contains('<') {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    collapse_whitespace(&parsed.root_element().text().collect::<Vec<_>>().join(" "))
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = raw, error = %e, "Skipping unparseable selector");
            None
        }
    }
}

/// The value an element contributes to a field.
fn element_value(element: ElementRef<'_>) -> String {
    let el = element.value();
    let attr = match el.name() {
        "meta" => el.attr("content"),
        "img" => el.attr("src").or_else(|| el.attr("data-src")).or_else(|| el.attr("data-original")),
        "time" => el.attr("datetime"),
        _ => None,
    };
    match attr {
        Some(value) => collapse_whitespace(value),
        None => collapse_whitespace(&element.text().collect::<String>()),
    }
}

/// Try `selectors` in order and return the first value `accept` keeps.
fn first_value<T>(
    document: &Html,
    selectors: &[&str],
    mut accept: impl FnMut(String) -> Option<T>,
) -> Option<T> {
    selectors
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .find_map(|selector| {
            document
                .select(&selector)
                .find_map(|element| accept(element_value(element)))
        })
}

/// Tags from the first selector that yields any. Keyword-style values are
/// split on ASCII and full-width separators.
fn tags(document: &Html, selectors: &[&str]) -> BTreeSet<String> {
    for selector in selectors.iter().filter_map(|raw| parse_selector(raw)) {
        let found: BTreeSet<String> = document
            .select(&selector)
            .flat_map(|element| {
                element_value(element)
                    .split([',', '，', ';', '；', '、'])
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    BTreeSet::new()
}

/// Absolute image URLs from the first selector that yields any, in document
/// order without duplicates.
fn images(document: &Html, selectors: &[&str], base: Option<&Url>) -> Vec<String> {
    for selector in selectors.iter().filter_map(|raw| parse_selector(raw)) {
        let mut seen = BTreeSet::new();
        let found: Vec<String> = document
            .select(&selector)
            .filter_map(|element| text::resolve_url(base, &element_value(element)))
            .filter(|url| seen.insert(url.clone()))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}
