//! Smart batch parsing of pasted URL lists.
//!
//! [`parse_batch`] turns a multi-line block of text into reviewable
//! [`ParsedUrlEntry`] rows before anything is fetched. Each line goes through
//! coercion, normalization, detection, intent classification and identifier
//! extraction. A bad line becomes an invalid row with an explanation; it never
//! aborts the batch.
//!
//! Rows can then be corrected by a reviewer with [`update_entry`] and
//! [`remove_entry`], which return new collections and recompute confidence
//! with the same rule as the initial parse. [`validate_for_collection`] is the
//! last check before a collection job is created.

use crate::detect::{detect_with, score_for};
use crate::intent::{
    adjust_confidence, classify_intent_with, expects_identifier, extract_identifiers_with,
    Identifiers,
};
use crate::models::{Intent, ParsedUrlEntry};
use crate::sources::{registry, SourceId, SourceRegistry};
use crate::utils::generate_id;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Rows below this confidence are flagged for human review.
pub const REVIEW_THRESHOLD: f32 = 0.7;
/// Rows below this confidence are reported by the pre-flight check.
pub const PREFLIGHT_THRESHOLD: f32 = 0.5;

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub by_source: BTreeMap<String, usize>,
    pub by_intent: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchParseResult {
    pub entries: Vec<ParsedUrlEntry>,
    pub summary: BatchSummary,
    /// One message per invalid row, prefixed with its 1-based line number.
    pub errors: Vec<String>,
    /// One message per valid row below [`REVIEW_THRESHOLD`].
    pub warnings: Vec<String>,
}

/// Reviewer edits to a single row. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    /// Replacing the URL re-parses the row from scratch.
    pub url: Option<String>,
    pub platform: Option<SourceId>,
    pub intent: Option<Intent>,
    pub item_id: Option<String>,
    pub shop_id: Option<String>,
}

/// Outcome of the pre-flight check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCheck {
    pub can_start: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Non-blocking notices; the caller may proceed anyway.
    pub warnings: Vec<String>,
}

/// Split input into candidate lines: trimmed, non-empty, not comments
/// (`#`, `//`), de-duplicated in first-seen order.
pub fn preprocess(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
        .unique()
        .map(str::to_string)
        .collect()
}

pub fn parse_batch(text: &str) -> BatchParseResult {
    parse_batch_with(registry(), text)
}

#[instrument(level = "info", skip_all, fields(bytes = text.len()))]
pub fn parse_batch_with(registry: &SourceRegistry, text: &str) -> BatchParseResult {
    let lines = preprocess(text);
    let entries: Vec<ParsedUrlEntry> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| parse_line(registry, line, index))
        .collect();

    let (mut errors, warnings) = diagnostics(&entries);
    if entries.is_empty() {
        errors.push("No URLs found in input".to_string());
    }
    let summary = summarize(&entries);
    info!(
        total = summary.total,
        valid = summary.valid,
        invalid = summary.invalid,
        warnings = warnings.len(),
        "Parsed URL batch"
    );

    BatchParseResult {
        entries,
        summary,
        errors,
        warnings,
    }
}

fn parse_line(registry: &SourceRegistry, line: &str, index: usize) -> ParsedUrlEntry {
    let id = format!("{}-{}", generate_id("url"), index);
    build_entry(registry, id, line)
}

fn build_entry(registry: &SourceRegistry, id: String, line: &str) -> ParsedUrlEntry {
    let detection = detect_with(registry, line);
    let Some(source) = detection.source.filter(|_| detection.is_valid) else {
        return ParsedUrlEntry {
            id,
            original_url: line.to_string(),
            normalized_url: detection.normalized_url,
            platform: None,
            intent: Intent::Product,
            confidence: 0.0,
            item_id: None,
            shop_id: None,
            is_valid: false,
            error: detection.error.or_else(|| Some("Invalid URL".to_string())),
            suggestions: detection.suggestion.into_iter().collect(),
        };
    };

    let intent = classify_intent_with(registry, &detection.normalized_url, source);
    let ids = Identifiers {
        item_id: detection.item_id,
        shop_id: detection.shop_id,
    };
    let confidence = adjust_confidence(detection.confidence, intent, &ids, registry.rules(source));

    let mut entry = ParsedUrlEntry {
        id,
        original_url: line.to_string(),
        normalized_url: detection.normalized_url,
        platform: Some(source),
        intent,
        confidence,
        item_id: ids.item_id,
        shop_id: ids.shop_id,
        is_valid: true,
        error: None,
        suggestions: detection.suggestion.into_iter().collect(),
    };
    entry.suggestions.extend(entry_suggestions(registry, &entry));
    debug!(url = %entry.normalized_url, %source, %intent, confidence, "Parsed line");
    entry
}

fn entry_suggestions(registry: &SourceRegistry, entry: &ParsedUrlEntry) -> Vec<String> {
    let mut suggestions = Vec::new();
    let source = entry.platform.unwrap_or(SourceId::Custom);
    if expects_identifier(registry.rules(source), entry.intent) {
        match entry.intent {
            Intent::Product if entry.item_id.is_none() => suggestions
                .push("No item id found; check that this is an item detail link".to_string()),
            Intent::Shop if entry.shop_id.is_none() => suggestions
                .push("No shop id found; check that this is a storefront link".to_string()),
            _ => {}
        }
    }
    if entry.confidence < REVIEW_THRESHOLD {
        suggestions.push("Low confidence; confirm the platform and intent before collecting".to_string());
    }
    suggestions
}

/// Error and warning messages for a set of rows, numbered by row position.
pub fn diagnostics(entries: &[ParsedUrlEntry]) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let line = index + 1;
        if !entry.is_valid {
            let reason = entry.error.as_deref().unwrap_or("Invalid URL");
            errors.push(format!("Line {}: {}", line, reason));
        } else if entry.confidence < REVIEW_THRESHOLD {
            warnings.push(format!(
                "Line {}: low confidence ({:.0}%) for {}; please review",
                line,
                entry.confidence * 100.0,
                entry.normalized_url
            ));
        }
    }
    (errors, warnings)
}

pub fn summarize(entries: &[ParsedUrlEntry]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: entries.len(),
        ..BatchSummary::default()
    };
    for entry in entries {
        if entry.is_valid {
            summary.valid += 1;
        } else {
            summary.invalid += 1;
        }
        let source = entry.platform.map(SourceId::as_str).unwrap_or("unknown");
        *summary.by_source.entry(source.to_string()).or_default() += 1;
        *summary.by_intent.entry(entry.intent.to_string()).or_default() += 1;
    }
    summary
}

pub fn update_entry(entries: &[ParsedUrlEntry], id: &str, patch: &EntryPatch) -> Vec<ParsedUrlEntry> {
    update_entry_with(registry(), entries, id, patch)
}

/// Apply `patch` to the row with `id` and return the new collection. Unknown
/// ids leave the collection unchanged.
pub fn update_entry_with(
    registry: &SourceRegistry,
    entries: &[ParsedUrlEntry],
    id: &str,
    patch: &EntryPatch,
) -> Vec<ParsedUrlEntry> {
    entries
        .iter()
        .map(|entry| {
            if entry.id == id {
                patched(registry, entry, patch)
            } else {
                entry.clone()
            }
        })
        .collect()
}

fn patched(registry: &SourceRegistry, entry: &ParsedUrlEntry, patch: &EntryPatch) -> ParsedUrlEntry {
    let mut next = match &patch.url {
        Some(url) => build_entry(registry, entry.id.clone(), url),
        None => entry.clone(),
    };
    if !next.is_valid {
        return next;
    }

    let platform_changed = patch.platform.is_some_and(|p| Some(p) != next.platform);
    if let Some(platform) = patch.platform {
        next.platform = Some(platform);
    }
    if platform_changed {
        let source = next.platform.unwrap_or(SourceId::Custom);
        let ids = extract_identifiers_with(registry, &next.normalized_url, source);
        next.item_id = ids.item_id;
        next.shop_id = ids.shop_id;
    }
    if let Some(intent) = patch.intent {
        next.intent = intent;
    }
    if patch.item_id.is_some() {
        next.item_id = patch.item_id.clone();
    }
    if patch.shop_id.is_some() {
        next.shop_id = patch.shop_id.clone();
    }

    if patch.platform.is_some() || patch.intent.is_some() || patch.item_id.is_some() || patch.shop_id.is_some() {
        next.confidence = recompute_confidence(registry, &next);
        next.suggestions = entry_suggestions(registry, &next);
    }
    next
}

/// Confidence for a row's current platform and intent, by the same rule the
/// initial parse uses.
pub fn recompute_confidence(registry: &SourceRegistry, entry: &ParsedUrlEntry) -> f32 {
    if !entry.is_valid {
        return 0.0;
    }
    let source = entry.platform.unwrap_or(SourceId::Custom);
    let base = score_for(registry, source, &entry.normalized_url);
    let ids = Identifiers {
        item_id: entry.item_id.clone(),
        shop_id: entry.shop_id.clone(),
    };
    adjust_confidence(base, entry.intent, &ids, registry.rules(source))
}

pub fn remove_entry(entries: &[ParsedUrlEntry], id: &str) -> Vec<ParsedUrlEntry> {
    entries.iter().filter(|e| e.id != id).cloned().collect()
}

/// Pre-flight check before creating a collection job.
///
/// Blocks when nothing valid remains. Low-confidence and invalid rows are
/// reported as warnings only.
pub fn validate_for_collection(entries: &[ParsedUrlEntry]) -> CollectionCheck {
    let valid = entries.iter().filter(|e| e.is_valid).count();
    let invalid = entries.len() - valid;
    let low_confidence = entries
        .iter()
        .filter(|e| e.is_valid && e.confidence < PREFLIGHT_THRESHOLD)
        .count();

    let mut check = CollectionCheck {
        can_start: valid > 0,
        ..CollectionCheck::default()
    };
    if valid == 0 {
        check.errors.push("No valid URLs to collect".to_string());
    }
    if low_confidence > 0 {
        check.warnings.push(format!(
            "{} entries have confidence below {:.0}%; review them or proceed anyway",
            low_confidence,
            PREFLIGHT_THRESHOLD * 100.0
        ));
    }
    if invalid > 0 {
        check
            .warnings
            .push(format!("{} invalid entries will be skipped", invalid));
    }
    check
}
