//! Intent classification and identifier extraction.
//!
//! Intent answers "what does this URL point at": a single item, or a shop /
//! listing. Identifier extraction pulls item and shop ids out of the URL with
//! each source's capture patterns. The two run independently; a missing
//! identifier only lowers confidence (see [`adjust_confidence`]).

use crate::models::Intent;
use crate::sources::{registry, CompiledRules, SourceId, SourceRegistry};
use regex::Regex;

/// Confidence added when the identifier expected for the intent was found.
pub const IDENTIFIER_BONUS: f32 = 0.1;
/// Confidence removed when the expected identifier is missing.
pub const MISSING_IDENTIFIER_PENALTY: f32 = 0.2;
/// The penalty never pushes confidence below this.
pub const CONFIDENCE_FLOOR: f32 = 0.3;

/// Item and shop identifiers found in a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub item_id: Option<String>,
    pub shop_id: Option<String>,
}

pub fn classify_intent(normalized_url: &str, source: SourceId) -> Intent {
    classify_intent_with(registry(), normalized_url, source)
}

/// Product-shape patterns are tried before shop-shape patterns; the first
/// category with a match wins. Defaults to [`Intent::Product`].
pub fn classify_intent_with(registry: &SourceRegistry, normalized_url: &str, source: SourceId) -> Intent {
    let Some(rules) = registry.rules(source) else {
        return Intent::Product;
    };
    if rules.product.iter().any(|re| re.is_match(normalized_url)) {
        Intent::Product
    } else if rules.shop.iter().any(|re| re.is_match(normalized_url)) {
        Intent::Shop
    } else {
        Intent::Product
    }
}

pub fn extract_identifiers(normalized_url: &str, source: SourceId) -> Identifiers {
    extract_identifiers_with(registry(), normalized_url, source)
}

pub fn extract_identifiers_with(
    registry: &SourceRegistry,
    normalized_url: &str,
    source: SourceId,
) -> Identifiers {
    let Some(rules) = registry.rules(source) else {
        return Identifiers::default();
    };
    Identifiers {
        item_id: first_capture(&rules.item_id, normalized_url),
        shop_id: first_capture(&rules.shop_id, normalized_url),
    }
}

fn first_capture(patterns: &[Regex], url: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| decode(m.as_str()))
            .filter(|id| !id.is_empty())
    })
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Whether a source defines a way to find the identifier that `intent`
/// relies on. Sources without capture patterns never expect one.
pub fn expects_identifier(rules: Option<&CompiledRules>, intent: Intent) -> bool {
    match (rules, intent) {
        (Some(rules), Intent::Product) => !rules.item_id.is_empty(),
        (Some(rules), Intent::Shop) => !rules.shop_id.is_empty(),
        _ => false,
    }
}

/// Adjust a detector confidence for the identifier found (or not) for the
/// classified intent.
///
/// Found: `+0.1`, capped at `1.0`. Expected but missing: `-0.2`, floored at
/// `0.3`. Not expected: unchanged.
pub fn adjust_confidence(
    base: f32,
    intent: Intent,
    ids: &Identifiers,
    rules: Option<&CompiledRules>,
) -> f32 {
    if !expects_identifier(rules, intent) {
        return base;
    }
    let found = match intent {
        Intent::Product => ids.item_id.is_some(),
        Intent::Shop => ids.shop_id.is_some(),
        Intent::Batch => false,
    };
    if found {
        (base + IDENTIFIER_BONUS).min(1.0)
    } else {
        (base - MISSING_IDENTIFIER_PENALTY).max(CONFIDENCE_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taobao_item_is_product_with_item_id() {
        let url = "https://item.taobao.com/item.htm?id=123456789";
        assert_eq!(classify_intent(url, SourceId::Taobao), Intent::Product);
        let ids = extract_identifiers(url, SourceId::Taobao);
        assert_eq!(ids.item_id.as_deref(), Some("123456789"));
        assert_eq!(ids.shop_id, None);
    }

    #[test]
    fn test_taobao_shop_subdomain_is_shop() {
        let url = "https://shop123456.taobao.com/";
        assert_eq!(classify_intent(url, SourceId::Taobao), Intent::Shop);
        let ids = extract_identifiers(url, SourceId::Taobao);
        assert_eq!(ids.shop_id.as_deref(), Some("123456"));
    }

    #[test]
    fn test_jd_shop_and_item() {
        assert_eq!(
            classify_intent("https://mall.jd.com/index-1000004123.html", SourceId::Jd),
            Intent::Shop
        );
        let ids = extract_identifiers("https://item.jd.com/100012043978.html", SourceId::Jd);
        assert_eq!(ids.item_id.as_deref(), Some("100012043978"));
    }

    #[test]
    fn test_pinduoduo_ids_from_query() {
        let url = "https://mobile.yangkeduo.com/mall_page.html?mall_id=778";
        assert_eq!(classify_intent(url, SourceId::Pinduoduo), Intent::Shop);
        assert_eq!(
            extract_identifiers(url, SourceId::Pinduoduo).shop_id.as_deref(),
            Some("778")
        );
    }

    #[test]
    fn test_unmatched_url_defaults_to_product() {
        assert_eq!(
            classify_intent("https://www.taobao.com/markets/promo", SourceId::Taobao),
            Intent::Product
        );
        assert_eq!(
            classify_intent("https://blog.example.com/post/1", SourceId::Custom),
            Intent::Product
        );
    }

    #[test]
    fn test_custom_storefront_shape_is_shop() {
        assert_eq!(
            classify_intent("https://example.com/store/acme", SourceId::Custom),
            Intent::Shop
        );
    }

    #[test]
    fn test_news_channel_is_listing() {
        assert_eq!(
            classify_intent("https://www.thepaper.cn/channel_25950", SourceId::ThePaper),
            Intent::Shop
        );
    }

    #[test]
    fn test_adjust_confidence_bonus_and_cap() {
        let rules = registry().rules(SourceId::Taobao);
        let found = Identifiers {
            item_id: Some("1".into()),
            shop_id: None,
        };
        let adjusted = adjust_confidence(0.95, Intent::Product, &found, rules);
        assert!((adjusted - 1.0).abs() < f32::EPSILON);
        let adjusted = adjust_confidence(0.7, Intent::Product, &found, rules);
        assert!((adjusted - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_confidence_penalty_and_floor() {
        let rules = registry().rules(SourceId::Taobao);
        let missing = Identifiers::default();
        let adjusted = adjust_confidence(0.7, Intent::Product, &missing, rules);
        assert!((adjusted - 0.5).abs() < 1e-6);
        let adjusted = adjust_confidence(0.4, Intent::Shop, &missing, rules);
        assert!((adjusted - CONFIDENCE_FLOOR).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_confidence_untouched_without_expectation() {
        let rules = registry().rules(SourceId::Custom);
        let adjusted = adjust_confidence(0.3, Intent::Product, &Identifiers::default(), rules);
        assert!((adjusted - 0.3).abs() < 1e-6);
        let rules = registry().rules(SourceId::Taobao);
        let adjusted = adjust_confidence(0.9, Intent::Batch, &Identifiers::default(), rules);
        assert!((adjusted - 0.9).abs() < 1e-6);
    }
}
