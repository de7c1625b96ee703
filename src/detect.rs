//! Platform and news-source detection.
//!
//! Detection is a cascade over the registry, most specific evidence first:
//!
//! 1. URL regexes of every enabled source, in registry order (0.9 to 0.95)
//! 2. Host match against each source's domains and historical aliases (0.7)
//! 3. Feed-shaped paths (`.rss`, `.xml`, `/feed`, `/rss`) classify as RSS (0.75)
//! 4. Anything else is a `custom` source (0.3), still valid
//!
//! Malformed input never panics or errors; it yields an invalid [`Detection`]
//! carrying the reason.

use crate::intent::extract_identifiers_with;
use crate::models::Detection;
use crate::normalize::{coerce_url, normalize};
use crate::sources::{registry, CompiledRules, SourceId, SourceKind, SourceRegistry};
use tracing::{debug, instrument};
use url::Url;

pub const DOMAIN_CONFIDENCE: f32 = 0.7;
pub const FEED_CONFIDENCE: f32 = 0.75;
pub const CUSTOM_CONFIDENCE: f32 = 0.3;

pub fn detect(url: &str) -> Detection {
    detect_with(registry(), url)
}

#[instrument(level = "debug", skip(registry))]
pub fn detect_with(registry: &SourceRegistry, url: &str) -> Detection {
    let Some(candidate) = coerce_url(url) else {
        return Detection::invalid(url, format!("Invalid URL: '{}'", url.trim()));
    };
    let normalized = normalize(&candidate);
    let Ok(parsed) = Url::parse(&normalized) else {
        return Detection::invalid(url, format!("Invalid URL: '{}'", url.trim()));
    };

    let (source, confidence) = classify(registry, &normalized, &parsed);
    let ids = extract_identifiers_with(registry, &normalized, source);
    debug!(%source, confidence, "Detected source");

    let suggestion = match source {
        SourceId::Custom => Some(
            "Unrecognized site; it will be collected with generic extraction rules".to_string(),
        ),
        SourceId::Rss => Some("Looks like a feed; items will be collected from it".to_string()),
        _ => None,
    };

    Detection {
        source: Some(source),
        confidence,
        normalized_url: normalized,
        is_valid: true,
        item_id: ids.item_id,
        shop_id: ids.shop_id,
        error: None,
        suggestion,
    }
}

fn classify(registry: &SourceRegistry, normalized: &str, parsed: &Url) -> (SourceId, f32) {
    let enabled = registry.list_enabled();

    for config in &enabled {
        if let Some(confidence) = pattern_confidence(registry.rules(config.id), normalized) {
            return (config.id, confidence);
        }
    }

    if let Some(host) = parsed.host_str() {
        if let Some(config) = enabled.iter().find(|c| c.matches_host(host)) {
            return (config.id, DOMAIN_CONFIDENCE);
        }
    }

    let rss_enabled = enabled.iter().any(|c| c.kind == SourceKind::Feed);
    if rss_enabled && looks_like_feed(parsed) {
        return (SourceId::Rss, FEED_CONFIDENCE);
    }

    (SourceId::Custom, CUSTOM_CONFIDENCE)
}

fn pattern_confidence(rules: Option<&CompiledRules>, url: &str) -> Option<f32> {
    rules?
        .url_patterns
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map(|(_, confidence)| *confidence)
}

/// Confidence that `normalized_url` belongs to `source`, using the same
/// evidence ladder as [`detect`] but restricted to that one source. Used when
/// a reviewer overrides the detected platform.
pub fn score_for(registry: &SourceRegistry, source: SourceId, normalized_url: &str) -> f32 {
    let Ok(parsed) = Url::parse(normalized_url) else {
        return CUSTOM_CONFIDENCE;
    };
    if let Some(confidence) = pattern_confidence(registry.rules(source), normalized_url) {
        return confidence;
    }
    let host_matches = registry
        .lookup(source)
        .zip(parsed.host_str())
        .is_some_and(|(config, host)| config.matches_host(host));
    if host_matches {
        return DOMAIN_CONFIDENCE;
    }
    if source == SourceId::Rss && looks_like_feed(&parsed) {
        return FEED_CONFIDENCE;
    }
    CUSTOM_CONFIDENCE
}

/// Path shaped like a syndication feed.
pub fn looks_like_feed(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    let by_extension = [".rss", ".xml", ".atom"].iter().any(|ext| path.ends_with(ext));
    let by_segment = path
        .split('/')
        .any(|segment| matches!(segment, "feed" | "feeds" | "rss" | "atom"));
    by_extension || by_segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{commerce, generic};

    #[test]
    fn test_taobao_item_detected_with_high_confidence() {
        let detection = detect("https://item.taobao.com/item.htm?id=123456789");
        assert!(detection.is_valid);
        assert_eq!(detection.source, Some(SourceId::Taobao));
        assert!(detection.confidence >= 0.9);
        assert_eq!(detection.item_id.as_deref(), Some("123456789"));
    }

    #[test]
    fn test_taobao_shop_detected() {
        let detection = detect("https://shop123456.taobao.com/");
        assert_eq!(detection.source, Some(SourceId::Taobao));
        assert!(detection.confidence >= 0.9);
        assert_eq!(detection.shop_id.as_deref(), Some("123456"));
    }

    #[test]
    fn test_pattern_matches_score_at_least_point_nine() {
        let urls = [
            ("https://detail.tmall.com/item.htm?id=6001", SourceId::Tmall),
            ("https://item.jd.com/100012043978.html", SourceId::Jd),
            ("https://item.360buy.com/1000.html", SourceId::Jd),
            ("https://detail.1688.com/offer/612345.html", SourceId::Alibaba1688),
            ("https://mobile.yangkeduo.com/goods.html?goods_id=1", SourceId::Pinduoduo),
            ("https://haohuo.jinritemai.com/views/product/item2?id=3", SourceId::Douyin),
            ("https://www.aliexpress.com/item/1005001.html", SourceId::Aliexpress),
            ("https://www.thepaper.cn/newsDetail_forward_2718", SourceId::ThePaper),
            ("https://www.caixin.com/2024-05-01/102192.html", SourceId::Caixin),
            ("https://36kr.com/p/2745", SourceId::Kr36),
            ("https://www.huxiu.com/article/3001.html", SourceId::Huxiu),
            ("https://news.sina.com.cn/c/2024-05-01/doc-inauxyz.shtml", SourceId::Sina),
            ("https://www.sohu.com/a/7788_1234", SourceId::Sohu),
            ("https://www.163.com/news/article/J0ABCDEF00019K82.html", SourceId::Netease),
            ("https://news.ifeng.com/c/8Zabc", SourceId::Ifeng),
        ];
        for (url, expected) in urls {
            let detection = detect(url);
            assert_eq!(detection.source, Some(expected), "{url}");
            assert!(detection.confidence >= 0.9, "{url}: {}", detection.confidence);
        }
    }

    #[test]
    fn test_bare_domain_scores_domain_confidence() {
        let urls = [
            ("https://www.taobao.com/", SourceId::Taobao),
            ("https://www.jd.com", SourceId::Jd),
            ("https://www.360buy.com/", SourceId::Jd),
            ("https://yangkeduo.com/", SourceId::Pinduoduo),
            ("https://www.thepaper.cn/", SourceId::ThePaper),
            ("https://news.sina.com.cn/", SourceId::Sina),
        ];
        for (url, expected) in urls {
            let detection = detect(url);
            assert_eq!(detection.source, Some(expected), "{url}");
            assert!(
                (0.6..0.8).contains(&detection.confidence),
                "{url}: {}",
                detection.confidence
            );
        }
    }

    #[test]
    fn test_unknown_site_is_custom_and_valid() {
        for url in ["https://blog.example.org/posts/1", "example.net/shop", "http://127.0.0.1:8080/a"] {
            let detection = detect(url);
            assert!(detection.is_valid, "{url}");
            assert_eq!(detection.source, Some(SourceId::Custom), "{url}");
            assert!(detection.confidence <= 0.3, "{url}");
            assert!(detection.suggestion.is_some());
        }
    }

    #[test]
    fn test_feed_shaped_urls_are_rss() {
        for url in [
            "https://blog.example.org/feed",
            "https://example.org/index.xml",
            "https://example.org/rss/all.rss",
            "https://news.example.org/atom",
        ] {
            let detection = detect(url);
            assert_eq!(detection.source, Some(SourceId::Rss), "{url}");
            assert!((detection.confidence - FEED_CONFIDENCE).abs() < 1e-6);
        }
    }

    #[test]
    fn test_malformed_input_is_invalid_not_panic() {
        for url in ["", "not a url", "ftp://example.com/file", "http://"] {
            let detection = detect(url);
            assert!(!detection.is_valid, "{url}");
            assert_eq!(detection.source, None);
            assert!(detection.error.is_some());
        }
    }

    #[test]
    fn test_scheme_less_input_is_coerced() {
        let detection = detect("item.jd.com/100012043978.html");
        assert!(detection.is_valid);
        assert_eq!(detection.source, Some(SourceId::Jd));
        assert_eq!(detection.normalized_url, "https://item.jd.com/100012043978.html");
    }

    #[test]
    fn test_disabled_sources_are_skipped() {
        let mut sources = commerce::sources();
        for source in &mut sources {
            if source.id == SourceId::Taobao {
                source.enabled = false;
            }
        }
        sources.push(generic::custom());
        let registry = SourceRegistry::new(sources);
        let detection = detect_with(&registry, "https://item.taobao.com/item.htm?id=1");
        assert_eq!(detection.source, Some(SourceId::Custom));
    }

    #[test]
    fn test_score_for_matches_detect_ladder() {
        let registry = registry();
        let url = "https://item.jd.com/100012043978.html";
        assert!(score_for(registry, SourceId::Jd, url) >= 0.9);
        assert!((score_for(registry, SourceId::Taobao, url) - CUSTOM_CONFIDENCE).abs() < 1e-6);
        assert!(
            (score_for(registry, SourceId::Jd, "https://www.jd.com/") - DOMAIN_CONFIDENCE).abs()
                < 1e-6
        );
    }
}
