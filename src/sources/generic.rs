//! Catch-all declarations for RSS feeds and unrecognised sites.
//!
//! Both carry only structural selectors (`article`, `main`, common CMS class
//! names, Open Graph meta tags) since nothing is known about the markup ahead
//! of time.

use super::{CleaningRules, FieldSelectors, SourceConfig, SourceId, SourceKind};

const GENERIC_SELECTORS: FieldSelectors = FieldSelectors {
    title: &[
        "meta[property='og:title']",
        "article h1",
        "h1.entry-title",
        "h1.post-title",
        "h1",
        "title",
    ],
    content: &[
        "article .entry-content",
        "article .post-content",
        ".entry-content",
        ".post-content",
        ".article-content",
        ".article-body",
        "[itemprop='articleBody']",
        "article",
        "main",
        "#content",
    ],
    excerpt: &["meta[name='description']", "meta[property='og:description']", ".entry-summary"],
    author: &[
        "meta[name='author']",
        "[rel='author']",
        "[itemprop='author']",
        ".author-name",
        ".byline",
        ".author",
    ],
    publish_date: &[
        "meta[property='article:published_time']",
        "time[datetime]",
        "[itemprop='datePublished']",
        ".published",
        ".post-date",
    ],
    tags: &["meta[property='article:tag']", "a[rel='tag']", ".tags a", "meta[name='keywords']"],
    category: &["meta[property='article:section']", ".category a", ".breadcrumb a:last-child"],
    featured_image: &["meta[property='og:image']", "meta[name='twitter:image']", "article img"],
    images: &["article img", "main img", ".entry-content img"],
    price: &[
        "meta[property='product:price:amount']",
        "[itemprop='price']",
        ".price",
    ],
};

const GENERIC_CLEANING: CleaningRules = CleaningRules {
    remove: &[
        "script",
        "style",
        "noscript",
        "iframe",
        "nav",
        "aside",
        "footer",
        "header",
        "form",
        ".share",
        ".sharing",
        ".social",
        ".ad",
        ".ads",
        ".advertisement",
        ".related",
        ".comments",
        "#comments",
    ],
    min_content_length: 100,
    max_content_length: 100_000,
    clean_html: true,
    plain_text: false,
};

pub fn rss() -> SourceConfig {
    SourceConfig::new(SourceId::Rss, "RSS Feed", SourceKind::Feed)
        .rate_limit(60)
        .selectors(GENERIC_SELECTORS)
        .cleaning(GENERIC_CLEANING)
}

pub fn custom() -> SourceConfig {
    SourceConfig::new(SourceId::Custom, "Custom Site", SourceKind::Custom)
        .rate_limit(30)
        .shop_patterns(&[
            r"/(?:shop|store|mall|seller)s?(?:/|$|\?)",
            r"/(?:category|collections?)/",
        ])
        .selectors(GENERIC_SELECTORS)
        .cleaning(GENERIC_CLEANING)
}
