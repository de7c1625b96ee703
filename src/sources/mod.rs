//! Static registry of supported commerce platforms and news outlets.
//!
//! Each supported source is described once, as data, by a [`SourceConfig`]:
//! the domains it lives on (including historical aliases), the URL shapes that
//! identify it, the selectors used to pull fields out of its pages, the
//! request headers it expects, and how its content should be cleaned.
//! Detection, intent classification, fetching and extraction all read from
//! this table; none of them branch on a specific source.
//!
//! # Supported Sources
//!
//! | Kind | Module | Sources |
//! |------|--------|---------|
//! | Commerce | [`commerce`] | Taobao, Tmall, JD, 1688, Pinduoduo, Douyin, AliExpress |
//! | News | [`news`] | The Paper, Caixin, 36Kr, Huxiu, Sina, Sohu, NetEase, iFeng |
//! | Generic | [`generic`] | RSS feeds and unrecognised "custom" sites |
//!
//! The registry is built once on first use and is immutable afterwards.

pub mod commerce;
pub mod generic;
pub mod news;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::error;

/// Closed set of source identifiers shared with the task system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "taobao")]
    Taobao,
    #[serde(rename = "tmall")]
    Tmall,
    #[serde(rename = "jd")]
    Jd,
    #[serde(rename = "1688")]
    Alibaba1688,
    #[serde(rename = "pinduoduo")]
    Pinduoduo,
    #[serde(rename = "douyin")]
    Douyin,
    #[serde(rename = "aliexpress")]
    Aliexpress,
    #[serde(rename = "thepaper")]
    ThePaper,
    #[serde(rename = "caixin")]
    Caixin,
    #[serde(rename = "36kr")]
    Kr36,
    #[serde(rename = "huxiu")]
    Huxiu,
    #[serde(rename = "sina")]
    Sina,
    #[serde(rename = "sohu")]
    Sohu,
    #[serde(rename = "netease")]
    Netease,
    #[serde(rename = "ifeng")]
    Ifeng,
    #[serde(rename = "rss")]
    Rss,
    #[serde(rename = "custom")]
    Custom,
}

impl SourceId {
    pub const ALL: [SourceId; 17] = [
        SourceId::Taobao,
        SourceId::Tmall,
        SourceId::Jd,
        SourceId::Alibaba1688,
        SourceId::Pinduoduo,
        SourceId::Douyin,
        SourceId::Aliexpress,
        SourceId::ThePaper,
        SourceId::Caixin,
        SourceId::Kr36,
        SourceId::Huxiu,
        SourceId::Sina,
        SourceId::Sohu,
        SourceId::Netease,
        SourceId::Ifeng,
        SourceId::Rss,
        SourceId::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Taobao => "taobao",
            SourceId::Tmall => "tmall",
            SourceId::Jd => "jd",
            SourceId::Alibaba1688 => "1688",
            SourceId::Pinduoduo => "pinduoduo",
            SourceId::Douyin => "douyin",
            SourceId::Aliexpress => "aliexpress",
            SourceId::ThePaper => "thepaper",
            SourceId::Caixin => "caixin",
            SourceId::Kr36 => "36kr",
            SourceId::Huxiu => "huxiu",
            SourceId::Sina => "sina",
            SourceId::Sohu => "sohu",
            SourceId::Netease => "netease",
            SourceId::Ifeng => "ifeng",
            SourceId::Rss => "rss",
            SourceId::Custom => "custom",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| format!("unknown source '{}'", s))
    }
}

/// Broad family a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Commerce,
    News,
    Feed,
    Custom,
}

/// A URL regex that identifies a source, with the confidence a match earns.
#[derive(Debug, Clone, Copy)]
pub struct UrlPattern {
    pub regex: &'static str,
    pub confidence: f32,
}

/// Ordered selector lists, one per extracted field. Earlier entries win.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSelectors {
    pub title: &'static [&'static str],
    pub content: &'static [&'static str],
    pub excerpt: &'static [&'static str],
    pub author: &'static [&'static str],
    pub publish_date: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub category: &'static [&'static str],
    pub featured_image: &'static [&'static str],
    pub images: &'static [&'static str],
    pub price: &'static [&'static str],
}

/// How extracted content is cleaned and bounded.
#[derive(Debug, Clone, Copy)]
pub struct CleaningRules {
    /// Selectors stripped from the content subtree before extraction.
    pub remove: &'static [&'static str],
    pub min_content_length: usize,
    pub max_content_length: usize,
    /// Drop script/style/comment nodes and collapse whitespace.
    pub clean_html: bool,
    /// Reduce content to plain text instead of keeping markup.
    pub plain_text: bool,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            remove: &[],
            min_content_length: 100,
            max_content_length: 50_000,
            clean_html: true,
            plain_text: false,
        }
    }
}

/// Everything the engine knows about one source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub id: SourceId,
    pub name: &'static str,
    pub kind: SourceKind,
    pub base_urls: &'static [&'static str],
    /// Registrable domains, current and historical. A host matches when it
    /// equals one of these or is a subdomain of one.
    pub domains: &'static [&'static str],
    pub enabled: bool,
    /// Requests per minute.
    pub rate_limit: u32,
    pub url_patterns: &'static [UrlPattern],
    pub product_patterns: &'static [&'static str],
    pub shop_patterns: &'static [&'static str],
    pub item_id_patterns: &'static [&'static str],
    pub shop_id_patterns: &'static [&'static str],
    pub selectors: FieldSelectors,
    pub headers: &'static [(&'static str, &'static str)],
    /// Forced `Accept-Language` for locale-sensitive sources.
    pub accept_language: Option<&'static str>,
    pub cleaning: CleaningRules,
}

impl SourceConfig {
    /// Start a declaration with conservative defaults: enabled, 30 requests
    /// per minute, no patterns and default cleaning.
    pub fn new(id: SourceId, name: &'static str, kind: SourceKind) -> Self {
        Self {
            id,
            name,
            kind,
            base_urls: &[],
            domains: &[],
            enabled: true,
            rate_limit: 30,
            url_patterns: &[],
            product_patterns: &[],
            shop_patterns: &[],
            item_id_patterns: &[],
            shop_id_patterns: &[],
            selectors: FieldSelectors::default(),
            headers: &[],
            accept_language: None,
            cleaning: CleaningRules::default(),
        }
    }

    pub fn base_urls(mut self, base_urls: &'static [&'static str]) -> Self {
        self.base_urls = base_urls;
        self
    }

    pub fn domains(mut self, domains: &'static [&'static str]) -> Self {
        self.domains = domains;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = per_minute;
        self
    }

    pub fn url_patterns(mut self, patterns: &'static [UrlPattern]) -> Self {
        self.url_patterns = patterns;
        self
    }

    pub fn product_patterns(mut self, patterns: &'static [&'static str]) -> Self {
        self.product_patterns = patterns;
        self
    }

    pub fn shop_patterns(mut self, patterns: &'static [&'static str]) -> Self {
        self.shop_patterns = patterns;
        self
    }

    pub fn item_id_patterns(mut self, patterns: &'static [&'static str]) -> Self {
        self.item_id_patterns = patterns;
        self
    }

    pub fn shop_id_patterns(mut self, patterns: &'static [&'static str]) -> Self {
        self.shop_id_patterns = patterns;
        self
    }

    pub fn selectors(mut self, selectors: FieldSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn headers(mut self, headers: &'static [(&'static str, &'static str)]) -> Self {
        self.headers = headers;
        self
    }

    pub fn accept_language(mut self, value: &'static str) -> Self {
        self.accept_language = Some(value);
        self
    }

    pub fn cleaning(mut self, cleaning: CleaningRules) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// True when `host` is one of this source's domains or a subdomain of one.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || (host.len() > domain.len()
                    && host.ends_with(domain)
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        })
    }
}

/// Regexes compiled from one source's pattern lists.
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub url_patterns: Vec<(Regex, f32)>,
    pub product: Vec<Regex>,
    pub shop: Vec<Regex>,
    pub item_id: Vec<Regex>,
    pub shop_id: Vec<Regex>,
}

impl CompiledRules {
    fn compile(config: &SourceConfig) -> Self {
        Self {
            url_patterns: config
                .url_patterns
                .iter()
                .filter_map(|p| compile_one(config.id, p.regex).map(|re| (re, p.confidence)))
                .collect(),
            product: compile_all(config.id, config.product_patterns),
            shop: compile_all(config.id, config.shop_patterns),
            item_id: compile_all(config.id, config.item_id_patterns),
            shop_id: compile_all(config.id, config.shop_id_patterns),
        }
    }
}

fn compile_one(id: SourceId, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            error!(source = %id, pattern, error = %e, "Invalid source pattern; ignoring");
            None
        }
    }
}

fn compile_all(id: SourceId, patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| compile_one(id, p)).collect()
}

/// Lookup table from [`SourceId`] to configuration and compiled rules.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<SourceConfig>,
    rules: HashMap<SourceId, CompiledRules>,
    custom: SourceConfig,
}

static REGISTRY: Lazy<SourceRegistry> = Lazy::new(SourceRegistry::builtin);

/// The process-wide built-in registry.
pub fn registry() -> &'static SourceRegistry {
    &REGISTRY
}

impl SourceRegistry {
    /// Build a registry from declarations. Order is significant: detection
    /// tries sources in the order given.
    pub fn new(sources: Vec<SourceConfig>) -> Self {
        let rules = sources
            .iter()
            .map(|config| (config.id, CompiledRules::compile(config)))
            .collect();
        let custom = sources
            .iter()
            .find(|c| c.id == SourceId::Custom)
            .cloned()
            .unwrap_or_else(generic::custom);
        Self {
            sources,
            rules,
            custom,
        }
    }

    /// Commerce platforms first, then news outlets, then the generic entries.
    pub fn builtin() -> Self {
        let mut sources = commerce::sources();
        sources.extend(news::sources());
        sources.push(generic::rss());
        sources.push(generic::custom());
        Self::new(sources)
    }

    pub fn lookup(&self, id: SourceId) -> Option<&SourceConfig> {
        self.sources.iter().find(|c| c.id == id)
    }

    /// Configuration for `id`, or the generic custom configuration when the
    /// source is unknown to this registry.
    pub fn config_or_custom(&self, id: SourceId) -> &SourceConfig {
        self.lookup(id).unwrap_or(&self.custom)
    }

    pub fn list_enabled(&self) -> Vec<&SourceConfig> {
        self.sources.iter().filter(|c| c.enabled).collect()
    }

    pub fn rules(&self, id: SourceId) -> Option<&CompiledRules> {
        self.rules.get(&id)
    }
}
