//! URL normalization.
//!
//! Normalized URLs keep only the query parameters that identify an item,
//! shop or mall, and never carry a fragment. Tracking parameters (`spm`,
//! `utm_*`, `scm`, ...) are dropped so the same item pasted from different
//! places normalizes to the same string.
//!
//! Normalized URLs identify a page; they are not what gets requested. Sites
//! routinely address articles with query ids outside the kept set (`?p=42`,
//! `?aid=1001`), so requests go to [`fetch_target`] instead.

use url::Url;

/// Query parameters that carry identifiers and survive normalization.
pub const KEPT_PARAMS: &[&str] = &[
    "id",
    "item_id",
    "itemId",
    "goods_id",
    "goodsId",
    "shop_id",
    "shopId",
    "user_id",
    "userId",
    "mall_id",
    "mallId",
    "memberId",
    "product_id",
    "productId",
    "sku_id",
    "skuId",
];

/// Normalize a URL, or return the input unchanged when it cannot be parsed.
///
/// # Examples
///
/// ```
/// use storefront_harvest::normalize::normalize;
///
/// assert_eq!(
///     normalize("https://item.taobao.com/item.htm?spm=a1z10&id=42#detail"),
///     "https://item.taobao.com/item.htm?id=42"
/// );
/// assert_eq!(normalize("not a url"), "not a url");
/// ```
pub fn normalize(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url.trim()) else {
        return url.to_string();
    };
    parsed.set_fragment(None);

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| KEPT_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
    parsed.to_string()
}

/// Turn user input into an absolute http(s) URL string.
///
/// Bare domains (`item.jd.com/100.html`) and protocol-relative links
/// (`//item.jd.com/100.html`) get an `https://` scheme. Returns `None` for
/// input that still does not describe an http(s) URL with a dotted host.
pub fn coerce_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    if let Ok(parsed) = Url::parse(trimmed) {
        if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() {
            return Some(trimmed.to_string());
        }
    }
    if trimmed.contains("://") {
        return None;
    }

    let candidate = match trimmed.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => format!("https://{}", trimmed),
    };
    let parsed = Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?;
    if host.contains('.') && !host.starts_with('.') && !host.ends_with('.') {
        Some(candidate)
    } else {
        None
    }
}

/// URL to request for raw input: coerced to http(s), fragment removed, query
/// kept as given.
///
/// # Examples
///
/// ```
/// use storefront_harvest::normalize::fetch_target;
///
/// assert_eq!(
///     fetch_target("blog.example.com/index.php?p=42#comments").as_deref(),
///     Some("https://blog.example.com/index.php?p=42")
/// );
/// ```
pub fn fetch_target(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(&coerce_url(raw)?).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}
