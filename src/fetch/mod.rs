//! HTTP retrieval of pages and feeds.
//!
//! # Architecture
//!
//! - [`PageSource`]: the async seam the collector fetches through
//! - [`HtmlFetcher`]: `reqwest`-backed implementation with per-source headers
//!   and a hard request timeout
//! - [`RetryFetch`]: decorator adding exponential backoff for retryable
//!   failures
//! - [`Throttle`]: per-source delay scheduler
//!
//! Non-2xx responses never surface as raw codes: 403, 404 and 429 map onto
//! dedicated [`FetchError`] variants, anything else onto
//! [`FetchError::Status`].

pub mod retry;
pub mod throttle;

pub use retry::RetryFetch;
pub use throttle::Throttle;

use crate::config::CollectorConfig;
use crate::error::FetchError;
use crate::sources::SourceConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("DNT", "1"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Something that can retrieve a page body for a source.
///
/// The returned future carries no `Send` bound. The collector awaits fetches
/// on the calling task and never spawns them, so non-`Send` sources (test
/// fakes holding a `RefCell`, say) work. Callers that spawn onto a
/// multi-threaded runtime should hold a concrete source such as
/// [`HtmlFetcher`], whose future is `Send`.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetch `url` with `source`'s request profile.
    ///
    /// # Returns
    ///
    /// The response body on a 2xx status, or a classified [`FetchError`].
    async fn fetch(&self, url: &str, source: &SourceConfig) -> Result<String, FetchError>;
}

/// Request headers for `source`: global defaults, then the source's own
/// headers (replacing defaults case-insensitively), then its forced
/// `Accept-Language`.
pub fn request_headers(source: &SourceConfig, user_agent: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    headers.push(("User-Agent".to_string(), user_agent.to_string()));

    let overrides = source
        .headers
        .iter()
        .copied()
        .chain(source.accept_language.map(|lang| ("Accept-Language", lang)));
    for (name, value) in overrides {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.1 = value.to_string(),
            None => headers.push((name.to_string(), value.to_string())),
        }
    }
    headers
}

fn header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid request header"),
        }
    }
    map
}

/// `reqwest`-backed [`PageSource`].
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl HtmlFetcher {
    /// # Errors
    ///
    /// [`FetchError::Client`] when the TLS backend or client cannot be built.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn from_config(config: &CollectorConfig) -> Result<Self, FetchError> {
        Self::new(config.timeout(), &config.user_agent)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else if e.is_builder() {
            FetchError::Client(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl PageSource for HtmlFetcher {
    #[instrument(level = "info", skip(self, source), fields(source = %source.id))]
    async fn fetch(&self, url: &str, source: &SourceConfig) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let headers = header_map(&request_headers(source, &self.user_agent));

        // The whole exchange, body included, is bounded by the timeout; the
        // request future is dropped (and its connection released) on expiry.
        let exchange = async {
            let response = self
                .client
                .get(url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| self.classify(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::from_status(status.as_u16()));
            }
            response.text().await.map_err(|e| self.classify(e))
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_secs())),
        };

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &result {
            Ok(body) => info!(bytes = body.len(), elapsed_ms, "Fetched page"),
            Err(e) => warn!(kind = ?e.kind(), error = %e, elapsed_ms, "Fetch failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{registry, SourceId};

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_html_fetcher_future_is_send() {
        let fetcher = HtmlFetcher::new(Duration::from_secs(1), "test-agent").unwrap();
        let custom = registry().config_or_custom(SourceId::Custom);
        let future = fetcher.fetch("http://127.0.0.1:9/", custom);
        assert_send(&future);
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_defaults_present_for_custom_source() {
        let custom = registry().config_or_custom(SourceId::Custom);
        let headers = request_headers(custom, "test-agent");
        for name in ["Accept", "Accept-Language", "Accept-Encoding", "DNT", "Connection", "Upgrade-Insecure-Requests"] {
            assert!(header(&headers, name).is_some(), "{name}");
        }
        assert_eq!(header(&headers, "user-agent"), Some("test-agent"));
    }

    #[test]
    fn test_locale_sensitive_source_forces_accept_language() {
        let aliexpress = registry().config_or_custom(SourceId::Aliexpress);
        let headers = request_headers(aliexpress, DEFAULT_USER_AGENT);
        assert_eq!(header(&headers, "Accept-Language"), aliexpress.accept_language);
        let count = headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("accept-language"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_source_headers_are_merged() {
        let taobao = registry().config_or_custom(SourceId::Taobao);
        let headers = request_headers(taobao, DEFAULT_USER_AGENT);
        for (name, value) in taobao.headers {
            assert_eq!(header(&headers, name), Some(*value));
        }
    }

    #[test]
    fn test_header_map_skips_invalid_entries() {
        let headers = vec![
            ("X-Ok".to_string(), "yes".to_string()),
            ("Bad Header".to_string(), "v".to_string()),
            ("X-Bad-Value".to_string(), "line\nbreak".to_string()),
        ];
        let map = header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "yes");
    }
}
