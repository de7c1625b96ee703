//! # Storefront Harvest
//!
//! URL classification and content extraction for Chinese e-commerce platforms,
//! Chinese news portals, RSS/Atom feeds and arbitrary sites.
//!
//! Given raw, possibly messy URLs, the crate normalizes them, works out which
//! platform or news source each belongs to and whether it points at a single
//! item or a listing, then fetches the page and extracts a normalized
//! [`CollectedRecord`](models::CollectedRecord) using per-source selector
//! rules with ordered fallbacks.
//!
//! ## Data flow
//!
//! ```text
//! raw URL ─► normalize ─► detect ─► intent ─► fetch ─► extract ─► validate ─► record
//!                 │                                       ▲
//!                 └──── sources (selectors, patterns) ────┘
//! feed URL ─► fetch ─► rss ─► per item: fetch+extract, or feed fallback
//! ```
//!
//! ## Example
//!
//! ```
//! use storefront_harvest::detect::detect;
//! use storefront_harvest::sources::SourceId;
//!
//! let detection = detect("item.jd.com/100012043978.html?utm_source=x#top");
//! assert_eq!(detection.source, Some(SourceId::Jd));
//! assert_eq!(detection.normalized_url, "https://item.jd.com/100012043978.html");
//! assert_eq!(detection.item_id.as_deref(), Some("100012043978"));
//! ```

pub mod batch;
pub mod collector;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod intent;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod rss;
pub mod sources;
pub mod utils;
