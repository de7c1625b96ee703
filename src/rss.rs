//! Tolerant RSS 2.0 and Atom parsing.
//!
//! Real-world feeds are frequently not well-formed XML: stray `&`, HTML
//! fragments in descriptions, unclosed CDATA. Instead of a strict XML parse,
//! feeds are read with regexes that accept CDATA-wrapped and plain text alike,
//! so one bad item costs only that item.
//!
//! - Channel metadata comes from the part of the document before the first
//!   item.
//! - `<item>` blocks are read in document order, up to a caller-supplied cap.
//! - A feed with no `<item>` blocks is read as Atom (`<entry>` blocks).
//! - An item with neither a title nor a link is skipped with a warning.

use crate::error::FeedError;
use crate::models::{Feed, RssItem};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Items read from one feed unless configured otherwise.
pub const DEFAULT_MAX_ITEMS: usize = 50;

static ITEM: Lazy<Regex> = Lazy::new(|| static_regex(r"(?is)<item\b[^>]*>(.*?)</item\s*>"));
static ENTRY: Lazy<Regex> = Lazy::new(|| static_regex(r"(?is)<entry\b[^>]*>(.*?)</entry\s*>"));
static FIRST_BLOCK: Lazy<Regex> = Lazy::new(|| static_regex(r"(?i)<(?:item|entry)\b"));
static FEED_ROOT: Lazy<Regex> = Lazy::new(|| static_regex(r"(?i)<(?:rss|feed|channel|rdf:RDF)\b"));
static CDATA: Lazy<Regex> = Lazy::new(|| static_regex(r"(?s)<!\[CDATA\[(.*?)(?:\]\]>|$)"));
static ATOM_LINK: Lazy<Regex> = Lazy::new(|| static_regex(r#"(?i)<link\b([^>]*)/?>"#));
static HREF: Lazy<Regex> = Lazy::new(|| static_regex(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#));
static REL: Lazy<Regex> = Lazy::new(|| static_regex(r#"(?i)\brel\s*=\s*["']([^"']+)["']"#));
static TERM: Lazy<Regex> =
    Lazy::new(|| static_regex(r#"(?i)<category\b[^>]*\bterm\s*=\s*["']([^"']+)["'][^>]*>"#));

/// Element regexes by tag name, compiled once.
static TAGS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    [
        "title", "link", "description", "pubDate", "author", "dc:creator", "category", "guid",
        "summary", "content", "content:encoded", "published", "updated", "name", "dc:date",
    ]
    .into_iter()
    .map(|tag| (tag, element_regex(tag)))
    .collect()
});

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static feed pattern")
}

fn element_regex(tag: &str) -> Regex {
    static_regex(&format!(
        r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>",
        tag = regex::escape(tag)
    ))
}

fn tag_regex(tag: &str) -> Cow<'static, Regex> {
    match TAGS.get(tag) {
        Some(re) => Cow::Borrowed(re),
        None => Cow::Owned(element_regex(tag)),
    }
}

/// Unwrap CDATA sections, or decode XML entities when there are none. Text
/// with undecodable entities (`&nbsp;` and friends) is kept as is.
fn clean_text(raw: &str) -> String {
    let text = if raw.contains("<![CDATA[") {
        CDATA.replace_all(raw, "$1").into_owned()
    } else {
        match quick_xml::escape::unescape(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        }
    };
    text.trim().to_string()
}

/// Text of the first `<tag>` element in `block`, if non-empty.
fn tag_text(block: &str, tag: &str) -> Option<String> {
    tag_regex(tag)
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|text| !text.is_empty())
}

fn all_tag_texts(block: &str, tag: &str) -> Vec<String> {
    tag_regex(tag)
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|text| !text.is_empty())
        .collect()
}

/// First Atom `<link href>` that is an alternate (or untyped) link.
fn atom_link(block: &str) -> Option<String> {
    ATOM_LINK.captures_iter(block).find_map(|caps| {
        let attrs = caps.get(1)?.as_str();
        let rel = REL.captures(attrs).and_then(|c| c.get(1)).map(|m| m.as_str());
        if rel.is_some_and(|r| !r.eq_ignore_ascii_case("alternate")) {
            return None;
        }
        HREF.captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
    })
}

fn is_http(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

fn parse_rss_item(block: &str) -> RssItem {
    let link = tag_text(block, "link")
        .filter(|l| is_http(l))
        .or_else(|| tag_text(block, "guid").filter(|g| is_http(g)));
    RssItem {
        title: tag_text(block, "title").unwrap_or_default(),
        link,
        description: tag_text(block, "description")
            .or_else(|| tag_text(block, "content:encoded"))
            .unwrap_or_default(),
        pub_date: tag_text(block, "pubDate").or_else(|| tag_text(block, "dc:date")),
        author: tag_text(block, "author").or_else(|| tag_text(block, "dc:creator")),
        categories: all_tag_texts(block, "category"),
    }
}

fn parse_atom_entry(block: &str) -> RssItem {
    let author = tag_text(block, "author").map(|author| tag_text(&author, "name").unwrap_or(author));
    let mut categories: Vec<String> = TERM
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .collect();
    categories.extend(all_tag_texts(block, "category"));
    RssItem {
        title: tag_text(block, "title").unwrap_or_default(),
        link: atom_link(block).filter(|l| is_http(l)),
        description: tag_text(block, "summary")
            .or_else(|| tag_text(block, "content"))
            .unwrap_or_default(),
        pub_date: tag_text(block, "published").or_else(|| tag_text(block, "updated")),
        author,
        categories,
    }
}

/// Parse a feed body, keeping at most `max_items` item blocks.
///
/// # Errors
///
/// - [`FeedError::Malformed`] when the body has no RSS or Atom root at all
/// - [`FeedError::NoItems`] when it is a feed but no item survived parsing
pub fn parse_feed(xml: &str, max_items: usize) -> Result<Feed, FeedError> {
    let header_end = FIRST_BLOCK.find(xml).map_or(xml.len(), |m| m.start());
    let header = &xml[..header_end];

    let mut blocks: Vec<&str> = ITEM
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .take(max_items)
        .collect();
    let atom = blocks.is_empty();
    if atom {
        blocks = ENTRY
            .captures_iter(xml)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .take(max_items)
            .collect();
    }

    if blocks.is_empty() {
        return Err(if FEED_ROOT.is_match(xml) {
            FeedError::NoItems
        } else {
            warn!(preview = %truncate_for_log(xml.trim(), 200), "Body is not a feed");
            FeedError::Malformed("document has no rss or atom root element".to_string())
        });
    }

    let mut items = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.into_iter().enumerate() {
        let item = if atom {
            parse_atom_entry(block)
        } else {
            parse_rss_item(block)
        };
        if item.title.is_empty() && item.link.is_none() {
            warn!(index, "Skipping feed item with neither title nor link");
            continue;
        }
        items.push(item);
    }
    if items.is_empty() {
        return Err(FeedError::NoItems);
    }

    let feed = Feed {
        title: tag_text(header, "title").unwrap_or_default(),
        description: tag_text(header, "description")
            .or_else(|| tag_text(header, "subtitle"))
            .unwrap_or_default(),
        link: tag_text(header, "link")
            .filter(|l| is_http(l))
            .or_else(|| atom_link(header))
            .unwrap_or_default(),
        items,
    };
    debug!(title = %feed.title, items = feed.items.len(), atom, "Parsed feed");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title><![CDATA[Example News]]></title>
  <link>https://news.example.com/</link>
  <description>Latest &amp; greatest</description>
  <item>
    <title><![CDATA[First <b>story</b>]]></title>
    <link>https://news.example.com/1</link>
    <description><![CDATA[<p>Body of the first story.</p>]]></description>
    <pubDate>Wed, 01 May 2024 08:30:00 +0000</pubDate>
    <dc:creator>Li Lei</dc:creator>
    <category>tech</category>
    <category>ai</category>
  </item>
  <item>
    <description>orphan description with no title or link</description>
  </item>
  <item>
    <title>Tom &amp; Jerry return</title>
    <guid isPermaLink="true">https://news.example.com/3</guid>
    <author>editor@example.com</author>
  </item>
</channel>
</rss>"#;

    #[test]
    fn test_channel_metadata() {
        let feed = parse_feed(RSS, DEFAULT_MAX_ITEMS).unwrap();
        assert_eq!(feed.title, "Example News");
        assert_eq!(feed.link, "https://news.example.com/");
        assert_eq!(feed.description, "Latest & greatest");
    }

    #[test]
    fn test_items_in_order_with_malformed_skipped() {
        let feed = parse_feed(RSS, DEFAULT_MAX_ITEMS).unwrap();
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.title, "First <b>story</b>");
        assert_eq!(first.link.as_deref(), Some("https://news.example.com/1"));
        assert_eq!(first.description, "<p>Body of the first story.</p>");
        assert_eq!(first.pub_date.as_deref(), Some("Wed, 01 May 2024 08:30:00 +0000"));
        assert_eq!(first.author.as_deref(), Some("Li Lei"));
        assert_eq!(first.categories, vec!["tech", "ai"]);

        let second = &feed.items[1];
        assert_eq!(second.title, "Tom & Jerry return");
        assert_eq!(second.link.as_deref(), Some("https://news.example.com/3"));
        assert_eq!(second.author.as_deref(), Some("editor@example.com"));
    }

    #[test]
    fn test_item_cap_keeps_document_order() {
        let items: String = (0..60)
            .map(|i| format!("<item><title>Item {i}</title><link>https://e.com/{i}</link></item>"))
            .collect();
        let xml = format!("<rss><channel><title>Big</title>{items}</channel></rss>");
        let feed = parse_feed(&xml, DEFAULT_MAX_ITEMS).unwrap();
        assert_eq!(feed.items.len(), 50);
        assert_eq!(feed.items[0].title, "Item 0");
        assert_eq!(feed.items[49].title, "Item 49");
    }

    #[test]
    fn test_atom_entries() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Blog</title>
  <subtitle>Notes</subtitle>
  <link href="https://blog.example.org/" rel="alternate"/>
  <link href="https://blog.example.org/atom.xml" rel="self"/>
  <entry>
    <title>Hello Atom</title>
    <link rel="self" href="https://blog.example.org/api/1"/>
    <link href="https://blog.example.org/posts/1"/>
    <summary type="html">&lt;p&gt;Hi&lt;/p&gt;</summary>
    <published>2024-05-01T08:30:00Z</published>
    <author><name>Han Meimei</name></author>
    <category term="rust"/>
  </entry>
</feed>"#;
        let feed = parse_feed(xml, DEFAULT_MAX_ITEMS).unwrap();
        assert_eq!(feed.title, "Atom Blog");
        assert_eq!(feed.description, "Notes");
        assert_eq!(feed.link, "https://blog.example.org/");
        let entry = &feed.items[0];
        assert_eq!(entry.title, "Hello Atom");
        assert_eq!(entry.link.as_deref(), Some("https://blog.example.org/posts/1"));
        assert_eq!(entry.description, "<p>Hi</p>");
        assert_eq!(entry.pub_date.as_deref(), Some("2024-05-01T08:30:00Z"));
        assert_eq!(entry.author.as_deref(), Some("Han Meimei"));
        assert_eq!(entry.categories, vec!["rust"]);
    }

    #[test]
    fn test_empty_feed_and_non_feed() {
        assert!(matches!(
            parse_feed("<rss><channel><title>x</title></channel></rss>", 50),
            Err(FeedError::NoItems)
        ));
        assert!(matches!(
            parse_feed("<html><body>not a feed</body></html>", 50),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            parse_feed("<rss><channel><item><description>x</description></item></channel></rss>", 50),
            Err(FeedError::NoItems)
        ));
    }
}
