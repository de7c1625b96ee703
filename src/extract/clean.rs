//! Content cleaning: serialize an element's subtree while dropping unwanted
//! nodes, producing both markup and plain text in one walk.

use scraper::{ElementRef, Node, Selector};

/// Tags dropped whenever cleaning is requested, regardless of the source's
/// own remove list.
const NOISE_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "template"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "blockquote", "pre", "table", "tr", "figure", "figcaption",
];

/// Cleaned inner content of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleaned {
    pub html: String,
    /// Whitespace-collapsed text; block boundaries become newlines.
    pub text: String,
}

impl Cleaned {
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Compiled form of a source's cleaning rules.
pub struct Cleaner {
    remove: Vec<Selector>,
    strip_noise: bool,
}

impl Cleaner {
    /// Unparseable remove selectors are skipped.
    pub fn new(remove: &[&str], strip_noise: bool) -> Self {
        Self {
            remove: remove.iter().filter_map(|s| Selector::parse(s).ok()).collect(),
            strip_noise,
        }
    }

    pub fn clean(&self, element: ElementRef<'_>) -> Cleaned {
        let mut html = String::new();
        let mut text = String::new();
        self.walk(element, &mut html, &mut text);
        Cleaned {
            html: if self.strip_noise { collapse_markup(&html) } else { html },
            text: tidy_text(&text),
        }
    }

    fn skip(&self, element: ElementRef<'_>) -> bool {
        let name = element.value().name();
        (self.strip_noise && NOISE_TAGS.contains(&name))
            || self.remove.iter().any(|sel| sel.matches(&element))
    }

    fn walk(&self, element: ElementRef<'_>, html: &mut String, text: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(t) => {
                    html.push_str(&escape_text(t));
                    text.push_str(t);
                }
                Node::Comment(c) if !self.strip_noise => {
                    html.push_str("<!--");
                    html.push_str(c);
                    html.push_str("-->");
                }
                Node::Element(_) => {
                    if let Some(nested) = ElementRef::wrap(child) {
                        self.walk_element(nested, html, text);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&self, element: ElementRef<'_>, html: &mut String, text: &mut String) {
        if self.skip(element) {
            return;
        }
        let name = element.value().name();
        html.push('<');
        html.push_str(name);
        for (key, value) in element.value().attrs() {
            html.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
        }
        html.push('>');
        if VOID_TAGS.contains(&name) {
            if name == "br" {
                text.push('\n');
            }
            return;
        }
        self.walk(element, html, text);
        html.push_str("</");
        html.push_str(name);
        html.push('>');
        if BLOCK_TAGS.contains(&name) {
            text.push('\n');
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Collapse runs of whitespace in markup to one space.
fn collapse_markup(html: &str) -> String {
    html.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace within lines and drop empty lines.
fn tidy_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
