//! Plain-text derivations: reading time, summaries, keywords, dates and URL
//! resolution.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use url::Url;

use crate::utils::collapse_whitespace;

pub const WORDS_PER_MINUTE: usize = 200;
pub const SUMMARY_CHARS: usize = 160;
pub const KEYWORD_LIMIT: usize = 10;
pub const MIN_KEYWORD_CHARS: usize = 4;
/// CJK tokens are bigrams; each character already carries a word's meaning.
pub const MIN_CJK_KEYWORD_CHARS: usize = 2;

/// Offset applied to dates that carry no zone: the covered outlets and
/// platforms publish in China Standard Time.
const NAIVE_OFFSET_SECS: i32 = 8 * 3600;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "about", "above", "after", "again", "against", "also", "because", "been", "before",
        "being", "below", "between", "both", "could", "does", "doing", "down", "during", "each",
        "either", "every", "from", "further", "have", "having", "here", "into", "just", "more",
        "most", "much", "must", "neither", "other", "over", "said", "same", "says", "should",
        "some", "such", "than", "that", "their", "theirs", "them", "then", "there", "these",
        "they", "this", "those", "through", "under", "until", "very", "were", "what", "when",
        "where", "which", "while", "whom", "will", "with", "within", "without", "would", "your",
        "yours",
        // Chinese
        "的", "了", "和", "是", "在", "也", "就", "都", "而", "及", "与", "着", "或", "一个",
        "没有", "我们", "你们", "他们", "她们", "这个", "那个", "这些", "那些", "可以", "因为",
        "所以", "但是", "如果", "已经", "还是", "以及", "进行", "通过", "表示", "目前", "同时",
        "与此同时", "另一方面", "总而言之", "除此之外", "不仅如此", "由此可见", "据了解",
        "记者获悉", "责任编辑",
    ]
    .into_iter()
    .collect()
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{4})\s*[-/.年]\s*(\d{1,2})\s*[-/.月]\s*(\d{1,2})\s*日?(?:[\sT]*(\d{1,2}):(\d{2})(?::(\d{2}))?)?",
    )
    .expect("static date pattern")
});

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}')
}

/// Words in `text`. Latin-script words are whitespace-separated; each CJK
/// character counts as one word.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .map(|chunk| {
            let cjk = chunk.chars().filter(|c| is_cjk(*c)).count();
            let rest = chunk
                .split(is_cjk)
                .filter(|part| part.chars().any(char::is_alphanumeric))
                .count();
            cjk + rest
        })
        .sum()
}

/// Minutes to read `text`, rounded up. Zero only for empty text.
pub fn reading_time(text: &str) -> u32 {
    let words = word_count(text);
    if words == 0 {
        return 0;
    }
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Plain-text summary of at most [`SUMMARY_CHARS`] characters plus an
/// ellipsis. Cuts at the last whitespace when there is one in the second half
/// of the window so words are not split.
pub fn summarize(text: &str) -> String {
    let text = collapse_whitespace(text);
    if text.chars().count() <= SUMMARY_CHARS {
        return text;
    }
    let window: String = text.chars().take(SUMMARY_CHARS).collect();
    let cut = match window.rfind(char::is_whitespace) {
        Some(pos) if window[..pos].chars().count() >= SUMMARY_CHARS / 2 => &window[..pos],
        _ => window.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation() || "，。、；：".contains(c));
    format!("{}...", cut)
}

/// Lowercased tokens of `text`. CJK runs have no word boundaries, so each run
/// becomes its overlapping character bigrams: "人工智能" yields "人工", "工智"
/// and "智能".
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .flat_map(split_script_runs)
        .flat_map(|run| {
            if run.starts_with(is_cjk) {
                cjk_bigrams(run)
            } else {
                vec![run.to_lowercase()]
            }
        })
}

fn cjk_bigrams(run: &str) -> Vec<String> {
    let chars: Vec<char> = run.chars().collect();
    if chars.len() < 2 {
        return vec![run.to_string()];
    }
    chars.windows(2).map(|pair| pair.iter().collect()).collect()
}

/// Split a token where it switches between CJK and other scripts, so "iPhone手机"
/// yields "iPhone" and "手机".
fn split_script_runs(token: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;
    for (i, c) in token.char_indices() {
        let cjk = is_cjk(c);
        if previous.is_some_and(|p| p != cjk) {
            runs.push(&token[start..i]);
            start = i;
        }
        previous = Some(cjk);
    }
    if start < token.len() {
        runs.push(&token[start..]);
    }
    runs
}

/// The [`KEYWORD_LIMIT`] most frequent tokens of `title` and `content`,
/// ignoring stop words and tokens under [`MIN_KEYWORD_CHARS`] characters
/// ([`MIN_CJK_KEYWORD_CHARS`] for CJK bigrams). Ties keep first-appearance
/// order.
///
/// Stop words longer than two CJK characters never equal a bigram; only
/// their two-character pieces that are themselves listed get filtered.
pub fn keywords(title: &str, content: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let combined = format!("{} {}", title, content);
    for (position, token) in tokens(&combined).enumerate() {
        let min_chars = if token.starts_with(is_cjk) {
            MIN_CJK_KEYWORD_CHARS
        } else {
            MIN_KEYWORD_CHARS
        };
        if token.chars().count() < min_chars
            || STOP_WORDS.contains(token.as_str())
            || token.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        counts.entry(token).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(token, _)| token)
        .collect()
}

/// Resolve an image or link reference against the page URL.
///
/// Handles protocol-relative (`//cdn/...`), root-relative (`/img/...`) and
/// relative (`img/a.png`) forms. Inline `data:` and `javascript:` references
/// are dropped.
pub fn resolve_url(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("javascript:") {
        return None;
    }
    if let Ok(absolute) = Url::parse(raw) {
        return matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string());
    }
    let base = base?;
    if let Some(rest) = raw.strip_prefix("//") {
        return Url::parse(&format!("{}://{}", base.scheme(), rest))
            .ok()
            .map(|u| u.to_string());
    }
    base.join(raw).ok().map(|u| u.to_string())
}

/// Parse a publish date in any of the formats seen on the covered sites.
///
/// Zoned formats (RFC 3339, RFC 2822) keep their offset. Numeric and Chinese
/// forms (`2024-05-01 08:30`, `2024/05/01`, `2024年5月1日 08:30`), possibly
/// surrounded by other text, are read as UTC+08:00.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return from_naive(naive);
    }

    let caps = NUMERIC_DATE.captures(s)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let date = NaiveDate::from_ymd_opt(number(1)? as i32, number(2)?, number(3)?)?;
    let naive = date.and_hms_opt(number(4).unwrap_or(0), number(5).unwrap_or(0), number(6).unwrap_or(0))?;
    from_naive(naive)
}

fn from_naive(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    FixedOffset::east_opt(NAIVE_OFFSET_SECS)?
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_mixed_scripts() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count("新闻报道"), 4);
        assert_eq!(word_count("iPhone 手机 sale"), 4);
        assert_eq!(word_count("  -- "), 0);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time(""), 0);
        assert_eq!(reading_time("one"), 1);
        assert_eq!(reading_time(&"word ".repeat(200)), 1);
        assert_eq!(reading_time(&"word ".repeat(201)), 2);
        assert_eq!(reading_time(&"字".repeat(450)), 3);
    }

    #[test]
    fn test_summary_short_text_unchanged() {
        assert_eq!(summarize("  A short\n piece. "), "A short piece.");
    }

    #[test]
    fn test_summary_cuts_at_word_boundary() {
        let text = "lorem ipsum ".repeat(30);
        let summary = summarize(&text);
        assert!(summary.ends_with("..."));
        let body = summary.trim_end_matches("...");
        assert!(body.chars().count() <= SUMMARY_CHARS);
        assert!(body.ends_with("lorem") || body.ends_with("ipsum"));
    }

    #[test]
    fn test_summary_cjk_without_spaces() {
        let text = "中".repeat(400);
        let summary = summarize(&text);
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
    }

    #[test]
    fn test_keywords_frequency_and_stop_words() {
        let title = "Rust async runtime";
        let content = "Tokio is an async runtime. The runtime drives futures; futures are lazy. \
                       This runtime also has timers, with timers driven by the runtime.";
        let words = keywords(title, content);
        assert_eq!(words[0], "runtime");
        assert!(words.contains(&"async".to_string()));
        assert!(words.contains(&"futures".to_string()));
        assert!(!words.contains(&"this".to_string()));
        assert!(!words.contains(&"with".to_string()));
        assert!(words.iter().all(|w| w.chars().count() >= MIN_KEYWORD_CHARS));
    }

    #[test]
    fn test_keywords_chinese_bigrams_skip_stop_words() {
        let title = "人工智能发展";
        let content = "我们认为人工智能正在改变医疗。因为人工智能可以辅助诊断。";
        let words = keywords(title, content);
        assert_eq!(&words[..3], ["人工", "工智", "智能"]);
        assert!(!words.contains(&"我们".to_string()));
        assert!(!words.contains(&"因为".to_string()));
        assert!(!words.contains(&"可以".to_string()));
        assert!(words.iter().all(|w| w.chars().count() == 2));
    }

    #[test]
    fn test_keywords_mixed_script_token() {
        let words = keywords("iPhone手机", "iPhone手机 降价");
        assert_eq!(words, ["iphone", "手机", "降价"]);
    }

    #[test]
    fn test_keywords_limit_and_tie_order() {
        let content = "alpha1 bravo2 charlie delta echo1 foxtrot golf1 hotel india1 juliet kilo1 lima1";
        let words = keywords("", content);
        assert_eq!(words.len(), KEYWORD_LIMIT);
        assert_eq!(words[0], "alpha1");
        assert_eq!(words[1], "bravo2");
    }

    #[test]
    fn test_resolve_url_forms() {
        let base = Url::parse("https://news.example.com/a/b/page.html").unwrap();
        let base = Some(&base);
        assert_eq!(
            resolve_url(base, "//cdn.example.com/x.jpg").as_deref(),
            Some("https://cdn.example.com/x.jpg")
        );
        assert_eq!(
            resolve_url(base, "/img/y.png").as_deref(),
            Some("https://news.example.com/img/y.png")
        );
        assert_eq!(
            resolve_url(base, "z.gif").as_deref(),
            Some("https://news.example.com/a/b/z.gif")
        );
        assert_eq!(
            resolve_url(base, "http://other.org/q.png").as_deref(),
            Some("http://other.org/q.png")
        );
        assert_eq!(resolve_url(base, "data:image/png;base64,AAAA"), None);
        assert_eq!(resolve_url(None, "/relative.png"), None);
    }

    #[test]
    fn test_parse_date_zoned_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_date("2024-05-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-05-01T16:30:00+08:00"), Some(expected));
        assert_eq!(parse_date("Wed, 01 May 2024 08:30:00 +0000"), Some(expected));
    }

    #[test]
    fn test_parse_date_naive_formats_are_china_time() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap();
        assert_eq!(parse_date("2024-05-01 08:30"), Some(expected));
        assert_eq!(parse_date("2024/05/01 08:30:00"), Some(expected));
        assert_eq!(parse_date("2024年5月1日 08:30"), Some(expected));
        assert_eq!(parse_date("发布时间：2024-05-01 08:30 来源：澎湃"), Some(expected));
        assert_eq!(
            parse_date("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 4, 30, 16, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }
}
