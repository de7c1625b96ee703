//! News outlet declarations: national outlets and magazines first, then the
//! large regional portals.

use super::{CleaningRules, FieldSelectors, SourceConfig, SourceId, SourceKind, UrlPattern};

const NEWS_REMOVE: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "aside",
    "footer",
    "form",
    ".share",
    ".social-share",
    ".ad",
    ".advertisement",
    "[class*='recommend']",
    "[class*='related']",
    ".comment",
    ".copyright",
];

const NEWS_CLEANING: CleaningRules = CleaningRules {
    remove: NEWS_REMOVE,
    min_content_length: 100,
    max_content_length: 100_000,
    clean_html: true,
    plain_text: false,
};

const COMMON_DATE_META: &str = "meta[property='article:published_time']";
const COMMON_IMAGE_META: &str = "meta[property='og:image']";

pub fn sources() -> Vec<SourceConfig> {
    vec![
        the_paper(),
        caixin(),
        kr36(),
        huxiu(),
        sina(),
        sohu(),
        netease(),
        ifeng(),
    ]
}

fn the_paper() -> SourceConfig {
    SourceConfig::new(SourceId::ThePaper, "The Paper", SourceKind::News)
        .base_urls(&["https://www.thepaper.cn"])
        .domains(&["thepaper.cn"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:www|m)\.thepaper\.cn/newsDetail_forward_\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www\.)?thepaper\.cn/detail/\d+", confidence: 0.93 },
            UrlPattern { regex: r"^https?://(?:www\.)?thepaper\.cn/(?:channel|list)_\d+", confidence: 0.9 },
        ])
        .product_patterns(&[r"newsDetail_forward_\d+", r"thepaper\.cn/detail/\d+"])
        .shop_patterns(&[r"thepaper\.cn/(?:channel|list)_\d+"])
        .item_id_patterns(&[r"newsDetail_forward_(\d+)", r"thepaper\.cn/detail/(\d+)"])
        .shop_id_patterns(&[r"thepaper\.cn/(?:channel|list)_(\d+)"])
        .selectors(FieldSelectors {
            title: &["h1[class*='index_title']", ".news_title", "h1", "meta[property='og:title']"],
            content: &["div[class*='index_cententWrap']", ".news_txt", "div[class*='cententWrap']", "article"],
            excerpt: &["meta[name='description']", ".news_summary"],
            author: &["div[class*='index_left'] .ant-space-item:first-child", ".news_about p:first-child", "meta[name='author']"],
            publish_date: &[COMMON_DATE_META, "div[class*='index_left'] .ant-space-item span", ".news_about span"],
            tags: &[".news_keyword a", "meta[name='keywords']"],
            category: &[".news_path a:last-child"],
            featured_image: &[COMMON_IMAGE_META, "div[class*='index_cententWrap'] img"],
            images: &["div[class*='index_cententWrap'] img", ".news_txt img"],
            price: &[],
        })
        .headers(&[("Referer", "https://www.thepaper.cn/")])
        .cleaning(NEWS_CLEANING)
}

fn caixin() -> SourceConfig {
    SourceConfig::new(SourceId::Caixin, "Caixin", SourceKind::News)
        .base_urls(&["https://www.caixin.com"])
        .domains(&["caixin.com", "caixinglobal.com"])
        .rate_limit(20)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://[a-z]+\.caixin\.com/\d{4}-\d{2}-\d{2}/\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www\.)?caixinglobal\.com/\d{4}-\d{2}-\d{2}/[a-z0-9-]+-\d+\.html", confidence: 0.93 },
        ])
        .product_patterns(&[r"caixin(?:global)?\.com/\d{4}-\d{2}-\d{2}/"])
        .shop_patterns(&[r"^https?://[a-z]+\.caixin\.com/(?:[a-z]+/)?$"])
        .item_id_patterns(&[r"/\d{4}-\d{2}-\d{2}/(?:[a-z0-9-]+-)?(\d+)\.html"])
        .selectors(FieldSelectors {
            title: &["#conTit h1", ".article-title", "h1", "meta[property='og:title']"],
            content: &["#Main_Content_Val", ".textbox", "#the_content", "article"],
            excerpt: &["#subhead", ".subhead", "meta[name='description']"],
            author: &["#author_baidu", ".artInfo .author", "meta[name='author']"],
            publish_date: &["#pubtime_baidu", ".artInfo", COMMON_DATE_META],
            tags: &["meta[name='keywords']"],
            category: &[".crumbs a:last-child"],
            featured_image: &[COMMON_IMAGE_META, ".media img"],
            images: &["#Main_Content_Val img", ".textbox img"],
            price: &[],
        })
        .headers(&[("Referer", "https://www.caixin.com/")])
        .cleaning(NEWS_CLEANING)
}

fn kr36() -> SourceConfig {
    SourceConfig::new(SourceId::Kr36, "36Kr", SourceKind::News)
        .base_urls(&["https://36kr.com"])
        .domains(&["36kr.com"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:www\.|m\.)?36kr\.com/p/\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www\.|m\.)?36kr\.com/newsflashes/\d+", confidence: 0.92 },
            UrlPattern { regex: r"^https?://(?:www\.)?36kr\.com/information/[a-z_]+", confidence: 0.9 },
        ])
        .product_patterns(&[r"36kr\.com/(?:p|newsflashes)/\d+"])
        .shop_patterns(&[r"36kr\.com/information/", r"36kr\.com/user/"])
        .item_id_patterns(&[r"36kr\.com/(?:p|newsflashes)/(\d+)"])
        .shop_id_patterns(&[r"36kr\.com/information/([a-z_]+)", r"36kr\.com/user/(\d+)"])
        .selectors(FieldSelectors {
            title: &["h1.article-title", ".article-title", "h1", "meta[property='og:title']"],
            content: &[".articleDetailContent", ".common-width.content", ".article-content", "article"],
            excerpt: &[".summary", ".article-summary", "meta[name='description']"],
            author: &[".title-icon-item.item-a a", ".article-title-icon a", "meta[name='author']"],
            publish_date: &[".title-icon-item.item-time", COMMON_DATE_META],
            tags: &[".kr-tag-list a", "meta[name='keywords']"],
            category: &[".kr-article-nav a:last-child"],
            featured_image: &[COMMON_IMAGE_META],
            images: &[".articleDetailContent img", ".article-content img"],
            price: &[],
        })
        .cleaning(NEWS_CLEANING)
}

fn huxiu() -> SourceConfig {
    SourceConfig::new(SourceId::Huxiu, "Huxiu", SourceKind::News)
        .base_urls(&["https://www.huxiu.com"])
        .domains(&["huxiu.com"])
        .rate_limit(20)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:www\.|m\.)?huxiu\.com/article/\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www\.)?huxiu\.com/(?:channel|member)/\d+\.html", confidence: 0.9 },
        ])
        .product_patterns(&[r"huxiu\.com/article/\d+"])
        .shop_patterns(&[r"huxiu\.com/(?:channel|member)/"])
        .item_id_patterns(&[r"huxiu\.com/article/(\d+)"])
        .shop_id_patterns(&[r"huxiu\.com/(?:channel|member)/(\d+)"])
        .selectors(FieldSelectors {
            title: &[".article__title", ".article-title", "h1", "meta[property='og:title']"],
            content: &["#article-content", ".article__content", ".article-content-wrap", "article"],
            excerpt: &[".article__summary", "meta[name='description']"],
            author: &[".article__author-info-box .author-name", ".author-name", "meta[name='author']"],
            publish_date: &[".article__time", ".article-time", COMMON_DATE_META],
            tags: &[".article__tag-list a", ".tag-box a"],
            category: &[".article__column a"],
            featured_image: &[".article__top-img img", COMMON_IMAGE_META],
            images: &["#article-content img", ".article__content img"],
            price: &[],
        })
        .cleaning(NEWS_CLEANING)
}

fn sina() -> SourceConfig {
    SourceConfig::new(SourceId::Sina, "Sina News", SourceKind::News)
        .base_urls(&["https://news.sina.com.cn"])
        .domains(&["sina.com.cn", "sina.cn"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://[a-z]+\.sina\.com\.cn/.+/\d{4}-\d{2}-\d{2}/doc-i[a-z0-9]+\.shtml", confidence: 0.95 },
            UrlPattern { regex: r"^https?://[a-z.]*sina\.cn/.*doc-i[a-z0-9]+", confidence: 0.92 },
        ])
        .product_patterns(&[r"doc-i[a-z0-9]+"])
        .shop_patterns(&[r"^https?://[a-z]+\.sina\.com\.cn/(?:roll|[a-z]+/index)"])
        .item_id_patterns(&[r"doc-i([a-z0-9]+)"])
        .selectors(FieldSelectors {
            title: &[".main-title", "h1.main-title", "#artibodyTitle", "h1", "meta[property='og:title']"],
            content: &["#artibody", ".article", "#article", ".art_content"],
            excerpt: &["meta[name='description']"],
            author: &[".show_author", ".date-source .source", "meta[name='author']"],
            publish_date: &[".date-source .date", ".date", COMMON_DATE_META],
            tags: &[".keywords a", "meta[name='keywords']"],
            category: &[".channel-path a:last-child"],
            featured_image: &[COMMON_IMAGE_META, "#artibody img"],
            images: &["#artibody img", ".article img"],
            price: &[],
        })
        .headers(&[("Referer", "https://news.sina.com.cn/")])
        .cleaning(NEWS_CLEANING)
}

fn sohu() -> SourceConfig {
    SourceConfig::new(SourceId::Sohu, "Sohu", SourceKind::News)
        .base_urls(&["https://www.sohu.com"])
        .domains(&["sohu.com"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:www|m)\.sohu\.com/a/\d+_\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www|m)\.sohu\.com/media/\d+", confidence: 0.9 },
        ])
        .product_patterns(&[r"sohu\.com/a/\d+"])
        .shop_patterns(&[r"sohu\.com/media/\d+"])
        .item_id_patterns(&[r"sohu\.com/a/(\d+)_\d+"])
        .shop_id_patterns(&[r"sohu\.com/a/\d+_(\d+)", r"sohu\.com/media/(\d+)"])
        .selectors(FieldSelectors {
            title: &[".text-title h1", "h1", "meta[property='og:title']"],
            content: &["#mp-editor", "article.article", ".article", ".text"],
            excerpt: &["meta[name='description']"],
            author: &[".user-info h4 a", "#user-info h4", "meta[name='mediaid']"],
            publish_date: &["#news-time", ".time", COMMON_DATE_META],
            tags: &[".tag a", "meta[name='keywords']"],
            category: &[".location a:last-child"],
            featured_image: &[COMMON_IMAGE_META, "#mp-editor img"],
            images: &["#mp-editor img", "article img"],
            price: &[],
        })
        .cleaning(CleaningRules {
            remove: &[
                "script",
                "style",
                "iframe",
                ".ql-align-center > span",
                "#backsohucom",
                ".statement",
                "[data-role='editor-name']",
            ],
            ..NEWS_CLEANING
        })
}

fn netease() -> SourceConfig {
    SourceConfig::new(SourceId::Netease, "NetEase News", SourceKind::News)
        .base_urls(&["https://www.163.com", "https://news.163.com"])
        .domains(&["163.com", "126.net"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://www\.163\.com/[a-z]+/article/[A-Z0-9]+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://[a-z]+\.163\.com/\d{2}/\d{4}/\d{2}/[A-Z0-9]+\.html", confidence: 0.93 },
            UrlPattern { regex: r"^https?://c\.m\.163\.com/news/a/[A-Z0-9]+\.html", confidence: 0.92 },
        ])
        .product_patterns(&[r"/article/[A-Z0-9]+\.html", r"/\d{2}/\d{4}/\d{2}/[A-Z0-9]+\.html", r"/news/a/"])
        .shop_patterns(&[r"163\.com/dy/media/"])
        .item_id_patterns(&[r"/([A-Z0-9]{16})\.html"])
        .shop_id_patterns(&[r"163\.com/dy/media/([A-Z0-9]+)\.html"])
        .selectors(FieldSelectors {
            title: &[".post_title", "h1.post_title", "#epContentLeft h1", "h1", "meta[property='og:title']"],
            content: &[".post_body", "#endText", ".post_text", "article"],
            excerpt: &["meta[name='description']"],
            author: &[".post_author", ".ep-editor", "meta[name='author']"],
            publish_date: &[".post_info", ".post_time_source", COMMON_DATE_META],
            tags: &["meta[name='keywords']"],
            category: &[".post_crumb a:last-child"],
            featured_image: &[COMMON_IMAGE_META, ".post_body img"],
            images: &[".post_body img", "#endText img"],
            price: &[],
        })
        .cleaning(NEWS_CLEANING)
}

fn ifeng() -> SourceConfig {
    SourceConfig::new(SourceId::Ifeng, "iFeng News", SourceKind::News)
        .base_urls(&["https://news.ifeng.com"])
        .domains(&["ifeng.com"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:news|finance|tech|ent|www|i)\.ifeng\.com/c/[A-Za-z0-9]+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:news|finance|tech|ent)\.ifeng\.com/a/\d{8}/\d+_0\.shtml", confidence: 0.93 },
        ])
        .product_patterns(&[r"ifeng\.com/c/", r"ifeng\.com/a/\d{8}/"])
        .shop_patterns(&[r"ifeng\.com/(?:shanklist|listpage)/"])
        .item_id_patterns(&[r"ifeng\.com/c/([A-Za-z0-9]+)", r"/\d{8}/(\d+)_0\.shtml"])
        .selectors(FieldSelectors {
            title: &["h1[class*='index_topic']", "#artical_topic", "h1", "meta[property='og:title']"],
            content: &["div[class*='index_main_content']", "#main_content", ".js_selection_area", "article"],
            excerpt: &["meta[name='description']"],
            author: &["span[class*='index_source']", "#artical_sth .ss03", "meta[name='author']"],
            publish_date: &["span[class*='index_time']", "#artical_sth .ss01", COMMON_DATE_META],
            tags: &["meta[name='keywords']"],
            category: &["div[class*='index_breadcrumbs'] a:last-child"],
            featured_image: &[COMMON_IMAGE_META, "div[class*='index_main_content'] img"],
            images: &["div[class*='index_main_content'] img", "#main_content img"],
            price: &[],
        })
        .cleaning(NEWS_CLEANING)
}
