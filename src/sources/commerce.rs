//! Commerce platform declarations.
//!
//! Product pages on these platforms are frequently rendered client-side, so
//! the selector lists lean on server-rendered fallbacks (`og:` meta tags,
//! legacy desktop markup) after the current class names.

use super::{CleaningRules, FieldSelectors, SourceConfig, SourceId, SourceKind, UrlPattern};

const ZH_CN: &str = "zh-CN,zh;q=0.9,en;q=0.8";

const COMMERCE_REMOVE: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    ".tb-share",
    ".J_Share",
    ".recommend",
    ".ad",
    "[class*='advert']",
];

const COMMERCE_CLEANING: CleaningRules = CleaningRules {
    remove: COMMERCE_REMOVE,
    min_content_length: 20,
    max_content_length: 20_000,
    clean_html: true,
    plain_text: true,
};

pub fn sources() -> Vec<SourceConfig> {
    vec![
        taobao(),
        tmall(),
        jd(),
        alibaba_1688(),
        pinduoduo(),
        douyin(),
        aliexpress(),
    ]
}

fn taobao() -> SourceConfig {
    SourceConfig::new(SourceId::Taobao, "Taobao", SourceKind::Commerce)
        .base_urls(&["https://www.taobao.com"])
        .domains(&["taobao.com", "tb.cn"])
        .rate_limit(20)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://item\.taobao\.com/item\.htm\?(?:.*&)?id=\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://shop\d+\.taobao\.com", confidence: 0.95 },
            UrlPattern { regex: r"^https?://h5\.m\.taobao\.com/awp/core/detail\.htm", confidence: 0.92 },
            UrlPattern { regex: r"^https?://(?:world|market)\.taobao\.com/item/\d+\.htm", confidence: 0.92 },
            UrlPattern { regex: r"^https?://[a-z0-9-]+\.taobao\.com/shop/view_shop\.htm", confidence: 0.9 },
            UrlPattern { regex: r"^https?://m\.tb\.cn/h\.[A-Za-z0-9]+", confidence: 0.9 },
        ])
        .product_patterns(&[
            r"item\.taobao\.com/item\.htm",
            r"/awp/core/detail\.htm",
            r"taobao\.com/item/\d+\.htm",
            r"m\.tb\.cn/h\.",
        ])
        .shop_patterns(&[
            r"^https?://shop\d+\.taobao\.com",
            r"taobao\.com/shop/",
            r"^https?://shop\.m\.taobao\.com",
        ])
        .item_id_patterns(&[r"[?&]id=(\d+)", r"taobao\.com/item/(\d+)\.htm"])
        .shop_id_patterns(&[
            r"^https?://shop(\d+)\.taobao\.com",
            r"[?&](?:shop_?[iI]d|user_?[iI]d)=(\d+)",
        ])
        .selectors(FieldSelectors {
            title: &[
                "[class*='ItemHeader--mainTitle']",
                "#J_Title .tb-main-title",
                ".tb-main-title",
                "h1[class*='mainTitle']",
                "meta[property='og:title']",
                "title",
            ],
            content: &[
                "#J_DivItemDesc",
                "#description .content",
                "[class*='desc--']",
                ".tb-detail-bd",
                "#attributes",
            ],
            excerpt: &["#J_Title .tb-subtitle", "[class*='ItemHeader--subTitle']", "meta[name='description']"],
            author: &["[class*='ShopHeader--title']", ".tb-shop-name a", ".shop-name-link"],
            publish_date: &[],
            tags: &["#J_AttrUL li", ".attributes-list li"],
            category: &["#J_Breadcrumb a:last-child", ".tb-breadcrumb a:last-child"],
            featured_image: &["#J_ImgBooth", "[class*='PicGallery--mainPic']", "meta[property='og:image']"],
            images: &["#J_UlThumb img", "[class*='PicGallery--thumbnail'] img", "#J_DivItemDesc img"],
            price: &[
                "[class*='Price--priceText']",
                "#J_PromoPriceNum",
                "#J_StrPrice .tb-rmb-num",
                ".tb-rmb-num",
            ],
        })
        .headers(&[("Referer", "https://www.taobao.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn tmall() -> SourceConfig {
    SourceConfig::new(SourceId::Tmall, "Tmall", SourceKind::Commerce)
        .base_urls(&["https://www.tmall.com"])
        .domains(&["tmall.com", "tmall.hk"])
        .rate_limit(20)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://detail\.tmall\.(?:com|hk)/item\.htm\?(?:.*&)?id=\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://detail\.m\.tmall\.com/item\.htm", confidence: 0.93 },
            UrlPattern { regex: r"^https?://[a-z0-9-]+\.tmall\.(?:com|hk)/shop/view_shop\.htm", confidence: 0.92 },
            UrlPattern { regex: r"^https?://[a-z0-9-]+\.tmall\.(?:com|hk)/(?:search\.htm|category)", confidence: 0.9 },
        ])
        .product_patterns(&[r"detail\.(?:m\.)?tmall\.(?:com|hk)/item\.htm"])
        .shop_patterns(&[r"tmall\.(?:com|hk)/shop/", r"tmall\.(?:com|hk)/(?:search\.htm|category)"])
        .item_id_patterns(&[r"[?&]id=(\d+)"])
        .shop_id_patterns(&[
            r"[?&](?:shop_?[iI]d|user_?[iI]d)=(\d+)",
            r"^https?://([a-z0-9-]+)\.tmall\.(?:com|hk)/(?:shop|search|category)",
        ])
        .selectors(FieldSelectors {
            title: &[
                "[class*='ItemHeader--mainTitle']",
                ".tb-detail-hd h1",
                "[data-spm='1000983'] h1",
                "meta[property='og:title']",
                "title",
            ],
            content: &["#description .content", "[class*='desc--']", "#J_AttrList", ".tm-detail-meta"],
            excerpt: &[".tb-detail-hd .newp", "[class*='ItemHeader--subTitle']", "meta[name='description']"],
            author: &["[class*='ShopHeader--title']", ".slogo-shopname", ".shopLink"],
            publish_date: &[],
            tags: &["#J_AttrUL li"],
            category: &[".tm-breadcrumb a:last-child"],
            featured_image: &["#J_ImgBooth", "[class*='PicGallery--mainPic']", "meta[property='og:image']"],
            images: &["#J_UlThumb img", "[class*='PicGallery--thumbnail'] img"],
            price: &["[class*='Price--priceText']", ".tm-price", "#J_PromoPrice .tm-price"],
        })
        .headers(&[("Referer", "https://www.tmall.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn jd() -> SourceConfig {
    SourceConfig::new(SourceId::Jd, "JD.com", SourceKind::Commerce)
        .base_urls(&["https://www.jd.com"])
        .domains(&["jd.com", "jd.hk", "360buy.com"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://item\.jd\.(?:com|hk)/\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://mall\.jd\.com/index-\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://item\.m\.jd\.com/product/\d+\.html", confidence: 0.93 },
            UrlPattern { regex: r"^https?://shop\.m\.jd\.com/\?(?:.*&)?shopId=\d+", confidence: 0.92 },
            UrlPattern { regex: r"^https?://item\.360buy\.com/\d+\.html", confidence: 0.9 },
        ])
        .product_patterns(&[r"item\.(?:m\.)?(?:jd\.(?:com|hk)|360buy\.com)/"])
        .shop_patterns(&[r"mall\.jd\.com/index-", r"shop\.m\.jd\.com/", r"[?&]shopId="])
        .item_id_patterns(&[
            r"item\.(?:m\.)?jd\.(?:com|hk)/(?:product/)?(\d+)\.html",
            r"360buy\.com/(\d+)\.html",
        ])
        .shop_id_patterns(&[r"mall\.jd\.com/index-(\d+)\.html", r"[?&]shopId=(\d+)"])
        .selectors(FieldSelectors {
            title: &[".sku-name", ".itemInfo-wrap .sku-name", "#itemName", "meta[property='og:title']", "title"],
            content: &["#detail .detail-content", "#J-detail-content", ".parameter2", "#detail"],
            excerpt: &["#p-ad", ".news", "meta[name='description']"],
            author: &[".J-hove-wrap .name a", ".shopName", "#popbox .mt h3 a"],
            publish_date: &[],
            tags: &[".parameter2 li", ".p-parameter-list li"],
            category: &["#crumb-wrap .item a:last-child", ".crumb a:last-child"],
            featured_image: &["#spec-img", "#spec-n1 img", "meta[property='og:image']"],
            images: &["#spec-list img", ".lh img", "#J-detail-content img"],
            price: &[".p-price .price", ".summary-price .p-price", "#jd-price"],
        })
        .headers(&[("Referer", "https://www.jd.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn alibaba_1688() -> SourceConfig {
    SourceConfig::new(SourceId::Alibaba1688, "1688", SourceKind::Commerce)
        .base_urls(&["https://www.1688.com"])
        .domains(&["1688.com", "china.alibaba.com"])
        .rate_limit(20)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://detail\.1688\.com/offer/\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://m\.1688\.com/offer/\d+\.html", confidence: 0.93 },
            UrlPattern { regex: r"^https?://shop[0-9a-z]+\.1688\.com", confidence: 0.92 },
            UrlPattern { regex: r"^https?://[a-z0-9-]+\.1688\.com/page/", confidence: 0.9 },
            UrlPattern { regex: r"^https?://detail\.china\.alibaba\.com/offer/\d+\.html", confidence: 0.9 },
        ])
        .product_patterns(&[r"/offer/\d+\.html"])
        .shop_patterns(&[r"^https?://shop[0-9a-z]+\.1688\.com", r"\.1688\.com/page/", r"[?&]memberId="])
        .item_id_patterns(&[r"/offer/(\d+)\.html"])
        .shop_id_patterns(&[
            r"[?&]memberId=([\w-]+)",
            r"^https?://(shop[0-9a-z]+)\.1688\.com",
            r"^https?://([a-z0-9-]+)\.1688\.com/page/",
        ])
        .selectors(FieldSelectors {
            title: &[".title-text", ".d-title", "h1.d-title", "meta[property='og:title']", "title"],
            content: &["#desc-lazyload-container", ".desc-lazyload-container", "#mod-detail-description", ".offer-attr-list"],
            excerpt: &["meta[name='description']"],
            author: &[".company-name", ".shop-company-name", ".seller-name"],
            publish_date: &[],
            tags: &[".offer-attr-item", ".obj-content td"],
            category: &[".breadcrumb a:last-child"],
            featured_image: &[".detail-gallery-img", ".vertical-img img", "meta[property='og:image']"],
            images: &[".detail-gallery-turn-wrapper img", "#dt-tab img", "#desc-lazyload-container img"],
            price: &[".price-text", ".price-now", ".price-original-sku .value"],
        })
        .headers(&[("Referer", "https://www.1688.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn pinduoduo() -> SourceConfig {
    SourceConfig::new(SourceId::Pinduoduo, "Pinduoduo", SourceKind::Commerce)
        .base_urls(&["https://mobile.yangkeduo.com"])
        .domains(&["pinduoduo.com", "yangkeduo.com"])
        .rate_limit(10)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://mobile\.(?:yangkeduo|pinduoduo)\.com/goods\d?\.html\?(?:.*&)?goods_id=\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://mobile\.(?:yangkeduo|pinduoduo)\.com/mall_page\.html\?(?:.*&)?mall_id=\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:mobile\.)?(?:yangkeduo|pinduoduo)\.com/.*[?&]goods_id=\d+", confidence: 0.9 },
        ])
        .product_patterns(&[r"/goods\d?\.html", r"[?&]goods_id="])
        .shop_patterns(&[r"/mall_page\.html", r"[?&]mall_id="])
        .item_id_patterns(&[r"[?&]goods_id=(\d+)"])
        .shop_id_patterns(&[r"[?&]mall_id=(\d+)"])
        .selectors(FieldSelectors {
            title: &[".enable-select", "[class*='goods-name']", "meta[property='og:title']", "title"],
            content: &["[class*='goods-detail']", "[class*='goodsDetail']", ".goods-desc"],
            excerpt: &["meta[name='description']"],
            author: &["[class*='mall-name']", ".mall-name"],
            publish_date: &[],
            tags: &["[class*='goods-tag']"],
            category: &[],
            featured_image: &["[class*='goods-banner'] img", "meta[property='og:image']"],
            images: &["[class*='goods-banner'] img", "[class*='goods-detail'] img"],
            price: &["[class*='goods-price']", ".price"],
        })
        .headers(&[("Referer", "https://mobile.yangkeduo.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn douyin() -> SourceConfig {
    SourceConfig::new(SourceId::Douyin, "Douyin Shop", SourceKind::Commerce)
        .base_urls(&["https://www.douyin.com", "https://haohuo.jinritemai.com"])
        .domains(&["douyin.com", "iesdouyin.com", "jinritemai.com"])
        .rate_limit(10)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://haohuo\.jinritemai\.com/.*[?&]id=\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:www\.)?douyin\.com/user/[A-Za-z0-9_-]+", confidence: 0.9 },
            UrlPattern { regex: r"^https?://haohuo\.jinritemai\.com/views/shop/", confidence: 0.92 },
            UrlPattern { regex: r"^https?://v\.douyin\.com/[A-Za-z0-9]+", confidence: 0.9 },
            UrlPattern { regex: r"^https?://(?:www\.)?iesdouyin\.com/share/", confidence: 0.9 },
        ])
        .product_patterns(&[r"jinritemai\.com/views/product", r"jinritemai\.com/ecommerce/trade/detail", r"v\.douyin\.com/"])
        .shop_patterns(&[r"jinritemai\.com/views/shop", r"douyin\.com/user/", r"[?&]shop_id="])
        .item_id_patterns(&[r"[?&]id=(\d+)", r"/product/(\d+)"])
        .shop_id_patterns(&[r"[?&]shop_id=([A-Za-z0-9]+)", r"douyin\.com/user/([A-Za-z0-9_-]+)"])
        .selectors(FieldSelectors {
            title: &["[class*='product-title']", "[class*='goods-title']", "meta[property='og:title']", "title"],
            content: &["[class*='product-detail']", "[class*='detail-content']", "[class*='goods-desc']"],
            excerpt: &["meta[name='description']"],
            author: &["[class*='shop-name']", "[class*='author-name']"],
            publish_date: &[],
            tags: &["[class*='product-tag']"],
            category: &[],
            featured_image: &["[class*='product-cover'] img", "meta[property='og:image']"],
            images: &["[class*='product-swiper'] img", "[class*='product-detail'] img"],
            price: &["[class*='product-price']", "[class*='price-num']"],
        })
        .headers(&[("Referer", "https://www.douyin.com/")])
        .accept_language(ZH_CN)
        .cleaning(COMMERCE_CLEANING)
}

fn aliexpress() -> SourceConfig {
    SourceConfig::new(SourceId::Aliexpress, "AliExpress", SourceKind::Commerce)
        .base_urls(&["https://www.aliexpress.com"])
        .domains(&["aliexpress.com", "aliexpress.us", "aliexpress.ru"])
        .rate_limit(30)
        .url_patterns(&[
            UrlPattern { regex: r"^https?://(?:[a-z]{2,3}\.|m\.)?aliexpress\.(?:com|us|ru)/item/\d+\.html", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:[a-z]{2,3}\.|m\.)?aliexpress\.(?:com|us|ru)/store/(?:[a-z]+/)?\d+", confidence: 0.95 },
            UrlPattern { regex: r"^https?://(?:[a-z]{2,3}\.)?aliexpress\.(?:com|us|ru)/i/\d+\.html", confidence: 0.9 },
        ])
        .product_patterns(&[r"aliexpress\.(?:com|us|ru)/(?:item|i)/\d+"])
        .shop_patterns(&[r"aliexpress\.(?:com|us|ru)/store/"])
        .item_id_patterns(&[r"/(?:item|i)/(\d+)\.html"])
        .shop_id_patterns(&[r"/store/(?:[a-z]+/)?(\d+)"])
        .selectors(FieldSelectors {
            title: &["h1[data-pl='product-title']", ".product-title-text", "h1", "meta[property='og:title']", "title"],
            content: &["#product-description", "[class*='description--']", ".product-description", ".detail-desc-decorate-richtext"],
            excerpt: &["meta[name='description']"],
            author: &["[class*='store-header--storeName']", ".shop-name a", ".store-name"],
            publish_date: &[],
            tags: &["[class*='specification--prop']"],
            category: &[".breadcrumb a:last-child", "[class*='breadcrumb'] a:last-child"],
            featured_image: &["[class*='magnifier--image']", ".magnifier-image", "meta[property='og:image']"],
            images: &["[class*='slider--img'] img", ".images-view-item img", "#product-description img"],
            price: &["[class*='price--currentPriceText']", ".product-price-value", ".uniform-banner-box-price"],
        })
        .headers(&[("Referer", "https://www.aliexpress.com/")])
        .accept_language("en-US,en;q=0.9")
        .cleaning(COMMERCE_CLEANING)
}
