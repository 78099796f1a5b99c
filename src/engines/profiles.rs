// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_batch::Source;
use crate::domain::models::vendor::RunContext;

/// 字段定位策略
///
/// 每个字段按顺序尝试一组定位策略，第一个返回非空结果的策略生效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// 第一个匹配元素的文本
    Text(&'static str),
    /// 第一个匹配元素的文本，去掉指定的标记词
    TextWithout {
        selector: &'static str,
        remove: &'static str,
    },
    /// 第一个匹配元素的属性值
    Attr(&'static str, &'static str),
    /// 条目根元素自身的属性值
    RootAttr(&'static str),
    /// 属性值中标记之前的部分，例如 `4.5 stars` 取 `4.5`
    AttrBefore {
        selector: &'static str,
        attr: &'static str,
        marker: &'static str,
    },
    /// 在条目全文中匹配手机号，其次座机号
    PhonePattern,
    /// 条目文本中第一个包含地点首段或街道词的行
    AddressLine,
}

/// 条目发现策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStrategy {
    pub selector: &'static str,
    pub label: &'static str,
    /// 命中的是标题元素时，向上取该祖先作为条目容器
    pub ancestor: Option<&'static str>,
}

/// "加载更多" 按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMore {
    pub selector: &'static str,
    pub text: &'static str,
}

/// 单个来源的页面画像
///
/// 描述URL构造、结果容器、条目策略、各字段的定位链和列表结束标志
#[derive(Debug, Clone, Copy)]
pub struct FeedProfile {
    pub source: Source,
    /// 结果就绪时出现的选择器
    pub ready_selector: &'static str,
    /// 需要滚动的容器，为空时滚动窗口
    pub scroll_container: Option<&'static str>,
    pub item_strategies: &'static [ItemStrategy],
    pub end_markers: &'static [&'static str],
    pub load_more: &'static [LoadMore],
    pub footer_selectors: &'static [&'static str],
    pub name: &'static [Locator],
    pub phone: &'static [Locator],
    pub address: &'static [Locator],
    pub rating: &'static [Locator],
    /// 名称只取第一行
    pub first_line_name: bool,
    pub default_target: usize,
}

/// 目录站点中命中即丢弃的导航/样板标签
pub const BLACKLIST: &[&str] = &[
    "Wedding Requisites",
    "Beauty & Spa",
    "Repairs & Services",
    "Daily Needs",
    "Bills & Recharge",
    "Travel Bookings",
    "Trending Searches",
    "Explore Top Tourist Places",
    "Popular Searches",
    "Cool Day Essentials",
    "Follow us on",
    "One-Stop for All Local Businesses",
    "JD Mart",
    "Advertise",
    "Free Listing",
    "Login / Sign Up",
    "Recent Activity",
    "Seasonal",
];

const DIRECTORY_PHONE_SELECTOR: &str =
    ".callcontent, .contact-info, .mobilessv, .mobilesv, .phone, a[href^='tel:']";

pub static DIRECTORY: FeedProfile = FeedProfile {
    source: Source::Directory,
    ready_selector: "div.result-box, li.cntanr, div.store-details, .resultbox_title_anchor",
    scroll_container: None,
    item_strategies: &[
        ItemStrategy {
            selector: "li.cntanr",
            label: "Classic List Item",
            ancestor: None,
        },
        ItemStrategy {
            selector: "div.result-box",
            label: "Result Box Div",
            ancestor: None,
        },
        ItemStrategy {
            selector: "div.store-details",
            label: "Store Details Div",
            ancestor: None,
        },
        ItemStrategy {
            selector: ".resultbox_title_anchor",
            label: "Title Anchor Class",
            ancestor: Some("li.cntanr, div.result-box, div.store-details"),
        },
        ItemStrategy {
            selector: "h2.store-name",
            label: "Store Name H2",
            ancestor: Some("li.cntanr, div.result-box, div.store-details"),
        },
    ],
    end_markers: &[],
    load_more: &[
        LoadMore {
            selector: "button",
            text: "Show More",
        },
        LoadMore {
            selector: ".load-more-btn, #loadMore",
            text: "",
        },
        LoadMore {
            selector: "a",
            text: "Load more",
        },
    ],
    footer_selectors: &["footer, .footer, #footer"],
    name: &[Locator::Text(".resultbox_title_anchor, .store-name, h2")],
    phone: &[
        Locator::Text(DIRECTORY_PHONE_SELECTOR),
        Locator::Attr(DIRECTORY_PHONE_SELECTOR, "title"),
        Locator::Attr(DIRECTORY_PHONE_SELECTOR, "aria-label"),
        Locator::Attr("a[href^='tel:']", "href"),
        Locator::PhonePattern,
    ],
    address: &[
        Locator::TextWithout {
            selector: ".address-info, .cont_sw_addr, span.cont_fl_addr, .full-address",
            remove: "Map",
        },
        Locator::AddressLine,
    ],
    rating: &[Locator::Text(".green-box, .rating, .star_m")],
    first_line_name: true,
    default_target: 300,
};

pub static MAPS: FeedProfile = FeedProfile {
    source: Source::Maps,
    ready_selector: "div[role='feed']",
    scroll_container: Some("div[role='feed']"),
    item_strategies: &[
        ItemStrategy {
            selector: "div[role='feed'] > div > div[role='article']",
            label: "Feed Article",
            ancestor: None,
        },
        ItemStrategy {
            selector: "div[role='article']",
            label: "Page Article",
            ancestor: None,
        },
    ],
    end_markers: &["You've reached the end of the list"],
    load_more: &[],
    footer_selectors: &[],
    name: &[
        Locator::RootAttr("aria-label"),
        Locator::Attr("a[aria-label]", "aria-label"),
        Locator::Text(".fontHeadlineSmall"),
    ],
    phone: &[Locator::PhonePattern],
    address: &[Locator::AddressLine],
    rating: &[Locator::AttrBefore {
        selector: "span[role='img']",
        attr: "aria-label",
        marker: "stars",
    }],
    first_line_name: false,
    default_target: 50,
};

/// 目录站点上不加 `Wedding-` 前缀的类目
const UNPREFIXED_CATEGORIES: &[&str] = &[
    "Pandits",
    "Textiles",
    "Transport",
    "Shamiyana",
    "Bakery",
    "Makeover Artists",
    "Music Systems",
    "Florists",
    "Decorators",
    "Jewellery",
];

fn directory_slug(category: &str) -> String {
    let slug = match category {
        "Catering" => "Caterers",
        "Photography" => "Photographers",
        "Halls" => "Banquet-Halls",
        "Shamiyana" => "Tent-House",
        "Transport" => "Travel-Agents",
        "Pandits" => "Pandits",
        "Textiles" => "Fabric-Retailers",
        "Bakery" => "Bakeries",
        "Makeover Artists" => "Beauty-Parlours",
        "Music Systems" => "Sound-Systems-On-Hire",
        "Florists" => "Florists",
        "Decorators" => "Wedding-Decorators",
        "Jewellery" => "Jewellery-Showrooms",
        other => return format!("Wedding-{}", other.trim().replace(' ', "-")),
    };

    if UNPREFIXED_CATEGORIES.contains(&category) {
        slug.to_string()
    } else {
        format!("Wedding-{}", slug)
    }
}

impl FeedProfile {
    pub fn for_source(source: Source) -> &'static FeedProfile {
        match source {
            Source::Directory => &DIRECTORY,
            Source::Maps => &MAPS,
        }
    }

    /// 由类目和地点构造搜索页URL
    pub fn search_url(&self, ctx: &RunContext) -> String {
        match self.source {
            Source::Directory => format!(
                "https://www.justdial.com/{}/{}",
                urlencoding::encode(ctx.location_fragment()),
                directory_slug(&ctx.category)
            ),
            Source::Maps => maps_search_url(&format!("{} in {}", ctx.category, ctx.location)),
        }
    }

    /// 记录的摘要文本
    pub fn snippet(&self, name: &str, ctx: &RunContext) -> String {
        match self.source {
            Source::Directory => format!("{} vendor in {}", ctx.category, ctx.location),
            Source::Maps => format!("{} - {} in {}", name, ctx.category, ctx.location),
        }
    }

    /// 名称是否命中样板标签黑名单（不区分大小写）
    pub fn is_blacklisted(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        BLACKLIST
            .iter()
            .any(|label| lowered.contains(&label.to_lowercase()))
    }
}

/// 地图搜索URL
pub fn maps_search_url(query: &str) -> String {
    format!(
        "https://www.google.com/maps/search/{}",
        urlencoding::encode(query)
    )
}
