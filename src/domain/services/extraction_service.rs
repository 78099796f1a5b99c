// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vendor::{
    RunContext, VendorRecord, PHONE_NOT_AVAILABLE, RATING_NOT_AVAILABLE, UNKNOWN_VENDOR,
};
use crate::domain::services::deduplicator::RunDeduplicator;
use crate::domain::services::normalizer;
use crate::engines::profiles::{FeedProfile, Locator};
use crate::engines::traits::RawItem;
use crate::utils::errors::PipelineError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// 常见街道词
static STREET_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Road|Rd|Street|St|Cross|Main|Nagar|Layout|Circle|Colony|Extension)\b")
        .expect("Failed to compile street regex")
});

/// 单个条目的提取结果
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(VendorRecord),
    /// 名称命中样板标签
    Blacklisted(String),
    /// 本次运行中已出现过相同 `(name, location)`
    Duplicate(String),
}

/// 解析后的条目视图，供定位策略读取
struct ItemView<'a> {
    fragment: Html,
    item: &'a RawItem,
    ctx: &'a RunContext,
}

impl<'a> ItemView<'a> {
    fn parse(item: &'a RawItem, ctx: &'a RunContext) -> Self {
        Self {
            fragment: Html::parse_fragment(&item.html),
            item,
            ctx,
        }
    }

    fn root(&self) -> Option<ElementRef<'_>> {
        self.fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
    }

    fn first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, PipelineError> {
        let selector = parse_selector(selector)?;
        Ok(self.fragment.select(&selector).next())
    }

    /// 渲染文本的各行；没有渲染文本时退回到HTML中的文本节点
    fn lines(&self) -> Vec<String> {
        let source: Vec<String> = if self.item.text.trim().is_empty() {
            self.fragment
                .root_element()
                .text()
                .map(str::to_string)
                .collect()
        } else {
            self.item.text.lines().map(str::to_string).collect()
        };

        source
            .iter()
            .map(|line| collapse(line))
            .filter(|line| !line.is_empty())
            .collect()
    }

    fn full_text(&self) -> String {
        self.lines().join("\n")
    }

    /// 依次应用定位策略，返回第一个非空结果
    fn resolve(
        &self,
        chain: &[Locator],
        exclude: Option<&str>,
        finish: impl Fn(String) -> Option<String>,
    ) -> Result<Option<String>, PipelineError> {
        for locator in chain {
            if let Some(value) = self.apply(locator, exclude)? {
                if let Some(done) = finish(value) {
                    return Ok(Some(done));
                }
            }
        }
        Ok(None)
    }

    fn apply(
        &self,
        locator: &Locator,
        exclude: Option<&str>,
    ) -> Result<Option<String>, PipelineError> {
        let value = match *locator {
            Locator::Text(selector) => self.first(selector)?.map(|el| element_text(&el)),
            Locator::TextWithout { selector, remove } => self
                .first(selector)?
                .map(|el| collapse(&element_text(&el).replace(remove, ""))),
            Locator::Attr(selector, attr) => self
                .first(selector)?
                .and_then(|el| el.value().attr(attr).map(collapse)),
            Locator::RootAttr(attr) => self
                .root()
                .and_then(|el| el.value().attr(attr).map(collapse)),
            Locator::AttrBefore {
                selector,
                attr,
                marker,
            } => self.first(selector)?.and_then(|el| {
                el.value()
                    .attr(attr)
                    .filter(|value| value.contains(marker))
                    .and_then(|value| value.split(marker).next())
                    .map(collapse)
            }),
            Locator::PhonePattern => normalizer::find_phone(&self.full_text()),
            Locator::AddressLine => {
                let fragment = self.ctx.location_fragment().to_lowercase();
                self.lines().into_iter().find(|line| {
                    if exclude.is_some_and(|name| line == name) {
                        return false;
                    }
                    (!fragment.is_empty() && line.to_lowercase().contains(&fragment))
                        || STREET_TOKEN.is_match(line)
                })
            }
        };

        Ok(value.filter(|v| !v.is_empty()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PipelineError> {
    Selector::parse(selector)
        .map_err(|e| PipelineError::Extraction(format!("invalid selector {}: {}", selector, e)))
}

/// 元素内所有文本节点，按空白折叠
fn element_text(el: &ElementRef) -> String {
    collapse(&el.text().collect::<Vec<_>>().join(" "))
}

/// 元素的第一段非空文本
fn element_first_line(el: &ElementRef) -> Option<String> {
    el.text().map(collapse).find(|t| !t.is_empty())
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 列表条目提取器
///
/// 每次运行创建一个，内部持有该次运行的去重器
pub struct ListingExtractor {
    profile: &'static FeedProfile,
    ctx: RunContext,
    dedup: RunDeduplicator,
}

impl ListingExtractor {
    pub fn new(profile: &'static FeedProfile, ctx: RunContext) -> Self {
        Self {
            profile,
            ctx,
            dedup: RunDeduplicator::new(),
        }
    }

    /// 提取单个条目
    ///
    /// 结构性缺失不是错误：字段按定位链依次回退，最终落到占位值
    pub fn extract(&mut self, item: &RawItem) -> Result<Extraction, PipelineError> {
        if item.html.trim().is_empty() && item.text.trim().is_empty() {
            return Err(PipelineError::Extraction("empty item".to_string()));
        }

        let view = ItemView::parse(item, &self.ctx);

        let name = self
            .resolve_name(&view)?
            .unwrap_or_else(|| UNKNOWN_VENDOR.to_string());

        if self.profile.is_blacklisted(&name) {
            return Ok(Extraction::Blacklisted(name));
        }
        if !self.dedup.admit(&name, &self.ctx.location) {
            return Ok(Extraction::Duplicate(name));
        }

        let mut phone = view
            .resolve(self.profile.phone, None, |raw| normalizer::find_phone(&raw))?
            .unwrap_or_else(|| PHONE_NOT_AVAILABLE.to_string());

        let address = match view.resolve(self.profile.address, Some(name.as_str()), Some)? {
            Some(raw) => {
                let (cleaned, embedded) = normalizer::normalize(&raw);
                let cleaned = match embedded {
                    Some(found) if normalizer::is_valid_phone(&found) => {
                        if phone == PHONE_NOT_AVAILABLE {
                            phone = found;
                        }
                        cleaned
                    }
                    // 不是合法号码时留在地址里，由导出阶段再分离
                    Some(_) => normalizer::strip_hours(&raw),
                    None => cleaned,
                };
                if cleaned.is_empty() {
                    self.ctx.location.clone()
                } else {
                    cleaned
                }
            }
            None => self.ctx.location.clone(),
        };

        let rating = view
            .resolve(self.profile.rating, None, Some)?
            .unwrap_or_else(|| RATING_NOT_AVAILABLE.to_string());

        let snippet = self.profile.snippet(&name, &self.ctx);

        Ok(Extraction::Record(VendorRecord {
            name,
            phone,
            address,
            rating,
            snippet,
            category: self.ctx.category.clone(),
            location: self.ctx.location.clone(),
        }))
    }

    fn resolve_name(&self, view: &ItemView) -> Result<Option<String>, PipelineError> {
        if !self.profile.first_line_name {
            return view.resolve(self.profile.name, None, Some);
        }

        // 标题元素常带有认证、标签等附加文本，只取第一段
        for locator in self.profile.name {
            let value = match *locator {
                Locator::Text(selector) => view
                    .first(selector)?
                    .and_then(|el| element_first_line(&el)),
                _ => view
                    .apply(locator, None)?
                    .and_then(|v| v.lines().next().map(str::to_string)),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// 按顺序提取条目，最多产出 `limit` 条记录
    ///
    /// 单个条目的错误只记录日志，不中断循环
    pub fn extract_all(&mut self, items: &[RawItem], limit: usize) -> Vec<VendorRecord> {
        let mut records = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if records.len() >= limit {
                break;
            }

            match self.extract(item) {
                Ok(Extraction::Record(record)) => {
                    debug!(
                        "    + Added: {} | Phone: {} | Address: {}",
                        record.name, record.phone, record.address
                    );
                    records.push(record);
                }
                Ok(Extraction::Blacklisted(name)) => {
                    debug!("Skipped blacklisted item: {}", name);
                }
                Ok(Extraction::Duplicate(name)) => {
                    debug!("Skipped duplicate item: {}", name);
                }
                Err(e) => {
                    warn!("条目 {} 提取失败，跳过: {}", index, e);
                }
            }
        }

        records
    }
}
