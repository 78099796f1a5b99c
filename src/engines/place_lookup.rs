// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::enrichment_service::{LookupOutcome, VendorLookup};
use crate::domain::services::normalizer;
use crate::engines::profiles::maps_search_url;
use crate::engines::traits::{FeedDriver, RawItem};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;

const MAIN_PANEL: &str = "div[role='main']";

static POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}\b").expect("Failed to compile postal code regex"));

static ADDRESS_BUTTON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("button[data-item-id='address']").expect("Failed to parse address selector")
});

/// 地图详情面板查询
///
/// 按 `name location` 搜索，读取主面板中的电话和地址
pub struct MapsPlaceLookup<'a> {
    driver: &'a dyn FeedDriver,
    settle: Duration,
}

impl<'a> MapsPlaceLookup<'a> {
    pub fn new(driver: &'a dyn FeedDriver, settle: Duration) -> Self {
        Self { driver, settle }
    }
}

#[async_trait]
impl VendorLookup for MapsPlaceLookup<'_> {
    async fn lookup(&self, name: &str, location: &str) -> Result<LookupOutcome, PipelineError> {
        let url = maps_search_url(&format!("{} {}", name, location));

        self.driver
            .navigate(&url)
            .await
            .map_err(|e| PipelineError::Lookup(e.to_string()))?;
        tokio::time::sleep(self.settle).await;

        let panels = self
            .driver
            .items(MAIN_PANEL, None)
            .await
            .map_err(|e| PipelineError::Lookup(e.to_string()))?;

        Ok(panels
            .first()
            .map(parse_place_panel)
            .unwrap_or_default())
    }
}

/// 解析详情面板
///
/// 电话取面板文本中的手机号/座机号；地址优先取地址按钮的 `aria-label`，
/// 否则取第一行带 6 位邮编的文本
pub fn parse_place_panel(panel: &RawItem) -> LookupOutcome {
    let phone = normalizer::find_phone(&panel.text);

    let document = Html::parse_fragment(&panel.html);
    let address = document
        .select(&ADDRESS_BUTTON)
        .next()
        .and_then(|button| button.value().attr("aria-label"))
        .map(|label| label.replace("Address: ", "").trim().to_string())
        .filter(|label| !label.is_empty())
        .or_else(|| {
            panel
                .text
                .lines()
                .map(str::trim)
                .find(|line| POSTAL_CODE.is_match(line))
                .map(str::to_string)
        });

    LookupOutcome { phone, address }
}
