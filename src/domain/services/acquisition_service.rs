// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{AcquisitionSettings, BrowserSettings};
use crate::domain::models::vendor::RunContext;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::services::pacing::PacingPolicy;
use crate::engines::profiles::FeedProfile;
use crate::engines::traits::{FeedDriver, RawItem};
use crate::utils::errors::PipelineError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 导航失败时保存的页面快照
pub const ERROR_SNAPSHOT_KEY: &str = "last_scrape_error.html";
/// 导航失败时保存的截图
pub const ERROR_SCREENSHOT_KEY: &str = "debug_error.png";
/// 一个条目都没有时保存的页面快照
pub const EMPTY_SNAPSHOT_KEY: &str = "last_scrape.html";

/// 采集循环参数
#[derive(Debug, Clone)]
pub struct AcquisitionOptions {
    pub target_count: usize,
    pub max_stall_rounds: u32,
    pub scroll_step_px: i64,
    pub scroll_steps_per_round: u32,
    /// 等待结果容器出现的上限
    pub feed_wait: Duration,
}

impl AcquisitionOptions {
    pub fn from_settings(
        acquisition: &AcquisitionSettings,
        browser: &BrowserSettings,
        profile: &FeedProfile,
    ) -> Self {
        Self {
            target_count: acquisition.target_count.unwrap_or(profile.default_target),
            max_stall_rounds: acquisition.max_stall_rounds,
            scroll_step_px: acquisition.scroll_step_px,
            scroll_steps_per_round: acquisition.scroll_steps_per_round,
            feed_wait: Duration::from_secs(browser.feed_wait_secs),
        }
    }
}

/// 循环结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    Stalled,
    EndOfList,
    Footer,
}

/// 采集结果：按出现顺序排列、互不重复的原始条目
#[derive(Debug, Clone)]
pub struct Acquired {
    pub items: Vec<RawItem>,
    pub rounds: u32,
    pub stop: StopReason,
    /// 结果容器是否在等待上限内出现
    pub feed_found: bool,
}

/// 采集循环
///
/// 导航到搜索页后反复滚动结果容器，直到条目数达到目标、
/// 连续无增长的轮次超过上限、或出现列表结束标志
pub struct AcquisitionService {
    storage: Arc<dyn StorageRepository>,
    pacing: PacingPolicy,
    options: AcquisitionOptions,
}

impl AcquisitionService {
    pub fn new(
        storage: Arc<dyn StorageRepository>,
        pacing: PacingPolicy,
        options: AcquisitionOptions,
    ) -> Self {
        Self {
            storage,
            pacing,
            options,
        }
    }

    pub fn options(&self) -> &AcquisitionOptions {
        &self.options
    }

    pub async fn acquire(
        &self,
        driver: &dyn FeedDriver,
        profile: &FeedProfile,
        ctx: &RunContext,
    ) -> Result<Acquired, PipelineError> {
        let url = profile.search_url(ctx);
        info!("Navigating to {} for {} in {}", url, ctx.category, ctx.location);

        if let Err(e) = driver.navigate(&url).await {
            error!("导航失败: {}", e);
            self.capture_failure(driver).await;
            return Err(PipelineError::Navigation {
                url,
                reason: e.to_string(),
            });
        }

        let feed_found = match driver
            .wait_for(profile.ready_selector, self.options.feed_wait)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                error!("等待结果容器失败: {}", e);
                self.capture_failure(driver).await;
                return Err(PipelineError::Navigation {
                    url,
                    reason: e.to_string(),
                });
            }
        };

        let container = if feed_found {
            info!("Feed found: {}", profile.ready_selector);
            profile.scroll_container
        } else {
            warn!(
                "Feed {} not found within {:?}, falling back to page content",
                profile.ready_selector, self.options.feed_wait
            );
            None
        };

        let target = self.options.target_count;
        let mut items: Vec<RawItem> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stall: u32 = 0;
        let mut rounds: u32 = 0;

        info!("Starting scroll loop. Target: {} items", target);

        let stop = loop {
            rounds += 1;

            let added = self.collect(driver, profile, &mut items, &mut seen).await;
            if added == 0 {
                stall += 1;
            } else {
                stall = 0;
            }
            info!(
                "  - Currently loaded: {} (+{}), stall {}/{}",
                items.len(),
                added,
                stall,
                self.options.max_stall_rounds
            );

            if items.len() >= target {
                info!("Reached target count");
                break StopReason::TargetReached;
            }
            if self.end_marker_visible(driver, profile).await {
                info!("Reached end of list");
                break StopReason::EndOfList;
            }
            if stall > 0 && self.footer_visible(driver, profile).await {
                info!("Footer detected, stopping scroll");
                break StopReason::Footer;
            }
            if stall > self.options.max_stall_rounds {
                warn!("No growth for {} rounds, giving up", stall);
                break StopReason::Stalled;
            }

            self.scroll_round(driver, profile, container).await;
        };

        if items.is_empty() {
            warn!("No items found. Saving page markup to {}", EMPTY_SNAPSHOT_KEY);
            match driver.content().await {
                Ok(html) => self.store_diagnostic(EMPTY_SNAPSHOT_KEY, html.as_bytes()).await,
                Err(e) => warn!("Failed to read page content: {}", e),
            }
        }

        Ok(Acquired {
            items,
            rounds,
            stop,
            feed_found,
        })
    }

    /// 按条目策略收集当前页面中的条目，返回新增数量
    async fn collect(
        &self,
        driver: &dyn FeedDriver,
        profile: &FeedProfile,
        items: &mut Vec<RawItem>,
        seen: &mut HashSet<String>,
    ) -> usize {
        for strategy in profile.item_strategies {
            let found = match driver.items(strategy.selector, strategy.ancestor).await {
                Ok(found) => found,
                Err(e) => {
                    warn!("Strategy {} failed: {}", strategy.label, e);
                    continue;
                }
            };
            if found.is_empty() {
                continue;
            }

            debug!(
                "  - Found {} items in DOM (Strategy: {})",
                found.len(),
                strategy.label
            );

            let before = items.len();
            for item in found {
                if seen.insert(item_key(&item)) {
                    items.push(item);
                }
            }
            return items.len() - before;
        }

        0
    }

    async fn scroll_round(
        &self,
        driver: &dyn FeedDriver,
        profile: &FeedProfile,
        container: Option<&str>,
    ) {
        for _ in 0..self.options.scroll_steps_per_round {
            if let Err(e) = driver.scroll(container, self.options.scroll_step_px).await {
                warn!("Scroll error: {}", e);
                break;
            }
            self.pacing.scroll.pause().await;
        }

        for button in profile.load_more {
            match driver.click_text(button.selector, button.text).await {
                Ok(true) => {
                    debug!("Clicked load-more button {}", button.selector);
                    break;
                }
                Ok(false) => {}
                Err(e) => warn!("Load-more click failed: {}", e),
            }
        }

        self.pacing.round.pause().await;
    }

    async fn end_marker_visible(&self, driver: &dyn FeedDriver, profile: &FeedProfile) -> bool {
        for marker in profile.end_markers {
            match driver.text_visible(marker).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => warn!("End marker check failed: {}", e),
            }
        }
        false
    }

    async fn footer_visible(&self, driver: &dyn FeedDriver, profile: &FeedProfile) -> bool {
        for selector in profile.footer_selectors {
            if let Ok(true) = driver.in_viewport(selector).await {
                return true;
            }
        }
        false
    }

    /// 保存失败现场：页面HTML和截图，各自失败只记录日志
    async fn capture_failure(&self, driver: &dyn FeedDriver) {
        match driver.screenshot().await {
            Ok(png) => self.store_diagnostic(ERROR_SCREENSHOT_KEY, &png).await,
            Err(e) => warn!("Failed to capture screenshot: {}", e),
        }
        match driver.content().await {
            Ok(html) => self.store_diagnostic(ERROR_SNAPSHOT_KEY, html.as_bytes()).await,
            Err(e) => warn!("Failed to read page content: {}", e),
        }
    }

    async fn store_diagnostic(&self, key: &str, data: &[u8]) {
        match self.storage.save(key, data).await {
            Ok(()) => info!("Diagnostic saved to {}", self.storage.locate(key)),
            Err(e) => warn!("Failed to save diagnostic {}: {}", key, e),
        }
    }
}

/// 条目去重键：渲染文本，为空时退回到HTML
fn item_key(item: &RawItem) -> String {
    let text = item.text.trim();
    if text.is_empty() {
        item.html.clone()
    } else {
        text.to_string()
    }
}
