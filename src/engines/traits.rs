// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 页面导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 超时
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    /// 浏览器会话错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 页面脚本执行或结果解析失败
    #[error("Script error: {0}")]
    Script(String),
}

/// 页面中的一个原始条目
///
/// `html` 为条目容器的 outerHTML，`text` 为渲染后的可见文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawItem {
    pub html: String,
    pub text: String,
}

impl RawItem {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }
}

/// 浏览器驱动特质
///
/// 采集循环和二次查询只通过这个接口操作页面，便于在测试中替换为脚本化实现
#[async_trait]
pub trait FeedDriver: Send + Sync {
    /// 导航到指定URL并等待加载完成
    async fn navigate(&self, url: &str) -> Result<(), EngineError>;

    /// 在超时时间内等待选择器出现，出现返回 `true`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, EngineError>;

    /// 统计匹配选择器的元素数量
    async fn count(&self, selector: &str) -> Result<usize, EngineError>;

    /// 滚动容器；`container` 为空时滚动整个窗口
    async fn scroll(&self, container: Option<&str>, delta_px: i64) -> Result<(), EngineError>;

    /// 点击第一个可见且文本包含 `text` 的元素，点击成功返回 `true`
    async fn click_text(&self, selector: &str, text: &str) -> Result<bool, EngineError>;

    /// 页面可见文本中是否包含 `text`
    async fn text_visible(&self, text: &str) -> Result<bool, EngineError>;

    /// 是否存在匹配选择器且在视口内可见的元素
    async fn in_viewport(&self, selector: &str) -> Result<bool, EngineError>;

    /// 按选择器收集条目；`ancestor` 非空时改为收集匹配元素最近的该祖先容器
    async fn items(
        &self,
        selector: &str,
        ancestor: Option<&str>,
    ) -> Result<Vec<RawItem>, EngineError>;

    /// 当前页面的完整HTML
    async fn content(&self) -> Result<String, EngineError>;

    /// 整页PNG截图
    async fn screenshot(&self) -> Result<Vec<u8>, EngineError>;
}
