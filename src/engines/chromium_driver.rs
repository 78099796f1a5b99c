// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{EngineError, FeedDriver, RawItem};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// 隐藏自动化特征的初始化脚本，在每个文档加载前执行
const WEBDRIVER_MASK: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
window.chrome = window.chrome || { runtime: {} };
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
"#;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 基于 chromiumoxide 的浏览器驱动
///
/// 一次运行持有一个浏览器会话和一个页面，所有操作顺序执行
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumDriver {
    /// 启动（或连接）浏览器并完成反检测设置
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, EngineError> {
        let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url).await.map_err(|e| {
                EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
            })?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .window_size(settings.window_width, settings.window_height)
                .request_timeout(Duration::from_secs(settings.navigation_timeout_secs))
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-infobars")
                .arg("--disable-dev-shm-usage")
                .arg(format!("--user-agent={}", settings.user_agent));

            if !settings.headless {
                builder = builder.with_head();
            }

            Browser::launch(builder.build().map_err(EngineError::Browser)?)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
        };

        // 浏览器事件循环
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        page.set_user_agent(settings.user_agent.as_str())
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(WEBDRIVER_MASK))
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
        })
    }

    /// 关闭浏览器会话
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        self.handler.abort();
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, EngineError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| EngineError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| EngineError::Script(e.to_string()))
    }
}

/// 把任意文本转成 JS 字符串字面量
fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait]
impl FeedDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        tokio::time::timeout(self.navigation_timeout, async {
            self.page
                .goto(url)
                .await
                .map_err(|e| EngineError::Navigation(e.to_string()))?;
            Ok::<(), EngineError>(())
        })
        .await
        .map_err(|_| EngineError::Timeout(self.navigation_timeout))?
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, EngineError> {
        let started = Instant::now();
        loop {
            if self.count(selector).await? > 0 {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn count(&self, selector: &str) -> Result<usize, EngineError> {
        self.eval(format!(
            "document.querySelectorAll({}).length",
            js_str(selector)
        ))
        .await
    }

    async fn scroll(&self, container: Option<&str>, delta_px: i64) -> Result<(), EngineError> {
        let script = match container {
            Some(selector) => format!(
                "(() => {{ const el = document.querySelector({}); \
                 if (el) {{ el.scrollBy(0, {delta}); }} else {{ window.scrollBy(0, {delta}); }} \
                 return true; }})()",
                js_str(selector),
                delta = delta_px
            ),
            None => format!("(() => {{ window.scrollBy(0, {}); return true; }})()", delta_px),
        };
        let _: bool = self.eval(script).await?;
        Ok(())
    }

    async fn click_text(&self, selector: &str, text: &str) -> Result<bool, EngineError> {
        self.eval(format!(
            "(() => {{ const needle = {}.toLowerCase(); \
             for (const el of document.querySelectorAll({})) {{ \
               const label = (el.innerText || el.textContent || '').toLowerCase(); \
               if (el.offsetParent !== null && label.includes(needle)) {{ el.click(); return true; }} \
             }} return false; }})()",
            js_str(text),
            js_str(selector)
        ))
        .await
    }

    async fn text_visible(&self, text: &str) -> Result<bool, EngineError> {
        self.eval(format!(
            "(document.body ? document.body.innerText : '').includes({})",
            js_str(text)
        ))
        .await
    }

    async fn in_viewport(&self, selector: &str) -> Result<bool, EngineError> {
        self.eval(format!(
            "(() => {{ for (const el of document.querySelectorAll({})) {{ \
               const r = el.getBoundingClientRect(); \
               if (r.height > 0 && r.top < window.innerHeight && r.bottom > 0) return true; \
             }} return false; }})()",
            js_str(selector)
        ))
        .await
    }

    async fn items(
        &self,
        selector: &str,
        ancestor: Option<&str>,
    ) -> Result<Vec<RawItem>, EngineError> {
        let ancestor = ancestor.map(js_str).unwrap_or_else(|| "null".to_string());
        self.eval(format!(
            "(() => {{ const anc = {}; const seen = new Set(); const out = []; \
             for (const el of document.querySelectorAll({})) {{ \
               const node = anc ? (el.closest(anc) || el.parentElement || el) : el; \
               if (seen.has(node)) continue; seen.add(node); \
               out.push({{ html: node.outerHTML, text: node.innerText || '' }}); \
             }} return out; }})()",
            ancestor,
            js_str(selector)
        ))
        .await
    }

    async fn content(&self) -> Result<String, EngineError> {
        self.page
            .content()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, EngineError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        self.page
            .screenshot(params)
            .await
            .map_err(|e| EngineError::Browser(format!("Page screenshot failed: {}", e)))
    }
}
