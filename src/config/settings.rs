// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、浏览器会话、采集循环、请求节奏和产物存储等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 采集循环配置
    pub acquisition: AcquisitionSettings,
    /// 请求节奏配置
    pub pacing: PacingSettings,
    /// 存储配置
    pub storage: StorageSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
}

/// 浏览器会话配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 是否无头模式运行
    pub headless: bool,
    /// 远程 Chrome 调试地址（设置后不再本地启动浏览器）
    pub remote_debugging_url: Option<String>,
    /// 固定的桌面浏览器 User-Agent
    pub user_agent: String,
    /// 视口宽度
    pub window_width: u32,
    /// 视口高度
    pub window_height: u32,
    /// 页面导航超时时间（秒）
    pub navigation_timeout_secs: u64,
    /// 等待结果容器出现的时间（秒）
    pub feed_wait_secs: u64,
    /// 二次查询页面加载后的等待时间（毫秒）
    pub lookup_settle_ms: u64,
}

/// 采集循环配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AcquisitionSettings {
    /// 目标条目数，未设置时使用来源默认值
    pub target_count: Option<usize>,
    /// 连续无增长轮次上限
    pub max_stall_rounds: u32,
    /// 单次滚动像素
    pub scroll_step_px: i64,
    /// 每轮滚动次数
    pub scroll_steps_per_round: u32,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            target_count: None,
            max_stall_rounds: 30,
            scroll_step_px: 200,
            scroll_steps_per_round: 10,
        }
    }
}

/// 请求节奏配置设置
///
/// 所有区间均为毫秒，最小值与最大值都为 0 时表示不等待
#[derive(Debug, Clone, Deserialize)]
pub struct PacingSettings {
    pub scroll_min_ms: u64,
    pub scroll_max_ms: u64,
    pub round_min_ms: u64,
    pub round_max_ms: u64,
    pub lookup_min_ms: u64,
    pub lookup_max_ms: u64,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 批次产物、导出文件和诊断快照的输出目录
    pub output_dir: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .set_default("database.url", "sqlite://marriage_vendors.db?mode=rwc")?
            .set_default("database.max_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            // Browser session
            .set_default("browser.headless", false)?
            .set_default(
                "browser.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
            )?
            .set_default("browser.window_width", 1366)?
            .set_default("browser.window_height", 768)?
            .set_default("browser.navigation_timeout_secs", 60)?
            .set_default("browser.feed_wait_secs", 20)?
            .set_default("browser.lookup_settle_ms", 3000)?
            // Acquisition loop
            .set_default("acquisition.max_stall_rounds", 30)?
            .set_default("acquisition.scroll_step_px", 200)?
            .set_default("acquisition.scroll_steps_per_round", 10)?
            // Pacing
            .set_default("pacing.scroll_min_ms", 400)?
            .set_default("pacing.scroll_max_ms", 700)?
            .set_default("pacing.round_min_ms", 2000)?
            .set_default("pacing.round_max_ms", 4000)?
            .set_default("pacing.lookup_min_ms", 2000)?
            .set_default("pacing.lookup_max_ms", 4000)?
            .set_default("storage.output_dir", ".")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("VENDORSCOUT").separator("__"));

        builder.build()?.try_deserialize()
    }
}
