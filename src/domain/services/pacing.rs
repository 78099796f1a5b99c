// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PacingSettings;
use std::time::Duration;

/// 随机等待区间
///
/// 网络操作之间的随机停顿，用来降低被识别为自动化流量的概率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    min_ms: u64,
    max_ms: u64,
}

impl Pacing {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// 不等待
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.max_ms == 0
    }

    /// 在区间内取一个随机时长
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.max_ms);
        }
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    pub async fn pause(&self) {
        if self.is_none() {
            return;
        }
        tokio::time::sleep(self.sample()).await;
    }
}

/// 采集与补全流程的节奏策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacingPolicy {
    /// 每次小步滚动之间
    pub scroll: Pacing,
    /// 每轮滚动结束后等待新条目加载
    pub round: Pacing,
    /// 相邻两次二次查询之间
    pub lookup: Pacing,
}

impl PacingPolicy {
    pub fn none() -> Self {
        Self::default()
    }
}

impl From<&PacingSettings> for PacingPolicy {
    fn from(settings: &PacingSettings) -> Self {
        Self {
            scroll: Pacing::new(settings.scroll_min_ms, settings.scroll_max_ms),
            round: Pacing::new(settings.round_min_ms, settings.round_max_ms),
            lookup: Pacing::new(settings.lookup_min_ms, settings.lookup_max_ms),
        }
    }
}
