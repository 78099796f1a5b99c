// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

/// 单次运行内的去重器
///
/// 以规整后的 `(name, location)` 为键，只在一次运行内有效；
/// 跨运行的重复由仓库的唯一约束处理
#[derive(Debug, Default)]
pub struct RunDeduplicator {
    seen: HashSet<(String, String)>,
}

impl RunDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次出现返回 `true` 并记住该键，重复出现返回 `false`
    pub fn admit(&mut self, name: &str, location: &str) -> bool {
        self.seen.insert(Self::key(name, location))
    }

    fn key(name: &str, location: &str) -> (String, String) {
        (fold(name), fold(location))
    }
}

/// 小写并折叠空白
fn fold(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
