// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_log::ScraperRunLog;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 运行日志仓库特质
///
/// 日志只追加，不提供修改和删除接口
#[async_trait]
pub trait RunLogRepository: Send + Sync {
    async fn append(&self, log: &ScraperRunLog) -> Result<(), RepositoryError>;

    /// 最近的日志，按写入顺序倒序
    async fn recent(&self, limit: u64) -> Result<Vec<ScraperRunLog>, RepositoryError>;
}
