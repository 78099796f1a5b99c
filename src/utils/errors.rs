// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::storage_repository::StorageError;
use crate::engines::traits::EngineError;
use thiserror::Error;

/// 仓库层错误类型
///
/// 重复的身份键不属于错误，`upsert` 以 `false` 返回
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("未找到数据")]
    NotFound,
}

/// 流水线错误类型
///
/// 条目级错误（提取、二次查询）由循环内部吞掉并记录，
/// 只有运行级错误会从 `run` 之类的入口向外传播
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 页面或结果列表在等待上限内未就绪
    #[error("导航失败 {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// 单个条目处理失败
    #[error("条目提取失败: {0}")]
    Extraction(String),

    /// 单次二次查询失败
    #[error("二次查询失败: {0}")]
    Lookup(String),

    #[error("浏览器错误: {0}")]
    Engine(#[from] EngineError),

    #[error("仓库错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("批次产物解析失败: {0}")]
    Artifact(#[from] serde_json::Error),

    #[error("批次产物不存在: {0}")]
    MissingBatch(String),

    #[error("批次中没有供应商: {0}")]
    EmptyBatch(String),
}

impl From<sea_orm::DbErr> for PipelineError {
    fn from(err: sea_orm::DbErr) -> Self {
        PipelineError::Repository(RepositoryError::DatabaseError(err))
    }
}
