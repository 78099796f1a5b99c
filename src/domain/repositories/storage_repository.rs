// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 产物存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Other(String),
}

/// 产物存储特质
///
/// 批次产物（JSON）、导出文件（CSV）和诊断快照都通过键存取，
/// 键即输出目录下的相对文件名
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 写入（覆盖）指定键的内容
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 读取指定键的内容，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// 键对应的可读位置，用于日志输出
    fn locate(&self, key: &str) -> String {
        key.to_string()
    }
}
