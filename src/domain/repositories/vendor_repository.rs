// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vendor::VendorRecord;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use serde::Serialize;

/// 已持久化的供应商记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredVendor {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub category: String,
    pub location: String,
    pub rating: Option<String>,
    pub summary: Option<String>,
}

/// 供应商查询条件
#[derive(Debug, Default, Clone)]
pub struct VendorFilter {
    pub category: Option<String>,
    pub location: Option<String>,
}

/// 供应商仓库特质
///
/// 身份键 `(name, phone, category, location)` 上的唯一约束由存储层保证
#[async_trait]
pub trait VendorRepository: Send + Sync {
    /// 插入记录；身份键已存在时不做任何修改并返回 `false`
    async fn upsert(&self, vendor: &VendorRecord) -> Result<bool, RepositoryError>;

    /// 记录总数
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// 按类目分组计数
    async fn counts_by_category(&self) -> Result<Vec<(String, i64)>, RepositoryError>;

    /// 记录数最多的地点，按数量降序
    async fn top_locations(&self, limit: u64) -> Result<Vec<(String, i64)>, RepositoryError>;

    async fn list(&self, filter: VendorFilter) -> Result<Vec<StoredVendor>, RepositoryError>;

    /// 为 `(name, location)` 匹配且电话缺失的记录写入电话，返回受影响行数
    async fn fill_missing_phone(
        &self,
        name: &str,
        location: &str,
        phone: &str,
    ) -> Result<u64, RepositoryError>;

    /// 为 `(name, location)` 匹配的记录写入地址，地址与地点相同则不写
    async fn update_address(
        &self,
        name: &str,
        location: &str,
        address: &str,
    ) -> Result<u64, RepositoryError>;

    async fn set_summary(&self, id: i32, summary: &str) -> Result<(), RepositoryError>;
}
