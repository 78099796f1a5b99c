// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_batch::{artifact_key, RunBatch};
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::vendor_repository::VendorRepository;
use crate::domain::services::normalizer;
use crate::domain::services::pacing::Pacing;
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 一次二次查询找到的信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOutcome {
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl LookupOutcome {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.address.is_none()
    }
}

/// 二次查询特质
///
/// 以 `name + location` 为键独立查询单个供应商
#[async_trait]
pub trait VendorLookup: Send + Sync {
    async fn lookup(&self, name: &str, location: &str) -> Result<LookupOutcome, PipelineError>;
}

/// 补全服务
///
/// 读取批次中电话缺失的记录，逐个二次查询，
/// 把结果合并回仓库和批次产物
pub struct EnrichmentService {
    vendors: Arc<dyn VendorRepository>,
    storage: Arc<dyn StorageRepository>,
    pacing: Pacing,
}

impl EnrichmentService {
    pub fn new(
        vendors: Arc<dyn VendorRepository>,
        storage: Arc<dyn StorageRepository>,
        pacing: Pacing,
    ) -> Self {
        Self {
            vendors,
            storage,
            pacing,
        }
    }

    /// 补全一个批次，返回实际发生变化的记录数
    ///
    /// 单个供应商的查询失败只记录日志；仓库和存储错误会中止本次补全，
    /// 中止前已合并的记录仍会写回批次产物
    pub async fn reconcile(
        &self,
        lookup: &dyn VendorLookup,
        category: &str,
        location: &str,
    ) -> Result<usize, PipelineError> {
        let key = artifact_key(category, location);
        let data = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| PipelineError::MissingBatch(self.storage.locate(&key)))?;
        let mut batch = RunBatch::from_json(&data)?;

        let pending: Vec<usize> = batch
            .vendors
            .iter()
            .enumerate()
            .filter(|(_, v)| v.needs_phone())
            .map(|(i, _)| i)
            .collect();

        info!(
            "Loaded {} vendors from {}, {} missing phone",
            batch.vendors.len(),
            key,
            pending.len()
        );
        if pending.is_empty() {
            info!("No vendors need enrichment");
            return Ok(0);
        }

        let mut updated = 0;
        for (n, index) in pending.into_iter().enumerate() {
            if n > 0 {
                self.pacing.pause().await;
            }

            let name = batch.vendors[index].name.clone();
            debug!("Searching: {} {}", name, location);

            let outcome = match lookup.lookup(&name, location).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Error enriching {}: {}", name, e);
                    continue;
                }
            };

            match self.merge(&mut batch, index, outcome).await {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => {
                    // 已合并的记录先落盘，保持产物与仓库一致
                    error!("Store update failed for {}: {}", name, e);
                    self.storage.save(&key, &batch.to_json()?).await?;
                    return Err(e);
                }
            }
        }

        self.storage.save(&key, &batch.to_json()?).await?;
        info!("Enrichment complete. Updated {} vendors", updated);

        Ok(updated)
    }

    /// 合并单条查询结果，返回批次记录是否发生变化
    async fn merge(
        &self,
        batch: &mut RunBatch,
        index: usize,
        outcome: LookupOutcome,
    ) -> Result<bool, PipelineError> {
        let location = batch.location.clone();
        let LookupOutcome { mut phone, mut address } = outcome;

        // 没找到电话时，从地址文本中尝试分离
        if phone.is_none() {
            if let Some(raw) = address.take() {
                let (cleaned, embedded) = normalizer::normalize(&raw);
                phone = embedded;
                address = Some(cleaned).filter(|a| !a.is_empty());
            }
        }

        let vendor = &mut batch.vendors[index];
        let mut changed = false;

        if let Some(phone) = phone {
            let rows = self
                .vendors
                .fill_missing_phone(&vendor.name, &location, &phone)
                .await?;
            if rows > 0 {
                info!("Updated DB phone for {}", vendor.name);
            }
            if vendor.needs_phone() {
                vendor.phone = phone;
                changed = true;
            }
        }

        if let Some(address) = address.filter(|a| a != &location) {
            self.vendors
                .update_address(&vendor.name, &location, &address)
                .await?;
            if vendor.address != address {
                vendor.address = address;
                changed = true;
            }
        }

        if changed {
            info!("  Found {} | {}", vendor.phone, vendor.address);
        } else {
            debug!("  Nothing new for {}", vendor.name);
        }

        Ok(changed)
    }
}
