// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_batch::{artifact_key, export_key, RunBatch, Source};
use crate::domain::models::run_log::{RunStatus, ScraperRunLog};
use crate::domain::models::vendor::{is_missing_phone, RunContext};
use crate::domain::repositories::run_log_repository::RunLogRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::vendor_repository::VendorRepository;
use crate::domain::services::acquisition_service::AcquisitionService;
use crate::domain::services::extraction_service::ListingExtractor;
use crate::domain::services::normalizer;
use crate::engines::profiles::FeedProfile;
use crate::engines::traits::FeedDriver;
use crate::utils::errors::PipelineError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 失败日志消息的最大长度
const MAX_LOG_MESSAGE: usize = 200;

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub status: RunStatus,
    pub message: String,
    /// 本次提取出的记录数
    pub scraped: usize,
    /// 新写入仓库的记录数
    pub added: usize,
}

impl RunResult {
    fn new(status: RunStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            scraped: 0,
            added: 0,
        }
    }

    /// 运行是否在结构上完成（零条记录也算完成）
    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Success | RunStatus::Warning)
    }
}

/// 运行编排服务
///
/// `run` 串联采集、提取、写批次产物和入库四个步骤，
/// 每次调用都会追加一条运行日志
pub struct RunService {
    vendors: Arc<dyn VendorRepository>,
    logs: Arc<dyn RunLogRepository>,
    storage: Arc<dyn StorageRepository>,
}

impl RunService {
    pub fn new(
        vendors: Arc<dyn VendorRepository>,
        logs: Arc<dyn RunLogRepository>,
        storage: Arc<dyn StorageRepository>,
    ) -> Self {
        Self {
            vendors,
            logs,
            storage,
        }
    }

    /// 执行一次完整运行
    pub async fn run(
        &self,
        driver: &dyn FeedDriver,
        acquisition: &AcquisitionService,
        category: &str,
        location: &str,
        source: Source,
    ) -> RunResult {
        info!("Starting {} run for {} in {}", source, category, location);

        let scraped = match self
            .scrape(driver, acquisition, category, location, source)
            .await
        {
            Ok(scraped) => scraped,
            Err(e) => return self.record_failure(category, location, e).await,
        };

        match self.ingest(category, location).await {
            Ok(mut result) => {
                result.scraped = scraped;
                result
            }
            Err(e) => self.record_failure(category, location, e).await,
        }
    }

    /// 采集并提取，写出批次产物，返回记录数
    pub async fn scrape(
        &self,
        driver: &dyn FeedDriver,
        acquisition: &AcquisitionService,
        category: &str,
        location: &str,
        source: Source,
    ) -> Result<usize, PipelineError> {
        let ctx = RunContext::new(category, location);
        let profile = FeedProfile::for_source(source);

        let acquired = acquisition.acquire(driver, profile, &ctx).await?;
        info!(
            "Acquired {} raw items in {} rounds ({:?})",
            acquired.items.len(),
            acquired.rounds,
            acquired.stop
        );

        let mut extractor = ListingExtractor::new(profile, ctx.clone());
        let mut batch = RunBatch::new(&ctx, source);
        batch.vendors =
            extractor.extract_all(&acquired.items, acquisition.options().target_count);

        let key = batch.artifact_key();
        self.storage.save(&key, &batch.to_json()?).await?;
        info!(
            "Successfully scraped {} vendors. Saved to {}",
            batch.vendors.len(),
            self.storage.locate(&key)
        );

        Ok(batch.vendors.len())
    }

    /// 把批次产物写入仓库并记录运行日志
    ///
    /// 产物缺失记为 Warning，无法解析记为 Failed，二者都不是错误返回
    pub async fn ingest(&self, category: &str, location: &str) -> Result<RunResult, PipelineError> {
        let key = artifact_key(category, location);

        let Some(data) = self.storage.get(&key).await? else {
            warn!("Output file '{}' not found", self.storage.locate(&key));
            let result = RunResult::new(RunStatus::Warning, "Output file not found");
            self.record(category, location, &result).await?;
            return Ok(result);
        };

        let batch = match RunBatch::from_json(&data) {
            Ok(batch) => batch,
            Err(e) => {
                error!("JSON decode failed for {}: {}", key, e);
                let result = RunResult::new(RunStatus::Failed, "JSON decode failed");
                self.record(category, location, &result).await?;
                return Ok(result);
            }
        };

        let mut added = 0;
        for vendor in &batch.vendors {
            if self.vendors.upsert(vendor).await? {
                added += 1;
            }
        }

        info!("Success: Added {} new vendors for {}", added, category);
        let mut result =
            RunResult::new(RunStatus::Success, format!("Added {} new vendors", added));
        result.scraped = batch.vendors.len();
        result.added = added;
        self.record(category, location, &result).await?;

        Ok(result)
    }

    /// 导出 `name,phone,address` CSV，返回导出文件位置
    pub async fn export(&self, category: &str, location: &str) -> Result<String, PipelineError> {
        let key = artifact_key(category, location);
        let data = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| PipelineError::MissingBatch(self.storage.locate(&key)))?;
        let batch = RunBatch::from_json(&data)?;

        if batch.vendors.is_empty() {
            return Err(PipelineError::EmptyBatch(key));
        }

        let mut csv = String::from("name,phone,address\r\n");
        for vendor in &batch.vendors {
            let (phone, address) = export_fields(&vendor.phone, &vendor.address);
            csv.push_str(&format!(
                "{},{},{}\r\n",
                csv_field(&vendor.name),
                csv_field(&phone),
                csv_field(&address)
            ));
        }

        let export = export_key(category, location);
        self.storage.save(&export, csv.as_bytes()).await?;
        let path = self.storage.locate(&export);
        info!("Exported {} vendors to {}", batch.vendors.len(), path);

        Ok(path)
    }

    async fn record(
        &self,
        category: &str,
        location: &str,
        result: &RunResult,
    ) -> Result<(), PipelineError> {
        let log = ScraperRunLog::now(category, location, result.status, result.message.clone());
        self.logs.append(&log).await?;
        Ok(())
    }

    /// 记录一次运行级错误并返回对应的运行结果
    ///
    /// 导航/浏览器类记为 Failed，其余记为 Exception；日志消息截断到 200 个字符。
    /// 浏览器未能启动等发生在 `run` 之外的错误也通过这里写入运行日志
    pub async fn record_failure(
        &self,
        category: &str,
        location: &str,
        err: PipelineError,
    ) -> RunResult {
        let status = match err {
            PipelineError::Navigation { .. } | PipelineError::Engine(_) => RunStatus::Failed,
            _ => RunStatus::Exception,
        };
        error!("Run for {} in {} ended with {}: {}", category, location, status, err);

        let result = RunResult::new(status, truncate(&err.to_string(), MAX_LOG_MESSAGE));
        if let Err(e) = self.record(category, location, &result).await {
            error!("Failed to write run log: {}", e);
        }
        result
    }
}

/// 导出前的字段清理
///
/// 电话缺失时尝试从地址中分离；地址带营业时间样板时再清理一次
pub fn export_fields(phone: &str, address: &str) -> (String, String) {
    let mut phone = phone.to_string();
    let mut address = address.to_string();

    if is_missing_phone(&phone) && !address.is_empty() {
        let (cleaned, embedded) = normalizer::normalize(&address);
        if let Some(embedded) = embedded {
            phone = embedded;
            address = cleaned;
        }
    }
    if normalizer::has_hours_boilerplate(&address) {
        address = normalizer::normalize(&address).0;
    }

    (phone, address)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}
