// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_log::{RunStatus, ScraperRunLog};
use crate::domain::repositories::run_log_repository::RunLogRepository;
use crate::infrastructure::database::entities::scraper_log as scraper_log_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use std::sync::Arc;

/// 运行日志仓库实现
#[derive(Clone)]
pub struct RunLogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl RunLogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<scraper_log_entity::Model> for ScraperRunLog {
    fn from(model: scraper_log_entity::Model) -> Self {
        Self {
            timestamp: model.timestamp,
            category: model.category,
            location: model.location,
            // 未知状态按异常处理，避免历史数据导致读取失败
            status: model.status.parse().unwrap_or(RunStatus::Exception),
            message: model.message,
        }
    }
}

#[async_trait]
impl RunLogRepository for RunLogRepositoryImpl {
    async fn append(&self, log: &ScraperRunLog) -> Result<(), RepositoryError> {
        let model = scraper_log_entity::ActiveModel {
            timestamp: Set(log.timestamp),
            category: Set(log.category.clone()),
            location: Set(log.location.clone()),
            status: Set(log.status.to_string()),
            message: Set(log.message.clone()),
            ..Default::default()
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<ScraperRunLog>, RepositoryError> {
        let models = scraper_log_entity::Entity::find()
            .order_by_desc(scraper_log_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
