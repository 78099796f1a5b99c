// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vendor::{VendorRecord, PHONE_NOT_AVAILABLE, RATING_NOT_AVAILABLE};
use crate::domain::repositories::vendor_repository::{StoredVendor, VendorFilter, VendorRepository};
use crate::infrastructure::database::entities::vendor as vendor_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use std::sync::Arc;

/// 供应商仓库实现
///
/// 基于SeaORM实现的供应商数据访问层
#[derive(Clone)]
pub struct VendorRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl VendorRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<vendor_entity::Model> for StoredVendor {
    fn from(model: vendor_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            category: model.category,
            location: model.location,
            rating: model.rating,
            summary: model.summary,
        }
    }
}

impl From<&VendorRecord> for vendor_entity::ActiveModel {
    fn from(vendor: &VendorRecord) -> Self {
        let rating = if vendor.rating.is_empty() {
            None
        } else {
            Some(vendor.rating.clone())
        };

        Self {
            name: Set(vendor.name.clone()),
            phone: Set(vendor.phone.clone()),
            address: Set(vendor.address.clone()),
            category: Set(vendor.category.clone()),
            location: Set(vendor.location.clone()),
            rating: Set(rating),
            summary: Set(None),
            ..Default::default()
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl VendorRepository for VendorRepositoryImpl {
    async fn upsert(&self, vendor: &VendorRecord) -> Result<bool, RepositoryError> {
        let model: vendor_entity::ActiveModel = vendor.into();

        let result = vendor_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    vendor_entity::Column::Name,
                    vendor_entity::Column::Phone,
                    vendor_entity::Column::Category,
                    vendor_entity::Column::Location,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await;

        match result {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(vendor_entity::Entity::find().count(self.db.as_ref()).await?)
    }

    async fn counts_by_category(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows = vendor_entity::Entity::find()
            .select_only()
            .column(vendor_entity::Column::Category)
            .column_as(Expr::col(vendor_entity::Column::Id).count(), "count")
            .group_by(vendor_entity::Column::Category)
            .order_by_asc(vendor_entity::Column::Category)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await?;

        Ok(rows)
    }

    async fn top_locations(&self, limit: u64) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows = vendor_entity::Entity::find()
            .select_only()
            .column(vendor_entity::Column::Location)
            .column_as(Expr::col(vendor_entity::Column::Id).count(), "count")
            .group_by(vendor_entity::Column::Location)
            .order_by_desc(Expr::col(vendor_entity::Column::Id).count())
            .order_by_asc(vendor_entity::Column::Location)
            .limit(limit)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await?;

        Ok(rows)
    }

    async fn list(&self, filter: VendorFilter) -> Result<Vec<StoredVendor>, RepositoryError> {
        let mut query = vendor_entity::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(vendor_entity::Column::Category.eq(category));
        }
        if let Some(location) = filter.location {
            query = query.filter(vendor_entity::Column::Location.eq(location));
        }

        let models = query
            .order_by_asc(vendor_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn fill_missing_phone(
        &self,
        name: &str,
        location: &str,
        phone: &str,
    ) -> Result<u64, RepositoryError> {
        let missing = Condition::any()
            .add(vendor_entity::Column::Phone.eq(""))
            .add(vendor_entity::Column::Phone.eq(PHONE_NOT_AVAILABLE))
            .add(vendor_entity::Column::Phone.eq(RATING_NOT_AVAILABLE))
            .add(vendor_entity::Column::Phone.is_null());

        let result = vendor_entity::Entity::update_many()
            .col_expr(vendor_entity::Column::Phone, Expr::value(phone))
            .filter(vendor_entity::Column::Name.eq(name))
            .filter(vendor_entity::Column::Location.eq(location))
            .filter(missing)
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(res) => Ok(res.rows_affected),
            // 已存在同名同电话的记录，保留原记录不动
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(
                    "Phone {} already recorded for {} in {}, skipping update",
                    phone,
                    name,
                    location
                );
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_address(
        &self,
        name: &str,
        location: &str,
        address: &str,
    ) -> Result<u64, RepositoryError> {
        if address.trim().is_empty() || address == location {
            return Ok(0);
        }

        let result = vendor_entity::Entity::update_many()
            .col_expr(vendor_entity::Column::Address, Expr::value(address))
            .filter(vendor_entity::Column::Name.eq(name))
            .filter(vendor_entity::Column::Location.eq(location))
            .filter(vendor_entity::Column::Address.ne(address))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn set_summary(&self, id: i32, summary: &str) -> Result<(), RepositoryError> {
        let result = vendor_entity::Entity::update_many()
            .col_expr(vendor_entity::Column::Summary, Expr::value(summary))
            .filter(vendor_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
