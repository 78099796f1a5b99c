// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{batch, setup_stores, vendor, ScriptedDriver, ScriptedLookup, TestStores};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vendorscout::domain::models::run_batch::{artifact_key, RunBatch};
use vendorscout::domain::models::vendor::{RunContext, VendorRecord};
use vendorscout::domain::repositories::storage_repository::StorageRepository;
use vendorscout::domain::repositories::vendor_repository::{
    StoredVendor, VendorFilter, VendorRepository,
};
use vendorscout::domain::services::enrichment_service::{EnrichmentService, VendorLookup};
use vendorscout::domain::services::pacing::Pacing;
use vendorscout::engines::place_lookup::MapsPlaceLookup;
use vendorscout::engines::traits::RawItem;
use vendorscout::infrastructure::repositories::vendor_repo_impl::VendorRepositoryImpl;
use vendorscout::utils::errors::{PipelineError, RepositoryError};

fn ctx() -> RunContext {
    RunContext::new("Halls", "Shimoga")
}

/// 写入批次产物并把记录入库
async fn seed(stores: &TestStores) {
    let ctx = ctx();
    let run = batch(
        &ctx,
        vec![
            vendor("Royal Hall", "Not Available", "Shimoga", &ctx),
            vendor("Kalyana Mantapa", "9844282504", "Sagar Road", &ctx),
            vendor("Sri Devi Hall", "N/A", "Shimoga", &ctx),
        ],
    );
    for record in &run.vendors {
        stores.vendors.upsert(record).await.unwrap();
    }
    stores
        .storage
        .save(&run.artifact_key(), &run.to_json().unwrap())
        .await
        .unwrap();
}

fn service(stores: &TestStores) -> EnrichmentService {
    EnrichmentService::new(stores.vendors.clone(), stores.storage.clone(), Pacing::none())
}

async fn load_batch(stores: &TestStores) -> RunBatch {
    let data = stores
        .storage
        .get(&artifact_key("Halls", "Shimoga"))
        .await
        .unwrap()
        .unwrap();
    RunBatch::from_json(&data).unwrap()
}

#[tokio::test]
async fn test_reconcile_fills_phone_and_address() {
    let stores = setup_stores().await;
    seed(&stores).await;

    let lookup = ScriptedLookup::new()
        .answer("Royal Hall", Some("99005 12345"), Some("BH Road, Shimoga"))
        .fail("Sri Devi Hall", "panel did not load");

    let updated = service(&stores)
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap();

    assert_eq!(updated, 1);
    // 只查询缺失电话的记录，单次失败不影响其余记录
    assert_eq!(lookup.calls(), vec!["Royal Hall", "Sri Devi Hall"]);

    let run = load_batch(&stores).await;
    assert_eq!(run.vendors[0].phone, "99005 12345");
    assert_eq!(run.vendors[0].address, "BH Road, Shimoga");
    assert_eq!(run.vendors[1].phone, "9844282504");
    assert_eq!(run.vendors[2].phone, "N/A");

    let stored = stores
        .vendors
        .list(VendorFilter {
            category: None,
            location: Some("Shimoga".to_string()),
        })
        .await
        .unwrap();
    let royal = stored.iter().find(|v| v.name == "Royal Hall").unwrap();
    assert_eq!(royal.phone, "99005 12345");
    assert_eq!(royal.address, "BH Road, Shimoga");
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let stores = setup_stores().await;
    seed(&stores).await;

    let lookup = ScriptedLookup::new()
        .answer("Royal Hall", Some("99005 12345"), Some("BH Road, Shimoga"))
        .answer("Sri Devi Hall", Some("08182 222333"), None);
    let service = service(&stores);

    assert_eq!(service.reconcile(&lookup, "Halls", "Shimoga").await.unwrap(), 2);
    let first = load_batch(&stores).await;

    assert_eq!(service.reconcile(&lookup, "Halls", "Shimoga").await.unwrap(), 0);
    assert_eq!(load_batch(&stores).await, first);
    assert_eq!(lookup.calls().len(), 2);
    assert_eq!(stores.vendors.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_phone_is_split_out_of_looked_up_address() {
    let stores = setup_stores().await;
    seed(&stores).await;

    let lookup = ScriptedLookup::new().answer(
        "Royal Hall",
        None,
        Some("Open \u{00b7} Closes 10 pm \u{00b7} 99005 12345 BH Road"),
    );

    service(&stores)
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap();

    let run = load_batch(&stores).await;
    assert_eq!(run.vendors[0].phone, "99005 12345");
    assert_eq!(run.vendors[0].address, "BH Road");
}

#[tokio::test]
async fn test_address_equal_to_location_is_ignored() {
    let stores = setup_stores().await;
    seed(&stores).await;

    let lookup = ScriptedLookup::new().answer("Sri Devi Hall", None, Some("Shimoga"));

    let updated = service(&stores)
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap();

    assert_eq!(updated, 0);
    assert_eq!(load_batch(&stores).await.vendors[2].address, "Shimoga");
}

#[tokio::test]
async fn test_missing_batch_is_an_error() {
    let stores = setup_stores().await;
    let lookup = ScriptedLookup::new();

    let err = service(&stores)
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::MissingBatch(_)));
    assert!(lookup.calls().is_empty());
}

#[tokio::test]
async fn test_nothing_pending_skips_lookups() {
    let stores = setup_stores().await;
    let ctx = ctx();
    let run = batch(&ctx, vec![vendor("Kalyana Mantapa", "9844282504", "", &ctx)]);
    stores
        .storage
        .save(&run.artifact_key(), &run.to_json().unwrap())
        .await
        .unwrap();

    let lookup = ScriptedLookup::new();
    let updated = service(&stores)
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap();

    assert_eq!(updated, 0);
    assert!(lookup.calls().is_empty());
}

#[tokio::test]
async fn test_place_lookup_reads_main_panel() {
    let mut driver = ScriptedDriver::new(vec![vec![RawItem::new(
        r#"<div role="main"><button data-item-id="address" aria-label="Address: 12, BH Road, Shimoga 577201"></button></div>"#,
        "Royal Hall\n4.2\nCall 99005 12345",
    )]]);
    driver.item_selector = "div[role='main']";

    let lookup = MapsPlaceLookup::new(&driver, Duration::ZERO);
    let outcome = lookup.lookup("Royal Hall", "Shimoga").await.unwrap();

    assert_eq!(outcome.phone.as_deref(), Some("99005 12345"));
    assert_eq!(outcome.address.as_deref(), Some("12, BH Road, Shimoga 577201"));
    assert_eq!(
        driver.navigations(),
        vec!["https://www.google.com/maps/search/Royal%20Hall%20Shimoga".to_string()]
    );
}

#[tokio::test]
async fn test_place_lookup_navigation_failure() {
    let mut driver = ScriptedDriver::new(vec![vec![]]);
    driver.fail_navigation = true;

    let lookup = MapsPlaceLookup::new(&driver, Duration::ZERO);
    let err = lookup.lookup("Royal Hall", "Shimoga").await.unwrap_err();

    assert!(matches!(err, PipelineError::Lookup(_)));
}

/// 对指定供应商的电话写入返回错误，其余操作转发给真实仓库
struct FailingVendors {
    inner: Arc<VendorRepositoryImpl>,
    fail_for: &'static str,
}

#[async_trait]
impl VendorRepository for FailingVendors {
    async fn upsert(&self, vendor: &VendorRecord) -> Result<bool, RepositoryError> {
        self.inner.upsert(vendor).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count().await
    }

    async fn counts_by_category(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        self.inner.counts_by_category().await
    }

    async fn top_locations(&self, limit: u64) -> Result<Vec<(String, i64)>, RepositoryError> {
        self.inner.top_locations(limit).await
    }

    async fn list(&self, filter: VendorFilter) -> Result<Vec<StoredVendor>, RepositoryError> {
        self.inner.list(filter).await
    }

    async fn fill_missing_phone(
        &self,
        name: &str,
        location: &str,
        phone: &str,
    ) -> Result<u64, RepositoryError> {
        if name == self.fail_for {
            return Err(RepositoryError::NotFound);
        }
        self.inner.fill_missing_phone(name, location, phone).await
    }

    async fn update_address(
        &self,
        name: &str,
        location: &str,
        address: &str,
    ) -> Result<u64, RepositoryError> {
        self.inner.update_address(name, location, address).await
    }

    async fn set_summary(&self, id: i32, summary: &str) -> Result<(), RepositoryError> {
        self.inner.set_summary(id, summary).await
    }
}

#[tokio::test]
async fn test_store_error_keeps_earlier_merges_in_artifact() {
    let stores = setup_stores().await;
    seed(&stores).await;

    let vendors = Arc::new(FailingVendors {
        inner: stores.vendors.clone(),
        fail_for: "Sri Devi Hall",
    });
    let service = EnrichmentService::new(vendors, stores.storage.clone(), Pacing::none());
    let lookup = ScriptedLookup::new()
        .answer("Royal Hall", Some("99005 12345"), None)
        .answer("Sri Devi Hall", Some("08182 222333"), None);

    let err = service
        .reconcile(&lookup, "Halls", "Shimoga")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Repository(RepositoryError::NotFound)
    ));

    // 仓库与产物对已处理的记录保持一致
    let run = load_batch(&stores).await;
    assert_eq!(run.vendors[0].phone, "99005 12345");
    assert_eq!(run.vendors[2].phone, "N/A");

    let stored = stores.vendors.list(VendorFilter::default()).await.unwrap();
    let royal = stored.iter().find(|v| v.name == "Royal Hall").unwrap();
    assert_eq!(royal.phone, "99005 12345");
}
