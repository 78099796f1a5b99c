// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{batch, maps_article, setup_stores, test_options, vendor, ScriptedDriver, TestStores};
use vendorscout::domain::models::run_batch::{artifact_key, export_key, RunBatch, Source};
use vendorscout::domain::models::run_log::RunStatus;
use vendorscout::domain::models::vendor::RunContext;
use vendorscout::domain::repositories::run_log_repository::RunLogRepository;
use vendorscout::domain::repositories::storage_repository::StorageRepository;
use vendorscout::domain::repositories::vendor_repository::{VendorFilter, VendorRepository};
use vendorscout::domain::services::acquisition_service::{
    AcquisitionService, ERROR_SCREENSHOT_KEY, ERROR_SNAPSHOT_KEY,
};
use vendorscout::domain::services::pacing::PacingPolicy;
use vendorscout::domain::services::run_service::RunService;
use vendorscout::engines::traits::{EngineError, RawItem};
use vendorscout::utils::errors::PipelineError;

const CATEGORY: &str = "Halls";
const LOCATION: &str = "Shimoga, Karnataka";

fn run_service(stores: &TestStores) -> RunService {
    RunService::new(
        stores.vendors.clone(),
        stores.logs.clone(),
        stores.storage.clone(),
    )
}

fn acquisition(stores: &TestStores, target: usize) -> AcquisitionService {
    AcquisitionService::new(
        stores.storage.clone(),
        PacingPolicy::none(),
        test_options(target, 0),
    )
}

#[tokio::test]
async fn test_run_discards_boilerplate_and_duplicates() {
    let stores = setup_stores().await;
    let driver = ScriptedDriver::new(vec![vec![
        RawItem::new(
            r#"<div role="article" aria-label="Popular Searches"></div>"#,
            "Popular Searches\nHalls near you",
        ),
        maps_article("Royal Hall", "BH Road, Shimoga \u{00b7} 99005 12345"),
        maps_article("ROYAL HALL", "Sagar Road, Shimoga"),
    ]]);

    let result = run_service(&stores)
        .run(&driver, &acquisition(&stores, 50), CATEGORY, LOCATION, Source::Maps)
        .await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.message, "Added 1 new vendors");
    assert_eq!(result.scraped, 1);
    assert_eq!(result.added, 1);
    assert!(result.is_complete());

    let data = stores
        .storage
        .get(&artifact_key(CATEGORY, LOCATION))
        .await
        .unwrap()
        .unwrap();
    let run = RunBatch::from_json(&data).unwrap();
    assert_eq!(run.source, Some(Source::Maps));
    assert_eq!(run.vendors.len(), 1);
    assert_eq!(run.vendors[0].name, "Royal Hall");
    assert_eq!(run.vendors[0].phone, "99005 12345");
    assert_eq!(run.vendors[0].address, "BH Road, Shimoga");
    assert_eq!(run.vendors[0].rating, "N/A");

    let stored = stores.vendors.list(VendorFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, CATEGORY);
    assert_eq!(stored[0].location, LOCATION);

    let logs = stores.logs.recent(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, RunStatus::Success);
}

#[tokio::test]
async fn test_run_respects_target_count() {
    let stores = setup_stores().await;
    let items: Vec<_> = (1..=5)
        .map(|i| maps_article(&format!("Hall {}", i), "Shimoga"))
        .collect();
    let driver = ScriptedDriver::new(vec![items]);

    let result = run_service(&stores)
        .run(&driver, &acquisition(&stores, 3), CATEGORY, LOCATION, Source::Maps)
        .await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.scraped, 3);
    assert_eq!(stores.vendors.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_rerun_adds_nothing_new() {
    let stores = setup_stores().await;
    let driver = ScriptedDriver::new(vec![vec![
        maps_article("Royal Hall", "BH Road, Shimoga"),
        maps_article("Kalyana Mantapa", "Sagar Road, Shimoga"),
    ]]);
    let service = run_service(&stores);
    let acquisition = acquisition(&stores, 50);

    let first = service
        .run(&driver, &acquisition, CATEGORY, LOCATION, Source::Maps)
        .await;
    let second = service
        .run(&driver, &acquisition, CATEGORY, LOCATION, Source::Maps)
        .await;

    assert_eq!(first.added, 2);
    assert_eq!(second.status, RunStatus::Success);
    assert_eq!(second.scraped, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.message, "Added 0 new vendors");
    assert_eq!(stores.vendors.count().await.unwrap(), 2);
    assert_eq!(stores.logs.recent(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_run_is_still_complete() {
    let stores = setup_stores().await;
    let driver = ScriptedDriver::new(vec![vec![]]);

    let result = run_service(&stores)
        .run(&driver, &acquisition(&stores, 50), CATEGORY, LOCATION, Source::Maps)
        .await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.scraped, 0);
    assert!(result.is_complete());
    assert!(stores
        .storage
        .exists(&artifact_key(CATEGORY, LOCATION))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_navigation_failure_is_logged_as_failed() {
    let stores = setup_stores().await;
    let mut driver = ScriptedDriver::new(vec![vec![]]);
    driver.fail_navigation = true;

    let result = run_service(&stores)
        .run(&driver, &acquisition(&stores, 50), CATEGORY, LOCATION, Source::Maps)
        .await;

    assert_eq!(result.status, RunStatus::Failed);
    assert!(!result.is_complete());
    assert!(result.message.chars().count() <= 200);

    let logs = stores.logs.recent(1).await.unwrap();
    assert_eq!(logs[0].status, RunStatus::Failed);
    assert_eq!(logs[0].category, CATEGORY);

    assert!(stores.storage.exists(ERROR_SNAPSHOT_KEY).await.unwrap());
    assert!(stores.storage.exists(ERROR_SCREENSHOT_KEY).await.unwrap());
    assert!(!stores
        .storage
        .exists(&artifact_key(CATEGORY, LOCATION))
        .await
        .unwrap());
    assert_eq!(stores.vendors.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_browser_launch_failure_is_logged() {
    let stores = setup_stores().await;
    let reason = format!("Failed to launch Chrome: {}", "x".repeat(300));

    let result = run_service(&stores)
        .record_failure(
            CATEGORY,
            LOCATION,
            PipelineError::Engine(EngineError::Browser(reason)),
        )
        .await;

    assert_eq!(result.status, RunStatus::Failed);
    assert!(!result.is_complete());
    assert_eq!(result.message.chars().count(), 200);

    let logs = stores.logs.recent(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, RunStatus::Failed);
    assert_eq!(logs[0].location, LOCATION);
    assert_eq!(logs[0].message, result.message);
}

#[tokio::test]
async fn test_unexpected_failure_is_logged_as_exception() {
    let stores = setup_stores().await;

    let result = run_service(&stores)
        .record_failure(
            CATEGORY,
            LOCATION,
            PipelineError::MissingBatch("vendors_Halls_Shimoga_Karnataka.json".to_string()),
        )
        .await;

    assert_eq!(result.status, RunStatus::Exception);
    assert_eq!(
        stores.logs.recent(1).await.unwrap()[0].status,
        RunStatus::Exception
    );
}

#[tokio::test]
async fn test_directory_run_uses_directory_url() {
    let stores = setup_stores().await;
    let mut driver = ScriptedDriver::new(vec![vec![RawItem::new(
        r#"<li class="cntanr"><h2 class="store-name">Sri Ganesh Caterers</h2><span class="callcontent">98442 82504</span></li>"#,
        "Sri Ganesh Caterers\n98442 82504",
    )]]);
    driver.item_selector = "li.cntanr";

    let result = run_service(&stores)
        .run(
            &driver,
            &acquisition(&stores, 50),
            "Catering",
            LOCATION,
            Source::Directory,
        )
        .await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.added, 1);
    assert_eq!(
        driver.navigations(),
        vec!["https://www.justdial.com/Shimoga/Wedding-Caterers".to_string()]
    );

    let stored = stores.vendors.list(VendorFilter::default()).await.unwrap();
    assert_eq!(stored[0].name, "Sri Ganesh Caterers");
    assert_eq!(stored[0].phone, "98442 82504");
}

#[tokio::test]
async fn test_ingest_without_artifact_warns() {
    let stores = setup_stores().await;

    let result = run_service(&stores).ingest(CATEGORY, LOCATION).await.unwrap();

    assert_eq!(result.status, RunStatus::Warning);
    assert_eq!(result.message, "Output file not found");
    assert!(result.is_complete());

    let logs = stores.logs.recent(1).await.unwrap();
    assert_eq!(logs[0].status, RunStatus::Warning);
    assert_eq!(logs[0].message, "Output file not found");
}

#[tokio::test]
async fn test_ingest_with_broken_artifact_fails() {
    let stores = setup_stores().await;
    stores
        .storage
        .save(&artifact_key(CATEGORY, LOCATION), b"{\"vendors\": [")
        .await
        .unwrap();

    let result = run_service(&stores).ingest(CATEGORY, LOCATION).await.unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.message, "JSON decode failed");
    assert_eq!(
        stores.logs.recent(1).await.unwrap()[0].status,
        RunStatus::Failed
    );
    assert_eq!(stores.vendors.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ingest_accepts_null_fields() {
    let stores = setup_stores().await;
    let artifact = r#"{
        "category": "Halls",
        "location": "Shimoga, Karnataka",
        "vendors": [
            {"name": "Royal Hall", "phone": null, "address": "BH Road", "rating": null}
        ]
    }"#;
    stores
        .storage
        .save(&artifact_key(CATEGORY, LOCATION), artifact.as_bytes())
        .await
        .unwrap();

    let result = run_service(&stores).ingest(CATEGORY, LOCATION).await.unwrap();

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.added, 1);
    let stored = stores.vendors.list(VendorFilter::default()).await.unwrap();
    assert_eq!(stored[0].phone, "");
    assert_eq!(stored[0].location, LOCATION);
}

#[tokio::test]
async fn test_export_writes_csv() {
    let stores = setup_stores().await;
    let ctx = RunContext::new(CATEGORY, LOCATION);
    let run = batch(
        &ctx,
        vec![
            vendor("Royal Hall", "99005 12345", "BH Road, Shimoga", &ctx),
            vendor(
                "Kalyana Mantapa",
                "Not Available",
                "073386 66555 Open \u{00b7} Closes 5 pm \u{00b7} 4th Cross",
                &ctx,
            ),
        ],
    );
    stores
        .storage
        .save(&run.artifact_key(), &run.to_json().unwrap())
        .await
        .unwrap();

    let path = run_service(&stores).export(CATEGORY, LOCATION).await.unwrap();
    assert_eq!(path, export_key(CATEGORY, LOCATION));

    let csv = stores.storage.get(&path).await.unwrap().unwrap();
    assert_eq!(
        String::from_utf8(csv).unwrap(),
        "name,phone,address\r\n\
         Royal Hall,99005 12345,\"BH Road, Shimoga\"\r\n\
         Kalyana Mantapa,073386 66555,4th Cross\r\n"
    );
}

#[tokio::test]
async fn test_export_requires_vendors() {
    let stores = setup_stores().await;
    let service = run_service(&stores);

    let err = service.export(CATEGORY, LOCATION).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingBatch(_)));

    let ctx = RunContext::new(CATEGORY, LOCATION);
    let run = batch(&ctx, Vec::new());
    stores
        .storage
        .save(&run.artifact_key(), &run.to_json().unwrap())
        .await
        .unwrap();

    let err = service.export(CATEGORY, LOCATION).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyBatch(_)));
}
