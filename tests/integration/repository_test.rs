// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{setup_db, vendor};
use vendorscout::domain::models::run_log::{RunStatus, ScraperRunLog};
use vendorscout::domain::models::vendor::RunContext;
use vendorscout::domain::repositories::run_log_repository::RunLogRepository;
use vendorscout::domain::repositories::vendor_repository::{VendorFilter, VendorRepository};
use vendorscout::infrastructure::repositories::run_log_repo_impl::RunLogRepositoryImpl;
use vendorscout::infrastructure::repositories::vendor_repo_impl::VendorRepositoryImpl;
use vendorscout::utils::errors::RepositoryError;

#[tokio::test]
async fn test_upsert_is_idempotent_on_identity() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let ctx = RunContext::new("Catering", "Shimoga");
    let record = vendor("Sri Ganesh Caterers", "9844282504", "BH Road", &ctx);

    assert!(repo.upsert(&record).await.unwrap());
    assert!(!repo.upsert(&record).await.unwrap());

    // 身份键之外的字段不同也视为同一条记录
    let mut changed = record.clone();
    changed.address = "Gopala".to_string();
    assert!(!repo.upsert(&changed).await.unwrap());

    // 电话不同则是另一条记录
    let mut other_phone = record.clone();
    other_phone.phone = "9900512345".to_string();
    assert!(repo.upsert(&other_phone).await.unwrap());

    assert_eq!(repo.count().await.unwrap(), 2);
    let stored = repo.list(VendorFilter::default()).await.unwrap();
    assert_eq!(stored[0].address, "BH Road");
    assert_eq!(stored[0].rating.as_deref(), Some("N/A"));
    assert_eq!(stored[0].summary, None);
}

#[tokio::test]
async fn test_grouped_counts_and_filters() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let shimoga = RunContext::new("Catering", "Shimoga");
    let mysore = RunContext::new("Catering", "Mysore");
    let halls = RunContext::new("Halls", "Mysore");

    for (name, ctx) in [
        ("A", &shimoga),
        ("B", &mysore),
        ("C", &mysore),
        ("D", &halls),
    ] {
        assert!(repo.upsert(&vendor(name, "N/A", "", ctx)).await.unwrap());
    }

    assert_eq!(
        repo.counts_by_category().await.unwrap(),
        vec![("Catering".to_string(), 3), ("Halls".to_string(), 1)]
    );
    assert_eq!(
        repo.top_locations(5).await.unwrap(),
        vec![("Mysore".to_string(), 3), ("Shimoga".to_string(), 1)]
    );
    assert_eq!(repo.top_locations(1).await.unwrap().len(), 1);

    let filtered = repo
        .list(VendorFilter {
            category: Some("Catering".to_string()),
            location: Some("Mysore".to_string()),
        })
        .await
        .unwrap();
    let names: Vec<_> = filtered.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[tokio::test]
async fn test_fill_missing_phone_only_touches_sentinels() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let ctx = RunContext::new("Halls", "Shimoga");

    repo.upsert(&vendor("Royal Hall", "Not Available", "", &ctx))
        .await
        .unwrap();
    repo.upsert(&vendor("Royal Hall", "9844282504", "", &ctx))
        .await
        .unwrap();

    let rows = repo
        .fill_missing_phone("Royal Hall", "Shimoga", "9900512345")
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let mut phones: Vec<_> = repo
        .list(VendorFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.phone)
        .collect();
    phones.sort();
    assert_eq!(phones, vec!["9844282504", "9900512345"]);

    // 已经没有缺失电话的记录
    let rows = repo
        .fill_missing_phone("Royal Hall", "Shimoga", "9123456789")
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_fill_missing_phone_collision_is_skipped() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let ctx = RunContext::new("Halls", "Shimoga");

    repo.upsert(&vendor("Royal Hall", "N/A", "", &ctx))
        .await
        .unwrap();
    repo.upsert(&vendor("Royal Hall", "9844282504", "", &ctx))
        .await
        .unwrap();

    // 写入后会与已有记录的身份键冲突
    let rows = repo
        .fill_missing_phone("Royal Hall", "Shimoga", "9844282504")
        .await
        .unwrap();
    assert_eq!(rows, 0);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_update_address_rules() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let ctx = RunContext::new("Halls", "Shimoga");
    repo.upsert(&vendor("Royal Hall", "N/A", "Shimoga", &ctx))
        .await
        .unwrap();

    assert_eq!(
        repo.update_address("Royal Hall", "Shimoga", "Shimoga")
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        repo.update_address("Royal Hall", "Shimoga", "   ").await.unwrap(),
        0
    );
    assert_eq!(
        repo.update_address("Royal Hall", "Shimoga", "BH Road, Shimoga")
            .await
            .unwrap(),
        1
    );
    // 相同地址不再更新
    assert_eq!(
        repo.update_address("Royal Hall", "Shimoga", "BH Road, Shimoga")
            .await
            .unwrap(),
        0
    );

    let stored = repo.list(VendorFilter::default()).await.unwrap();
    assert_eq!(stored[0].address, "BH Road, Shimoga");
}

#[tokio::test]
async fn test_set_summary() {
    let repo = VendorRepositoryImpl::new(setup_db().await);
    let ctx = RunContext::new("Halls", "Shimoga");
    repo.upsert(&vendor("Royal Hall", "N/A", "", &ctx))
        .await
        .unwrap();
    let id = repo.list(VendorFilter::default()).await.unwrap()[0].id;

    repo.set_summary(id, "Spacious hall near the bus stand")
        .await
        .unwrap();
    let stored = repo.list(VendorFilter::default()).await.unwrap();
    assert_eq!(
        stored[0].summary.as_deref(),
        Some("Spacious hall near the bus stand")
    );

    let err = repo.set_summary(id + 100, "missing").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn test_run_logs_are_returned_newest_first() {
    let repo = RunLogRepositoryImpl::new(setup_db().await);

    repo.append(&ScraperRunLog::now(
        "Halls",
        "Shimoga",
        RunStatus::Success,
        "Added 3 new vendors",
    ))
    .await
    .unwrap();
    repo.append(&ScraperRunLog::now(
        "Halls",
        "Mysore",
        RunStatus::Failed,
        "导航失败",
    ))
    .await
    .unwrap();

    let logs = repo.recent(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].location, "Mysore");
    assert_eq!(logs[0].status, RunStatus::Failed);
    assert_eq!(logs[1].message, "Added 3 new vendors");
    assert!(logs[1].timestamp <= logs[0].timestamp);

    assert_eq!(repo.recent(1).await.unwrap().len(), 1);
}
