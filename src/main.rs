// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use vendorscout::config::settings::Settings;
use vendorscout::domain::models::run_batch::Source;
use vendorscout::domain::repositories::run_log_repository::RunLogRepository;
use vendorscout::domain::repositories::storage_repository::StorageRepository;
use vendorscout::domain::repositories::vendor_repository::{VendorFilter, VendorRepository};
use vendorscout::domain::services::acquisition_service::{AcquisitionOptions, AcquisitionService};
use vendorscout::domain::services::enrichment_service::EnrichmentService;
use vendorscout::domain::services::pacing::PacingPolicy;
use vendorscout::domain::services::run_service::RunService;
use vendorscout::engines::chromium_driver::ChromiumDriver;
use vendorscout::engines::place_lookup::MapsPlaceLookup;
use vendorscout::engines::profiles::FeedProfile;
use vendorscout::infrastructure::database::connection;
use vendorscout::infrastructure::repositories::run_log_repo_impl::RunLogRepositoryImpl;
use vendorscout::infrastructure::repositories::vendor_repo_impl::VendorRepositoryImpl;
use vendorscout::infrastructure::storage::create_storage_repository;
use vendorscout::utils::telemetry;

#[derive(Parser)]
#[clap(name = "vendorscout", about = "Wedding vendor listing pipeline")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one category/location, write the batch artifact and ingest it
    Scrape {
        #[clap(long)]
        category: String,
        #[clap(long)]
        location: String,
        /// Listing source: maps or directory
        #[clap(long, default_value = "maps")]
        source: Source,
        /// Override the per-source target item count
        #[clap(long)]
        target: Option<usize>,
    },

    /// Fill missing phones/addresses of an existing batch via place lookups
    Enrich {
        #[clap(long)]
        category: String,
        #[clap(long)]
        location: String,
    },

    /// Upsert an existing batch artifact into the store
    Ingest {
        #[clap(long)]
        category: String,
        #[clap(long)]
        location: String,
    },

    /// Export name/phone/address of a batch to CSV
    Export {
        #[clap(long)]
        category: String,
        #[clap(long)]
        location: String,
    },

    /// List stored vendors
    List {
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        location: Option<String>,
    },

    /// Store an externally generated summary for a vendor
    Summarize {
        #[clap(long)]
        id: i32,
        #[clap(long)]
        text: String,
    },

    /// Show vendor counts
    Stats {
        /// Number of top locations to show
        #[clap(short, long, default_value = "5")]
        limit: u64,
    },

    /// Show recent run logs
    Logs {
        #[clap(short, long, default_value = "10")]
        limit: u64,
    },
}

/// 主函数
///
/// 退出码 0 表示运行在结构上完成，非零表示运行级错误
#[tokio::main]
async fn main() -> Result<ExitCode> {
    telemetry::init_telemetry();
    let cli = Cli::parse();

    let settings = Settings::new()?;
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    Migrator::up(db.as_ref(), None).await?;

    let vendors: Arc<dyn VendorRepository> = Arc::new(VendorRepositoryImpl::new(db.clone()));
    let logs: Arc<dyn RunLogRepository> = Arc::new(RunLogRepositoryImpl::new(db.clone()));
    let storage: Arc<dyn StorageRepository> = create_storage_repository(&settings.storage)?;
    let pacing = PacingPolicy::from(&settings.pacing);
    let runs = RunService::new(vendors.clone(), logs.clone(), storage.clone());

    match cli.command {
        Commands::Scrape {
            category,
            location,
            source,
            target,
        } => {
            let profile = FeedProfile::for_source(source);
            let mut options =
                AcquisitionOptions::from_settings(&settings.acquisition, &settings.browser, profile);
            if let Some(target) = target {
                options.target_count = target;
            }
            let acquisition = AcquisitionService::new(storage.clone(), pacing, options);

            let driver = match ChromiumDriver::launch(&settings.browser).await {
                Ok(driver) => driver,
                Err(e) => {
                    let result = runs.record_failure(&category, &location, e.into()).await;
                    error!("{}: {}", result.status, result.message);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let result = runs
                .run(&driver, &acquisition, &category, &location, source)
                .await;
            driver.close().await;

            info!("{}: {}", result.status, result.message);
            if !result.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Enrich { category, location } => {
            let enrichment = EnrichmentService::new(vendors.clone(), storage.clone(), pacing.lookup);
            let driver = match ChromiumDriver::launch(&settings.browser).await {
                Ok(driver) => driver,
                Err(e) => {
                    let result = runs.record_failure(&category, &location, e.into()).await;
                    error!("{}: {}", result.status, result.message);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let lookup = MapsPlaceLookup::new(
                &driver,
                Duration::from_millis(settings.browser.lookup_settle_ms),
            );

            let outcome = enrichment.reconcile(&lookup, &category, &location).await;
            driver.close().await;

            match outcome {
                Ok(updated) => info!("Updated {} vendors", updated),
                Err(e) => {
                    error!("Enrichment failed: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Ingest { category, location } => {
            let result = runs.ingest(&category, &location).await?;
            info!("{}: {}", result.status, result.message);
            if !result.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Export { category, location } => {
            let path = runs.export(&category, &location).await?;
            println!("{}", path);
        }
        Commands::List { category, location } => {
            let rows = vendors.list(VendorFilter { category, location }).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Summarize { id, text } => {
            vendors.set_summary(id, &text).await?;
            info!("Summary stored for vendor {}", id);
        }
        Commands::Stats { limit } => {
            println!("Total vendors: {}", vendors.count().await?);
            println!("\nBy category:");
            for (category, count) in vendors.counts_by_category().await? {
                println!("  {:<24} {}", category, count);
            }
            println!("\nTop locations:");
            for (location, count) in vendors.top_locations(limit).await? {
                println!("  {:<24} {}", location, count);
            }
        }
        Commands::Logs { limit } => {
            for log in logs.recent(limit).await? {
                println!(
                    "{}  {:<9} {} / {}  {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.status.to_string(),
                    log.category,
                    log.location,
                    log.message
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
