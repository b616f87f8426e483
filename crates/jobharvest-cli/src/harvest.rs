//! Harvest command handlers: one-shot cycles, retention sweeps, and the
//! long-running scheduler daemon.

use std::sync::Arc;
use std::time::Duration;

use jobharvest_core::{load_platforms, AppConfig, HarvestConfig, Platform, PlatformsFile};
use jobharvest_db::{ListingStore, MemoryListingStore, PgListingStore};
use jobharvest_harvester::{CycleScheduler, Harvester};

/// Connects to Postgres and applies pending migrations.
pub(crate) async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<PgListingStore>> {
    let pool = jobharvest_db::connect_and_migrate(config).await?;
    Ok(Arc::new(PgListingStore::new(pool)))
}

/// Builds the cycle config from the platforms file plus command-line overrides.
pub(crate) fn harvest_config(
    file: &PlatformsFile,
    platforms: &[Platform],
    pages: Option<u32>,
) -> anyhow::Result<HarvestConfig> {
    let mut config = file.harvest_config().restricted_to(platforms);
    if let Some(pages) = pages {
        if pages == 0 {
            anyhow::bail!("--pages must be at least 1");
        }
        config = config.with_page_count(pages);
    }
    if config.enabled().next().is_none() {
        anyhow::bail!("no platforms enabled; check the platforms file and --platform");
    }
    Ok(config)
}

fn build_harvester(
    config: &AppConfig,
    file: &PlatformsFile,
    store: Arc<dyn ListingStore>,
) -> anyhow::Result<Harvester> {
    let adapters = jobharvest_scraper::build_adapters(config, &file.search)?;
    Ok(Harvester::new(store, adapters, config.retention_days))
}

/// Runs one harvest cycle and prints the result as pretty JSON.
///
/// # Errors
///
/// Returns an error if configuration, store setup, or the cycle itself fails.
/// Per-platform failures are part of the printed result, not errors.
pub(crate) async fn run_once(
    config: &AppConfig,
    platforms: &[Platform],
    pages: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let file = load_platforms(&config.platforms_path)?;
    let cycle = harvest_config(&file, platforms, pages)?;

    let store: Arc<dyn ListingStore> = if dry_run {
        tracing::info!("dry run: listings go to an in-memory store");
        Arc::new(MemoryListingStore::new())
    } else {
        open_store(config).await?
    };

    let harvester = build_harvester(config, &file, store)?;
    let result = harvester.run_harvest_cycle(&cycle).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.has_errors() {
        tracing::warn!(errors = result.errors.len(), "harvest finished with errors");
    }
    Ok(())
}

/// Deletes listings older than `max_age_days`.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the delete fails.
pub(crate) async fn run_sweep(config: &AppConfig, max_age_days: u32) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let harvester = Harvester::new(store, Vec::new(), config.retention_days);
    let deleted = harvester.sweep_old_listings(max_age_days).await?;
    println!("deleted {deleted} listing(s) posted more than {max_age_days} day(s) ago");
    Ok(())
}

/// Runs a cycle immediately, then every `cycle_interval_secs`, until ctrl-c
/// or SIGTERM. In-flight cycles finish before the process exits.
///
/// # Errors
///
/// Returns an error if setup fails or the scheduler cannot start or stop.
pub(crate) async fn run_daemon(config: &AppConfig) -> anyhow::Result<()> {
    let file = load_platforms(&config.platforms_path)?;
    let cycle = harvest_config(&file, &[], None)?;
    let store = open_store(config).await?;
    let harvester = build_harvester(config, &file, store)?;

    let scheduler = CycleScheduler::new(
        Arc::new(harvester),
        cycle,
        Duration::from_secs(config.cycle_interval_secs),
        config.max_concurrent_cycles,
    );
    scheduler.start().await?;
    let ticket = scheduler.trigger().await;
    tracing::info!(
        ticket = ticket.0,
        interval_secs = config.cycle_interval_secs,
        max_concurrent_cycles = config.max_concurrent_cycles,
        "daemon started"
    );

    shutdown_signal().await;
    scheduler.stop().await?;

    let status = scheduler.status().await;
    tracing::info!(
        last_run = ?status.last_run,
        last_error = ?status.last_error,
        "daemon stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, waiting for in-flight cycles");
}
