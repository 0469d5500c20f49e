//! Blockchain monitoring service entry point.
//!
//! Loads configuration from `CONFIG_DIR`, starts one watcher per network with active
//! monitors and runs until Ctrl+C. On shutdown every in-flight cycle finishes its
//! current stage before the process exits.
//!
//! Only configuration errors at startup end the process; failures during a cycle are
//! logged and retried on the next tick.

use std::sync::Arc;

use anyhow::Context;
use blockwatch_monitor::{
	bootstrap::{create_block_watcher, data_dir, initialize_services},
	repositories::{
		MonitorRepository, MonitorService, NetworkRepository, NetworkService, TriggerRepository,
		TriggerService,
	},
	services::{blockwatcher::FileBlockStorage, notification::DefaultNotifierFactory},
	utils::logging::setup_logging,
};
use dotenvy::dotenv;
use tokio_cron_scheduler::JobScheduler;

type MonitorServiceType = MonitorService<
	MonitorRepository<NetworkRepository, TriggerRepository>,
	NetworkRepository,
	TriggerRepository,
>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenv().ok();

	let _log_guard =
		setup_logging().map_err(|e| anyhow::anyhow!("Failed to set up logging: {}", e))?;

	let notifiers = Arc::new(DefaultNotifierFactory::new().context("creating notifiers")?);
	let services = initialize_services::<_, NetworkRepository, TriggerRepository>(
		None::<MonitorServiceType>,
		None::<NetworkService<NetworkRepository>>,
		None::<TriggerService<TriggerRepository>>,
		notifiers,
	)
	.context("loading configuration")?;

	tracing::info!(
		networks = services.networks.len(),
		monitors = services.active_monitors.len(),
		triggers = services.triggers.len(),
		"Configuration loaded"
	);

	let storage_dir = data_dir();
	tokio::fs::create_dir_all(&storage_dir)
		.await
		.with_context(|| format!("creating data directory {}", storage_dir.display()))?;
	let storage = Arc::new(FileBlockStorage::new(storage_dir));

	let mut block_watcher = create_block_watcher::<JobScheduler>(&services, storage)
		.context("creating network watchers")?;
	if block_watcher.is_empty() {
		tracing::warn!("No network has active monitors; nothing to watch");
		return Ok(());
	}

	block_watcher
		.start_all()
		.await
		.context("starting network watchers")?;
	tracing::info!(watchers = block_watcher.len(), "Service started. Press Ctrl+C to shutdown");

	tokio::signal::ctrl_c()
		.await
		.context("waiting for shutdown signal")?;
	tracing::info!("Shutdown signal received, finishing in-flight cycles");

	if let Err(e) = block_watcher.stop_all().await {
		tracing::error!(error = %e, "Failed to stop network watchers cleanly");
	}

	tracing::info!("Shutdown complete");
	Ok(())
}
