//! Bootstrap module for initializing services and wiring the network watchers.
//!
//! # Services
//! - `FilterService`: condition evaluation, sharing the loaded scripts
//! - `TriggerExecutionService`: ordered trigger dispatch through a `NotifierFactory`
//!
//! # Watchers
//! - `create_block_watcher`: one `NetworkWatcher` per network that has active monitors

use std::{collections::HashMap, env, path::PathBuf, sync::Arc};

use crate::{
	models::{Monitor, Network, Trigger},
	repositories::{
		MonitorRepositoryTrait, MonitorService, NetworkRepositoryTrait, NetworkService,
		RepositoryError, TriggerRepositoryTrait, TriggerService,
	},
	services::{
		blockchain::{create_endpoint_pool, BlockChainError, BlockFetcher, NetworkClient},
		blockwatcher::{
			BlockStorage, BlockWatcherService, JobSchedulerTrait, NetworkWatcher, ProgressTracker,
		},
		filter::FilterService,
		notification::NotifierFactory,
		trigger::TriggerExecutionService,
	},
};

const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_DATA_DIR: &str = "data";

/// Root of the `networks/`, `monitors/` and `triggers/` directories (`CONFIG_DIR`)
pub fn config_dir() -> PathBuf {
	env::var("CONFIG_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR))
}

/// Checkpoint directory (`DATA_DIR`)
pub fn data_dir() -> PathBuf {
	env::var("DATA_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Everything the watchers share once configuration is loaded
pub struct Services {
	pub filter_service: Arc<FilterService>,
	pub trigger_execution_service: Arc<TriggerExecutionService>,
	pub active_monitors: Vec<Monitor>,
	pub networks: HashMap<String, Network>,
	pub triggers: HashMap<String, Trigger>,
}

/// Loads configuration and builds the shared services.
///
/// Services that are not supplied are loaded from their default directories below
/// [`config_dir`]. Any configuration problem is returned and should end the process.
pub fn initialize_services<M, N, T>(
	monitor_service: Option<MonitorService<M, N, T>>,
	network_service: Option<NetworkService<N>>,
	trigger_service: Option<TriggerService<T>>,
	notifiers: Arc<dyn NotifierFactory>,
) -> Result<Services, RepositoryError>
where
	M: MonitorRepositoryTrait<N, T>,
	N: NetworkRepositoryTrait,
	T: TriggerRepositoryTrait,
{
	let config_dir = config_dir();

	let network_service = match network_service {
		Some(service) => service,
		None => NetworkService::new(Some(&config_dir.join("networks")))?,
	};

	let trigger_service = match trigger_service {
		Some(service) => service,
		None => TriggerService::new(Some(&config_dir.join("triggers")))?,
	};

	let monitor_service = match monitor_service {
		Some(service) => service,
		None => MonitorService::new(
			Some(&config_dir.join("monitors")),
			Some(network_service.clone()),
			Some(trigger_service.clone()),
		)?,
	};

	let triggers = trigger_service.get_all();
	let scripts = Arc::new(monitor_service.load_scripts(&triggers)?);

	let filter_service = Arc::new(FilterService::new(scripts.clone()));
	let trigger_execution_service = Arc::new(TriggerExecutionService::new(
		Arc::new(triggers.clone()),
		notifiers,
		scripts,
	));

	Ok(Services {
		filter_service,
		trigger_execution_service,
		active_monitors: filter_active_monitors(monitor_service.get_all()),
		networks: network_service.get_all(),
		triggers,
	})
}

/// Unpaused monitors, sorted by name
pub fn filter_active_monitors(monitors: HashMap<String, Monitor>) -> Vec<Monitor> {
	let mut active: Vec<Monitor> = monitors.into_values().filter(|m| !m.paused).collect();
	active.sort_by(|a, b| a.name.cmp(&b.name));
	active
}

/// Whether any of `monitors` watches `network_slug`
pub fn has_active_monitors(monitors: &[Monitor], network_slug: &str) -> bool {
	monitors
		.iter()
		.any(|m| !m.paused && m.networks.iter().any(|n| n == network_slug))
}

/// Builds a watcher for every network with at least one active monitor
pub fn create_block_watcher<J: JobSchedulerTrait>(
	services: &Services,
	storage: Arc<dyn BlockStorage>,
) -> Result<BlockWatcherService<NetworkClient, J>, BlockChainError> {
	let mut block_watcher = BlockWatcherService::new();

	let mut slugs: Vec<_> = services.networks.keys().collect();
	slugs.sort();

	for slug in slugs {
		let network = &services.networks[slug];
		if !has_active_monitors(&services.active_monitors, slug) {
			tracing::info!(network = %slug, "No active monitors, not watching network");
			continue;
		}

		let pool = Arc::new(create_endpoint_pool(network)?);
		let watcher = NetworkWatcher::new(
			network.clone(),
			&services.active_monitors,
			BlockFetcher::new(network, pool),
			ProgressTracker::new(network, storage.clone()),
			services.filter_service.clone(),
			services.trigger_execution_service.clone(),
		);
		block_watcher.add_watcher(watcher);
	}

	Ok(block_watcher)
}
