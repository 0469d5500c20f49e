use std::{collections::HashMap, fs, path::Path, sync::Arc};

use blockwatch_monitor::{
	bootstrap::{create_block_watcher, initialize_services},
	models::{Monitor, Network, ScriptLanguage, Trigger},
	repositories::{
		MonitorRepository, MonitorService, NetworkRepository, NetworkService, RepositoryError,
		TriggerRepository, TriggerService,
	},
	services::{blockwatcher::FileBlockStorage, notification::DefaultNotifierFactory},
	utils::tests::{MonitorBuilder, NetworkBuilder, TriggerBuilder},
};
use tempfile::TempDir;

use crate::integration::mocks::{MockJobScheduler, TOKEN};

type Monitors = MonitorService<
	MonitorRepository<NetworkRepository, TriggerRepository>,
	NetworkRepository,
	TriggerRepository,
>;

/// Writes `networks/`, `triggers/` and `monitors/` below `root`
fn write_config(root: &Path, networks: &[Network], triggers: &[Trigger], monitors: &[Monitor]) {
	for dir in ["networks", "triggers", "monitors"] {
		fs::create_dir_all(root.join(dir)).unwrap();
	}
	for network in networks {
		fs::write(
			root.join("networks").join(format!("{}.json", network.slug)),
			serde_json::to_string_pretty(network).unwrap(),
		)
		.unwrap();
	}
	let triggers: HashMap<_, _> = triggers.iter().map(|t| (t.name.clone(), t.clone())).collect();
	fs::write(
		root.join("triggers").join("triggers.json"),
		serde_json::to_string_pretty(&triggers).unwrap(),
	)
	.unwrap();
	for (i, monitor) in monitors.iter().enumerate() {
		fs::write(
			root.join("monitors").join(format!("monitor_{}.json", i)),
			serde_json::to_string_pretty(monitor).unwrap(),
		)
		.unwrap();
	}
}

fn load(root: &Path) -> Result<(Monitors, NetworkService<NetworkRepository>, TriggerService<TriggerRepository>), RepositoryError> {
	let networks = NetworkService::<NetworkRepository>::new(Some(&root.join("networks")))?;
	let triggers = TriggerService::<TriggerRepository>::new(Some(&root.join("triggers")))?;
	let monitors = Monitors::new(
		Some(&root.join("monitors")),
		Some(networks.clone()),
		Some(triggers.clone()),
	)?;
	Ok((monitors, networks, triggers))
}

fn stellar_monitor(name: &str, triggers: Vec<String>) -> Monitor {
	MonitorBuilder::new()
		.name(name)
		.networks(vec!["stellar_testnet".to_string()])
		.address(TOKEN)
		.function("mint()", None)
		.triggers(triggers)
		.build()
}

#[tokio::test]
async fn test_watchers_only_for_networks_with_active_monitors() {
	let dir = TempDir::new().unwrap();
	let script = dir.path().join("notify.sh");
	fs::write(&script, "cat > /dev/null").unwrap();

	write_config(
		dir.path(),
		&[
			NetworkBuilder::new().stellar().build(),
			NetworkBuilder::new().build(),
		],
		&[
			TriggerBuilder::new()
				.name("hook")
				.webhook("https://hooks.example.org")
				.build(),
			TriggerBuilder::new()
				.name("notify")
				.script(&script.to_string_lossy(), ScriptLanguage::Bash)
				.build(),
		],
		&[
			stellar_monitor("Mints", vec!["hook".to_string(), "notify".to_string()]),
			MonitorBuilder::new()
				.name("Paused")
				.networks(vec!["ethereum_mainnet".to_string()])
				.paused(true)
				.build(),
		],
	);

	let (monitors, networks, triggers) = load(dir.path()).unwrap();
	let services = initialize_services(
		Some(monitors),
		Some(networks),
		Some(triggers),
		Arc::new(DefaultNotifierFactory::new().unwrap()),
	)
	.unwrap();

	assert_eq!(services.networks.len(), 2);
	assert_eq!(services.triggers.len(), 2);
	assert_eq!(services.active_monitors.len(), 1);

	let storage = Arc::new(FileBlockStorage::new(dir.path().join("data")));
	let block_watcher = create_block_watcher::<MockJobScheduler>(&services, storage).unwrap();
	assert_eq!(block_watcher.len(), 1);
	let watcher = block_watcher.watcher("stellar_testnet").unwrap();
	assert_eq!(watcher.monitors().len(), 1);
	assert!(block_watcher.watcher("ethereum_mainnet").is_none());
}

#[test]
fn test_monitor_with_unknown_trigger_is_rejected() {
	let dir = TempDir::new().unwrap();
	write_config(
		dir.path(),
		&[NetworkBuilder::new().stellar().build()],
		&[TriggerBuilder::new()
			.name("hook")
			.webhook("https://hooks.example.org")
			.build()],
		&[stellar_monitor("Mints", vec!["missing".to_string()])],
	);

	let result = load(dir.path());
	assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
}

#[test]
fn test_missing_script_fails_startup() {
	let dir = TempDir::new().unwrap();
	write_config(
		dir.path(),
		&[NetworkBuilder::new().stellar().build()],
		&[TriggerBuilder::new()
			.name("notify")
			.script("/nonexistent/notify.sh", ScriptLanguage::Bash)
			.build()],
		&[stellar_monitor("Mints", vec!["notify".to_string()])],
	);

	let result = load(dir.path()).and_then(|(monitors, networks, triggers)| {
		initialize_services(
			Some(monitors),
			Some(networks),
			Some(triggers),
			Arc::new(DefaultNotifierFactory::new().unwrap()),
		)
		.map(|_| ())
	});
	assert!(result.is_err());
}
