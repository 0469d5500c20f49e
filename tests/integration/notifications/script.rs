use std::{collections::HashMap, fs, sync::Arc};

use blockwatch_monitor::{
	models::{BlockType, ScriptLanguage, Trigger},
	services::{
		filter::FilterService,
		notification::DefaultNotifierFactory,
		trigger::{TriggerError, TriggerExecutionService},
	},
	utils::{
		script::ScriptMap,
		tests::{MonitorBuilder, NetworkBuilder, TriggerBuilder},
	},
};

use crate::integration::mocks::{mint_ledger, TOKEN};

#[tokio::test]
async fn test_script_failure_surfaces_stderr() {
	let path = format!(
		"{}/tests/integration/fixtures/notify_stderr.py",
		env!("CARGO_MANIFEST_DIR")
	);
	let scripts: ScriptMap = HashMap::from([(
		path.clone(),
		(ScriptLanguage::Python, fs::read_to_string(&path).unwrap()),
	)]);

	let triggers: HashMap<String, Trigger> = [
		("deliver", "ethereum_mainnet"),
		("refuse", "stellar_testnet"),
	]
	.into_iter()
	.map(|(name, network)| {
		(
			name.to_string(),
			TriggerBuilder::new()
				.name(name)
				.script(&path, ScriptLanguage::Python)
				.script_timeout_ms(5000)
				.script_arguments(vec![network.to_string()])
				.build(),
		)
	})
	.collect();

	let monitor = MonitorBuilder::new()
		.name("Mints")
		.networks(vec!["stellar_testnet".to_string()])
		.address(TOKEN)
		.function("mint()", None)
		.triggers(vec!["refuse".to_string(), "deliver".to_string()])
		.build();
	let network = NetworkBuilder::new().stellar().build();
	let scripts = Arc::new(scripts);
	let monitor_match = FilterService::new(scripts.clone())
		.evaluate(
			&network,
			&monitor,
			&BlockType::Stellar(Box::new(mint_ledger(3))),
		)
		.await
		.unwrap()
		.matches
		.remove(0);

	let service = TriggerExecutionService::new(
		Arc::new(triggers),
		Arc::new(DefaultNotifierFactory::new().unwrap()),
		scripts,
	);
	let report = service.dispatch(&monitor, &monitor_match).await;

	assert_eq!(report.failures(), 1);
	match &report.results[0].result {
		Err(error @ TriggerError::ExecutionError(_)) => {
			assert!(error.to_string().contains("refusing to notify for stellar_testnet"));
		}
		other => panic!("Expected an execution error, got {:?}", other),
	}
	assert!(report.results[1].is_success());
}
