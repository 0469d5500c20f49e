use std::{fs, sync::Arc};

use blockwatch_monitor::{
	models::{BlockType, Monitor, ScriptLanguage},
	services::filter::{FilterError, FilterService},
	utils::{
		script::ScriptMap,
		tests::{MonitorBuilder, NetworkBuilder},
	},
};

use crate::integration::mocks::{mint_ledger, TOKEN};

fn fixture(name: &str) -> String {
	format!("{}/tests/integration/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn scripts(paths: &[&str]) -> Arc<ScriptMap> {
	Arc::new(
		paths
			.iter()
			.map(|path| {
				(
					path.to_string(),
					(ScriptLanguage::Python, fs::read_to_string(path).unwrap()),
				)
			})
			.collect(),
	)
}

fn monitor(script_paths: &[&str]) -> Monitor {
	script_paths.iter().fold(
		MonitorBuilder::new()
			.name("Parity")
			.networks(vec!["stellar_testnet".to_string()])
			.address(TOKEN)
			.function("mint()", None),
		|builder: MonitorBuilder, path| builder.trigger_condition(path, 5000, ScriptLanguage::Python, None),
	)
	.build()
}

#[tokio::test]
async fn test_parity_filter_follows_last_line() {
	let parity = fixture("ledger_parity.py");
	let service = FilterService::new(scripts(&[&parity]));
	let network = NetworkBuilder::new().stellar().build();
	let monitor = monitor(&[&parity]);

	let odd = BlockType::Stellar(Box::new(mint_ledger(101)));
	let evaluation = service.evaluate(&network, &monitor, &odd).await.unwrap();
	assert!(evaluation.matches.is_empty());
	assert!(evaluation.script_errors.is_empty());

	let even = BlockType::Stellar(Box::new(mint_ledger(102)));
	let evaluation = service.evaluate(&network, &monitor, &even).await.unwrap();
	assert_eq!(evaluation.matches.len(), 1);

	// Same pair, same result
	let again = service.evaluate(&network, &monitor, &even).await.unwrap();
	assert_eq!(again.matches, evaluation.matches);
}

#[tokio::test]
async fn test_failing_script_fails_closed_and_is_reported() {
	let parity = fixture("ledger_parity.py");
	let failing = fixture("failing_filter.py");
	let service = FilterService::new(scripts(&[&failing, &parity]));
	let network = NetworkBuilder::new().stellar().build();
	let monitor = monitor(&[&failing, &parity]);

	let even = BlockType::Stellar(Box::new(mint_ledger(102)));
	let evaluation = service.evaluate(&network, &monitor, &even).await.unwrap();

	assert!(evaluation.matches.is_empty());
	assert_eq!(evaluation.script_errors.len(), 1);
	assert!(matches!(
		evaluation.script_errors[0],
		FilterError::ScriptError(_)
	));
	assert!(evaluation.script_errors[0]
		.to_string()
		.contains("rpc quota exceeded"));
}
