use std::{collections::HashMap, sync::Arc};

use blockwatch_monitor::{
	models::{BlockType, Monitor, MonitorMatch, Trigger},
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
use mockito::Matcher;
use serde_json::json;

use crate::integration::mocks::{mint_ledger, TOKEN};

async fn mint_match(monitor: &Monitor, sequence: u64) -> MonitorMatch {
	let network = NetworkBuilder::new().stellar().build();
	let block = BlockType::Stellar(Box::new(mint_ledger(sequence)));
	FilterService::new(Arc::new(ScriptMap::new()))
		.evaluate(&network, monitor, &block)
		.await
		.unwrap()
		.matches
		.remove(0)
}

fn service(triggers: Vec<Trigger>) -> TriggerExecutionService {
	let triggers: HashMap<_, _> = triggers.into_iter().map(|t| (t.name.clone(), t)).collect();
	TriggerExecutionService::new(
		Arc::new(triggers),
		Arc::new(DefaultNotifierFactory::new().unwrap()),
		Arc::new(ScriptMap::new()),
	)
}

fn monitor(triggers: &[&str]) -> Monitor {
	MonitorBuilder::new()
		.name("Mints")
		.networks(vec!["stellar_testnet".to_string()])
		.address(TOKEN)
		.function("mint()", None)
		.triggers(triggers.iter().map(|t| t.to_string()).collect())
		.build()
}

#[tokio::test]
async fn test_signed_webhook_carries_rendered_template() {
	let mut server = mockito::Server::new_async().await;
	let hook = server
		.mock("POST", "/mints")
		.match_header("content-type", "application/json")
		.match_header("x-team", "ops")
		.match_header("x-signature", Matcher::Regex("^[0-9a-f]{64}$".to_string()))
		.match_header("x-timestamp", Matcher::Regex("^[0-9]+$".to_string()))
		.match_body(Matcher::Json(json!({
			"title": "Mints on stellar_testnet",
			"body": "tx7 in ledger 7 ()"
		})))
		.with_status(200)
		.expect(1)
		.create_async()
		.await;

	let trigger = TriggerBuilder::new()
		.name("hook")
		.webhook(&format!("{}/mints", server.url()))
		.webhook_secret("s3cret")
		.webhook_headers(HashMap::from([("X-Team".to_string(), "ops".to_string())]))
		.message(
			"${monitor.name} on ${network}",
			"${transaction.hash} in ledger ${ledger.sequence} (${event.signature})",
		)
		.build();

	let monitor = monitor(&["hook"]);
	let monitor_match = mint_match(&monitor, 7).await;
	let report = service(vec![trigger]).dispatch(&monitor, &monitor_match).await;

	assert_eq!(report.failures(), 0);
	hook.assert_async().await;
}

#[tokio::test]
async fn test_rejected_webhook_does_not_stop_later_triggers() {
	let mut server = mockito::Server::new_async().await;
	let first = server
		.mock("POST", "/first")
		.with_status(500)
		.expect_at_least(1)
		.create_async()
		.await;
	let second = server
		.mock("POST", "/second")
		.with_status(204)
		.expect(1)
		.create_async()
		.await;

	let triggers = vec![
		TriggerBuilder::new()
			.name("first")
			.webhook(&format!("{}/first", server.url()))
			.build(),
		TriggerBuilder::new()
			.name("second")
			.webhook(&format!("{}/second", server.url()))
			.build(),
	];

	let monitor = monitor(&["first", "second"]);
	let monitor_match = mint_match(&monitor, 8).await;
	let report = service(triggers).dispatch(&monitor, &monitor_match).await;

	let names: Vec<_> = report.results.iter().map(|r| r.trigger.as_str()).collect();
	assert_eq!(names, vec!["first", "second"]);
	assert!(matches!(
		report.results[0].result,
		Err(TriggerError::ExecutionError(_))
	));
	assert!(report.results[1].is_success());
	first.assert_async().await;
	second.assert_async().await;
}
