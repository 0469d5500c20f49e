use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
	time::Duration,
};

use backon::ExponentialBuilder;
use blockwatch_monitor::{
	models::{Monitor, Network, Trigger},
	services::{
		blockchain::{BlockFetcher, EndpointPool},
		blockwatcher::{
			BlockRange, BlockStorage, BlockWatcherError, BlockWatcherService, CycleOutcome,
			NetworkWatcher, ProgressTracker, WatcherState,
		},
		filter::FilterService,
		notification::{NotificationError, Notifier},
		trigger::TriggerExecutionService,
	},
	utils::{
		script::ScriptMap,
		tests::{MonitorBuilder, NetworkBuilder, TriggerBuilder},
	},
};
use mockall::predicate::eq;

use crate::integration::mocks::{
	ledger_client, MockClient, MockJobScheduler, MockNotifier, MockNotifierFactory, MockStorage,
	TOKEN,
};

fn network() -> Network {
	NetworkBuilder::new()
		.stellar()
		.confirmation_blocks(0)
		.max_past_blocks(Some(5))
		.max_fetch_attempts(1)
		.build()
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

/// Trigger service whose notifiers record their trigger's name; `failing` always errors
fn recording_triggers(
	names: &[&str],
	failing: &'static str,
	sent: Arc<Mutex<Vec<String>>>,
) -> Arc<TriggerExecutionService> {
	let mut factory = MockNotifierFactory::new();
	factory.expect_create().returning(move |trigger: &Trigger| {
		let sent = sent.clone();
		let name = trigger.name.clone();
		let mut notifier = MockNotifier::new();
		notifier.expect_send().returning(move |_| {
			sent.lock().unwrap().push(name.clone());
			if name == failing {
				Err(NotificationError::network_error("unreachable", None, None))
			} else {
				Ok(())
			}
		});
		Ok(Arc::new(notifier) as Arc<dyn Notifier>)
	});

	let triggers: HashMap<String, Trigger> = names
		.iter()
		.map(|name| {
			(
				name.to_string(),
				TriggerBuilder::new()
					.name(name)
					.webhook("https://hooks.example.org")
					.message("Mint", "${transaction.hash}")
					.build(),
			)
		})
		.collect();

	Arc::new(TriggerExecutionService::new(
		Arc::new(triggers),
		Arc::new(factory),
		Arc::new(ScriptMap::new()),
	))
}

fn watcher<J>(
	client: MockClient,
	storage: Arc<dyn BlockStorage>,
	triggers: Arc<TriggerExecutionService>,
	monitors: &[Monitor],
) -> NetworkWatcher<MockClient, J>
where
	J: blockwatch_monitor::services::blockwatcher::JobSchedulerTrait,
{
	let network = network();
	let pool = EndpointPool::new(network.slug.clone(), vec![("http://rpc".to_string(), 1, client)]);
	let fetcher = BlockFetcher::new(&network, Arc::new(pool))
		.with_backoff(ExponentialBuilder::default().with_min_delay(Duration::from_millis(1)));
	let tracker = ProgressTracker::new(&network, storage);
	NetworkWatcher::new(
		network,
		monitors,
		fetcher,
		tracker,
		Arc::new(FilterService::new(Arc::new(ScriptMap::new()))),
		triggers,
	)
}

#[tokio::test]
async fn test_failing_trigger_does_not_block_commit() {
	let mut storage = MockStorage::new();
	storage
		.expect_get_last_processed_block()
		.with(eq("stellar_testnet"))
		.returning(|_| Ok(Some(20)));
	storage
		.expect_save_last_processed_block()
		.with(eq("stellar_testnet"), eq(21))
		.times(1)
		.returning(|_, _| Ok(()));

	let sent = Arc::new(Mutex::new(Vec::new()));
	let triggers = recording_triggers(&["A", "B", "C"], "B", sent.clone());
	let watcher = watcher::<MockJobScheduler>(
		ledger_client(21),
		Arc::new(storage),
		triggers,
		&[monitor(&["A", "B", "C"])],
	);

	let outcome = watcher.run_cycle().await.unwrap();
	assert_eq!(
		outcome,
		CycleOutcome::Completed {
			range: BlockRange { from: 21, to: 21 },
			matches: 1,
			trigger_failures: 1,
		}
	);
	assert_eq!(*sent.lock().unwrap(), vec!["A", "B", "C"]);
	assert_eq!(*watcher.state().borrow(), WatcherState::Idle);
}

#[tokio::test]
async fn test_store_error_leaves_checkpoint_for_retry() {
	let mut storage = MockStorage::new();
	storage
		.expect_get_last_processed_block()
		.returning(|_| Ok(Some(20)));
	storage
		.expect_save_last_processed_block()
		.times(2)
		.returning(|_, _| Err(BlockWatcherError::storage_error("disk full", None, None)));

	let sent = Arc::new(Mutex::new(Vec::new()));
	let triggers = recording_triggers(&["A"], "none", sent.clone());
	let watcher = watcher::<MockJobScheduler>(
		ledger_client(22),
		Arc::new(storage),
		triggers,
		&[monitor(&["A"])],
	);

	// At-least-once: the same range is dispatched again by the next cycle
	for _ in 0..2 {
		let result = watcher.run_cycle().await;
		assert!(matches!(result, Err(BlockWatcherError::StorageError(_))));
		assert_eq!(*watcher.state().borrow(), WatcherState::Idle);
	}
	assert_eq!(sent.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_scheduler_lifecycle() {
	let sent = Arc::new(Mutex::new(Vec::new()));

	// Scheduler cannot be created
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect()
			.returning(|| Err("Failed to initialize scheduler".into()));

		let mut watcher = watcher::<MockJobScheduler>(
			MockClient::new(),
			Arc::new(MockStorage::new()),
			recording_triggers(&["A"], "none", sent.clone()),
			&[monitor(&["A"])],
		);
		let result = watcher.start().await;
		assert!(matches!(result, Err(BlockWatcherError::SchedulerError(_))));
	}

	// Job cannot be added
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect().returning(|| {
			let mut scheduler = MockJobScheduler::default();
			scheduler
				.expect_add()
				.returning(|_| Err("Failed to add job".into()));
			Ok(scheduler)
		});

		let mut watcher = watcher::<MockJobScheduler>(
			MockClient::new(),
			Arc::new(MockStorage::new()),
			recording_triggers(&["A"], "none", sent.clone()),
			&[monitor(&["A"])],
		);
		let result = watcher.start().await;
		assert!(matches!(result, Err(BlockWatcherError::SchedulerError(_))));
	}

	// Started once, shut down on stop
	{
		let ctx = MockJobScheduler::new_context();
		ctx.expect().times(1).returning(|| {
			let mut scheduler = MockJobScheduler::default();
			scheduler.expect_add().times(1).returning(|_| Ok(()));
			scheduler.expect_start().times(1).returning(|| Ok(()));
			scheduler.expect_shutdown().times(1).returning(|| Ok(()));
			Ok(scheduler)
		});

		let mut service = BlockWatcherService::<MockClient, MockJobScheduler>::new();
		service.add_watcher(watcher::<MockJobScheduler>(
			MockClient::new(),
			Arc::new(MockStorage::new()),
			recording_triggers(&["A"], "none", sent.clone()),
			&[monitor(&["A"])],
		));

		service.start_all().await.unwrap();
		// Starting twice keeps the running scheduler
		service.start_all().await.unwrap();
		service.stop_all().await.unwrap();

		let watcher = service.watcher("stellar_testnet").unwrap();
		assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::Cancelled);
	}
}
