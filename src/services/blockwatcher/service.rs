//! Per-network watch cycles and their scheduling.
//!
//! Every network gets a [`NetworkWatcher`] running its own cron job. A cycle walks
//! through `Fetching`, `Evaluating`, `Dispatching` and `Committing` and always ends in
//! `Idle`. The checkpoint only moves once every match of the range has been dispatched.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::instrument;

use crate::{
	models::{BlockType, Monitor, MonitorMatch, Network},
	services::{
		blockchain::{BlockChainClient, BlockChainError, BlockFetcher},
		blockwatcher::{error::BlockWatcherError, tracker::BlockRange, ProgressTracker},
		filter::FilterService,
		trigger::TriggerExecutionService,
	},
	utils::logging::error::BoxedSource,
};

/// Scheduler driving the cycles of one network
#[async_trait]
pub trait JobSchedulerTrait: Send + Sync + Sized {
	async fn new() -> Result<Self, BoxedSource>;
	async fn add(&self, job: Job) -> Result<(), BoxedSource>;
	async fn start(&self) -> Result<(), BoxedSource>;
	async fn shutdown(&mut self) -> Result<(), BoxedSource>;
}

#[async_trait]
impl JobSchedulerTrait for JobScheduler {
	async fn new() -> Result<Self, BoxedSource> {
		JobScheduler::new().await.map_err(Into::into)
	}

	async fn add(&self, job: Job) -> Result<(), BoxedSource> {
		self.add(job).await.map(|_| ()).map_err(Into::into)
	}

	async fn start(&self) -> Result<(), BoxedSource> {
		self.start().await.map_err(Into::into)
	}

	async fn shutdown(&mut self) -> Result<(), BoxedSource> {
		self.shutdown().await.map_err(Into::into)
	}
}

/// Stage a network's watcher is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
	Idle,
	Fetching,
	Evaluating,
	Dispatching,
	Committing,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
	/// The chain has not advanced past the checkpoint
	NothingNew,
	/// The range was processed and committed
	Completed {
		range: BlockRange,
		matches: usize,
		trigger_failures: usize,
	},
	/// Every endpoint is cooling down; the range is retried on the next tick
	Deferred,
	/// Shutdown was requested before dispatch started
	Cancelled,
	/// The previous cycle was still running
	Skipped,
}

struct WatchCycle<C> {
	network: Network,
	monitors: Vec<Monitor>,
	fetcher: BlockFetcher<C>,
	tracker: ProgressTracker,
	filter: Arc<FilterService>,
	triggers: Arc<TriggerExecutionService>,
	state: watch::Sender<WatcherState>,
	cycle_lock: Mutex<()>,
	shutdown: AtomicBool,
}

enum Fetched {
	Blocks(BlockRange, Vec<BlockType>),
	NothingNew,
	Deferred,
}

impl<C: BlockChainClient> WatchCycle<C> {
	fn metadata(&self, range: Option<&BlockRange>) -> Option<HashMap<String, String>> {
		let mut metadata = HashMap::from([("network".to_string(), self.network.slug.clone())]);
		if let Some(range) = range {
			metadata.insert("from".to_string(), range.from.to_string());
			metadata.insert("to".to_string(), range.to.to_string());
		}
		Some(metadata)
	}

	fn enter(&self, state: WatcherState) {
		self.state.send_replace(state);
	}

	fn is_shutting_down(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	async fn run(&self) -> Result<CycleOutcome, BlockWatcherError> {
		let Ok(_guard) = self.cycle_lock.try_lock() else {
			tracing::debug!(
				network = %self.network.slug,
				"Previous cycle still running, skipping tick"
			);
			return Ok(CycleOutcome::Skipped);
		};

		let result = self.run_stages().await;
		self.enter(WatcherState::Idle);
		result
	}

	#[instrument(skip_all, fields(network = %self.network.slug))]
	async fn run_stages(&self) -> Result<CycleOutcome, BlockWatcherError> {
		if self.is_shutting_down() {
			return Ok(CycleOutcome::Cancelled);
		}

		self.enter(WatcherState::Fetching);
		let (range, blocks) = match self.fetch().await? {
			Fetched::Blocks(range, blocks) => (range, blocks),
			Fetched::NothingNew => return Ok(CycleOutcome::NothingNew),
			Fetched::Deferred => return Ok(CycleOutcome::Deferred),
		};
		if self.is_shutting_down() {
			return Ok(CycleOutcome::Cancelled);
		}

		self.enter(WatcherState::Evaluating);
		let matches = self.evaluate(&range, &blocks).await?;
		if self.is_shutting_down() {
			return Ok(CycleOutcome::Cancelled);
		}

		// From here on the range runs to completion so matches are never sent twice
		self.enter(WatcherState::Dispatching);
		let mut trigger_failures = 0;
		for (monitor, monitor_match) in &matches {
			let report = self.triggers.dispatch(monitor, monitor_match).await;
			trigger_failures += report.failures();
		}

		self.enter(WatcherState::Committing);
		self.tracker.commit(range.to).await?;

		tracing::info!(
			from = range.from,
			to = range.to,
			matches = matches.len(),
			trigger_failures,
			"Processed block range"
		);

		Ok(CycleOutcome::Completed {
			range,
			matches: matches.len(),
			trigger_failures,
		})
	}

	fn fetch_failed(
		&self,
		e: BlockChainError,
		range: Option<&BlockRange>,
	) -> Result<Fetched, BlockWatcherError> {
		match e {
			BlockChainError::NoHealthyEndpoint(_) => {
				tracing::warn!(error = %e, "No healthy endpoint, deferring cycle");
				Ok(Fetched::Deferred)
			}
			e => Err(BlockWatcherError::network_error(
				"Failed to fetch blocks",
				Some(Box::new(e)),
				self.metadata(range),
			)),
		}
	}

	async fn fetch(&self) -> Result<Fetched, BlockWatcherError> {
		let latest = match self.fetcher.latest_block_number().await {
			Ok(latest) => latest,
			Err(e) => return self.fetch_failed(e, None),
		};

		let Some(range) = self.tracker.next_range(latest).await? else {
			tracing::debug!(latest, "No new blocks");
			return Ok(Fetched::NothingNew);
		};

		let blocks = match self.fetcher.fetch_range(range.from, range.to).await {
			Ok(blocks) => blocks,
			Err(e) => return self.fetch_failed(e, Some(&range)),
		};

		if self.network.stores_blocks() {
			let storage = self.tracker.storage();
			storage.delete_blocks(&self.network.slug).await?;
			storage.save_blocks(&self.network.slug, &blocks).await?;
		}

		Ok(Fetched::Blocks(range, blocks))
	}

	async fn evaluate<'a>(
		&'a self,
		range: &BlockRange,
		blocks: &[BlockType],
	) -> Result<Vec<(&'a Monitor, MonitorMatch)>, BlockWatcherError> {
		let mut matches = Vec::new();
		for block in blocks {
			for monitor in &self.monitors {
				let evaluation = self
					.filter
					.evaluate(&self.network, monitor, block)
					.await
					.map_err(|e| {
						BlockWatcherError::processing_error(
							format!("Failed to evaluate monitor {}", monitor.name),
							Some(Box::new(e)),
							self.metadata(Some(range)),
						)
					})?;

				if !evaluation.script_errors.is_empty() {
					tracing::warn!(
						monitor = %monitor.name,
						block = ?block.number(),
						errors = evaluation.script_errors.len(),
						"Filter scripts failed; affected candidates did not match"
					);
				}
				matches.extend(evaluation.matches.into_iter().map(|m| (monitor, m)));
			}
		}
		Ok(matches)
	}
}

/// Watches one network on its cron schedule
pub struct NetworkWatcher<C, J: JobSchedulerTrait> {
	cycle: Arc<WatchCycle<C>>,
	scheduler: Option<J>,
}

impl<C, J> NetworkWatcher<C, J>
where
	C: BlockChainClient + 'static,
	J: JobSchedulerTrait,
{
	/// Creates a watcher for `network`.
	///
	/// Monitors that are paused or do not reference the network are dropped.
	pub fn new(
		network: Network,
		monitors: &[Monitor],
		fetcher: BlockFetcher<C>,
		tracker: ProgressTracker,
		filter: Arc<FilterService>,
		triggers: Arc<TriggerExecutionService>,
	) -> Self {
		let monitors = monitors
			.iter()
			.filter(|m| !m.paused && m.networks.contains(&network.slug))
			.cloned()
			.collect();
		let (state, _) = watch::channel(WatcherState::Idle);

		Self {
			cycle: Arc::new(WatchCycle {
				network,
				monitors,
				fetcher,
				tracker,
				filter,
				triggers,
				state,
				cycle_lock: Mutex::new(()),
				shutdown: AtomicBool::new(false),
			}),
			scheduler: None,
		}
	}

	pub fn network(&self) -> &Network {
		&self.cycle.network
	}

	pub fn monitors(&self) -> &[Monitor] {
		&self.cycle.monitors
	}

	/// Receiver following the watcher's stage
	pub fn state(&self) -> watch::Receiver<WatcherState> {
		self.cycle.state.subscribe()
	}

	/// Runs one cycle now, outside the schedule
	pub async fn run_cycle(&self) -> Result<CycleOutcome, BlockWatcherError> {
		self.cycle.run().await
	}

	/// Schedules cycles on the network's cron expression
	pub async fn start(&mut self) -> Result<(), BlockWatcherError> {
		if self.scheduler.is_some() {
			return Ok(());
		}
		let metadata = || self.cycle.metadata(None);

		let scheduler = J::new().await.map_err(|e| {
			BlockWatcherError::scheduler_error("Failed to create scheduler", Some(e), metadata())
		})?;

		let cycle = self.cycle.clone();
		let job = Job::new_async(self.cycle.network.cron_schedule.as_str(), move |_uuid, _l| {
			let cycle = cycle.clone();
			Box::pin(async move {
				match cycle.run().await {
					Ok(CycleOutcome::Deferred) => {
						tracing::info!(network = %cycle.network.slug, "Cycle deferred")
					}
					Ok(outcome) => {
						tracing::debug!(network = %cycle.network.slug, ?outcome, "Cycle finished")
					}
					Err(e) => tracing::error!(
						network = %cycle.network.slug,
						error = %e,
						"Cycle failed; range will be retried"
					),
				}
			})
		})
		.map_err(|e| {
			BlockWatcherError::scheduler_error(
				format!("Invalid cron schedule {}", self.cycle.network.cron_schedule),
				Some(Box::new(e)),
				metadata(),
			)
		})?;

		scheduler.add(job).await.map_err(|e| {
			BlockWatcherError::scheduler_error("Failed to add job", Some(e), metadata())
		})?;
		scheduler.start().await.map_err(|e| {
			BlockWatcherError::scheduler_error("Failed to start scheduler", Some(e), metadata())
		})?;

		tracing::info!(
			network = %self.cycle.network.slug,
			monitors = self.cycle.monitors.len(),
			schedule = %self.cycle.network.cron_schedule,
			"Started network watcher"
		);
		self.scheduler = Some(scheduler);
		Ok(())
	}

	/// Stops scheduling and waits for an in-flight cycle to finish its current stage
	pub async fn stop(&mut self) -> Result<(), BlockWatcherError> {
		self.cycle.shutdown.store(true, Ordering::SeqCst);

		if let Some(mut scheduler) = self.scheduler.take() {
			scheduler.shutdown().await.map_err(|e| {
				BlockWatcherError::scheduler_error(
					"Failed to stop scheduler",
					Some(e),
					self.cycle.metadata(None),
				)
			})?;
		}

		let _guard = self.cycle.cycle_lock.lock().await;
		tracing::info!(network = %self.cycle.network.slug, "Stopped network watcher");
		Ok(())
	}
}

/// Owns the watchers of every configured network
pub struct BlockWatcherService<C, J: JobSchedulerTrait> {
	watchers: HashMap<String, NetworkWatcher<C, J>>,
}

impl<C, J> Default for BlockWatcherService<C, J>
where
	J: JobSchedulerTrait,
{
	fn default() -> Self {
		Self {
			watchers: HashMap::new(),
		}
	}
}

impl<C, J> BlockWatcherService<C, J>
where
	C: BlockChainClient + 'static,
	J: JobSchedulerTrait,
{
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_watcher(&mut self, watcher: NetworkWatcher<C, J>) {
		self.watchers
			.insert(watcher.network().slug.clone(), watcher);
	}

	pub fn watcher(&self, network_slug: &str) -> Option<&NetworkWatcher<C, J>> {
		self.watchers.get(network_slug)
	}

	pub fn len(&self) -> usize {
		self.watchers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.watchers.is_empty()
	}

	pub async fn start_all(&mut self) -> Result<(), BlockWatcherError> {
		for watcher in self.watchers.values_mut() {
			watcher.start().await?;
		}
		Ok(())
	}

	/// Stops every watcher, returning the first error after trying all of them
	pub async fn stop_all(&mut self) -> Result<(), BlockWatcherError> {
		let mut first_error = None;
		for watcher in self.watchers.values_mut() {
			if let Err(e) = watcher.stop().await {
				first_error.get_or_insert(e);
			}
		}
		first_error.map_or(Ok(()), Err)
	}
}
