//! Concurrent, ordered block fetching through the endpoint pool.
//!
//! Blocks of a range are requested with bounded concurrency and delivered in ascending
//! order. Every block gets its own retry budget; each attempt acquires a fresh endpoint
//! so a failing endpoint is left behind after its cool-down starts. When every endpoint
//! is cooling down, an attempt waits for the first one to come back as long as that is
//! at most [`MAX_COOLDOWN_WAIT`] away, and fails with `NoHealthyEndpoint` otherwise.

use std::{collections::HashMap, sync::Arc, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use futures::{stream, StreamExt, TryStreamExt};

use crate::{
	models::{BlockType, Network},
	services::blockchain::{BlockChainClient, BlockChainError, EndpointOutcome, EndpointPool},
};

/// Longest cool-down an attempt waits out instead of failing with `NoHealthyEndpoint`
pub const MAX_COOLDOWN_WAIT: Duration = Duration::from_secs(2);

/// Fetches blocks for one network
pub struct BlockFetcher<C> {
	network_slug: String,
	pool: Arc<EndpointPool<C>>,
	concurrency: usize,
	attempts: u32,
	backoff: ExponentialBuilder,
	cooldown_wait: Duration,
}

impl<C: BlockChainClient> BlockFetcher<C> {
	pub fn new(network: &Network, pool: Arc<EndpointPool<C>>) -> Self {
		Self {
			network_slug: network.slug.clone(),
			pool,
			concurrency: network.fetch_concurrency().max(1),
			attempts: network.fetch_attempts().max(1),
			backoff: ExponentialBuilder::default()
				.with_min_delay(Duration::from_millis(100))
				.with_max_delay(Duration::from_secs(2))
				.with_jitter(),
			cooldown_wait: MAX_COOLDOWN_WAIT,
		}
	}

	/// Overrides the delay between attempts
	pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
		self.backoff = backoff;
		self
	}

	/// Overrides the longest cool-down an attempt waits out
	pub fn with_cooldown_wait(mut self, wait: Duration) -> Self {
		self.cooldown_wait = wait;
		self
	}

	pub fn pool(&self) -> &Arc<EndpointPool<C>> {
		&self.pool
	}

	fn retry_policy(&self) -> ExponentialBuilder {
		self.backoff
			.clone()
			.with_max_times(self.attempts.saturating_sub(1) as usize)
	}

	/// One request through a freshly acquired endpoint, reporting its health
	async fn through_pool<T, F, Fut>(&self, request: F) -> Result<T, BlockChainError>
	where
		F: Fn(Arc<C>) -> Fut,
		Fut: std::future::Future<Output = Result<T, BlockChainError>>,
	{
		if let Some(wait) = self.pool.next_available_in().await {
			if wait <= self.cooldown_wait {
				tracing::debug!(
					network = %self.network_slug,
					wait_ms = wait.as_millis() as u64,
					"All endpoints cooling down, waiting for the first to return"
				);
				tokio::time::sleep(wait).await;
			}
		}

		let endpoint = self.pool.acquire().await?;
		match request(endpoint.client.clone()).await {
			Ok(value) => {
				self.pool.report(&endpoint, EndpointOutcome::Success).await;
				Ok(value)
			}
			Err(error) => {
				if error.is_endpoint_failure() {
					self.pool.report(&endpoint, EndpointOutcome::Failure).await;
				}
				Err(error)
			}
		}
	}

	/// Latest block number of the network, retried like a block fetch
	pub async fn latest_block_number(&self) -> Result<u64, BlockChainError> {
		(|| async {
			self.through_pool(|client| async move { client.get_latest_block_number().await })
				.await
		})
		.retry(self.retry_policy())
		.when(BlockChainError::is_transient)
		.notify(|error, delay| {
			tracing::warn!(
				network = %self.network_slug,
				"Retrying latest block number in {:?}: {}",
				delay,
				error
			)
		})
		.await
	}

	/// Fetches one block, retrying transient failures across endpoints
	pub async fn fetch_block(&self, block_number: u64) -> Result<BlockType, BlockChainError> {
		let result = (|| async {
			let block = self
				.through_pool(|client| async move { client.get_block(block_number).await })
				.await?;
			match block.number() {
				Some(number) if number != block_number => Err(BlockChainError::request_error(
					format!("Asked for block {} but received {}", block_number, number),
					None,
					None,
				)),
				_ => Ok(block),
			}
		})
		.retry(self.retry_policy())
		.when(BlockChainError::is_transient)
		.notify(|error, delay| {
			tracing::debug!(
				network = %self.network_slug,
				block_number,
				"Retrying block in {:?}: {}",
				delay,
				error
			)
		})
		.await;

		result.map_err(|error| match error {
			BlockChainError::NoHealthyEndpoint(_) => error,
			other => BlockChainError::fetch_error(
				format!(
					"Block {} could not be fetched after {} attempts",
					block_number, self.attempts
				),
				Some(Box::new(other)),
				Some(HashMap::from([
					("network".to_string(), self.network_slug.clone()),
					("block_number".to_string(), block_number.to_string()),
				])),
			),
		})
	}

	/// Fetches `from..=to` in ascending order.
	///
	/// The whole range fails if any block fails, so callers never see a gap.
	pub async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<BlockType>, BlockChainError> {
		if from > to {
			return Ok(Vec::new());
		}

		tracing::debug!(
			network = %self.network_slug,
			from,
			to,
			concurrency = self.concurrency,
			"Fetching block range"
		);

		stream::iter(from..=to)
			.map(|number| self.fetch_block(number))
			.buffered(self.concurrency)
			.try_collect()
			.await
	}
}
