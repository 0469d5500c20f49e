//! Weighted endpoint pool with failure back-off.
//!
//! Each network has one pool holding a client per configured RPC endpoint. Selection is
//! weighted-random among endpoints that are not cooling down. Every failure reported for
//! an endpoint doubles its cool-down, up to a ceiling; a success clears it.

use std::{fmt, sync::Arc, time::Duration};

use rand::Rng;
use tokio::{sync::Mutex, time::Instant};

use crate::services::blockchain::BlockChainError;

/// Cool-down applied after the first consecutive failure
pub const DEFAULT_BASE_COOLDOWN: Duration = Duration::from_secs(1);

/// Ceiling for the exponential cool-down
pub const DEFAULT_MAX_COOLDOWN: Duration = Duration::from_secs(60);

/// Result of using an endpoint, reported back to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointOutcome {
	Success,
	Failure,
}

/// An endpoint handed out by [`EndpointPool::acquire`]
pub struct Endpoint<C> {
	index: usize,
	pub url: String,
	pub client: Arc<C>,
}

impl<C> Clone for Endpoint<C> {
	fn clone(&self) -> Self {
		Self {
			index: self.index,
			url: self.url.clone(),
			client: self.client.clone(),
		}
	}
}

impl<C> fmt::Debug for Endpoint<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Endpoint").field("url", &self.url).finish()
	}
}

struct PooledEndpoint<C> {
	url: String,
	weight: u32,
	client: Arc<C>,
}

#[derive(Debug, Default, Clone)]
struct EndpointHealth {
	consecutive_failures: u32,
	cooldown_until: Option<Instant>,
}

impl EndpointHealth {
	fn is_available(&self, now: Instant) -> bool {
		self.cooldown_until.is_none_or(|until| until <= now)
	}
}

/// Pool of interchangeable clients for one network
pub struct EndpointPool<C> {
	network_slug: String,
	endpoints: Vec<PooledEndpoint<C>>,
	health: Mutex<Vec<EndpointHealth>>,
	base_cooldown: Duration,
	max_cooldown: Duration,
}

impl<C: Send + Sync> EndpointPool<C> {
	/// Creates a pool from `(url, weight, client)` triples
	pub fn new(network_slug: impl Into<String>, endpoints: Vec<(String, u32, C)>) -> Self {
		let endpoints: Vec<PooledEndpoint<C>> = endpoints
			.into_iter()
			.map(|(url, weight, client)| PooledEndpoint {
				url,
				weight,
				client: Arc::new(client),
			})
			.collect();
		let health = vec![EndpointHealth::default(); endpoints.len()];

		Self {
			network_slug: network_slug.into(),
			endpoints,
			health: Mutex::new(health),
			base_cooldown: DEFAULT_BASE_COOLDOWN,
			max_cooldown: DEFAULT_MAX_COOLDOWN,
		}
	}

	/// Overrides the back-off bounds
	pub fn with_cooldown(mut self, base: Duration, max: Duration) -> Self {
		self.base_cooldown = base;
		self.max_cooldown = max.max(base);
		self
	}

	pub fn network_slug(&self) -> &str {
		&self.network_slug
	}

	pub fn len(&self) -> usize {
		self.endpoints.len()
	}

	pub fn is_empty(&self) -> bool {
		self.endpoints.is_empty()
	}

	/// Picks an endpoint, weighted by configuration, among those not cooling down
	///
	/// # Errors
	/// `NoHealthyEndpoint` when every endpoint is cooling down or has zero weight
	pub async fn acquire(&self) -> Result<Endpoint<C>, BlockChainError> {
		let candidates: Vec<(usize, u32)> = {
			let health = self.health.lock().await;
			let now = Instant::now();
			self.endpoints
				.iter()
				.enumerate()
				.filter(|(i, endpoint)| endpoint.weight > 0 && health[*i].is_available(now))
				.map(|(i, endpoint)| (i, endpoint.weight))
				.collect()
		};

		let index = pick_weighted(&candidates).ok_or_else(|| {
			BlockChainError::no_healthy_endpoint(
				format!(
					"All {} endpoints of {} are cooling down or disabled",
					self.endpoints.len(),
					self.network_slug
				),
				None,
				None,
			)
		})?;

		let endpoint = &self.endpoints[index];
		Ok(Endpoint {
			index,
			url: endpoint.url.clone(),
			client: endpoint.client.clone(),
		})
	}

	/// Records the outcome of a request made through `endpoint`
	pub async fn report(&self, endpoint: &Endpoint<C>, outcome: EndpointOutcome) {
		let mut health = self.health.lock().await;
		let Some(entry) = health.get_mut(endpoint.index) else {
			return;
		};

		match outcome {
			EndpointOutcome::Success => {
				if entry.consecutive_failures > 0 {
					tracing::info!(
						network = %self.network_slug,
						url = %endpoint.url,
						"Endpoint recovered after {} failures",
						entry.consecutive_failures
					);
				}
				*entry = EndpointHealth::default();
			}
			EndpointOutcome::Failure => {
				entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
				let cooldown = cooldown_for(
					entry.consecutive_failures,
					self.base_cooldown,
					self.max_cooldown,
				);
				entry.cooldown_until = Some(Instant::now() + cooldown);
				tracing::warn!(
					network = %self.network_slug,
					url = %endpoint.url,
					failures = entry.consecutive_failures,
					cooldown_ms = cooldown.as_millis() as u64,
					"Endpoint failed, cooling down"
				);
			}
		}
	}

	/// Time until a cooling-down endpoint becomes selectable again.
	///
	/// `None` when an endpoint is selectable right now or none ever will be.
	pub async fn next_available_in(&self) -> Option<Duration> {
		let health = self.health.lock().await;
		let now = Instant::now();
		self.endpoints
			.iter()
			.zip(health.iter())
			.filter(|(endpoint, _)| endpoint.weight > 0)
			.map(|(_, entry)| {
				entry
					.cooldown_until
					.map_or(Duration::ZERO, |until| until.saturating_duration_since(now))
			})
			.min()
			.filter(|wait| !wait.is_zero())
	}

	/// Whether the endpoint at `url` is currently excluded from selection
	pub async fn is_cooling_down(&self, url: &str) -> bool {
		let health = self.health.lock().await;
		let now = Instant::now();
		self.endpoints
			.iter()
			.position(|endpoint| endpoint.url == url)
			.is_some_and(|i| !health[i].is_available(now))
	}
}

/// `base * 2^(failures - 1)`, capped at `max`
pub fn cooldown_for(consecutive_failures: u32, base: Duration, max: Duration) -> Duration {
	if consecutive_failures == 0 {
		return Duration::ZERO;
	}
	let exponent = (consecutive_failures - 1).min(16);
	base.saturating_mul(1u32 << exponent).min(max)
}

/// Weighted random choice over `(index, weight)` pairs with positive weights
fn pick_weighted(candidates: &[(usize, u32)]) -> Option<usize> {
	let total: u64 = candidates.iter().map(|(_, w)| u64::from(*w)).sum();
	if total == 0 {
		return None;
	}

	let mut roll = rand::rng().random_range(0..total);
	for (index, weight) in candidates {
		let weight = u64::from(*weight);
		if roll < weight {
			return Some(*index);
		}
		roll -= weight;
	}
	None
}
