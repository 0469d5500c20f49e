use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{models::BlockChainType, utils::default_max_past_blocks};

const DEFAULT_FETCH_CONCURRENCY: usize = 8;
const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;

/// Weighted RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	pub type_: String,
	pub url: String,
	/// Relative selection weight; 0 disables the endpoint
	pub weight: u32,
}

/// Configuration for connecting to and interacting with a blockchain network.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Network {
	pub network_type: BlockChainType,
	pub slug: String,
	pub name: String,
	pub rpc_urls: Vec<RpcUrl>,
	#[serde(default)]
	pub chain_id: Option<u64>,
	#[serde(default)]
	pub network_passphrase: Option<String>,
	pub block_time_ms: u64,
	pub confirmation_blocks: u64,
	pub cron_schedule: String,
	#[serde(default)]
	pub max_past_blocks: Option<u64>,
	#[serde(default)]
	pub store_blocks: Option<bool>,
	#[serde(default)]
	pub max_concurrent_fetches: Option<usize>,
	#[serde(default)]
	pub max_fetch_attempts: Option<u32>,
	#[serde(default)]
	pub rpc_timeout_ms: Option<u64>,
}

impl Network {
	/// Look-back window, falling back to the value derived from the schedule
	pub fn get_max_past_blocks(&self) -> u64 {
		self.max_past_blocks.unwrap_or_else(|| {
			default_max_past_blocks(
				&self.cron_schedule,
				self.block_time_ms,
				self.confirmation_blocks,
			)
		})
	}

	pub fn fetch_concurrency(&self) -> usize {
		self.max_concurrent_fetches
			.unwrap_or(DEFAULT_FETCH_CONCURRENCY)
			.max(1)
	}

	pub fn fetch_attempts(&self) -> u32 {
		self.max_fetch_attempts.unwrap_or(DEFAULT_FETCH_ATTEMPTS).max(1)
	}

	pub fn rpc_timeout(&self) -> Duration {
		Duration::from_millis(self.rpc_timeout_ms.unwrap_or(DEFAULT_RPC_TIMEOUT_MS))
	}

	pub fn stores_blocks(&self) -> bool {
		self.store_blocks.unwrap_or(false)
	}
}
