//! Test helper utilities for Network configuration
//!
//! - `NetworkBuilder`: Builder for creating test Network instances

use crate::models::{BlockChainType, Network, RpcUrl};

/// Builder for creating test Network instances
pub struct NetworkBuilder {
	network: Network,
}

impl Default for NetworkBuilder {
	fn default() -> Self {
		Self {
			network: Network {
				network_type: BlockChainType::EVM,
				slug: "ethereum_mainnet".to_string(),
				name: "Ethereum Mainnet".to_string(),
				rpc_urls: vec![RpcUrl {
					type_: "rpc".to_string(),
					url: "https://eth.example.com".to_string(),
					weight: 100,
				}],
				chain_id: Some(1),
				network_passphrase: None,
				block_time_ms: 12_000,
				confirmation_blocks: 1,
				cron_schedule: "0 */1 * * * *".to_string(),
				max_past_blocks: Some(10),
				store_blocks: Some(false),
				max_concurrent_fetches: None,
				max_fetch_attempts: None,
				rpc_timeout_ms: None,
			},
		}
	}
}

impl NetworkBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn stellar(mut self) -> Self {
		self.network.network_type = BlockChainType::Stellar;
		self.network.slug = "stellar_testnet".to_string();
		self.network.name = "Stellar Testnet".to_string();
		self.network.chain_id = None;
		self.network.network_passphrase = Some("Test SDF Network ; September 2015".to_string());
		self.network.block_time_ms = 5_000;
		self
	}

	pub fn slug(mut self, slug: &str) -> Self {
		self.network.slug = slug.to_string();
		self
	}

	pub fn name(mut self, name: &str) -> Self {
		self.network.name = name.to_string();
		self
	}

	/// Replaces the endpoints with a single one of weight 100
	pub fn rpc_url(mut self, url: &str) -> Self {
		self.network.rpc_urls = vec![RpcUrl {
			type_: "rpc".to_string(),
			url: url.to_string(),
			weight: 100,
		}];
		self
	}

	pub fn add_rpc_url(mut self, url: &str, weight: u32) -> Self {
		self.network.rpc_urls.push(RpcUrl {
			type_: "rpc".to_string(),
			url: url.to_string(),
			weight,
		});
		self
	}

	pub fn block_time_ms(mut self, block_time_ms: u64) -> Self {
		self.network.block_time_ms = block_time_ms;
		self
	}

	pub fn confirmation_blocks(mut self, confirmation_blocks: u64) -> Self {
		self.network.confirmation_blocks = confirmation_blocks;
		self
	}

	pub fn cron_schedule(mut self, cron_schedule: &str) -> Self {
		self.network.cron_schedule = cron_schedule.to_string();
		self
	}

	pub fn max_past_blocks(mut self, max_past_blocks: Option<u64>) -> Self {
		self.network.max_past_blocks = max_past_blocks;
		self
	}

	pub fn store_blocks(mut self, store_blocks: bool) -> Self {
		self.network.store_blocks = Some(store_blocks);
		self
	}

	pub fn max_concurrent_fetches(mut self, concurrency: usize) -> Self {
		self.network.max_concurrent_fetches = Some(concurrency);
		self
	}

	pub fn max_fetch_attempts(mut self, attempts: u32) -> Self {
		self.network.max_fetch_attempts = Some(attempts);
		self
	}

	pub fn build(self) -> Network {
		self.network
	}
}
