//! Network configuration loading and validation.

use std::{collections::HashMap, path::Path};

use crate::models::{
	config::{json_files_in, read_json},
	ConfigError, ConfigLoader, Network,
};

impl ConfigLoader for Network {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let network_dir = path.unwrap_or(Path::new("config/networks"));
		let mut pairs = Vec::new();

		for file in json_files_in(network_dir)? {
			let network = Self::load_from_path(&file)?;
			pairs.push((network.slug.clone(), network));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let config: Network = read_json(path)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |msg: &str| {
			ConfigError::validation_error(
				msg,
				None,
				Some(HashMap::from([("network".to_string(), self.slug.clone())])),
			)
		};

		if !self
			.slug
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
			|| self.slug.is_empty()
		{
			return Err(invalid(
				"Slug must contain only lowercase letters, numbers, and underscores",
			));
		}

		if !self.rpc_urls.iter().all(|rpc_url| rpc_url.type_ == "rpc") {
			return Err(invalid("RPC URL type must be one of: rpc"));
		}

		if !self.rpc_urls.iter().all(|rpc_url| {
			rpc_url.url.starts_with("http://") || rpc_url.url.starts_with("https://")
		}) {
			return Err(invalid("All RPC URLs must start with http:// or https://"));
		}

		if self.rpc_urls.iter().any(|rpc_url| rpc_url.weight > 100) {
			return Err(invalid("All RPC URL weights must be between 0 and 100"));
		}

		if !self.rpc_urls.iter().any(|rpc_url| rpc_url.weight > 0) {
			return Err(invalid("At least one RPC URL must have a positive weight"));
		}

		if self.block_time_ms < 100 {
			return Err(invalid("Block time must be at least 100ms"));
		}

		if self.cron_schedule.parse::<cron::Schedule>().is_err() {
			return Err(invalid("Invalid cron_schedule"));
		}

		if self.max_past_blocks == Some(0) {
			return Err(invalid("max_past_blocks must be greater than 0"));
		}

		if self.max_concurrent_fetches == Some(0) || self.max_fetch_attempts == Some(0) {
			return Err(invalid(
				"max_concurrent_fetches and max_fetch_attempts must be greater than 0",
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{BlockChainType, RpcUrl};

	fn network() -> Network {
		Network {
			network_type: BlockChainType::Stellar,
			slug: "stellar_testnet".to_string(),
			name: "Stellar Testnet".to_string(),
			rpc_urls: vec![RpcUrl {
				type_: "rpc".to_string(),
				url: "https://soroban-testnet.stellar.org".to_string(),
				weight: 100,
			}],
			chain_id: None,
			network_passphrase: Some("Test SDF Network ; September 2015".to_string()),
			block_time_ms: 5000,
			confirmation_blocks: 2,
			cron_schedule: "0 */1 * * * *".to_string(),
			max_past_blocks: Some(20),
			store_blocks: Some(false),
			max_concurrent_fetches: None,
			max_fetch_attempts: None,
			rpc_timeout_ms: None,
		}
	}

	#[test]
	fn test_valid_network() {
		assert!(network().validate().is_ok());
	}

	#[test]
	fn test_invalid_slug() {
		let network = Network {
			slug: "Stellar-Testnet".to_string(),
			..network()
		};
		assert!(network.validate().is_err());
	}

	#[test]
	fn test_all_endpoints_disabled() {
		let mut network = network();
		network.rpc_urls[0].weight = 0;
		assert!(network.validate().is_err());
	}

	#[test]
	fn test_invalid_cron() {
		let network = Network {
			cron_schedule: "every minute".to_string(),
			..network()
		};
		assert!(network.validate().is_err());
	}

	#[test]
	fn test_zero_window() {
		let network = Network {
			max_past_blocks: Some(0),
			..network()
		};
		assert!(network.validate().is_err());
	}
}
