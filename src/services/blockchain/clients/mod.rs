//! Blockchain client implementations.

mod evm {
	pub mod client;
}
mod stellar {
	pub mod client;
}

pub use evm::client::EvmClient;
pub use stellar::client::StellarClient;

use async_trait::async_trait;

use crate::{
	models::{BlockChainType, BlockType, Network},
	services::blockchain::{
		BlockChainClient, BlockChainError, EndpointPool, HttpTransportClient,
	},
};

/// Client for any supported network kind over HTTP
#[derive(Clone)]
pub enum NetworkClient {
	Evm(EvmClient<HttpTransportClient>),
	Stellar(StellarClient<HttpTransportClient>),
}

impl NetworkClient {
	/// Creates a client for `url` speaking the dialect of `network`
	pub fn for_network(network: &Network, url: &str) -> Result<Self, BlockChainError> {
		let transport = HttpTransportClient::new(url, network.rpc_timeout())?;
		Ok(match network.network_type {
			BlockChainType::EVM => Self::Evm(EvmClient::new(transport)),
			BlockChainType::Stellar => Self::Stellar(StellarClient::new(transport)),
		})
	}
}

#[async_trait]
impl BlockChainClient for NetworkClient {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		match self {
			Self::Evm(client) => client.get_latest_block_number().await,
			Self::Stellar(client) => client.get_latest_block_number().await,
		}
	}

	async fn get_block(&self, block_number: u64) -> Result<BlockType, BlockChainError> {
		match self {
			Self::Evm(client) => client.get_block(block_number).await,
			Self::Stellar(client) => client.get_block(block_number).await,
		}
	}
}

/// Builds the endpoint pool for `network` from its configured RPC URLs
pub fn create_endpoint_pool(network: &Network) -> Result<EndpointPool<NetworkClient>, BlockChainError> {
	let endpoints = network
		.rpc_urls
		.iter()
		.map(|rpc| {
			NetworkClient::for_network(network, &rpc.url).map(|client| (rpc.url.clone(), rpc.weight, client))
		})
		.collect::<Result<Vec<_>, _>>()?;

	if endpoints.is_empty() {
		return Err(BlockChainError::internal_error(
			format!("Network {} has no RPC URLs", network.slug),
			None,
			None,
		));
	}

	Ok(EndpointPool::new(network.slug.clone(), endpoints))
}
