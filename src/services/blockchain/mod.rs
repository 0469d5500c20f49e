//! Blockchain access: transports, per-network clients, the endpoint pool and the
//! block fetcher built on top of them.

mod client;
mod clients;
mod error;
mod fetcher;
mod pool;
mod transports;

pub use client::BlockChainClient;
pub use clients::{create_endpoint_pool, EvmClient, NetworkClient, StellarClient};
pub use error::BlockChainError;
pub use fetcher::BlockFetcher;
pub use pool::{
	cooldown_for, Endpoint, EndpointOutcome, EndpointPool, DEFAULT_BASE_COOLDOWN,
	DEFAULT_MAX_COOLDOWN,
};
pub use transports::{
	BlockchainTransport, HttpTransportClient, TransientErrorRetryStrategy, ROTATE_ON_ERROR_CODES,
};
