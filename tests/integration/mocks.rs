//! Mock implementations of the collaborator traits.
//!
//! - [`MockClient`] - RPC client bound to one endpoint
//! - [`MockStorage`] - checkpoint and block store
//! - [`MockNotifier`] / [`MockNotifierFactory`] - notification channels
//! - [`MockJobScheduler`] - cron scheduler driving a watcher

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use blockwatch_monitor::{
	models::{BlockType, NotificationMessage, StellarBlock, Trigger},
	services::{
		blockchain::{BlockChainClient, BlockChainError},
		blockwatcher::{BlockStorage, BlockWatcherError, JobSchedulerTrait},
		notification::{NotificationError, Notifier, NotifierFactory},
	},
	utils::{
		logging::error::BoxedSource,
		tests::stellar::{BlockBuilder, TransactionBuilder},
	},
};
use mockall::mock;
use tokio_cron_scheduler::Job;

mock! {
	pub Client {}

	#[async_trait]
	impl BlockChainClient for Client {
		async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;
		async fn get_block(&self, block_number: u64) -> Result<BlockType, BlockChainError>;
	}
}

mock! {
	pub Storage {}

	#[async_trait]
	impl BlockStorage for Storage {
		async fn get_last_processed_block(&self, network_id: &str) -> Result<Option<u64>, BlockWatcherError>;
		async fn save_last_processed_block(&self, network_id: &str, block: u64) -> Result<(), BlockWatcherError>;
		async fn save_blocks(&self, network_id: &str, blocks: &[BlockType]) -> Result<(), BlockWatcherError>;
		async fn delete_blocks(&self, network_id: &str) -> Result<(), BlockWatcherError>;
	}
}

mock! {
	pub Notifier {}

	#[async_trait]
	impl Notifier for Notifier {
		async fn send(&self, message: &NotificationMessage) -> Result<(), NotificationError>;
	}
}

mock! {
	pub NotifierFactory {}

	impl NotifierFactory for NotifierFactory {
		fn create(&self, trigger: &Trigger) -> Result<Arc<dyn Notifier>, NotificationError>;
	}
}

mock! {
	pub JobScheduler {}

	#[async_trait]
	impl JobSchedulerTrait for JobScheduler {
		async fn new() -> Result<Self, BoxedSource>;
		async fn add(&self, job: Job) -> Result<(), BoxedSource>;
		async fn start(&self) -> Result<(), BoxedSource>;
		async fn shutdown(&mut self) -> Result<(), BoxedSource>;
	}
}

/// Stellar token contract used across the tests
pub const TOKEN: &str = "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC";

/// Ledger with a single `mint` invocation against [`TOKEN`]
pub fn mint_ledger(sequence: u64) -> StellarBlock {
	let transaction = TransactionBuilder::new()
		.hash(&format!("tx{}", sequence))
		.ledger(sequence)
		.invoke(TOKEN, "mint", vec![])
		.build();
	BlockBuilder::new()
		.sequence(sequence)
		.transaction(transaction)
		.build()
}

/// Client that serves [`mint_ledger`] for every number up to `latest`
pub fn ledger_client(latest: u64) -> MockClient {
	let mut client = MockClient::new();
	client
		.expect_get_latest_block_number()
		.returning(move || Ok(latest));
	client
		.expect_get_block()
		.returning(|number| Ok(BlockType::Stellar(Box::new(mint_ledger(number)))));
	client
}
