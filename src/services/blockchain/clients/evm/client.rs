//! EVM-compatible blockchain client implementation.
//!
//! Reads blocks with full transaction objects through `eth_getBlockByNumber` and their
//! receipts through `eth_getBlockReceipts`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
	models::{BlockType, EVMBaseBlock, EVMBlock, EVMTransactionReceipt},
	services::blockchain::{BlockChainClient, BlockChainError, BlockchainTransport},
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible blockchains
#[derive(Clone)]
pub struct EvmClient<T: BlockchainTransport> {
	transport: T,
}

impl<T: BlockchainTransport> EvmClient<T> {
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	pub fn url(&self) -> &str {
		self.transport.url()
	}

	fn block_metadata(&self, block_number: u64) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("block_number".to_string(), block_number.to_string()),
			("url".to_string(), self.transport.url().to_string()),
		]))
	}
}

/// Parses a `0x`-prefixed hex quantity
fn parse_quantity(value: &Value) -> Option<u64> {
	let hex = value.as_str()?.strip_prefix("0x")?;
	u64::from_str_radix(hex, 16).ok()
}

#[async_trait]
impl<T: BlockchainTransport> BlockChainClient for EvmClient<T> {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		let result = self.transport.send_raw_request("eth_blockNumber", None).await?;

		parse_quantity(&result).ok_or_else(|| {
			BlockChainError::request_error(
				format!("Invalid block number in response: {}", result),
				None,
				None,
			)
		})
	}

	#[tracing::instrument(skip(self), fields(url = %self.transport.url()))]
	async fn get_block(&self, block_number: u64) -> Result<BlockType, BlockChainError> {
		let tag = format!("0x{:x}", block_number);

		let block = self
			.transport
			.send_raw_request("eth_getBlockByNumber", Some(json!([tag, true])))
			.await?;

		if block.is_null() {
			return Err(BlockChainError::block_not_found(
				block_number,
				None,
				self.block_metadata(block_number),
			));
		}

		let mut base: EVMBaseBlock = serde_json::from_value(block).map_err(|e| {
			BlockChainError::request_error(
				format!("Failed to decode block: {}", e),
				Some(Box::new(e)),
				self.block_metadata(block_number),
			)
		})?;

		if !base.transactions.is_empty() {
			let receipts = self
				.transport
				.send_raw_request("eth_getBlockReceipts", Some(json!([tag])))
				.await?;

			if receipts.is_null() {
				return Err(BlockChainError::block_not_found(
					block_number,
					None,
					self.block_metadata(block_number),
				));
			}

			base.receipts =
				serde_json::from_value::<Vec<EVMTransactionReceipt>>(receipts).map_err(|e| {
					BlockChainError::request_error(
						format!("Failed to decode receipts: {}", e),
						Some(Box::new(e)),
						self.block_metadata(block_number),
					)
				})?;
		}

		Ok(BlockType::EVM(Box::new(EVMBlock::from(base))))
	}
}
