//! Core blockchain client interface.
//!
//! Every network kind implements [`BlockChainClient`] against a single endpoint, so the
//! endpoint pool can hand out clients interchangeably.

use async_trait::async_trait;

use crate::{models::BlockType, services::blockchain::BlockChainError};

/// Defines the core interface for blockchain clients
#[async_trait]
pub trait BlockChainClient: Send + Sync {
	/// Retrieves the latest block number (ledger sequence on Stellar)
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;

	/// Retrieves one block with everything the evaluator needs: transactions plus
	/// receipts on EVM, transactions plus contract events on Stellar
	///
	/// # Errors
	/// `BlockNotFound` when the endpoint does not know the block yet
	async fn get_block(&self, block_number: u64) -> Result<BlockType, BlockChainError>;
}
