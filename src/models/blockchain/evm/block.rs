//! EVM block data structures.

use std::ops::Deref;

use alloy::primitives::{B256, U64};
use serde::{Deserialize, Serialize};

use super::{receipt::TransactionReceipt, transaction::Transaction};

/// Block header with full transactions, plus the receipts fetched alongside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBlock {
	#[serde(default)]
	pub number: Option<U64>,

	#[serde(default)]
	pub hash: Option<B256>,

	#[serde(default)]
	pub timestamp: U64,

	#[serde(default)]
	pub transactions: Vec<Transaction>,

	/// Not part of the block RPC response; filled from `eth_getBlockReceipts`
	#[serde(default)]
	pub receipts: Vec<TransactionReceipt>,
}

/// Wrapper around [`BaseBlock`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block(pub BaseBlock);

impl Block {
	/// Get the block number
	pub fn number(&self) -> Option<u64> {
		self.0.number.map(|n| n.to::<u64>())
	}

	/// Receipt for the given transaction hash
	pub fn receipt_for(&self, hash: &B256) -> Option<&TransactionReceipt> {
		self.0
			.receipts
			.iter()
			.find(|receipt| &receipt.transaction_hash == hash)
	}
}

impl From<BaseBlock> for Block {
	fn from(block: BaseBlock) -> Self {
		Self(block)
	}
}

impl Deref for Block {
	type Target = BaseBlock;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
