//! EVM transaction receipt data structures.

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Log entry emitted during transaction execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLog {
	/// Emitting contract
	pub address: Address,

	/// Indexed topics; the first is the event selector for non-anonymous events
	pub topics: Vec<B256>,

	/// ABI encoded non-indexed data
	#[serde(default)]
	pub data: Bytes,

	#[serde(default)]
	pub log_index: Option<U64>,

	#[serde(default)]
	pub transaction_hash: Option<B256>,

	#[serde(default)]
	pub block_number: Option<U64>,
}

/// Receipt as returned by `eth_getBlockReceipts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: B256,

	/// 1 for success, 0 for failure; absent on pre-Byzantium chains
	#[serde(default)]
	pub status: Option<U64>,

	#[serde(default)]
	pub gas_used: Option<U256>,

	#[serde(default)]
	pub block_number: Option<U64>,

	#[serde(default)]
	pub contract_address: Option<Address>,

	#[serde(default)]
	pub logs: Vec<BaseLog>,
}

impl TransactionReceipt {
	/// Whether execution succeeded. Receipts without a status are treated as successful.
	pub fn is_success(&self) -> bool {
		self.status.map(|s| s == U64::from(1)).unwrap_or(true)
	}
}
