//! EVM transaction data structures.

use std::ops::Deref;

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Transaction object as returned by `eth_getBlockByNumber` with full transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTransaction {
	/// Transaction hash
	pub hash: B256,

	/// Sender address
	pub from: Address,

	/// Recipient address (None for contract creation)
	#[serde(default)]
	pub to: Option<Address>,

	/// Value transferred in wei
	#[serde(default)]
	pub value: U256,

	/// Call data
	#[serde(default)]
	pub input: Bytes,

	/// Sender nonce
	#[serde(default)]
	pub nonce: U64,

	/// Gas limit
	#[serde(default)]
	pub gas: U64,

	/// Gas price (None for some EIP-1559 responses)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<U256>,

	/// Number of the containing block
	#[serde(default)]
	pub block_number: Option<U64>,

	/// Position within the containing block
	#[serde(default)]
	pub transaction_index: Option<U64>,
}

/// Wrapper around [`BaseTransaction`] with convenience accessors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction(pub BaseTransaction);

impl Transaction {
	/// Get the transaction value (amount of native currency transferred)
	pub fn value(&self) -> &U256 {
		&self.0.value
	}

	/// Get the transaction sender address
	pub fn sender(&self) -> &Address {
		&self.0.from
	}

	/// Get the transaction recipient address (None for contract creation)
	pub fn to(&self) -> Option<&Address> {
		self.0.to.as_ref()
	}

	/// Get the transaction hash
	pub fn hash(&self) -> &B256 {
		&self.0.hash
	}

	/// Function selector, if the call data carries one
	pub fn selector(&self) -> Option<&[u8]> {
		(self.0.input.len() >= 4).then(|| &self.0.input[..4])
	}
}

impl From<BaseTransaction> for Transaction {
	fn from(tx: BaseTransaction) -> Self {
		Self(tx)
	}
}

impl Deref for Transaction {
	type Target = BaseTransaction;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
