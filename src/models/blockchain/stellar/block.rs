//! Stellar ledger data structures.
//!
//! Field names follow the Stellar RPC `getLedgers` response.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{event::Event, transaction::Transaction};

/// Ledger header summary returned by `getLedgers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerInfo {
	pub hash: String,

	pub sequence: u64,

	/// Close time in unix seconds, as a string
	#[serde(rename = "ledgerCloseTime", default)]
	pub ledger_close_time: String,
}

/// A ledger together with its transactions and contract events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseBlock {
	pub ledger: LedgerInfo,

	#[serde(default)]
	pub transactions: Vec<Transaction>,

	#[serde(default)]
	pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block(pub BaseBlock);

impl Block {
	pub fn number(&self) -> u64 {
		self.0.ledger.sequence
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
