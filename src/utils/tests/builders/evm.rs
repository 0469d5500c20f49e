//! Test helper utilities for EVM blocks, transactions and receipts
//!
//! - `TransactionBuilder`: Builder for EVM transactions
//! - `ReceiptBuilder`: Builder for EVM receipts
//! - `BlockBuilder`: Builder for EVM blocks

use alloy::primitives::{Address, Bytes, B256, U256, U64};

use crate::models::{
	EVMBaseBlock, EVMBaseTransaction, EVMBlock, EVMReceiptLog, EVMTransaction,
	EVMTransactionReceipt,
};

/// Builder for creating test EVM transactions
#[derive(Default)]
pub struct TransactionBuilder {
	transaction: EVMBaseTransaction,
}

impl TransactionBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hash(mut self, hash: B256) -> Self {
		self.transaction.hash = hash;
		self
	}

	pub fn from(mut self, from: Address) -> Self {
		self.transaction.from = from;
		self
	}

	pub fn to(mut self, to: Address) -> Self {
		self.transaction.to = Some(to);
		self
	}

	pub fn value(mut self, value: U256) -> Self {
		self.transaction.value = value;
		self
	}

	pub fn input(mut self, input: Bytes) -> Self {
		self.transaction.input = input;
		self
	}

	pub fn gas_price(mut self, gas_price: U256) -> Self {
		self.transaction.gas_price = Some(gas_price);
		self
	}

	pub fn nonce(mut self, nonce: u64) -> Self {
		self.transaction.nonce = U64::from(nonce);
		self
	}

	pub fn build(self) -> EVMTransaction {
		EVMTransaction(self.transaction)
	}
}

/// Builder for creating test EVM receipts
#[derive(Default)]
pub struct ReceiptBuilder {
	receipt: EVMTransactionReceipt,
}

impl ReceiptBuilder {
	pub fn new() -> Self {
		Self {
			receipt: EVMTransactionReceipt {
				status: Some(U64::from(1)),
				..Default::default()
			},
		}
	}

	pub fn transaction_hash(mut self, hash: B256) -> Self {
		self.receipt.transaction_hash = hash;
		self
	}

	pub fn status(mut self, success: bool) -> Self {
		self.receipt.status = Some(U64::from(u64::from(success)));
		self
	}

	pub fn log(mut self, address: Address, topics: Vec<B256>, data: Bytes) -> Self {
		self.receipt.logs.push(EVMReceiptLog {
			address,
			topics,
			data,
			transaction_hash: Some(self.receipt.transaction_hash),
			..Default::default()
		});
		self
	}

	pub fn build(self) -> EVMTransactionReceipt {
		self.receipt
	}
}

/// Builder for creating test EVM blocks
#[derive(Default)]
pub struct BlockBuilder {
	block: EVMBaseBlock,
}

impl BlockBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn number(mut self, number: u64) -> Self {
		self.block.number = Some(U64::from(number));
		self
	}

	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.block.timestamp = U64::from(timestamp);
		self
	}

	pub fn transaction(mut self, transaction: EVMTransaction) -> Self {
		self.block.transactions.push(transaction);
		self
	}

	pub fn receipt(mut self, receipt: EVMTransactionReceipt) -> Self {
		self.block.receipts.push(receipt);
		self
	}

	pub fn build(self) -> EVMBlock {
		EVMBlock::from(self.block)
	}
}
