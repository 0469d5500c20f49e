//! Test helper utilities for Stellar ledgers, transactions and events
//!
//! - `TransactionBuilder`: Builder for Stellar transactions
//! - `EventBuilder`: Builder for Stellar contract events
//! - `BlockBuilder`: Builder for Stellar ledgers

use serde_json::{json, Value};

use crate::models::{
	StellarBaseBlock, StellarBlock, StellarEvent, StellarLedgerInfo, StellarTransaction,
	StellarTransactionInfo,
};

/// Builder for creating test Stellar transactions
pub struct TransactionBuilder {
	transaction: StellarTransactionInfo,
}

impl Default for TransactionBuilder {
	fn default() -> Self {
		Self {
			transaction: StellarTransactionInfo {
				status: "SUCCESS".to_string(),
				transaction_hash: "tx_hash".to_string(),
				application_order: 1,
				..Default::default()
			},
		}
	}
}

impl TransactionBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hash(mut self, hash: &str) -> Self {
		self.transaction.transaction_hash = hash.to_string();
		self
	}

	pub fn status(mut self, status: &str) -> Self {
		self.transaction.status = status.to_string();
		self
	}

	pub fn ledger(mut self, ledger: u64) -> Self {
		self.transaction.ledger = ledger;
		self
	}

	/// Sets an envelope invoking `function` on `contract` with JSON-rendered ScVal args
	pub fn invoke(mut self, contract: &str, function: &str, args: Vec<Value>) -> Self {
		self.transaction.envelope_json = Some(json!({
			"tx": {
				"tx": {
					"operations": [{
						"body": {
							"invoke_host_function": {
								"host_function": {
									"invoke_contract": {
										"contract_address": contract,
										"function_name": function,
										"args": args
									}
								},
								"auth": []
							}
						}
					}]
				}
			}
		}));
		self
	}

	/// Sets the envelope's transaction source account, keeping any invocation already set
	pub fn source(mut self, account: &str) -> Self {
		let envelope = self
			.transaction
			.envelope_json
			.get_or_insert_with(|| json!({ "tx": { "tx": {} } }));
		if let Some(tx) = envelope.pointer_mut("/tx/tx").and_then(Value::as_object_mut) {
			tx.insert("source_account".to_string(), json!(account));
		}
		self
	}

	pub fn build(self) -> StellarTransaction {
		StellarTransaction(self.transaction)
	}
}

/// Builder for creating test Stellar contract events
pub struct EventBuilder {
	event: StellarEvent,
}

impl Default for EventBuilder {
	fn default() -> Self {
		Self {
			event: StellarEvent {
				event_type: "contract".to_string(),
				ledger: 0,
				contract_id: String::new(),
				id: "event_id".to_string(),
				in_successful_contract_call: true,
				transaction_hash: "tx_hash".to_string(),
				topic_json: vec![],
				value_json: Value::Null,
			},
		}
	}
}

impl EventBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contract(mut self, contract_id: &str) -> Self {
		self.event.contract_id = contract_id.to_string();
		self
	}

	pub fn transaction_hash(mut self, hash: &str) -> Self {
		self.event.transaction_hash = hash.to_string();
		self
	}

	/// Name symbol followed by the remaining topics
	pub fn topics(mut self, name: &str, rest: Vec<Value>) -> Self {
		let mut topics = vec![json!({ "symbol": name })];
		topics.extend(rest);
		self.event.topic_json = topics;
		self
	}

	pub fn value(mut self, value: Value) -> Self {
		self.event.value_json = value;
		self
	}

	pub fn ledger(mut self, ledger: u64) -> Self {
		self.event.ledger = ledger;
		self
	}

	pub fn build(self) -> StellarEvent {
		self.event
	}
}

/// Builder for creating test Stellar ledgers
#[derive(Default)]
pub struct BlockBuilder {
	block: StellarBaseBlock,
}

impl BlockBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sequence(mut self, sequence: u64) -> Self {
		self.block.ledger = StellarLedgerInfo {
			hash: format!("ledger_{}", sequence),
			sequence,
			ledger_close_time: "1700000000".to_string(),
		};
		self
	}

	pub fn transaction(mut self, transaction: StellarTransaction) -> Self {
		self.block.transactions.push(transaction);
		self
	}

	pub fn event(mut self, event: StellarEvent) -> Self {
		self.block.events.push(event);
		self
	}

	pub fn build(self) -> StellarBlock {
		StellarBlock::from(self.block)
	}
}
