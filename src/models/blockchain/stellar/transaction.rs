//! Stellar transaction data structures.
//!
//! Field names follow the Stellar RPC `getTransactions` response with `xdrFormat: "json"`.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Information about a Stellar transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInfo {
	/// "SUCCESS" or "FAILED"
	pub status: String,

	#[serde(rename = "txHash", alias = "hash")]
	pub transaction_hash: String,

	#[serde(rename = "applicationOrder", default)]
	pub application_order: i32,

	#[serde(rename = "feeBump", default)]
	pub fee_bump: bool,

	/// Decoded transaction envelope
	#[serde(rename = "envelopeJson", default, skip_serializing_if = "Option::is_none")]
	pub envelope_json: Option<Value>,

	/// Decoded transaction result
	#[serde(rename = "resultJson", default, skip_serializing_if = "Option::is_none")]
	pub result_json: Option<Value>,

	/// Sequence number of the containing ledger
	pub ledger: u64,
}

/// A `invoke_contract` host function call found in a transaction envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInvocation {
	pub contract_address: String,
	pub function_name: String,
	pub args: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction(pub TransactionInfo);

impl Transaction {
	pub fn hash(&self) -> &str {
		&self.0.transaction_hash
	}

	pub fn is_success(&self) -> bool {
		self.0.status.eq_ignore_ascii_case("SUCCESS")
	}

	/// Contract invocations carried by the envelope, in operation order.
	///
	/// The envelope is walked structurally so v1 and fee-bump envelopes are handled alike.
	pub fn invocations(&self) -> Vec<ContractInvocation> {
		let mut found = Vec::new();
		if let Some(envelope) = &self.0.envelope_json {
			collect_invocations(envelope, &mut found);
		}
		found
	}

	/// Source accounts named by the envelope: the transaction source, fee-bump sources
	/// and per-operation sources
	pub fn source_accounts(&self) -> Vec<String> {
		let mut found = Vec::new();
		if let Some(envelope) = &self.0.envelope_json {
			collect_source_accounts(envelope, &mut found);
		}
		found
	}
}

fn collect_source_accounts(value: &Value, found: &mut Vec<String>) {
	match value {
		Value::Object(map) => {
			for (key, child) in map {
				match (key.as_str(), child) {
					("auth", _) => {}
					("source_account" | "fee_source", Value::String(account)) => {
						found.push(account.clone())
					}
					_ => collect_source_accounts(child, found),
				}
			}
		}
		Value::Array(items) => {
			for item in items {
				collect_source_accounts(item, found);
			}
		}
		_ => {}
	}
}

fn collect_invocations(value: &Value, found: &mut Vec<ContractInvocation>) {
	match value {
		Value::Object(map) => {
			for (key, child) in map {
				if key == "invoke_contract" {
					if let Some(invocation) = parse_invocation(child) {
						found.push(invocation);
						continue;
					}
				}
				// Authorization trees repeat the call; only the host function counts
				if key == "auth" {
					continue;
				}
				collect_invocations(child, found);
			}
		}
		Value::Array(items) => {
			for item in items {
				collect_invocations(item, found);
			}
		}
		_ => {}
	}
}

fn parse_invocation(value: &Value) -> Option<ContractInvocation> {
	Some(ContractInvocation {
		contract_address: value.get("contract_address")?.as_str()?.to_string(),
		function_name: value.get("function_name")?.as_str()?.to_string(),
		args: value
			.get("args")
			.and_then(Value::as_array)
			.cloned()
			.unwrap_or_default(),
	})
}

impl From<TransactionInfo> for Transaction {
	fn from(tx: TransactionInfo) -> Self {
		Self(tx)
	}
}

impl Deref for Transaction {
	type Target = TransactionInfo;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
