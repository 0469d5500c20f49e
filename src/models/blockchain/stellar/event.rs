//! Contract event as returned by the Stellar RPC `getEvents` method with
//! `xdrFormat: "json"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
	#[serde(rename = "type")]
	pub event_type: String,

	pub ledger: u64,

	#[serde(rename = "contractId", default)]
	pub contract_id: String,

	pub id: String,

	#[serde(rename = "inSuccessfulContractCall", default)]
	pub in_successful_contract_call: bool,

	#[serde(rename = "txHash", default)]
	pub transaction_hash: String,

	/// Topics as ScVal JSON; the first topic is conventionally the event name symbol
	#[serde(rename = "topicJson", default)]
	pub topic_json: Vec<Value>,

	/// Event body as ScVal JSON
	#[serde(rename = "valueJson", default)]
	pub value_json: Value,
}
