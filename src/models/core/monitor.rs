use serde::{Deserialize, Serialize};

use crate::models::ContractSpec;

/// Configuration for monitoring specific blockchain activity.
///
/// A monitor binds networks, contract addresses, match conditions and the ordered list
/// of triggers to fire. It is read-only at runtime.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Monitor {
	/// Unique name identifying this monitor
	pub name: String,

	/// Network slugs this monitor watches
	pub networks: Vec<String>,

	/// Whether this monitor is currently paused
	#[serde(default)]
	pub paused: bool,

	/// Contract addresses to monitor, optionally with their interface
	#[serde(default)]
	pub addresses: Vec<AddressWithSpec>,

	/// Conditions that must be met to trigger notifications
	#[serde(default)]
	pub match_conditions: MatchConditions,

	/// External filter scripts a structural match must also pass
	#[serde(default)]
	pub trigger_conditions: Vec<TriggerConditions>,

	/// Trigger names, fired in this order
	#[serde(default)]
	pub triggers: Vec<String>,
}

impl Monitor {
	/// Whether `address` is one of the monitored addresses (case-insensitive)
	pub fn watches_address(&self, address: &str) -> bool {
		self.addresses
			.iter()
			.any(|a| a.address.eq_ignore_ascii_case(address))
	}

	/// Contract spec registered for `address`
	pub fn contract_spec_for(&self, address: &str) -> Option<&ContractSpec> {
		self.addresses
			.iter()
			.find(|a| a.address.eq_ignore_ascii_case(address))
			.and_then(|a| a.contract_spec.as_ref())
	}
}

/// Contract address with optional interface specification
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AddressWithSpec {
	pub address: String,

	#[serde(default)]
	pub contract_spec: Option<ContractSpec>,
}

/// Collection of conditions that can trigger a monitor
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConditions {
	#[serde(default)]
	pub functions: Vec<FunctionCondition>,

	#[serde(default)]
	pub events: Vec<EventCondition>,

	#[serde(default)]
	pub transactions: Vec<TransactionCondition>,
}

impl MatchConditions {
	pub fn is_empty(&self) -> bool {
		self.functions.is_empty() && self.events.is_empty() && self.transactions.is_empty()
	}
}

/// Condition matching contract function calls
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionCondition {
	/// Function signature, e.g. `transfer(address,uint256)`
	pub signature: String,

	/// Optional expression over the decoded arguments
	#[serde(default)]
	pub expression: Option<String>,
}

/// Condition matching contract events
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventCondition {
	/// Event signature, e.g. `Transfer(address,address,uint256)`
	pub signature: String,

	#[serde(default)]
	pub expression: Option<String>,
}

/// Condition matching transaction properties
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionCondition {
	pub status: TransactionStatus,

	/// Optional expression over transaction fields (`value`, `from`, ...)
	#[serde(default)]
	pub expression: Option<String>,
}

/// Possible transaction execution states
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum TransactionStatus {
	Any,
	Success,
	Failure,
}

impl TransactionStatus {
	pub fn accepts(&self, succeeded: bool) -> bool {
		match self {
			TransactionStatus::Any => true,
			TransactionStatus::Success => succeeded,
			TransactionStatus::Failure => !succeeded,
		}
	}
}

/// Interpreter used to run a script
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ScriptLanguage {
	JavaScript,
	Python,
	Bash,
}

fn default_script_timeout_ms() -> u32 {
	1000
}

/// External filter script a candidate match must pass
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConditions {
	pub script_path: String,

	pub language: ScriptLanguage,

	#[serde(default)]
	pub arguments: Option<Vec<String>>,

	#[serde(default = "default_script_timeout_ms")]
	pub timeout_ms: u32,
}
