use alloy::json_abi::JsonAbi;
use serde::{Deserialize, Serialize};

use crate::models::{
	EVMTransaction, EVMTransactionReceipt, MatchArguments, MatchConditions, Monitor,
};

/// Result of a successful monitor match on an EVM chain
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitorMatch {
	/// Monitor configuration that triggered the match
	pub monitor: Monitor,

	/// Transaction that triggered the match
	pub transaction: EVMTransaction,

	/// Transaction receipt with execution results
	pub receipt: Option<EVMTransactionReceipt>,

	/// Network the match was found on
	pub network_slug: String,

	/// The single condition that matched
	pub matched_on: MatchConditions,

	/// Decoded arguments from the matched condition
	pub matched_on_args: Option<MatchArguments>,
}

/// Solidity JSON ABI attached to a monitored EVM address
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ContractSpec(pub JsonAbi);

impl ContractSpec {
	pub fn abi(&self) -> &JsonAbi {
		&self.0
	}
}

impl From<JsonAbi> for ContractSpec {
	fn from(abi: JsonAbi) -> Self {
		Self(abi)
	}
}
