use serde::{Deserialize, Serialize};

use crate::models::{MatchArguments, MatchConditions, Monitor};

use super::{block::LedgerInfo, transaction::Transaction};

/// Result of a successful monitor match on a Stellar network
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitorMatch {
	pub monitor: Monitor,
	pub transaction: Transaction,
	pub ledger: LedgerInfo,
	pub network_slug: String,
	pub matched_on: MatchConditions,
	pub matched_on_args: Option<MatchArguments>,
}

/// Named input of a contract function or event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpecInput {
	pub name: String,
	/// ScVal kind, e.g. `Address`, `I128`, `Symbol`
	pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpecEntry {
	pub name: String,
	#[serde(default)]
	pub inputs: Vec<SpecInput>,
}

impl SpecEntry {
	/// `name(Kind1,Kind2)`
	pub fn signature(&self) -> String {
		format!(
			"{}({})",
			self.name,
			self.inputs
				.iter()
				.map(|input| input.kind.as_str())
				.collect::<Vec<_>>()
				.join(",")
		)
	}
}

/// Function and event interface of a Soroban contract
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContractSpec {
	#[serde(default)]
	pub functions: Vec<SpecEntry>,
	#[serde(default)]
	pub events: Vec<SpecEntry>,
}
