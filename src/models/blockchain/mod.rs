//! Blockchain-specific model implementations.
//!
//! This module contains type definitions for the supported network kinds. Each
//! submodule implements the platform-specific blocks, transactions and match contexts;
//! the enums here tag them by network kind.

use serde::{Deserialize, Serialize};

pub mod evm;
pub mod stellar;

/// Supported blockchain platform types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlockChainType {
	/// Ethereum Virtual Machine based chains (account model)
	EVM,
	/// Stellar (ledger model)
	Stellar,
}

/// Block data from different blockchain platforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockType {
	/// EVM block with transactions and receipts
	EVM(Box<evm::EVMBlock>),
	/// Stellar ledger with transactions and events
	Stellar(Box<stellar::StellarBlock>),
}

impl BlockType {
	/// Block number (ledger sequence on Stellar)
	pub fn number(&self) -> Option<u64> {
		match self {
			BlockType::EVM(block) => block.number(),
			BlockType::Stellar(block) => Some(block.number()),
		}
	}
}

/// Monitor match results from different blockchain platforms.
///
/// Serialized externally tagged (`{"EVM": {...}}`), which is the shape scripts receive
/// as `monitor_match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonitorMatch {
	/// Matched conditions from EVM chains
	EVM(Box<evm::EVMMonitorMatch>),
	/// Matched conditions from Stellar chains
	Stellar(Box<stellar::StellarMonitorMatch>),
}

impl MonitorMatch {
	pub fn monitor_name(&self) -> &str {
		match self {
			MonitorMatch::EVM(m) => &m.monitor.name,
			MonitorMatch::Stellar(m) => &m.monitor.name,
		}
	}

	pub fn network_slug(&self) -> &str {
		match self {
			MonitorMatch::EVM(m) => &m.network_slug,
			MonitorMatch::Stellar(m) => &m.network_slug,
		}
	}

	pub fn matched_on_args(&self) -> Option<&MatchArguments> {
		match self {
			MonitorMatch::EVM(m) => m.matched_on_args.as_ref(),
			MonitorMatch::Stellar(m) => m.matched_on_args.as_ref(),
		}
	}

	pub fn matched_on(&self) -> &crate::models::MatchConditions {
		match self {
			MonitorMatch::EVM(m) => &m.matched_on,
			MonitorMatch::Stellar(m) => &m.matched_on,
		}
	}
}

/// Contract interface attached to a monitored address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractSpec {
	/// Solidity JSON ABI (a JSON array)
	EVM(evm::EVMContractSpec),
	/// Soroban function/event interface (a JSON object)
	Stellar(stellar::StellarContractSpec),
}

/// Collection of decoded parameters for one matched function or event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchParamsMap {
	/// Function or event signature
	pub signature: String,

	/// Decoded argument values, when a contract spec was available
	pub args: Option<Vec<MatchParamEntry>>,

	/// Selector or topic hash (EVM only)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hex_signature: Option<String>,
}

/// Single decoded parameter from a function or event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchParamEntry {
	pub name: String,
	pub value: String,
	/// Whether this is an indexed parameter (events only)
	pub indexed: bool,
	/// Parameter type (`uint256`, `address`, `I128`, ...)
	pub kind: String,
}

/// Arguments of the matched function or event
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatchArguments {
	pub functions: Option<Vec<MatchParamsMap>>,
	pub events: Option<Vec<MatchParamsMap>>,
}
