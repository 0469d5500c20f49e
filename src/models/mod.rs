//! Domain models and data structures for blockchain monitoring.
//!
//! - `blockchain`: network-kind specific blocks, transactions and match contexts (EVM, Stellar)
//! - `config`: configuration loading and validation
//! - `core`: core domain models (Monitor, Network, Trigger)

mod blockchain;
mod config;
mod core;

pub use blockchain::{
	BlockChainType, BlockType, ContractSpec, MatchArguments, MatchParamEntry, MatchParamsMap,
	MonitorMatch,
};

pub use blockchain::evm::{
	EVMBaseBlock, EVMBaseTransaction, EVMBlock, EVMContractSpec, EVMMonitorMatch, EVMReceiptLog,
	EVMTransaction, EVMTransactionReceipt,
};

pub use blockchain::stellar::{
	StellarBaseBlock, StellarBlock, StellarContractInvocation, StellarContractSpec, StellarEvent,
	StellarLedgerInfo, StellarMonitorMatch, StellarSpecEntry, StellarSpecInput,
	StellarTransaction, StellarTransactionInfo,
};

pub use core::{
	AddressWithSpec, EventCondition, FunctionCondition, MatchConditions, Monitor, Network,
	NotificationMessage, RpcUrl, ScriptLanguage, TransactionCondition, TransactionStatus, Trigger,
	TriggerConditions, TriggerType, TriggerTypeConfig,
};

pub use config::{is_valid_signature, ConfigError, ConfigLoader};
