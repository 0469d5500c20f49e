//! Stellar (ledger-model) specific data structures.

mod block;
mod event;
mod monitor;
mod transaction;

pub use block::{BaseBlock as StellarBaseBlock, Block as StellarBlock, LedgerInfo as StellarLedgerInfo};
pub use event::Event as StellarEvent;
pub use monitor::{
	ContractSpec as StellarContractSpec, MonitorMatch as StellarMonitorMatch,
	SpecEntry as StellarSpecEntry, SpecInput as StellarSpecInput,
};
pub use transaction::{
	ContractInvocation as StellarContractInvocation, Transaction as StellarTransaction,
	TransactionInfo as StellarTransactionInfo,
};
