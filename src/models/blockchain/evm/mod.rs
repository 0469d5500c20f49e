//! Ethereum Virtual Machine (EVM) blockchain specific implementations.
//!
//! This module contains data structures specific to EVM-based (account-model)
//! blockchains: blocks, transactions, receipts and monitor matches.

mod block;
mod monitor;
mod receipt;
mod transaction;

pub use block::{BaseBlock as EVMBaseBlock, Block as EVMBlock};
pub use monitor::{ContractSpec as EVMContractSpec, MonitorMatch as EVMMonitorMatch};
pub use receipt::{BaseLog as EVMReceiptLog, TransactionReceipt as EVMTransactionReceipt};
pub use transaction::{BaseTransaction as EVMBaseTransaction, Transaction as EVMTransaction};
