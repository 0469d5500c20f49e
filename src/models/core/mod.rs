//! Core domain models for the blockchain monitoring system.
//!
//! - Monitors: what to watch for
//! - Networks: chain definitions and endpoints
//! - Triggers: what to do when a monitor matches

mod monitor;
mod network;
mod trigger;

pub use monitor::{
	AddressWithSpec, EventCondition, FunctionCondition, MatchConditions, Monitor, ScriptLanguage,
	TransactionCondition, TransactionStatus, TriggerConditions,
};
pub use network::{Network, RpcUrl};
pub use trigger::{NotificationMessage, Trigger, TriggerType, TriggerTypeConfig};
