//! Test helper utilities for Monitor configuration
//!
//! - `MonitorBuilder`: Builder for creating test Monitor instances

use crate::models::{
	AddressWithSpec, ContractSpec, EventCondition, FunctionCondition, MatchConditions, Monitor,
	ScriptLanguage, TransactionCondition, TransactionStatus, TriggerConditions,
};

/// Builder for creating test Monitor instances
pub struct MonitorBuilder {
	monitor: Monitor,
}

impl Default for MonitorBuilder {
	fn default() -> Self {
		Self {
			monitor: Monitor {
				name: "TestMonitor".to_string(),
				networks: vec!["ethereum_mainnet".to_string()],
				paused: false,
				addresses: vec![],
				match_conditions: MatchConditions::default(),
				trigger_conditions: vec![],
				triggers: vec![],
			},
		}
	}
}

impl MonitorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.monitor.name = name.to_string();
		self
	}

	pub fn networks(mut self, networks: Vec<String>) -> Self {
		self.monitor.networks = networks;
		self
	}

	pub fn paused(mut self, paused: bool) -> Self {
		self.monitor.paused = paused;
		self
	}

	pub fn address(mut self, address: &str) -> Self {
		self.monitor.addresses.push(AddressWithSpec {
			address: address.to_string(),
			contract_spec: None,
		});
		self
	}

	pub fn address_with_spec(mut self, address: &str, spec: Option<ContractSpec>) -> Self {
		self.monitor.addresses.push(AddressWithSpec {
			address: address.to_string(),
			contract_spec: spec,
		});
		self
	}

	pub fn function(mut self, signature: &str, expression: Option<String>) -> Self {
		self.monitor
			.match_conditions
			.functions
			.push(FunctionCondition {
				signature: signature.to_string(),
				expression,
			});
		self
	}

	pub fn event(mut self, signature: &str, expression: Option<String>) -> Self {
		self.monitor.match_conditions.events.push(EventCondition {
			signature: signature.to_string(),
			expression,
		});
		self
	}

	pub fn transaction(mut self, status: TransactionStatus, expression: Option<String>) -> Self {
		self.monitor
			.match_conditions
			.transactions
			.push(TransactionCondition { status, expression });
		self
	}

	pub fn trigger_condition(
		mut self,
		script_path: &str,
		timeout_ms: u32,
		language: ScriptLanguage,
		arguments: Option<Vec<String>>,
	) -> Self {
		self.monitor.trigger_conditions.push(TriggerConditions {
			script_path: script_path.to_string(),
			language,
			arguments,
			timeout_ms,
		});
		self
	}

	pub fn triggers(mut self, triggers: Vec<String>) -> Self {
		self.monitor.triggers = triggers;
		self
	}

	pub fn build(self) -> Monitor {
		self.monitor
	}
}
