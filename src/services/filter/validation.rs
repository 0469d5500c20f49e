//! Load-time validation of monitor expressions.
//!
//! Every variable an expression names must be a declared parameter of its condition's
//! signature, so unknown names are rejected before a monitor ever runs.

use std::collections::{BTreeSet, HashMap};

use crate::{
	models::{ConfigError, ContractSpec, Monitor},
	services::filter::{
		expression::parse,
		filters::{evm, stellar},
	},
};

#[derive(Clone, Copy)]
enum SignatureKind {
	Function,
	Event,
}

/// Parameter names declared for `signature` by any contract spec of the monitor
fn declared_params(monitor: &Monitor, signature: &str, kind: SignatureKind) -> Option<Vec<String>> {
	monitor
		.addresses
		.iter()
		.filter_map(|address| address.contract_spec.as_ref())
		.find_map(|spec| match (spec, kind) {
			(ContractSpec::EVM(spec), SignatureKind::Function) => spec
				.abi()
				.functions()
				.find(|f| evm::helpers::are_same_signature(&f.signature(), signature))
				.map(|f| f.inputs.iter().map(|p| p.name.clone()).collect()),
			(ContractSpec::EVM(spec), SignatureKind::Event) => spec
				.abi()
				.events()
				.find(|e| evm::helpers::are_same_signature(&e.signature(), signature))
				.map(|e| e.inputs.iter().map(|p| p.name.clone()).collect()),
			(ContractSpec::Stellar(spec), kind) => {
				let entries = match kind {
					SignatureKind::Function => &spec.functions,
					SignatureKind::Event => &spec.events,
				};
				entries
					.iter()
					.find(|entry| stellar::helpers::are_same_signature(&entry.signature(), signature))
					.map(|entry| entry.inputs.iter().map(|input| input.name.clone()).collect())
			}
		})
}

/// Transaction fields usable by the monitor, inferred from its address formats.
/// `0x` addresses mean EVM; any other address means Stellar; no addresses allows both.
fn transaction_fields(monitor: &Monitor) -> BTreeSet<&'static str> {
	let evm = monitor
		.addresses
		.iter()
		.any(|a| a.address.trim().starts_with("0x"));
	let stellar = monitor
		.addresses
		.iter()
		.any(|a| !a.address.trim().starts_with("0x"));
	let both = !evm && !stellar;

	let mut fields = BTreeSet::new();
	if evm || both {
		fields.extend(evm::helpers::TRANSACTION_FIELDS.iter().copied());
	}
	if stellar || both {
		fields.extend(stellar::helpers::TRANSACTION_FIELDS.iter().copied());
	}
	fields
}

fn check_expression(
	monitor: &Monitor,
	context: &str,
	expression: &str,
	allowed: impl Fn(&str) -> bool,
	declared: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
	let metadata = || {
		HashMap::from([
			("monitor".to_string(), monitor.name.clone()),
			("condition".to_string(), context.to_string()),
			("expression".to_string(), expression.to_string()),
		])
	};

	let parsed = parse(expression).map_err(|e| {
		ConfigError::validation_error(
			format!("Invalid expression for {}", context),
			Some(Box::new(e)),
			Some(metadata()),
		)
	})?;

	if let Some(unknown) = parsed.variables().into_iter().find(|v| !allowed(v.base)) {
		return Err(ConfigError::validation_error(
			format!(
				"Unknown parameter '{}' in expression for {}; declared parameters: {}",
				unknown.base,
				context,
				declared()
			),
			None,
			Some(metadata()),
		));
	}

	Ok(())
}

fn check_signature_expression(
	monitor: &Monitor,
	signature: &str,
	expression: &str,
	kind: SignatureKind,
) -> Result<(), ConfigError> {
	let params = declared_params(monitor, signature, kind).ok_or_else(|| {
		ConfigError::validation_error(
			format!(
				"Expression on {} requires a contract spec declaring that signature",
				signature
			),
			None,
			Some(HashMap::from([
				("monitor".to_string(), monitor.name.clone()),
				("expression".to_string(), expression.to_string()),
			])),
		)
	})?;

	check_expression(
		monitor,
		signature,
		expression,
		|name| params.iter().any(|p| p == name),
		|| params.join(", "),
	)
}

/// Validates every expression of the monitor against the declared signatures.
///
/// Pure: reads nothing but the monitor itself.
pub fn validate_monitor(monitor: &Monitor) -> Result<(), ConfigError> {
	for condition in &monitor.match_conditions.functions {
		if let Some(expression) = &condition.expression {
			check_signature_expression(
				monitor,
				&condition.signature,
				expression,
				SignatureKind::Function,
			)?;
		}
	}

	for condition in &monitor.match_conditions.events {
		if let Some(expression) = &condition.expression {
			check_signature_expression(
				monitor,
				&condition.signature,
				expression,
				SignatureKind::Event,
			)?;
		}
	}

	let fields = transaction_fields(monitor);
	for condition in &monitor.match_conditions.transactions {
		if let Some(expression) = &condition.expression {
			check_expression(
				monitor,
				"transaction condition",
				expression,
				|name| fields.contains(name),
				|| fields.iter().copied().collect::<Vec<_>>().join(", "),
			)?;
		}
	}

	Ok(())
}
