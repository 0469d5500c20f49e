//! `${variable}` templates and the per-match variable context.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{
	models::{MatchParamsMap, Monitor, MonitorMatch, NotificationMessage, Trigger},
	services::filter::evm_helpers,
};

lazy_static! {
	static ref PLACEHOLDER: Regex =
		Regex::new(r"\$\{([A-Za-z0-9_.\-\[\]]+)\}").expect("placeholder pattern is valid");
}

/// Replaces every `${name}` with its value; names missing from `variables` render empty
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
	PLACEHOLDER
		.replace_all(template, |caps: &Captures| {
			variables.get(&caps[1]).cloned().unwrap_or_default()
		})
		.into_owned()
}

pub fn render_message(
	message: &NotificationMessage,
	variables: &HashMap<String, String>,
) -> NotificationMessage {
	NotificationMessage {
		title: render(&message.title, variables),
		body: render(&message.body, variables),
	}
}

fn insert_params(
	variables: &mut HashMap<String, String>,
	prefix: &str,
	params: Option<&Vec<MatchParamsMap>>,
) {
	let Some(params) = params.and_then(|p| p.first()) else {
		return;
	};
	variables.insert(format!("{}.signature", prefix), params.signature.clone());
	for arg in params.args.iter().flatten() {
		variables.insert(format!("{}.args.{}", prefix, arg.name), arg.value.clone());
	}
}

/// Builds a fresh context for one (monitor, match, trigger).
///
/// `function.*` variables come only from the match's own function hits and `event.*`
/// ones only from its event hits; a match without one of them leaves that namespace empty.
pub fn build_context(
	monitor: &Monitor,
	monitor_match: &MonitorMatch,
	trigger: &Trigger,
) -> HashMap<String, String> {
	let mut variables = HashMap::from([
		("monitor.name".to_string(), monitor.name.clone()),
		(
			"network".to_string(),
			monitor_match.network_slug().to_string(),
		),
		("trigger.name".to_string(), trigger.name.clone()),
	]);

	match monitor_match {
		MonitorMatch::EVM(m) => {
			let tx = &m.transaction;
			variables.insert(
				"transaction.hash".to_string(),
				evm_helpers::b256_to_string(tx.hash()),
			);
			variables.insert(
				"transaction.from".to_string(),
				evm_helpers::address_to_string(tx.sender()),
			);
			variables.insert(
				"transaction.to".to_string(),
				tx.to().map(evm_helpers::address_to_string).unwrap_or_default(),
			);
			variables.insert("transaction.value".to_string(), tx.value().to_string());
			let block = tx
				.0
				.block_number
				.or_else(|| m.receipt.as_ref().and_then(|r| r.block_number));
			if let Some(number) = block {
				variables.insert("block.number".to_string(), number.to_string());
			}
		}
		MonitorMatch::Stellar(m) => {
			variables.insert(
				"transaction.hash".to_string(),
				m.transaction.hash().to_string(),
			);
			variables.insert("block.number".to_string(), m.ledger.sequence.to_string());
			variables.insert("ledger.sequence".to_string(), m.ledger.sequence.to_string());
		}
	}

	let matched_on = monitor_match.matched_on();
	let args = monitor_match.matched_on_args();
	if !matched_on.functions.is_empty() {
		insert_params(&mut variables, "function", args.and_then(|a| a.functions.as_ref()));
	}
	if !matched_on.events.is_empty() {
		insert_params(&mut variables, "event", args.and_then(|a| a.events.as_ref()));
	}

	variables
}
