//! Stellar block filter.
//!
//! Function conditions match `invoke_contract` host function calls, event conditions match
//! contract events by their leading name symbol and transaction conditions match on status.
//! A transaction is only considered when it involves one of the monitor's addresses.
//! Signatures are built from the ScVal kinds of the actual arguments, so a call matches
//! `transfer(Address,Address,I128)` only when it was made with exactly those kinds.

use serde_json::Value;
use tracing::instrument;

use crate::{
	models::{
		ContractSpec, EventCondition, FunctionCondition, MatchParamEntry, MatchParamsMap,
		Monitor, MonitorMatch, Network, StellarBlock, StellarEvent, StellarMonitorMatch,
		StellarSpecEntry, StellarTransaction, TransactionCondition,
	},
	services::filter::{
		expression::{evaluate, parse},
		filters::{
			stellar::{
				evaluator::StellarArgsEvaluator,
				helpers::{
					are_same_signature, build_signature, sc_val_param, signature_name,
					transaction_params,
				},
			},
			TransactionHits,
		},
	},
};

/// Stateless filter for Stellar ledgers
#[derive(Debug, Default, Clone, Copy)]
pub struct StellarBlockFilter;

impl StellarBlockFilter {
	/// Matches of `monitor` in `block`, at most one per transaction, combined the same
	/// way as on EVM.
	#[instrument(skip_all, fields(monitor = %monitor.name, ledger = block.number()))]
	pub fn filter_block(
		&self,
		network: &Network,
		monitor: &Monitor,
		block: &StellarBlock,
	) -> Vec<MonitorMatch> {
		let mut matches = Vec::new();

		for transaction in &block.transactions {
			let events: Vec<&StellarEvent> = block
				.events
				.iter()
				.filter(|event| event.transaction_hash == transaction.hash())
				.collect();
			if !self.is_involved(monitor, transaction, &events) {
				continue;
			}

			let hits = TransactionHits {
				functions: self.find_matching_functions(monitor, transaction),
				events: self.find_matching_events(monitor, &events),
				transactions: self.find_matching_transactions(monitor, transaction),
			};

			if let Some((matched_on, matched_on_args)) = hits.combine(&monitor.match_conditions) {
				matches.push(MonitorMatch::Stellar(Box::new(StellarMonitorMatch {
					monitor: monitor.clone(),
					transaction: transaction.clone(),
					ledger: block.ledger.clone(),
					network_slug: network.slug.clone(),
					matched_on,
					matched_on_args,
				})));
			}
		}

		matches
	}

	/// Whether a monitored address is a source account of the transaction, a contract
	/// it invokes or the emitter of one of its events
	fn is_involved(
		&self,
		monitor: &Monitor,
		transaction: &StellarTransaction,
		events: &[&StellarEvent],
	) -> bool {
		transaction
			.source_accounts()
			.iter()
			.any(|account| monitor.watches_address(account))
			|| transaction
				.invocations()
				.iter()
				.any(|call| monitor.watches_address(&call.contract_address))
			|| events
				.iter()
				.any(|event| monitor.watches_address(&event.contract_id))
	}

	fn find_matching_functions(
		&self,
		monitor: &Monitor,
		transaction: &StellarTransaction,
	) -> Vec<(FunctionCondition, MatchParamsMap)> {
		let invocations = transaction.invocations();
		let mut found = Vec::new();

		for condition in &monitor.match_conditions.functions {
			let hit = invocations.iter().find_map(|call| {
				if !monitor.watches_address(&call.contract_address) {
					return None;
				}
				let values: Vec<&Value> = call.args.iter().collect();
				let signature = build_signature(&call.function_name, &values);
				if !are_same_signature(&signature, &condition.signature) {
					return None;
				}

				let args = spec_entry(monitor, &call.contract_address, &condition.signature, false)
					.map(|entry| named_params(entry, &values, 0));
				if let Some(expression) = &condition.expression {
					if !expression_holds(monitor, expression, args.as_deref()) {
						return None;
					}
				}
				Some(args)
			});

			if let Some(args) = hit {
				found.push((
					condition.clone(),
					MatchParamsMap {
						signature: condition.signature.clone(),
						args,
						hex_signature: None,
					},
				));
			}
		}

		found
	}

	fn find_matching_events(
		&self,
		monitor: &Monitor,
		events: &[&StellarEvent],
	) -> Vec<(EventCondition, MatchParamsMap)> {
		let mut found = Vec::new();

		for condition in &monitor.match_conditions.events {
			let wanted = signature_name(&condition.signature);
			let hit = events.iter().find_map(|event| {
				if !monitor.watches_address(&event.contract_id) {
					return None;
				}
				let (name_topic, rest) = event.topic_json.split_first()?;
				let name = name_topic.get("symbol").and_then(Value::as_str)?;
				if name != wanted {
					return None;
				}

				// Remaining topics are indexed arguments, the body is the last one
				let mut values: Vec<&Value> = rest.iter().collect();
				values.push(&event.value_json);
				let signature = build_signature(name, &values);
				if !are_same_signature(&signature, &condition.signature) {
					return None;
				}

				let args = spec_entry(monitor, &event.contract_id, &condition.signature, true)
					.map(|entry| named_params(entry, &values, rest.len()));
				if let Some(expression) = &condition.expression {
					if !expression_holds(monitor, expression, args.as_deref()) {
						return None;
					}
				}
				Some(args)
			});

			if let Some(args) = hit {
				found.push((
					condition.clone(),
					MatchParamsMap {
						signature: condition.signature.clone(),
						args,
						hex_signature: None,
					},
				));
			}
		}

		found
	}

	fn find_matching_transactions(
		&self,
		monitor: &Monitor,
		transaction: &StellarTransaction,
	) -> Vec<TransactionCondition> {
		let mut params: Option<Vec<MatchParamEntry>> = None;

		monitor
			.match_conditions
			.transactions
			.iter()
			.filter(|condition| condition.status.accepts(transaction.is_success()))
			.filter(|condition| match &condition.expression {
				None => true,
				Some(expression) => {
					let params = params.get_or_insert_with(|| transaction_params(transaction));
					expression_holds(monitor, expression, Some(params.as_slice()))
				}
			})
			.cloned()
			.collect()
	}
}

/// Spec entry for `signature` on `address`, from the functions or the events list
fn spec_entry<'m>(
	monitor: &'m Monitor,
	address: &str,
	signature: &str,
	event: bool,
) -> Option<&'m StellarSpecEntry> {
	let ContractSpec::Stellar(spec) = monitor.contract_spec_for(address)? else {
		return None;
	};
	let entries = if event { &spec.events } else { &spec.functions };
	entries
		.iter()
		.find(|entry| are_same_signature(&entry.signature(), signature))
}

/// Pairs values with spec input names. The first `indexed` values are marked indexed.
fn named_params(entry: &StellarSpecEntry, values: &[&Value], indexed: usize) -> Vec<MatchParamEntry> {
	entry
		.inputs
		.iter()
		.zip(values.iter())
		.enumerate()
		.map(|(position, (input, value))| sc_val_param(&input.name, value, position < indexed))
		.collect()
}

fn expression_holds(monitor: &Monitor, expression: &str, args: Option<&[MatchParamEntry]>) -> bool {
	let Some(args) = args else {
		tracing::warn!(
			monitor = %monitor.name,
			expression,
			"No contract spec to name arguments; treating condition as not matched"
		);
		return false;
	};

	match parse(expression).and_then(|parsed| evaluate(&parsed, &StellarArgsEvaluator::new(args))) {
		Ok(holds) => holds,
		Err(e) => {
			tracing::warn!(
				monitor = %monitor.name,
				expression,
				error = %e,
				"Expression could not be evaluated; treating condition as not matched"
			);
			false
		}
	}
}
