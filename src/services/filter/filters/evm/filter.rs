//! EVM block filter.
//!
//! Matches the transactions of one block against a monitor: function calls by selector,
//! events by first topic and plain transactions by status. Arguments are decoded with the
//! ABI attached to the monitored address when there is one.

use alloy::{
	core::dyn_abi::{DynSolValue, EventExt, JsonAbiExt},
	core::json_abi::{Event, Function, JsonAbi},
	primitives::LogData,
};
use tracing::instrument;

use crate::{
	models::{
		ContractSpec, EVMBlock, EVMMonitorMatch, EVMReceiptLog, EVMTransaction,
		EVMTransactionReceipt, EventCondition, FunctionCondition, MatchParamEntry,
		MatchParamsMap, Monitor, MonitorMatch, Network, TransactionCondition,
	},
	services::filter::{
		expression::{evaluate, parse},
		filters::{
			evm::{
				evaluator::EVMArgsEvaluator,
				helpers::{
					address_to_string, are_same_signature, b256_to_string, event_topic,
					format_token_value, function_selector, transaction_params,
				},
			},
			TransactionHits,
		},
	},
};

/// Stateless filter for EVM blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct EVMBlockFilter;

impl EVMBlockFilter {
	/// Matches of `monitor` in `block`, at most one per transaction.
	///
	/// Only transactions touching a monitored address are considered. Function, event and
	/// transaction conditions are checked in that order, each in declared order, and
	/// everything a transaction satisfied is reported together in its match.
	#[instrument(skip_all, fields(monitor = %monitor.name, block = ?block.number()))]
	pub fn filter_block(
		&self,
		network: &Network,
		monitor: &Monitor,
		block: &EVMBlock,
	) -> Vec<MonitorMatch> {
		let mut matches = Vec::new();

		for transaction in &block.transactions {
			let receipt = block.receipt_for(&transaction.hash);
			if !self.is_involved(monitor, transaction, receipt) {
				continue;
			}

			let hits = TransactionHits {
				functions: self.find_matching_functions(monitor, transaction),
				events: receipt
					.map(|receipt| self.find_matching_events(monitor, receipt))
					.unwrap_or_default(),
				transactions: self.find_matching_transactions(monitor, transaction, receipt),
			};

			if let Some((matched_on, matched_on_args)) = hits.combine(&monitor.match_conditions) {
				matches.push(MonitorMatch::EVM(Box::new(EVMMonitorMatch {
					monitor: monitor.clone(),
					transaction: transaction.clone(),
					receipt: receipt.cloned(),
					network_slug: network.slug.clone(),
					matched_on,
					matched_on_args,
				})));
			}
		}

		matches
	}

	/// Whether the transaction touches a monitored address as sender, recipient, created
	/// contract or log emitter. A monitor without addresses is never involved.
	fn is_involved(
		&self,
		monitor: &Monitor,
		transaction: &EVMTransaction,
		receipt: Option<&EVMTransactionReceipt>,
	) -> bool {
		if monitor.watches_address(&address_to_string(&transaction.from)) {
			return true;
		}
		if let Some(to) = &transaction.to {
			if monitor.watches_address(&address_to_string(to)) {
				return true;
			}
		}
		receipt.is_some_and(|receipt| {
			receipt
				.contract_address
				.is_some_and(|a| monitor.watches_address(&address_to_string(&a)))
				|| receipt
					.logs
					.iter()
					.any(|log| monitor.watches_address(&address_to_string(&log.address)))
		})
	}

	fn find_matching_functions(
		&self,
		monitor: &Monitor,
		transaction: &EVMTransaction,
	) -> Vec<(FunctionCondition, MatchParamsMap)> {
		let mut found = Vec::new();
		let (Some(to), Some(selector)) = (&transaction.to, transaction.selector()) else {
			return found;
		};
		let to = address_to_string(to);
		if !monitor.watches_address(&to) {
			return found;
		}

		for condition in &monitor.match_conditions.functions {
			let spec_function = abi_function(monitor, &to, &condition.signature);
			let expected: [u8; 4] = spec_function
				.map(|f| f.selector().0)
				.unwrap_or_else(|| function_selector(&condition.signature));
			if selector != expected.as_slice() {
				continue;
			}

			let args = spec_function.and_then(|f| decode_function_args(f, &transaction.input));
			if let Some(expression) = &condition.expression {
				if !expression_holds(monitor, expression, args.as_deref()) {
					continue;
				}
			}

			found.push((
				condition.clone(),
				MatchParamsMap {
					signature: condition.signature.clone(),
					args,
					hex_signature: Some(format!("0x{}", hex::encode(expected))),
				},
			));
		}

		found
	}

	fn find_matching_events(
		&self,
		monitor: &Monitor,
		receipt: &EVMTransactionReceipt,
	) -> Vec<(EventCondition, MatchParamsMap)> {
		let mut found = Vec::new();

		for condition in &monitor.match_conditions.events {
			let topic = event_topic(&condition.signature);

			// The first log satisfying the condition wins
			let hit = receipt.logs.iter().find_map(|log| {
				let address = address_to_string(&log.address);
				if !monitor.watches_address(&address) || log.topics.first() != Some(&topic) {
					return None;
				}

				let args = abi_event(monitor, &address, &condition.signature)
					.and_then(|event| decode_event_args(event, log));
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
						hex_signature: Some(b256_to_string(&topic)),
					},
				));
			}
		}

		found
	}

	fn find_matching_transactions(
		&self,
		monitor: &Monitor,
		transaction: &EVMTransaction,
		receipt: Option<&EVMTransactionReceipt>,
	) -> Vec<TransactionCondition> {
		let succeeded = receipt.map(|r| r.is_success()).unwrap_or(true);
		let mut params: Option<Vec<MatchParamEntry>> = None;

		monitor
			.match_conditions
			.transactions
			.iter()
			.filter(|condition| condition.status.accepts(succeeded))
			.filter(|condition| match &condition.expression {
				None => true,
				Some(expression) => {
					let params =
						params.get_or_insert_with(|| transaction_params(transaction, receipt));
					expression_holds(monitor, expression, Some(params.as_slice()))
				}
			})
			.cloned()
			.collect()
	}
}

fn evm_spec<'m>(monitor: &'m Monitor, address: &str) -> Option<&'m JsonAbi> {
	match monitor.contract_spec_for(address)? {
		ContractSpec::EVM(spec) => Some(spec.abi()),
		_ => None,
	}
}

fn abi_function<'m>(monitor: &'m Monitor, address: &str, signature: &str) -> Option<&'m Function> {
	evm_spec(monitor, address)?
		.functions()
		.find(|f| are_same_signature(&f.signature(), signature))
}

fn abi_event<'m>(monitor: &'m Monitor, address: &str, signature: &str) -> Option<&'m Event> {
	evm_spec(monitor, address)?
		.events()
		.find(|e| are_same_signature(&e.signature(), signature))
}

fn decode_function_args(function: &Function, input: &[u8]) -> Option<Vec<MatchParamEntry>> {
	let values = match function.abi_decode_input(input.get(4..)?) {
		Ok(values) => values,
		Err(e) => {
			tracing::warn!(
				function = %function.signature(),
				error = %e,
				"Failed to decode function input"
			);
			return None;
		}
	};

	Some(
		function
			.inputs
			.iter()
			.zip(values.iter())
			.map(|(param, value)| MatchParamEntry {
				name: param.name.clone(),
				value: format_token_value(value),
				indexed: false,
				kind: param.selector_type().into_owned(),
			})
			.collect(),
	)
}

fn decode_event_args(event: &Event, log: &EVMReceiptLog) -> Option<Vec<MatchParamEntry>> {
	let data = LogData::new(log.topics.clone(), log.data.clone())?;
	let decoded = match event.decode_log(&data) {
		Ok(decoded) => decoded,
		Err(e) => {
			tracing::warn!(
				event = %event.signature(),
				error = %e,
				"Failed to decode event log"
			);
			return None;
		}
	};

	let mut indexed = decoded.indexed.iter();
	let mut body = decoded.body.iter();
	event
		.inputs
		.iter()
		.map(|param| {
			let value: &DynSolValue = if param.indexed {
				indexed.next()?
			} else {
				body.next()?
			};
			Some(MatchParamEntry {
				name: param.name.clone(),
				value: format_token_value(value),
				indexed: param.indexed,
				kind: param.selector_type().into_owned(),
			})
		})
		.collect()
}

/// Evaluates an expression; one that cannot be evaluated counts as not matched
fn expression_holds(monitor: &Monitor, expression: &str, args: Option<&[MatchParamEntry]>) -> bool {
	let Some(args) = args else {
		tracing::warn!(
			monitor = %monitor.name,
			expression,
			"No decoded arguments for expression; treating condition as not matched"
		);
		return false;
	};

	let result = parse(expression).and_then(|parsed| evaluate(&parsed, &EVMArgsEvaluator::new(args)));
	match result {
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
