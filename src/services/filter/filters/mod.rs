//! Block filtering for the supported network kinds, followed by the filter script stage.
//!
//! The chain filters find structural and expression matches. Every candidate is then
//! run through all of the monitor's filter scripts and kept only if each one answers
//! `true`.

pub mod evm;
pub mod stellar;

use std::{collections::HashMap, sync::Arc};

use tracing::instrument;

pub use evm::EVMBlockFilter;
pub use stellar::StellarBlockFilter;

use crate::{
	models::{
		BlockChainType, BlockType, EventCondition, FunctionCondition, MatchArguments,
		MatchConditions, MatchParamsMap, Monitor, MonitorMatch, Network, TransactionCondition,
		TriggerConditions,
	},
	services::filter::error::FilterError,
	utils::script::{ScriptError, ScriptExecutorFactory, ScriptMap},
};

/// Outcome of evaluating one monitor against one block
#[derive(Debug, Default)]
pub struct BlockEvaluation {
	/// Candidates that passed every stage, in evaluation order
	pub matches: Vec<MonitorMatch>,
	/// Filter script failures; the affected candidates were dropped
	pub script_errors: Vec<FilterError>,
}

/// Conditions a single transaction satisfied, before they are combined into one match
#[derive(Debug, Default)]
pub(crate) struct TransactionHits {
	pub functions: Vec<(FunctionCondition, MatchParamsMap)>,
	pub events: Vec<(EventCondition, MatchParamsMap)>,
	pub transactions: Vec<TransactionCondition>,
}

impl TransactionHits {
	/// What the match for this transaction reports, or `None` when it is not a match.
	///
	/// - no declared conditions: every involved transaction matches;
	/// - only transaction conditions: one of them must hit;
	/// - no transaction conditions: a function or event condition must hit;
	/// - otherwise a function or event condition and a transaction condition must both hit.
	pub(crate) fn combine(
		self,
		declared: &MatchConditions,
	) -> Option<(MatchConditions, Option<MatchArguments>)> {
		let has_function = !self.functions.is_empty();
		let has_event = !self.events.is_empty();
		let has_transaction = !self.transactions.is_empty();

		let should_match = match (
			declared.functions.is_empty(),
			declared.events.is_empty(),
			declared.transactions.is_empty(),
		) {
			(true, true, true) => true,
			(true, true, false) => has_transaction,
			(_, _, true) => has_function || has_event,
			_ => (has_function || has_event) && has_transaction,
		};
		if !should_match {
			return None;
		}

		let (functions, function_args): (Vec<_>, Vec<_>) = self.functions.into_iter().unzip();
		let (events, event_args): (Vec<_>, Vec<_>) = self.events.into_iter().unzip();
		let args = (has_function || has_event).then(|| MatchArguments {
			functions: has_function.then_some(function_args),
			events: has_event.then_some(event_args),
		});

		Some((
			MatchConditions {
				functions,
				events,
				transactions: self.transactions,
			},
			args,
		))
	}
}

/// Evaluates monitors against blocks
pub struct FilterService {
	scripts: Arc<ScriptMap>,
}

impl FilterService {
	pub fn new(scripts: Arc<ScriptMap>) -> Self {
		Self { scripts }
	}

	/// Matches of `monitor` in `block`.
	///
	/// Evaluation is pure apart from filter scripts, so evaluating the same pair twice
	/// yields the same matches as long as the scripts are deterministic.
	#[instrument(skip_all, fields(network = %network.slug, monitor = %monitor.name, block = ?block.number()))]
	pub async fn evaluate(
		&self,
		network: &Network,
		monitor: &Monitor,
		block: &BlockType,
	) -> Result<BlockEvaluation, FilterError> {
		let candidates = match (network.network_type, block) {
			(BlockChainType::EVM, BlockType::EVM(block)) => {
				EVMBlockFilter.filter_block(network, monitor, block)
			}
			(BlockChainType::Stellar, BlockType::Stellar(block)) => {
				StellarBlockFilter.filter_block(network, monitor, block)
			}
			(kind, _) => {
				return Err(FilterError::block_type_mismatch(
					format!("Network {} expects {:?} blocks", network.slug, kind),
					None,
					Some(HashMap::from([("network".to_string(), network.slug.clone())])),
				));
			}
		};

		if monitor.trigger_conditions.is_empty() {
			return Ok(BlockEvaluation {
				matches: candidates,
				script_errors: Vec::new(),
			});
		}

		let mut evaluation = BlockEvaluation::default();
		for candidate in candidates {
			if self
				.passes_scripts(monitor, &candidate, block, &mut evaluation.script_errors)
				.await
			{
				evaluation.matches.push(candidate);
			}
		}

		Ok(evaluation)
	}

	/// Runs every filter script against the candidate. All of them run even after one
	/// has rejected it, so each failure is reported.
	async fn passes_scripts(
		&self,
		monitor: &Monitor,
		candidate: &MonitorMatch,
		block: &BlockType,
		errors: &mut Vec<FilterError>,
	) -> bool {
		let mut verdict = true;

		for condition in &monitor.trigger_conditions {
			match self.run_script(condition, candidate).await {
				Ok(true) => {}
				Ok(false) => {
					tracing::debug!(
						monitor = %monitor.name,
						script = %condition.script_path,
						"Filter script rejected match"
					);
					verdict = false;
				}
				Err(e) => {
					let mut metadata = HashMap::from([
						("monitor".to_string(), monitor.name.clone()),
						("network".to_string(), candidate.network_slug().to_string()),
						("script".to_string(), condition.script_path.clone()),
					]);
					if let Some(number) = block.number() {
						metadata.insert("block".to_string(), number.to_string());
					}
					if let Some(stderr) = e.stderr() {
						metadata.insert("stderr".to_string(), stderr.to_string());
					}
					errors.push(FilterError::script_error(
						format!("Filter script {} failed", condition.script_path),
						Some(Box::new(e)),
						Some(metadata),
					));
					verdict = false;
				}
			}
		}

		verdict
	}

	async fn run_script(
		&self,
		condition: &TriggerConditions,
		candidate: &MonitorMatch,
	) -> Result<bool, ScriptError> {
		let (language, content) = self.scripts.get(&condition.script_path).ok_or_else(|| {
			ScriptError::not_found(
				format!("Script {} was not loaded", condition.script_path),
				None,
				None,
			)
		})?;

		let executor = ScriptExecutorFactory::create(language, content);
		executor
			.execute(
				candidate,
				&condition.timeout_ms,
				condition.arguments.as_deref(),
				false,
			)
			.await
	}
}
