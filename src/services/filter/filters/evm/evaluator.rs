//! Parameter lookup and type mapping for EVM expressions.

use crate::{
	models::MatchParamEntry,
	services::filter::expression::{ConditionEvaluator, EvaluationError, ValueKind},
};

/// Resolves expression variables against decoded ABI arguments
pub struct EVMArgsEvaluator<'a> {
	args: &'a [MatchParamEntry],
}

impl<'a> EVMArgsEvaluator<'a> {
	pub fn new(args: &'a [MatchParamEntry]) -> Self {
		Self { args }
	}
}

/// Maps a Solidity type onto a comparison category
pub fn evm_value_kind(kind: &str) -> ValueKind {
	let kind = kind.trim();
	if kind.ends_with(']') || kind.starts_with('(') || kind.starts_with("tuple") {
		return ValueKind::Array;
	}
	match kind {
		"address" => ValueKind::Address,
		"bool" => ValueKind::Bool,
		"string" => ValueKind::String,
		k if k.starts_with("uint") || k.starts_with("int") => ValueKind::Integer,
		k if k.starts_with("ufixed") || k.starts_with("fixed") => ValueKind::Decimal,
		k if k.starts_with("bytes") => ValueKind::Hex,
		_ => ValueKind::Unknown,
	}
}

impl ConditionEvaluator for EVMArgsEvaluator<'_> {
	fn get_base_param(&self, name: &str) -> Result<(&str, &str), EvaluationError> {
		self.args
			.iter()
			.find(|entry| entry.name == name)
			.map(|entry| (entry.value.as_str(), entry.kind.as_str()))
			.ok_or_else(|| {
				EvaluationError::variable_not_found(
					format!("Parameter '{}' not found in decoded arguments", name),
					None,
					None,
				)
			})
	}

	fn value_kind(&self, kind: &str) -> ValueKind {
		evm_value_kind(kind)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::services::filter::expression::{evaluate, parse};

	fn entry(name: &str, value: &str, kind: &str) -> MatchParamEntry {
		MatchParamEntry {
			name: name.to_string(),
			value: value.to_string(),
			indexed: false,
			kind: kind.to_string(),
		}
	}

	#[test]
	fn test_value_kinds() {
		assert_eq!(evm_value_kind("uint256"), ValueKind::Integer);
		assert_eq!(evm_value_kind("int8"), ValueKind::Integer);
		assert_eq!(evm_value_kind("fixed128x18"), ValueKind::Decimal);
		assert_eq!(evm_value_kind("bytes32"), ValueKind::Hex);
		assert_eq!(evm_value_kind("address[]"), ValueKind::Array);
		assert_eq!(evm_value_kind("tuple"), ValueKind::Array);
		assert_eq!(evm_value_kind("function"), ValueKind::Unknown);
	}

	#[test]
	fn test_evaluates_transfer_arguments() {
		let args = vec![
			entry("to", "0x70bf6634ee8cb27d04478f184b9b8bb13e5f4710", "address"),
			entry("value", "2500000000", "uint256"),
		];
		let evaluator = EVMArgsEvaluator::new(&args);

		let expression = parse("value > 1000000000 AND to == 0x70BF6634EE8CB27D04478F184B9B8BB13E5F4710").unwrap();
		assert!(evaluate(&expression, &evaluator).unwrap());

		let expression = parse("amount > 5").unwrap();
		assert!(matches!(
			evaluate(&expression, &evaluator),
			Err(EvaluationError::VariableNotFound(_))
		));
	}
}
