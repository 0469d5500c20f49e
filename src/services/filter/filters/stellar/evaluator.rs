//! Parameter lookup and type mapping for Stellar expressions.

use crate::{
	models::MatchParamEntry,
	services::filter::expression::{ConditionEvaluator, EvaluationError, ValueKind},
};

/// Resolves expression variables against decoded ScVal arguments
pub struct StellarArgsEvaluator<'a> {
	args: &'a [MatchParamEntry],
}

impl<'a> StellarArgsEvaluator<'a> {
	pub fn new(args: &'a [MatchParamEntry]) -> Self {
		Self { args }
	}
}

/// Maps an ScVal kind onto a comparison category. Kind names are case-insensitive.
pub fn stellar_value_kind(kind: &str) -> ValueKind {
	match kind.trim().to_ascii_lowercase().as_str() {
		"address" => ValueKind::Address,
		"bool" => ValueKind::Bool,
		"string" | "symbol" => ValueKind::String,
		"u32" | "i32" | "u64" | "i64" | "u128" | "i128" | "u256" | "i256" | "timepoint"
		| "duration" => ValueKind::Integer,
		"bytes" => ValueKind::Hex,
		k if k.starts_with("bytesn") => ValueKind::Hex,
		"vec" => ValueKind::Array,
		"map" => ValueKind::Map,
		_ => ValueKind::Unknown,
	}
}

impl ConditionEvaluator for StellarArgsEvaluator<'_> {
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
		stellar_value_kind(kind)
	}
}
