//! Evaluation of parsed expressions against decoded arguments.

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;
use serde_json::Value;

use super::{
	ast::{Accessor, ComparisonOperator, Condition, Expression, LiteralValue, LogicalOperator},
	error::EvaluationError,
};

/// Comparison category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	Integer,
	Decimal,
	Address,
	Hex,
	Bool,
	String,
	Array,
	Map,
	/// Declared type the network does not know; compared as text
	Unknown,
}

impl ValueKind {
	/// Kind of a value reached through accessors, inferred from its JSON shape
	pub fn of_json(value: &Value) -> Self {
		match value {
			Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
			Value::Number(_) => ValueKind::Decimal,
			Value::String(s) => Self::of_text(s),
			Value::Bool(_) => ValueKind::Bool,
			Value::Array(_) => ValueKind::Array,
			Value::Object(_) => ValueKind::Map,
			Value::Null => ValueKind::String,
		}
	}

	fn of_text(text: &str) -> Self {
		let digits = text.strip_prefix('-').unwrap_or(text);
		if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
			return ValueKind::Integer;
		}
		match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
			Some(hex) if hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
				ValueKind::Address
			}
			Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => ValueKind::Hex,
			_ => ValueKind::String,
		}
	}
}

/// Resolves parameters for one candidate (a call, an event or a transaction)
pub trait ConditionEvaluator {
	/// Value (as rendered text) and declared type of a named parameter
	fn get_base_param(&self, name: &str) -> Result<(&str, &str), EvaluationError>;

	/// Comparison category of a declared type
	fn value_kind(&self, kind: &str) -> ValueKind;
}

/// Evaluates an expression. `AND` and `OR` short-circuit left to right.
pub fn evaluate<E: ConditionEvaluator + ?Sized>(
	expression: &Expression<'_>,
	evaluator: &E,
) -> Result<bool, EvaluationError> {
	match expression {
		Expression::Condition(condition) => evaluate_condition(condition, evaluator),
		Expression::Logical {
			left,
			operator,
			right,
		} => {
			let left = evaluate(left, evaluator)?;
			match (operator, left) {
				(LogicalOperator::And, false) => Ok(false),
				(LogicalOperator::Or, true) => Ok(true),
				_ => evaluate(right, evaluator),
			}
		}
	}
}

fn evaluate_condition<E: ConditionEvaluator + ?Sized>(
	condition: &Condition<'_>,
	evaluator: &E,
) -> Result<bool, EvaluationError> {
	let (value, kind) = evaluator.get_base_param(condition.left.base)?;

	if condition.left.accessors.is_empty() {
		return compare_values(
			evaluator.value_kind(kind),
			value,
			condition.operator,
			&condition.right,
		);
	}

	let root: Value = serde_json::from_str(value).map_err(|e| {
		EvaluationError::type_mismatch(
			format!(
				"Parameter '{}' of type {} is not structured and has no fields",
				condition.left.base, kind
			),
			Some(Box::new(e)),
			None,
		)
	})?;

	let mut current = &root;
	for accessor in &condition.left.accessors {
		current = step(current, accessor, &condition.left.to_string())?;
	}

	let text = match current {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	};
	compare_values(
		ValueKind::of_json(current),
		&text,
		condition.operator,
		&condition.right,
	)
}

fn step<'v>(
	value: &'v Value,
	accessor: &Accessor<'_>,
	path: &str,
) -> Result<&'v Value, EvaluationError> {
	let metadata = Some(HashMap::from([("path".to_string(), path.to_string())]));
	match (accessor, value) {
		(Accessor::Index(i), Value::Array(items)) => items.get(*i).ok_or_else(|| {
			EvaluationError::index_out_of_bounds(
				format!("Index {} out of bounds for {} elements", i, items.len()),
				None,
				metadata,
			)
		}),
		(Accessor::Key(key), Value::Object(map)) => map.get(*key).ok_or_else(|| {
			EvaluationError::field_not_found(format!("No field '{}'", key), None, metadata)
		}),
		(Accessor::Index(i), other) => Err(EvaluationError::type_mismatch(
			format!("Cannot index [{}] into {}", i, json_type_name(other)),
			None,
			metadata,
		)),
		(Accessor::Key(key), other) => Err(EvaluationError::type_mismatch(
			format!("Cannot read field '{}' of {}", key, json_type_name(other)),
			None,
			metadata,
		)),
	}
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "a map",
	}
}

fn unsupported(kind: ValueKind, operator: ComparisonOperator) -> EvaluationError {
	EvaluationError::unsupported_operator(
		format!("Operator '{}' is not supported for {:?} values", operator, kind),
		None,
		None,
	)
}

fn mismatch(kind: ValueKind, text: &str) -> EvaluationError {
	EvaluationError::type_mismatch(
		format!("Cannot compare {:?} value with '{}'", kind, text),
		None,
		None,
	)
}

fn apply_ordering(ordering: Ordering, operator: ComparisonOperator) -> Option<bool> {
	match operator {
		ComparisonOperator::Eq => Some(ordering == Ordering::Equal),
		ComparisonOperator::Ne => Some(ordering != Ordering::Equal),
		ComparisonOperator::Gt => Some(ordering == Ordering::Greater),
		ComparisonOperator::Gte => Some(ordering != Ordering::Less),
		ComparisonOperator::Lt => Some(ordering == Ordering::Less),
		ComparisonOperator::Lte => Some(ordering != Ordering::Greater),
		_ => None,
	}
}

fn compare_text(left: &str, operator: ComparisonOperator, right: &str) -> Option<bool> {
	let left = left.to_lowercase();
	let right = right.to_lowercase();
	match operator {
		ComparisonOperator::Eq => Some(left == right),
		ComparisonOperator::Ne => Some(left != right),
		ComparisonOperator::Contains => Some(left.contains(&right)),
		ComparisonOperator::StartsWith => Some(left.starts_with(&right)),
		ComparisonOperator::EndsWith => Some(left.ends_with(&right)),
		_ => None,
	}
}

fn parse_signed(text: &str) -> Option<I256> {
	let text = text.trim();
	if let Some(hex) = text.strip_prefix("0x") {
		return I256::from_hex_str(hex).ok();
	}
	I256::from_dec_str(text).ok()
}

fn parse_unsigned(text: &str) -> Option<U256> {
	let text = text.trim();
	if let Some(hex) = text.strip_prefix("0x") {
		return U256::from_str_radix(hex, 16).ok();
	}
	U256::from_str_radix(text, 10).ok()
}

fn compare_integers(
	left: &str,
	operator: ComparisonOperator,
	right: &str,
) -> Result<bool, EvaluationError> {
	let ordering = match (parse_signed(left), parse_signed(right)) {
		(Some(l), Some(r)) => l.cmp(&r),
		// Values above I256::MAX still fit an unsigned word and exceed every negative value
		(left_signed, right_signed) => match (parse_unsigned(left), parse_unsigned(right)) {
			(Some(l), Some(r)) => l.cmp(&r),
			(Some(_), None) if right_signed.is_some() => Ordering::Greater,
			(None, Some(_)) if left_signed.is_some() => Ordering::Less,
			(None, _) if left_signed.is_none() => return Err(mismatch(ValueKind::Integer, left)),
			_ => return Err(mismatch(ValueKind::Integer, right)),
		},
	};
	apply_ordering(ordering, operator).ok_or_else(|| unsupported(ValueKind::Integer, operator))
}

fn compare_decimals(
	left: &str,
	operator: ComparisonOperator,
	right: &str,
) -> Result<bool, EvaluationError> {
	let l = Decimal::from_str(left.trim()).map_err(|_| mismatch(ValueKind::Decimal, left))?;
	let r = Decimal::from_str(right.trim()).map_err(|_| mismatch(ValueKind::Decimal, right))?;
	apply_ordering(l.cmp(&r), operator).ok_or_else(|| unsupported(ValueKind::Decimal, operator))
}

fn compare_arrays(
	left: &str,
	operator: ComparisonOperator,
	right: &LiteralValue<'_>,
) -> Result<bool, EvaluationError> {
	let items: Vec<Value> =
		serde_json::from_str(left).map_err(|_| mismatch(ValueKind::Array, left))?;
	match operator {
		ComparisonOperator::Contains => {
			let needle = right.as_text().to_lowercase();
			Ok(items.iter().any(|item| element_text(item).to_lowercase() == needle))
		}
		ComparisonOperator::Eq | ComparisonOperator::Ne => {
			let expected: Value = serde_json::from_str(right.as_text())
				.map_err(|_| mismatch(ValueKind::Array, right.as_text()))?;
			let equal = Value::Array(items) == expected;
			Ok(if operator == ComparisonOperator::Eq {
				equal
			} else {
				!equal
			})
		}
		_ => Err(unsupported(ValueKind::Array, operator)),
	}
}

fn compare_maps(
	left: &str,
	operator: ComparisonOperator,
	right: &LiteralValue<'_>,
) -> Result<bool, EvaluationError> {
	let map: serde_json::Map<String, Value> =
		serde_json::from_str(left).map_err(|_| mismatch(ValueKind::Map, left))?;
	match operator {
		ComparisonOperator::Contains => {
			let needle = right.as_text().to_lowercase();
			Ok(map.iter().any(|(key, value)| {
				key.to_lowercase() == needle || element_text(value).to_lowercase() == needle
			}))
		}
		ComparisonOperator::Eq | ComparisonOperator::Ne => {
			let expected: Value = serde_json::from_str(right.as_text())
				.map_err(|_| mismatch(ValueKind::Map, right.as_text()))?;
			let equal = Value::Object(map) == expected;
			Ok(if operator == ComparisonOperator::Eq {
				equal
			} else {
				!equal
			})
		}
		_ => Err(unsupported(ValueKind::Map, operator)),
	}
}

fn element_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Compares a rendered parameter value against a literal.
///
/// Text comparisons (strings, addresses, hex) ignore case. Integers compare
/// numerically across the full 256-bit range.
pub fn compare_values(
	kind: ValueKind,
	left: &str,
	operator: ComparisonOperator,
	right: &LiteralValue<'_>,
) -> Result<bool, EvaluationError> {
	match kind {
		ValueKind::Integer => {
			if let LiteralValue::Number(n) = right {
				if n.contains('.') {
					return compare_decimals(left, operator, n);
				}
			}
			compare_integers(left, operator, right.as_text())
		}
		ValueKind::Decimal => compare_decimals(left, operator, right.as_text()),
		ValueKind::Address | ValueKind::Hex => compare_text(left, operator, right.as_text())
			.ok_or_else(|| unsupported(kind, operator)),
		ValueKind::Bool => {
			let left = match left.trim().to_lowercase().as_str() {
				"true" => true,
				"false" => false,
				_ => return Err(mismatch(kind, left)),
			};
			let right = match right {
				LiteralValue::Bool(b) => *b,
				other => return Err(mismatch(kind, other.as_text())),
			};
			match operator {
				ComparisonOperator::Eq => Ok(left == right),
				ComparisonOperator::Ne => Ok(left != right),
				_ => Err(unsupported(kind, operator)),
			}
		}
		ValueKind::String | ValueKind::Unknown => compare_text(left, operator, right.as_text())
			.ok_or_else(|| unsupported(kind, operator)),
		ValueKind::Array => compare_arrays(left, operator, right),
		ValueKind::Map => compare_maps(left, operator, right),
	}
}
