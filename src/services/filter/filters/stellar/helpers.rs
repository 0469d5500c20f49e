//! Helper functions for Stellar-specific operations.
//!
//! Ledger data arrives with XDR already rendered as JSON (`xdrFormat: "json"`), so an
//! ScVal is an externally tagged object such as `{"i128": "1000"}` or
//! `{"address": "GABC..."}`. These helpers turn such values into the kinds and strings
//! expressions compare against.

use alloy::primitives::{I256, U256};
use serde_json::{Map, Value};

use crate::models::{MatchParamEntry, StellarTransaction};

/// Transaction fields available to transaction expressions
pub const TRANSACTION_FIELDS: &[&str] = &[
	"hash",
	"ledger",
	"application_order",
	"fee_bump",
	"source_account",
];

pub fn normalize_signature(signature: &str) -> String {
	signature
		.chars()
		.filter(|c| !c.is_whitespace())
		.collect::<String>()
		.to_lowercase()
}

/// Compares signatures ignoring whitespace and the case of kind names
pub fn are_same_signature(signature1: &str, signature2: &str) -> bool {
	normalize_signature(signature1) == normalize_signature(signature2)
}

pub fn are_same_address(address1: &str, address2: &str) -> bool {
	address1.trim().eq_ignore_ascii_case(address2.trim())
}

/// Name part of `name(Kind,...)`
pub fn signature_name(signature: &str) -> &str {
	signature.split('(').next().unwrap_or_default().trim()
}

/// `name(Kind1,Kind2)` from the kinds of the given values
pub fn build_signature(name: &str, values: &[&Value]) -> String {
	format!(
		"{}({})",
		name,
		values
			.iter()
			.map(|value| sc_val_kind(value))
			.collect::<Vec<_>>()
			.join(",")
	)
}

fn single_entry(value: &Value) -> Option<(&str, &Value)> {
	match value {
		Value::Object(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
		_ => None,
	}
}

/// Kind of an ScVal, named as in contract specs (`Address`, `I128`, `Symbol`, ...)
pub fn sc_val_kind(value: &Value) -> &'static str {
	if value.as_str() == Some("void") || value.is_null() {
		return "Void";
	}
	let Some((tag, _)) = single_entry(value) else {
		return "Unknown";
	};
	match tag {
		"bool" => "Bool",
		"void" => "Void",
		"u32" => "U32",
		"i32" => "I32",
		"u64" => "U64",
		"i64" => "I64",
		"timepoint" => "Timepoint",
		"duration" => "Duration",
		"u128" => "U128",
		"i128" => "I128",
		"u256" => "U256",
		"i256" => "I256",
		"bytes" => "Bytes",
		"string" => "String",
		"symbol" => "Symbol",
		"vec" => "Vec",
		"map" => "Map",
		"address" => "Address",
		"error" => "Error",
		_ => "Unknown",
	}
}

fn as_u64(value: &Value) -> Option<u64> {
	value
		.as_u64()
		.or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn as_i64(value: &Value) -> Option<i64> {
	value
		.as_i64()
		.or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Renders a 128 or 256 bit integer given either as a decimal string or as its parts
fn wide_integer(tag: &str, inner: &Value) -> Option<String> {
	match inner {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Object(parts) => match tag {
			"u128" => {
				let hi = as_u64(parts.get("hi")?)?;
				let lo = as_u64(parts.get("lo")?)?;
				Some(((u128::from(hi) << 64) | u128::from(lo)).to_string())
			}
			"i128" => {
				let hi = as_i64(parts.get("hi")?)?;
				let lo = as_u64(parts.get("lo")?)?;
				Some(((i128::from(hi) << 64) | i128::from(lo)).to_string())
			}
			"u256" | "i256" => {
				let hi_hi = parts.get("hi_hi")?;
				let limbs = [
					as_u64(parts.get("lo_lo")?)?,
					as_u64(parts.get("lo_hi")?)?,
					as_u64(parts.get("hi_lo")?)?,
					as_u64(hi_hi).or_else(|| as_i64(hi_hi).map(|v| v as u64))?,
				];
				let raw = U256::from_limbs(limbs);
				Some(if tag == "u256" {
					raw.to_string()
				} else {
					I256::from_raw(raw).to_string()
				})
			}
			_ => None,
		},
		_ => None,
	}
}

/// Plain JSON form of an ScVal: integers as decimal strings, vectors as arrays and maps
/// as objects keyed by the rendered key
pub fn sc_val_to_json(value: &Value) -> Value {
	let Some((tag, inner)) = single_entry(value) else {
		return match value {
			Value::String(s) if s == "void" => Value::Null,
			other => other.clone(),
		};
	};

	match tag {
		"bool" => inner.clone(),
		"u32" | "i32" | "u64" | "i64" | "timepoint" | "duration" => match inner {
			Value::Number(n) => Value::String(n.to_string()),
			other => other.clone(),
		},
		"u128" | "i128" | "u256" | "i256" => wide_integer(tag, inner)
			.map(Value::String)
			.unwrap_or_else(|| inner.clone()),
		"vec" => match inner {
			Value::Array(items) => Value::Array(items.iter().map(sc_val_to_json).collect()),
			_ => Value::Array(vec![]),
		},
		"map" => {
			let mut object = Map::new();
			if let Value::Array(entries) = inner {
				for entry in entries {
					if let (Some(key), Some(val)) = (entry.get("key"), entry.get("val")) {
						object.insert(sc_val_text(key), sc_val_to_json(val));
					}
				}
			}
			Value::Object(object)
		}
		_ => inner.clone(),
	}
}

/// Text an expression compares against
pub fn sc_val_text(value: &Value) -> String {
	match sc_val_to_json(value) {
		Value::String(s) => s,
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

/// Decoded parameter for an ScVal, named by the caller
pub fn sc_val_param(name: &str, value: &Value, indexed: bool) -> MatchParamEntry {
	MatchParamEntry {
		name: name.to_string(),
		value: sc_val_text(value),
		indexed,
		kind: sc_val_kind(value).to_string(),
	}
}

fn path<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
	keys.iter().try_fold(value, |current, key| current.get(*key))
}

/// Source account of a v1 or fee-bump envelope
pub fn source_account(transaction: &StellarTransaction) -> Option<String> {
	let envelope = transaction.envelope_json.as_ref()?;
	path(envelope, &["tx", "tx", "source_account"])
		.or_else(|| {
			path(
				envelope,
				&["tx_fee_bump", "tx", "inner_tx", "tx", "tx", "source_account"],
			)
		})
		.and_then(Value::as_str)
		.map(str::to_string)
}

/// Transaction fields as parameters, in the order of [`TRANSACTION_FIELDS`]
pub fn transaction_params(transaction: &StellarTransaction) -> Vec<MatchParamEntry> {
	let param = |name: &str, value: String, kind: &str| MatchParamEntry {
		name: name.to_string(),
		value,
		indexed: false,
		kind: kind.to_string(),
	};

	vec![
		param("hash", transaction.hash().to_string(), "String"),
		param("ledger", transaction.ledger.to_string(), "U64"),
		param(
			"application_order",
			transaction.application_order.to_string(),
			"I32",
		),
		param("fee_bump", transaction.fee_bump.to_string(), "Bool"),
		param(
			"source_account",
			source_account(transaction).unwrap_or_default(),
			"Address",
		),
	]
}
