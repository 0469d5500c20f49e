//! Helper functions for EVM-specific operations.
//!
//! Hash and address rendering, signature normalization, selector computation and
//! formatting of ABI-decoded values into the strings expressions compare against.

use alloy::{
	core::dyn_abi::DynSolValue,
	primitives::{keccak256, Address, B256},
};
use serde_json::Value;

use crate::models::{EVMTransaction, EVMTransactionReceipt, MatchParamEntry};

/// Transaction fields available to transaction expressions
pub const TRANSACTION_FIELDS: &[&str] = &[
	"value",
	"from",
	"to",
	"hash",
	"gas_price",
	"gas_limit",
	"nonce",
	"input",
	"gas_used",
	"transaction_index",
];

/// `0x`-prefixed lowercase hex of a 32-byte hash
pub fn b256_to_string(hash: &B256) -> String {
	format!("0x{}", hex::encode(hash.as_slice()))
}

/// `0x`-prefixed lowercase hex of an address
pub fn address_to_string(address: &Address) -> String {
	format!("0x{}", hex::encode(address.as_slice()))
}

/// Compares two addresses, ignoring case and the `0x` prefix
pub fn are_same_address(address1: &str, address2: &str) -> bool {
	normalize_address(address1) == normalize_address(address2)
}

pub fn normalize_address(address: &str) -> String {
	address
		.trim()
		.trim_start_matches("0x")
		.trim_start_matches("0X")
		.to_lowercase()
}

/// Removes whitespace so `transfer(address, uint256)` reads as `transfer(address,uint256)`
pub fn normalize_signature(signature: &str) -> String {
	signature.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn are_same_signature(signature1: &str, signature2: &str) -> bool {
	normalize_signature(signature1) == normalize_signature(signature2)
}

/// First four bytes of the keccak hash of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(normalize_signature(signature).as_bytes());
	[hash[0], hash[1], hash[2], hash[3]]
}

/// Keccak hash of an event signature, the first topic of its logs
pub fn event_topic(signature: &str) -> B256 {
	keccak256(normalize_signature(signature).as_bytes())
}

/// Renders a decoded value.
///
/// Numbers are rendered in decimal and byte strings as `0x` hex. Arrays and tuples become
/// JSON arrays whose scalar elements are strings, so accessors and `contains` can reach
/// into them.
pub fn format_token_value(value: &DynSolValue) -> String {
	match value {
		DynSolValue::Array(_) | DynSolValue::FixedArray(_) | DynSolValue::Tuple(_) => {
			token_to_json(value).to_string()
		}
		other => format_scalar(other),
	}
}

fn format_scalar(value: &DynSolValue) -> String {
	match value {
		DynSolValue::Bool(b) => b.to_string(),
		DynSolValue::Int(i, _) => i.to_string(),
		DynSolValue::Uint(u, _) => u.to_string(),
		DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
		DynSolValue::Address(address) => address_to_string(address),
		DynSolValue::Function(function) => format!("0x{}", hex::encode(function.as_slice())),
		DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
		DynSolValue::String(s) => s.clone(),
		#[allow(unreachable_patterns)]
		other => format!("{:?}", other),
	}
}

fn token_to_json(value: &DynSolValue) -> Value {
	match value {
		DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
			Value::Array(items.iter().map(token_to_json).collect())
		}
		other => Value::String(format_scalar(other)),
	}
}

fn param(name: &str, value: String, kind: &str) -> MatchParamEntry {
	MatchParamEntry {
		name: name.to_string(),
		value,
		indexed: false,
		kind: kind.to_string(),
	}
}

/// Transaction fields as parameters, in the order of [`TRANSACTION_FIELDS`]
pub fn transaction_params(
	transaction: &EVMTransaction,
	receipt: Option<&EVMTransactionReceipt>,
) -> Vec<MatchParamEntry> {
	vec![
		param("value", transaction.value.to_string(), "uint256"),
		param("from", address_to_string(&transaction.from), "address"),
		param(
			"to",
			transaction
				.to
				.as_ref()
				.map(address_to_string)
				.unwrap_or_default(),
			"address",
		),
		param("hash", b256_to_string(&transaction.hash), "string"),
		param(
			"gas_price",
			transaction.gas_price.unwrap_or_default().to_string(),
			"uint256",
		),
		param("gas_limit", transaction.gas.to_string(), "uint256"),
		param("nonce", transaction.nonce.to_string(), "uint256"),
		param(
			"input",
			format!("0x{}", hex::encode(&transaction.input)),
			"bytes",
		),
		param(
			"gas_used",
			receipt
				.and_then(|r| r.gas_used)
				.unwrap_or_default()
				.to_string(),
			"uint256",
		),
		param(
			"transaction_index",
			transaction
				.transaction_index
				.map(|i| i.to_string())
				.unwrap_or_else(|| "0".to_string()),
			"uint64",
		),
	]
}
