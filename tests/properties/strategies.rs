//! Shared proptest strategies.

#![allow(dead_code)]

use proptest::{prelude::*, sample::select};

/// Variable names that cannot collide with operators or keywords
pub fn variable() -> impl Strategy<Value = String> {
	"v_[a-z0-9_]{0,8}"
		.prop_flat_map(|base| {
			prop::collection::vec(
				prop_oneof![
					"[a-z][a-z0-9_]{0,6}".prop_map(|key| format!(".{}", key)),
					(0u8..10).prop_map(|i| format!("[{}]", i)),
				],
				0..3,
			)
			.prop_map(move |accessors| format!("{}{}", base, accessors.concat()))
		})
}

pub fn operator() -> impl Strategy<Value = &'static str> {
	select(vec![
		"==",
		"!=",
		">",
		">=",
		"<",
		"<=",
		"contains",
		"starts_with",
		"ends_with",
	])
}

pub fn literal() -> impl Strategy<Value = String> {
	prop_oneof![
		any::<i64>().prop_map(|n| n.to_string()),
		(0u32..100_000, 0u32..1000).prop_map(|(i, f)| format!("{}.{}", i, f)),
		"[a-zA-Z0-9 _-]{0,12}".prop_map(|s| format!("'{}'", s)),
		"[a-zA-Z0-9 _-]{0,12}".prop_map(|s| format!("\"{}\"", s)),
		Just("true".to_string()),
		Just("false".to_string()),
		"0x[0-9a-fA-F]{1,40}",
	]
}

pub fn condition() -> impl Strategy<Value = String> {
	(variable(), operator(), literal()).prop_map(|(lhs, op, rhs)| format!("{} {} {}", lhs, op, rhs))
}

/// Well-formed expressions of bounded depth
pub fn expression() -> impl Strategy<Value = String> {
	condition().prop_recursive(4, 32, 4, |inner| {
		prop_oneof![
			(inner.clone(), select(vec!["AND", "OR", "&&", "||"]), inner.clone())
				.prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
			inner.prop_map(|e| format!("({})", e)),
		]
	})
}
