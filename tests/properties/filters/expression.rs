use blockwatch_monitor::services::filter::expression::parse;
use proptest::{prelude::*, test_runner::Config};

use crate::properties::strategies::expression;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn prop_parser_is_total(input in ".{0,200}") {
		// Any input yields a result, never a panic
		let _ = parse(&input);
	}

	#[test]
	fn prop_parser_is_total_on_near_misses(
		input in "[a-z_. ()\\[\\]0-9'\"=!<>&|]{0,120}",
	) {
		let _ = parse(&input);
	}

	#[test]
	fn prop_well_formed_expressions_parse(input in expression()) {
		prop_assert!(parse(&input).is_ok(), "failed to parse {}", input);
	}

	#[test]
	fn prop_deep_nesting_is_rejected(depth in 65usize..200) {
		let input = format!("{}v_a == 1{}", "(".repeat(depth), ")".repeat(depth));
		prop_assert!(parse(&input).is_err());
	}
}
