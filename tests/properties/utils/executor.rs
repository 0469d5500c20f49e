use std::{
	os::unix::process::ExitStatusExt,
	process::{ExitStatus, Output},
};

use blockwatch_monitor::utils::script::{process_script_output, ScriptError};
use proptest::{prelude::*, test_runner::Config};

fn output(code: i32, stdout: String, stderr: String) -> Output {
	Output {
		status: ExitStatus::from_raw(code << 8),
		stdout: stdout.into_bytes(),
		stderr: stderr.into_bytes(),
	}
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn prop_only_last_line_decides(
		lines in prop::collection::vec("[a-zA-Z0-9 ]{0,40}", 0..10),
		verdict in any::<bool>(),
		trailing in "[ \n]{0,4}",
	) {
		let mut stdout = lines.join("\n");
		stdout.push('\n');
		stdout.push_str(&verdict.to_string());
		stdout.push_str(&trailing);

		let result = process_script_output(output(0, stdout, String::new()), false);
		prop_assert_eq!(result.unwrap(), verdict);
	}

	#[test]
	fn prop_non_boolean_last_line_is_rejected(last in "[a-zA-Z0-9]{1,12}") {
		prop_assume!(last != "true" && last != "false");
		let result = process_script_output(output(0, format!("true\n{}", last), String::new()), false);
		prop_assert!(matches!(result, Err(ScriptError::ParseError(_))));
	}

	#[test]
	fn prop_non_zero_exit_is_an_error(
		code in 1i32..126,
		stdout in "(true|false)?",
		stderr in "[a-z ]{0,30}",
		notification in any::<bool>(),
	) {
		let result = process_script_output(output(code, stdout, stderr.clone()), notification);
		match result {
			Err(error @ ScriptError::ExecutionError(_)) => {
				prop_assert_eq!(error.stderr(), Some(stderr.trim()));
			}
			other => prop_assert!(false, "expected execution error, got {:?}", other),
		}
	}
}
