#![no_main]

use blockwatch_monitor::services::filter::expression::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	if let Ok(input) = std::str::from_utf8(data) {
		let _ = parse(input);
	}
});
