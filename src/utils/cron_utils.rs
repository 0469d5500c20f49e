//! Utility functions for working with cron schedules and time intervals

use chrono::Utc;
use cron::Schedule;

/// Calculates the time between two consecutive occurrences of a cron schedule.
///
/// # Arguments
/// * `cron_schedule` - A cron expression with a seconds field (e.g. "0 */1 * * * *")
///
/// # Returns
/// * `Some(i64)` - Milliseconds between consecutive runs
/// * `None` - If the expression is invalid or does not fire twice
pub fn get_cron_interval_ms(cron_schedule: &str) -> Option<i64> {
	let schedule = cron_schedule.parse::<Schedule>().ok()?;

	let now = Utc::now();
	let mut occurrences = schedule.after(&now).take(2);

	match (occurrences.next(), occurrences.next()) {
		(Some(first), Some(second)) => Some((second - first).num_milliseconds()),
		_ => None,
	}
}

/// Look-back window used when a network does not configure `max_past_blocks`.
///
/// `ceil(poll_interval / block_time) + confirmation_blocks + 1`, where the poll interval is
/// derived from the cron schedule. An unparseable schedule contributes no blocks.
pub fn default_max_past_blocks(
	cron_schedule: &str,
	block_time_ms: u64,
	confirmation_blocks: u64,
) -> u64 {
	let interval_ms = get_cron_interval_ms(cron_schedule)
		.filter(|ms| *ms > 0)
		.map(|ms| ms as u64)
		.unwrap_or(0);

	let blocks_per_poll = if block_time_ms == 0 {
		0
	} else {
		interval_ms.div_ceil(block_time_ms)
	};

	blocks_per_poll
		.saturating_add(confirmation_blocks)
		.saturating_add(1)
}
