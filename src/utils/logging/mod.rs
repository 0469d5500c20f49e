//! Logging setup driven by environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: fallback filter when RUST_LOG is unset; default is "info"
//! - LOG_DATA_DIR: directory for log files; default is "logs/"

pub mod error;

use std::{env, fs::create_dir_all};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Boxed error returned by the logging setup functions
pub type LoggingError = Box<dyn std::error::Error + Send + Sync + 'static>;

const LOG_FILE_PREFIX: &str = "monitor.log";

fn env_filter() -> EnvFilter {
	let fallback = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn create_log_format(with_ansi: bool) -> fmt::format::Format<fmt::format::Compact> {
	fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(with_ansi)
		.compact()
}

/// Sets up logging according to `LOG_MODE`.
///
/// In file mode logs roll daily under `LOG_DATA_DIR`. The returned guard flushes the
/// background writer when dropped, so the caller must hold it for the process lifetime.
pub fn setup_logging() -> Result<Option<WorkerGuard>, LoggingError> {
	let mode = env::var("LOG_MODE").unwrap_or_else(|_| "stdout".to_string());

	if mode.eq_ignore_ascii_case("file") {
		let log_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs/".to_string());
		create_dir_all(&log_dir)?;

		let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
		let (writer, guard) = tracing_appender::non_blocking(appender);

		tracing_subscriber::registry()
			.with(env_filter())
			.with(
				fmt::layer()
					.with_writer(writer)
					.event_format(create_log_format(false)),
			)
			.try_init()?;

		tracing::info!(log_dir = %log_dir, "Logging to file");
		return Ok(Some(guard));
	}

	setup_logging_with_writer(std::io::stdout)?;
	Ok(None)
}

/// Sets up logging with a custom writer
pub fn setup_logging_with_writer<W>(writer: W) -> Result<(), LoggingError>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(env_filter())
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(create_log_format(true))
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
