//! Script error types and handling.
//!
//! Provides error types for running filter and notification scripts.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Represents possible errors during script operations
#[derive(ThisError, Debug)]
pub enum ScriptError {
	/// A referenced script was never loaded
	#[error("Script not found: {0}")]
	NotFound(ErrorContext),

	/// The script ran and exited with a non-zero status
	#[error("Script execution error: {0}")]
	ExecutionError(ErrorContext),

	/// The script output did not follow the protocol
	#[error("Script parse error: {0}")]
	ParseError(ErrorContext),

	/// The script did not finish within its timeout
	#[error("Script timeout: {0}")]
	Timeout(ErrorContext),

	/// Spawning the process or talking to its pipes failed
	#[error("System error: {0}")]
	SystemError(ErrorContext),
}

impl ScriptError {
	pub fn not_found(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NotFound(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn execution_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ExecutionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn parse_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ParseError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn timeout(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Timeout(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn system_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SystemError(ErrorContext::new_with_log(msg, source, metadata))
	}

	fn context(&self) -> &ErrorContext {
		match self {
			Self::NotFound(ctx)
			| Self::ExecutionError(ctx)
			| Self::ParseError(ctx)
			| Self::Timeout(ctx)
			| Self::SystemError(ctx) => ctx,
		}
	}

	/// Standard error captured from the failed process, if any
	pub fn stderr(&self) -> Option<&str> {
		self.context()
			.metadata
			.as_ref()
			.and_then(|m| m.get("stderr"))
			.map(String::as_str)
	}
}

impl TraceableError for ScriptError {
	fn trace_id(&self) -> String {
		self.context().trace_id.clone()
	}
}
