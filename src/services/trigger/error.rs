//! Trigger error types and handling.
//!
//! Provides error types for trigger-related operations,
//! including execution failures and configuration issues.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Represents possible errors during trigger operations
#[derive(ThisError, Debug)]
pub enum TriggerError {
	/// A monitor references a trigger that is not loaded
	#[error("Trigger not found: {0}")]
	NotFound(ErrorContext),

	/// The channel or script failed to deliver
	#[error("Trigger execution error: {0}")]
	ExecutionError(ErrorContext),

	/// The trigger cannot be turned into a notifier
	#[error("Trigger configuration error: {0}")]
	ConfigurationError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl TriggerError {
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

	pub fn configuration_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConfigurationError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for TriggerError {
	fn trace_id(&self) -> String {
		match self {
			Self::NotFound(ctx) | Self::ExecutionError(ctx) | Self::ConfigurationError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_trigger_error_display() {
		let error = TriggerError::not_found("pager", None, None);
		assert_eq!(error.to_string(), "Trigger not found: pager");

		let error = TriggerError::configuration_error("bad method", None, None);
		assert_eq!(error.to_string(), "Trigger configuration error: bad method");
	}

	#[test]
	fn test_metadata_is_rendered() {
		let error = TriggerError::execution_error(
			"webhook failed",
			None,
			Some(HashMap::from([("trigger".to_string(), "pager".to_string())])),
		);
		assert_eq!(
			error.to_string(),
			"Trigger execution error: webhook failed [trigger=pager]"
		);
	}
}
