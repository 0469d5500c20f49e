//! Notification error types and handling.
//!
//! Provides error types for notification delivery: network failures, bad channel
//! configuration, failing notification scripts and channels nobody registered.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum NotificationError {
	/// Delivery failed on the wire or the receiver answered with an error status
	#[error("Network error: {0}")]
	NetworkError(ErrorContext),

	/// The channel configuration cannot be used
	#[error("Config error: {0}")]
	ConfigError(ErrorContext),

	/// A notification script failed or timed out
	#[error("Execution error: {0}")]
	ExecutionError(ErrorContext),

	/// No notifier is registered for the channel kind
	#[error("Unsupported channel: {0}")]
	UnsupportedChannel(ErrorContext),

	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl NotificationError {
	pub fn network_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NetworkError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn config_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConfigError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn execution_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ExecutionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn unsupported_channel(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnsupportedChannel(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for NotificationError {
	fn trace_id(&self) -> String {
		match self {
			Self::NetworkError(ctx)
			| Self::ConfigError(ctx)
			| Self::ExecutionError(ctx)
			| Self::UnsupportedChannel(ctx)
			| Self::InternalError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
