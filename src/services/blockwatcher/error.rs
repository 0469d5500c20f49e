//! Block watcher error types and handling.
//!
//! Covers scheduling, fetching, checkpoint persistence and cycle processing failures.
//! Every error carries the network (and block range where known) in its metadata.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Represents possible errors during block watching operations
#[derive(ThisError, Debug)]
pub enum BlockWatcherError {
	/// Creating, starting or stopping the cron scheduler failed
	#[error("Scheduler error: {0}")]
	SchedulerError(ErrorContext),

	/// Talking to the network failed; the cycle is retried on the next tick
	#[error("Network error: {0}")]
	NetworkError(ErrorContext),

	/// A stage of the cycle failed
	#[error("Processing error: {0}")]
	ProcessingError(ErrorContext),

	/// Reading or writing the checkpoint store failed
	#[error("Storage error: {0}")]
	StorageError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BlockWatcherError {
	pub fn scheduler_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SchedulerError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn network_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NetworkError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn processing_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ProcessingError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn storage_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::StorageError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for BlockWatcherError {
	fn trace_id(&self) -> String {
		match self {
			Self::SchedulerError(ctx)
			| Self::NetworkError(ctx)
			| Self::ProcessingError(ctx)
			| Self::StorageError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
