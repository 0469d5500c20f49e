//! Error types for repository operations.
//!
//! Loading configuration files, checking the references between monitors, networks and
//! triggers, and reading scripts can all fail at startup. Any of these ends the process.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Errors that can occur during repository operations
#[derive(ThisError, Debug)]
pub enum RepositoryError {
	/// Configurations loaded but contradict each other
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// A configuration or script could not be read or parsed
	#[error("Load error: {0}")]
	LoadError(ErrorContext),

	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl RepositoryError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn load_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::LoadError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for RepositoryError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::LoadError(ctx) | Self::InternalError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
