//! Configuration error types.
//!
//! This module defines the error types that can occur during configuration
//! loading and validation.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors that can occur during configuration operations
#[derive(ThisError, Debug)]
pub enum ConfigError {
	/// Configuration validation failed
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// Failed to parse configuration file
	#[error("Parse error: {0}")]
	ParseError(ErrorContext),

	/// File system error during configuration loading
	#[error("File error: {0}")]
	FileError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ConfigError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn parse_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ParseError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn file_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FileError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for ConfigError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::ParseError(ctx) | Self::FileError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
