//! Filter error types and handling.
//!
//! Provides error types for the condition evaluator: block kind mismatches, failing
//! filter scripts and expressions that cannot be evaluated.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum FilterError {
	/// A block was handed to the filter of another network kind
	#[error("Block type mismatch: {0}")]
	BlockTypeMismatch(ErrorContext),

	/// A filter script failed, timed out or printed something other than a verdict
	#[error("Filter script error: {0}")]
	ScriptError(ErrorContext),

	/// An expression could not be evaluated for a candidate
	#[error("Expression error: {0}")]
	ExpressionError(ErrorContext),

	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl FilterError {
	pub fn block_type_mismatch(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::BlockTypeMismatch(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn script_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ScriptError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn expression_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ExpressionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for FilterError {
	fn trace_id(&self) -> String {
		match self {
			Self::BlockTypeMismatch(ctx)
			| Self::ScriptError(ctx)
			| Self::ExpressionError(ctx)
			| Self::InternalError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
