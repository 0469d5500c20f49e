//! Expression parsing and evaluation errors.
//!
//! These are reported with the monitor and condition by the filter, so they are not
//! logged on construction.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum EvaluationError {
	/// The expression text is not valid
	#[error("Parse error: {0}")]
	ParseError(ErrorContext),

	/// The expression names a parameter the match does not carry
	#[error("Variable not found: {0}")]
	VariableNotFound(ErrorContext),

	/// An accessor names a key the value does not have
	#[error("Field not found: {0}")]
	FieldNotFound(ErrorContext),

	#[error("Index out of bounds: {0}")]
	IndexOutOfBounds(ErrorContext),

	/// The two sides of a comparison cannot be compared
	#[error("Type mismatch: {0}")]
	TypeMismatch(ErrorContext),

	/// The operator is not defined for the value's type
	#[error("Unsupported operator: {0}")]
	UnsupportedOperator(ErrorContext),
}

impl EvaluationError {
	pub fn parse_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ParseError(ErrorContext::new(msg, source, metadata))
	}

	pub fn variable_not_found(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::VariableNotFound(ErrorContext::new(msg, source, metadata))
	}

	pub fn field_not_found(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FieldNotFound(ErrorContext::new(msg, source, metadata))
	}

	pub fn index_out_of_bounds(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::IndexOutOfBounds(ErrorContext::new(msg, source, metadata))
	}

	pub fn type_mismatch(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::TypeMismatch(ErrorContext::new(msg, source, metadata))
	}

	pub fn unsupported_operator(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnsupportedOperator(ErrorContext::new(msg, source, metadata))
	}
}

impl TraceableError for EvaluationError {
	fn trace_id(&self) -> String {
		match self {
			Self::ParseError(ctx)
			| Self::VariableNotFound(ctx)
			| Self::FieldNotFound(ctx)
			| Self::IndexOutOfBounds(ctx)
			| Self::TypeMismatch(ctx)
			| Self::UnsupportedOperator(ctx) => ctx.trace_id.clone(),
		}
	}
}
