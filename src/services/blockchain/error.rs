//! Blockchain error types and handling.
//!
//! Covers endpoint connectivity, malformed RPC responses and the outcome of fetching a
//! block range through the endpoint pool.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Represents possible errors that can occur during blockchain operations
#[derive(ThisError, Debug)]
pub enum BlockChainError {
	/// The endpoint could not be reached, timed out or answered with a transport failure
	#[error("Connection error: {0}")]
	ConnectionError(ErrorContext),

	/// The endpoint answered but the response was an RPC error or could not be decoded
	#[error("Request error: {0}")]
	RequestError(ErrorContext),

	/// The endpoint does not (yet) know the requested block
	#[error("Block not found: {0}")]
	BlockNotFound(ErrorContext),

	/// Every endpoint of the network is cooling down or has zero weight
	#[error("No healthy endpoint: {0}")]
	NoHealthyEndpoint(ErrorContext),

	/// A block could not be fetched within the configured number of attempts
	#[error("Fetch error: {0}")]
	FetchError(ErrorContext),

	/// Internal errors within the blockchain client
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BlockChainError {
	pub fn connection_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConnectionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn request_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn block_not_found(
		number: u64,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::BlockNotFound(ErrorContext::new_with_log(
			number.to_string(),
			source,
			metadata,
		))
	}

	pub fn no_healthy_endpoint(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NoHealthyEndpoint(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn fetch_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FetchError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Whether another attempt, possibly against a different endpoint, may succeed
	pub fn is_transient(&self) -> bool {
		matches!(
			self,
			Self::ConnectionError(_) | Self::RequestError(_) | Self::BlockNotFound(_)
		)
	}

	/// Whether a failure should count against the health of the endpoint that produced it
	pub fn is_endpoint_failure(&self) -> bool {
		matches!(self, Self::ConnectionError(_) | Self::RequestError(_))
	}
}

impl TraceableError for BlockChainError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConnectionError(ctx)
			| Self::RequestError(ctx)
			| Self::BlockNotFound(ctx)
			| Self::NoHealthyEndpoint(ctx)
			| Self::FetchError(ctx)
			| Self::InternalError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
