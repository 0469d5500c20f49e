//! Network transport for blockchain clients.
//!
//! A transport talks to exactly one endpoint. Choosing between endpoints and backing off
//! from failing ones is the job of the endpoint pool, not of the transport.

mod http;

pub use http::HttpTransportClient;

use crate::services::blockchain::BlockChainError;
use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde_json::{json, Value};

/// HTTP status codes that are handed back to the pool instead of being retried in place
/// - 429: Too Many Requests - the endpoint is rate limiting us, another one should be tried
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// Base trait for blockchain transport clients
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// URL of the endpoint this transport is bound to
	fn url(&self) -> &str;

	/// Sends a request and returns the `result` member of the response
	async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, BlockChainError>;

	/// Builds the request body; JSON-RPC 2.0 by default
	fn customize_request(&self, method: &str, params: Option<Value>) -> Value {
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params
		})
	}
}

/// Retries connection failures and 5xx responses on the same endpoint, but leaves
/// rate-limit responses to the caller so the pool can move to another endpoint
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(response) if ROTATE_ON_ERROR_CODES.contains(&response.status().as_u16()) => {
				Some(Retryable::Fatal)
			}
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}
