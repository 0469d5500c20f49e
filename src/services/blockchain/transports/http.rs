//! HTTP JSON-RPC transport bound to a single endpoint.

use std::{collections::HashMap, time::Duration};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use serde_json::Value;
use url::Url;

use crate::services::blockchain::{
	transports::{BlockchainTransport, TransientErrorRetryStrategy},
	BlockChainError,
};

/// Number of in-place retries for transient transport failures
const IN_PLACE_RETRIES: u32 = 2;

/// HTTP transport client for one RPC endpoint
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	client: ClientWithMiddleware,
	url: String,
}

impl HttpTransportClient {
	/// Creates a transport for `url` with the given per-request timeout
	pub fn new(url: &str, timeout: Duration) -> Result<Self, BlockChainError> {
		let parsed = Url::parse(url).map_err(|e| {
			BlockChainError::internal_error(
				format!("Invalid RPC URL: {}", e),
				Some(Box::new(e)),
				None,
			)
		})?;

		let http = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(timeout)
			.connect_timeout(timeout.min(Duration::from_secs(20)))
			.build()
			.map_err(|e| {
				BlockChainError::internal_error(
					format!("Failed to build HTTP client: {}", e),
					Some(Box::new(e)),
					None,
				)
			})?;

		let retry_policy = ExponentialBackoff::builder()
			.base(2)
			.retry_bounds(Duration::from_millis(250), Duration::from_secs(2))
			.jitter(Jitter::Full)
			.build_with_max_retries(IN_PLACE_RETRIES);

		let client = ClientBuilder::new(http)
			.with(RetryTransientMiddleware::new_with_policy_and_strategy(
				retry_policy,
				TransientErrorRetryStrategy,
			))
			.build();

		Ok(Self {
			client,
			url: parsed.to_string(),
		})
	}

	fn metadata(&self, method: &str) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("url".to_string(), self.url.clone()),
			("method".to_string(), method.to_string()),
		]))
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for HttpTransportClient {
	fn url(&self) -> &str {
		&self.url
	}

	async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, BlockChainError> {
		let request_body = self.customize_request(method, params);

		let response = self
			.client
			.post(&self.url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await
			.map_err(|e| {
				BlockChainError::connection_error(
					format!("Failed to send request: {}", e),
					Some(Box::new(e)),
					self.metadata(method),
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(BlockChainError::connection_error(
				format!("HTTP error {}: {}", status.as_u16(), body),
				None,
				self.metadata(method),
			));
		}

		let json: Value = response.json().await.map_err(|e| {
			BlockChainError::request_error(
				format!("Failed to parse response: {}", e),
				Some(Box::new(e)),
				self.metadata(method),
			)
		})?;

		if let Some(error) = json.get("error") {
			return Err(BlockChainError::request_error(
				format!("RPC error: {}", error),
				None,
				self.metadata(method),
			));
		}

		json.get("result").cloned().ok_or_else(|| {
			BlockChainError::request_error("Response has no result", None, self.metadata(method))
		})
	}
}
