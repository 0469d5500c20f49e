//! Webhook notification implementation.
//!
//! Sends `{"title", "body"}` as JSON. With a secret configured, the request carries an
//! HMAC-SHA256 signature of the body and timestamp in `X-Signature` and the timestamp in
//! `X-Timestamp`.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{
	header::{HeaderMap, HeaderName, HeaderValue},
	Method,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use serde::Serialize;
use sha2::Sha256;

use crate::{
	models::{NotificationMessage, TriggerTypeConfig},
	services::notification::{NotificationError, Notifier},
};

type HmacSha256 = Hmac<Sha256>;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the shared HTTP client used by webhook notifiers
pub fn webhook_client() -> Result<ClientWithMiddleware, NotificationError> {
	let client = reqwest::Client::builder()
		.timeout(WEBHOOK_TIMEOUT)
		.build()
		.map_err(|e| {
			NotificationError::internal_error(
				"Failed to build webhook HTTP client",
				Some(Box::new(e)),
				None,
			)
		})?;

	let retry_policy = ExponentialBackoff::builder()
		.base(2)
		.retry_bounds(Duration::from_millis(250), Duration::from_secs(2))
		.jitter(Jitter::Full)
		.build_with_max_retries(2);

	Ok(ClientBuilder::new(client)
		.with(RetryTransientMiddleware::new_with_policy(retry_policy))
		.build())
}

#[derive(Serialize, Debug)]
struct WebhookMessage<'a> {
	title: &'a str,
	body: &'a str,
}

pub struct WebhookNotifier {
	client: ClientWithMiddleware,
	url: String,
	method: Method,
	secret: Option<String>,
	headers: HashMap<String, String>,
}

impl WebhookNotifier {
	/// Creates a notifier from a webhook trigger configuration
	pub fn from_config(
		config: &TriggerTypeConfig,
		client: ClientWithMiddleware,
	) -> Result<Self, NotificationError> {
		let TriggerTypeConfig::Webhook {
			url,
			method,
			secret,
			headers,
			..
		} = config
		else {
			return Err(NotificationError::config_error(
				format!("Expected a webhook configuration, got {}", config.channel_kind()),
				None,
				None,
			));
		};

		let method = match method {
			None => Method::POST,
			Some(m) => Method::from_bytes(m.to_uppercase().as_bytes()).map_err(|e| {
				NotificationError::config_error(
					format!("Invalid HTTP method {}", m),
					Some(Box::new(e)),
					None,
				)
			})?,
		};

		Ok(Self {
			client,
			url: url.clone(),
			method,
			secret: secret.clone(),
			headers: headers.clone().unwrap_or_default(),
		})
	}

	/// Hex HMAC-SHA256 of `body` followed by `timestamp`
	pub fn sign(secret: &str, body: &str, timestamp: &str) -> Result<String, NotificationError> {
		let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
			NotificationError::config_error(format!("Invalid secret: {}", e), None, None)
		})?;
		mac.update(body.as_bytes());
		mac.update(timestamp.as_bytes());
		Ok(hex::encode(mac.finalize().into_bytes()))
	}

	fn header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), NotificationError> {
		let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
			NotificationError::config_error(
				format!("Invalid header name: {}", name),
				Some(Box::new(e)),
				None,
			)
		})?;
		let header_value = HeaderValue::from_str(value).map_err(|e| {
			NotificationError::config_error(
				format!("Invalid header value for key: {}", name),
				Some(Box::new(e)),
				None,
			)
		})?;
		Ok((header_name, header_value))
	}
}

#[async_trait]
impl Notifier for WebhookNotifier {
	async fn send(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
		let payload = WebhookMessage {
			title: &message.title,
			body: &message.body,
		};
		let body = serde_json::to_string(&payload).map_err(|e| {
			NotificationError::internal_error(
				"Failed to serialize webhook payload",
				Some(Box::new(e)),
				None,
			)
		})?;

		let mut headers = HeaderMap::new();
		headers.insert(
			reqwest::header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		for (key, value) in &self.headers {
			let (name, value) = Self::header(key, value)?;
			headers.insert(name, value);
		}
		if let Some(secret) = &self.secret {
			let timestamp = Utc::now().timestamp_millis().to_string();
			let signature = Self::sign(secret, &body, &timestamp)?;
			let (name, value) = Self::header("X-Signature", &signature)?;
			headers.insert(name, value);
			let (name, value) = Self::header("X-Timestamp", &timestamp)?;
			headers.insert(name, value);
		}

		let metadata = || HashMap::from([("url".to_string(), self.url.clone())]);
		let response = self
			.client
			.request(self.method.clone(), self.url.as_str())
			.headers(headers)
			.body(body)
			.send()
			.await
			.map_err(|e| {
				NotificationError::network_error(
					"Failed to send webhook notification",
					Some(Box::new(e)),
					Some(metadata()),
				)
			})?;

		if !response.status().is_success() {
			return Err(NotificationError::network_error(
				format!("Webhook returned error status: {}", response.status()),
				None,
				Some(metadata()),
			));
		}

		Ok(())
	}
}
