//! Structured error context shared by every service error.
//!
//! An [`ErrorContext`] carries a message, the error it wraps and `key=value` metadata
//! (network, monitor, block range). It is stamped with a creation time and a trace ID;
//! the trace ID is inherited from the wrapped error so one failure keeps one ID as it
//! travels up through the services.

use chrono::Utc;
use std::{collections::HashMap, error::Error, fmt, iter};
use uuid::Uuid;

/// Boxed error used as the `source` of an [`ErrorContext`]
pub type BoxedSource = Box<dyn Error + Send + Sync + 'static>;

/// How far down a source chain an existing trace ID is looked for
const TRACE_ID_SEARCH_DEPTH: usize = 4;

#[derive(Debug)]
pub struct ErrorContext {
	pub message: String,
	pub source: Option<BoxedSource>,
	pub metadata: Option<HashMap<String, String>>,
	/// RFC 3339 creation time
	pub timestamp: String,
	pub trace_id: String,
}

impl ErrorContext {
	pub fn new(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = source
			.as_deref()
			.and_then(|source| inherited_trace_id(source))
			.unwrap_or_else(|| Uuid::new_v4().to_string());

		Self {
			message: message.into(),
			source,
			metadata,
			timestamp: Utc::now().to_rfc3339(),
			trace_id,
		}
	}

	/// Same as [`ErrorContext::new`], then emits the error at `ERROR` level
	pub fn new_with_log(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let context = Self::new(message, source, metadata);
		context.log();
		context
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata
			.get_or_insert_with(HashMap::new)
			.insert(key.into(), value.into());
		self
	}

	/// `message [k1=v1, k2=v2]` with keys in sorted order; just `message` without metadata
	pub fn format_with_metadata(&self) -> String {
		let mut pairs: Vec<(&String, &String)> = self.metadata.iter().flatten().collect();
		if pairs.is_empty() {
			return self.message.clone();
		}
		pairs.sort();

		let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
		format!("{} [{}]", self.message, rendered.join(", "))
	}

	fn log(&self) {
		let chain = self.source.as_deref().map(|source| describe_chain(source));
		tracing::error!(
			message = self.format_with_metadata(),
			trace_id = %self.trace_id,
			timestamp = %self.timestamp,
			error.chain = chain.as_deref(),
			"Error occurred"
		);
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format_with_metadata())
	}
}

impl Error for ErrorContext {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.source.as_deref().map(|e| e as &(dyn Error + 'static))
	}
}

/// Errors that carry a trace ID
pub trait TraceableError: Error + Send + Sync {
	fn trace_id(&self) -> String;
}

impl TraceableError for ErrorContext {
	fn trace_id(&self) -> String {
		self.trace_id.clone()
	}
}

impl TraceableError for dyn Error + Send + Sync + 'static {
	fn trace_id(&self) -> String {
		inherited_trace_id(self).unwrap_or_else(|| Uuid::new_v4().to_string())
	}
}

/// `err` followed by its sources
fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
	iter::successors(Some(err), |e: &&'a (dyn Error + 'static)| (*e).source())
}

/// First trace ID found on `err` or the first few errors beneath it
fn inherited_trace_id(err: &(dyn Error + 'static)) -> Option<String> {
	chain(err).take(TRACE_ID_SEARCH_DEPTH).find_map(own_trace_id)
}

/// Trace ID of `err` itself when it is one of the crate's error types
fn own_trace_id(err: &(dyn Error + 'static)) -> Option<String> {
	fn as_traceable<E: TraceableError + 'static>(err: &(dyn Error + 'static)) -> Option<String> {
		err.downcast_ref::<E>().map(E::trace_id)
	}

	type Lookup = fn(&(dyn Error + 'static)) -> Option<String>;
	const LOOKUPS: [Lookup; 9] = [
		as_traceable::<ErrorContext>,
		as_traceable::<crate::services::notification::NotificationError>,
		as_traceable::<crate::services::trigger::TriggerError>,
		as_traceable::<crate::services::filter::FilterError>,
		as_traceable::<crate::services::blockwatcher::BlockWatcherError>,
		as_traceable::<crate::services::blockchain::BlockChainError>,
		as_traceable::<crate::repositories::RepositoryError>,
		as_traceable::<crate::utils::script::ScriptError>,
		as_traceable::<crate::models::ConfigError>,
	];

	LOOKUPS.iter().find_map(|lookup| lookup(err))
}

/// RPC gateways sometimes answer with an HTML page; only the text before it is kept
fn strip_html(message: &str) -> &str {
	let is_html = ["<html>", "<head>", "<body>"].iter().any(|tag| message.contains(tag));
	match message.find('<') {
		Some(pos) if is_html => message[..pos].trim(),
		_ => message,
	}
}

/// One line per error in the chain, each below the first prefixed with `Caused by:`
fn describe_chain(err: &(dyn Error + 'static)) -> String {
	chain(err)
		.map(|e| strip_html(&e.to_string()).to_string())
		.collect::<Vec<_>>()
		.join("\n\tCaused by: ")
}
