//! Notification channels.
//!
//! - `Notifier`: the single `send` contract every built-in channel implements
//! - `NotifierFactory`: resolves a trigger to its notifier
//! - `WebhookNotifier`: JSON webhook with optional HMAC signature
//! - `ScriptNotifier`: runs a script trigger with the match on standard input
//!
//! Only webhooks ship with the crate. Email, Slack, Discord and Telegram notifiers are
//! plugged in through [`DefaultNotifierFactory::register`].

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;

mod error;
mod script;
mod webhook;

pub use error::NotificationError;
pub use script::ScriptNotifier;
pub use webhook::{webhook_client, WebhookNotifier};

use crate::models::{NotificationMessage, Trigger, TriggerType};

/// Delivers a rendered message over one channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn send(&self, message: &NotificationMessage) -> Result<(), NotificationError>;
}

/// Resolves the notifier for a trigger
#[cfg_attr(test, mockall::automock)]
pub trait NotifierFactory: Send + Sync {
	fn create(&self, trigger: &Trigger) -> Result<Arc<dyn Notifier>, NotificationError>;
}

/// Constructor for an embedder-supplied channel
pub type NotifierConstructor =
	Box<dyn Fn(&Trigger) -> Result<Arc<dyn Notifier>, NotificationError> + Send + Sync>;

/// Factory with the built-in webhook channel and any registered extras
pub struct DefaultNotifierFactory {
	client: ClientWithMiddleware,
	registered: HashMap<TriggerType, NotifierConstructor>,
}

impl DefaultNotifierFactory {
	pub fn new() -> Result<Self, NotificationError> {
		Ok(Self {
			client: webhook_client()?,
			registered: HashMap::new(),
		})
	}

	/// Registers a constructor for `kind`, replacing any earlier one
	pub fn register(&mut self, kind: TriggerType, constructor: NotifierConstructor) {
		self.registered.insert(kind, constructor);
	}
}

impl NotifierFactory for DefaultNotifierFactory {
	fn create(&self, trigger: &Trigger) -> Result<Arc<dyn Notifier>, NotificationError> {
		let kind = trigger.config.channel_kind();
		if let Some(constructor) = self.registered.get(&kind) {
			return constructor(trigger);
		}

		match kind {
			TriggerType::Webhook => Ok(Arc::new(WebhookNotifier::from_config(
				&trigger.config,
				self.client.clone(),
			)?)),
			other => Err(NotificationError::unsupported_channel(
				format!("No notifier registered for channel {}", other),
				None,
				Some(HashMap::from([("trigger".to_string(), trigger.name.clone())])),
			)),
		}
	}
}
