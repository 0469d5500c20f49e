//! Test helper utilities for Trigger configuration
//!
//! - `TriggerBuilder`: Builder for creating test Trigger instances

use std::collections::HashMap;

use crate::models::{NotificationMessage, ScriptLanguage, Trigger, TriggerType, TriggerTypeConfig};

/// Builder for creating test Trigger instances
pub struct TriggerBuilder {
	name: String,
	trigger_type: TriggerType,
	config: TriggerTypeConfig,
}

fn default_message() -> NotificationMessage {
	NotificationMessage {
		title: "Alert".to_string(),
		body: "Test message".to_string(),
	}
}

impl Default for TriggerBuilder {
	fn default() -> Self {
		Self {
			name: "test_trigger".to_string(),
			trigger_type: TriggerType::Webhook,
			config: TriggerTypeConfig::Webhook {
				url: "https://api.example.com/webhook".to_string(),
				secret: None,
				method: Some("POST".to_string()),
				headers: None,
				message: default_message(),
			},
		}
	}
}

impl TriggerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.name = name.to_string();
		self
	}

	pub fn trigger_type(mut self, trigger_type: TriggerType) -> Self {
		self.trigger_type = trigger_type;
		self
	}

	pub fn config(mut self, config: TriggerTypeConfig) -> Self {
		self.trigger_type = config.channel_kind();
		self.config = config;
		self
	}

	pub fn webhook(mut self, url: &str) -> Self {
		self.trigger_type = TriggerType::Webhook;
		self.config = TriggerTypeConfig::Webhook {
			url: url.to_string(),
			secret: None,
			method: Some("POST".to_string()),
			headers: None,
			message: default_message(),
		};
		self
	}

	pub fn webhook_secret(mut self, value: &str) -> Self {
		if let TriggerTypeConfig::Webhook { secret, .. } = &mut self.config {
			*secret = Some(value.to_string());
		}
		self
	}

	pub fn webhook_headers(mut self, value: HashMap<String, String>) -> Self {
		if let TriggerTypeConfig::Webhook { headers, .. } = &mut self.config {
			*headers = Some(value);
		}
		self
	}

	pub fn slack(mut self, webhook_url: &str) -> Self {
		self.trigger_type = TriggerType::Slack;
		self.config = TriggerTypeConfig::Slack {
			slack_url: webhook_url.to_string(),
			message: default_message(),
		};
		self
	}

	pub fn script(mut self, script_path: &str, language: ScriptLanguage) -> Self {
		self.trigger_type = TriggerType::Script;
		self.config = TriggerTypeConfig::Script {
			script_path: script_path.to_string(),
			arguments: None,
			language,
			timeout_ms: 1000,
		};
		self
	}

	pub fn script_arguments(mut self, value: Vec<String>) -> Self {
		if let TriggerTypeConfig::Script { arguments, .. } = &mut self.config {
			*arguments = Some(value);
		}
		self
	}

	pub fn script_timeout_ms(mut self, value: u32) -> Self {
		if let TriggerTypeConfig::Script { timeout_ms, .. } = &mut self.config {
			*timeout_ms = value;
		}
		self
	}

	pub fn message(mut self, title: &str, body: &str) -> Self {
		let replacement = NotificationMessage {
			title: title.to_string(),
			body: body.to_string(),
		};
		match &mut self.config {
			TriggerTypeConfig::Webhook { message, .. }
			| TriggerTypeConfig::Slack { message, .. }
			| TriggerTypeConfig::Discord { message, .. }
			| TriggerTypeConfig::Telegram { message, .. }
			| TriggerTypeConfig::Email { message, .. } => *message = replacement,
			TriggerTypeConfig::Script { .. } => {}
		}
		self
	}

	pub fn build(self) -> Trigger {
		Trigger {
			name: self.name,
			trigger_type: self.trigger_type,
			config: self.config,
		}
	}
}
