use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::ScriptLanguage;

/// Notification action fired when a monitor matches
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
	pub name: String,
	pub trigger_type: TriggerType,
	pub config: TriggerTypeConfig,
}

/// Channel kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
	Webhook,
	Email,
	Slack,
	Discord,
	Telegram,
	Script,
}

impl std::fmt::Display for TriggerType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			TriggerType::Webhook => "webhook",
			TriggerType::Email => "email",
			TriggerType::Slack => "slack",
			TriggerType::Discord => "discord",
			TriggerType::Telegram => "telegram",
			TriggerType::Script => "script",
		};
		write!(f, "{}", name)
	}
}

/// Message template with `${variable}` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationMessage {
	pub title: String,
	pub body: String,
}

/// Channel-specific settings. Variants are told apart by their required fields.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TriggerTypeConfig {
	Script {
		language: ScriptLanguage,
		script_path: String,
		#[serde(default)]
		arguments: Option<Vec<String>>,
		timeout_ms: u32,
	},
	Email {
		host: String,
		#[serde(default)]
		port: Option<u16>,
		username: String,
		password: String,
		message: NotificationMessage,
		sender: String,
		recipients: Vec<String>,
	},
	Telegram {
		token: String,
		chat_id: String,
		#[serde(default)]
		disable_web_preview: Option<bool>,
		message: NotificationMessage,
	},
	Slack {
		slack_url: String,
		message: NotificationMessage,
	},
	Discord {
		discord_url: String,
		message: NotificationMessage,
	},
	Webhook {
		url: String,
		#[serde(default)]
		method: Option<String>,
		#[serde(default)]
		secret: Option<String>,
		#[serde(default)]
		headers: Option<HashMap<String, String>>,
		message: NotificationMessage,
	},
}

impl TriggerTypeConfig {
	/// Template of non-script channels
	pub fn message(&self) -> Option<&NotificationMessage> {
		match self {
			TriggerTypeConfig::Script { .. } => None,
			TriggerTypeConfig::Email { message, .. }
			| TriggerTypeConfig::Telegram { message, .. }
			| TriggerTypeConfig::Slack { message, .. }
			| TriggerTypeConfig::Discord { message, .. }
			| TriggerTypeConfig::Webhook { message, .. } => Some(message),
		}
	}

	/// Channel kind implied by the configuration shape
	pub fn channel_kind(&self) -> TriggerType {
		match self {
			TriggerTypeConfig::Script { .. } => TriggerType::Script,
			TriggerTypeConfig::Email { .. } => TriggerType::Email,
			TriggerTypeConfig::Telegram { .. } => TriggerType::Telegram,
			TriggerTypeConfig::Slack { .. } => TriggerType::Slack,
			TriggerTypeConfig::Discord { .. } => TriggerType::Discord,
			TriggerTypeConfig::Webhook { .. } => TriggerType::Webhook,
		}
	}
}
