//! Trigger configuration loading and validation.
//!
//! A trigger file holds a map of trigger name to trigger, so one file can define many.

use std::{collections::HashMap, path::Path};

use crate::{
	models::{
		config::{json_files_in, read_json},
		ConfigError, ConfigLoader, Trigger, TriggerTypeConfig,
	},
	utils::script::validate_script_config,
};

impl ConfigLoader for Trigger {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let config_dir = path.unwrap_or(Path::new("config/triggers"));
		let mut pairs = Vec::new();

		for file in json_files_in(config_dir)? {
			let triggers: HashMap<String, Trigger> = read_json(&file)?;
			for (name, trigger) in triggers {
				trigger.validate()?;
				pairs.push((name, trigger));
			}
		}

		Ok(T::from_iter(pairs))
	}

	/// Loads the first trigger of a trigger file
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let triggers: HashMap<String, Trigger> = read_json(path)?;
		let trigger = triggers.into_values().next().ok_or_else(|| {
			ConfigError::validation_error(
				"trigger file is empty",
				None,
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})?;
		trigger.validate()?;
		Ok(trigger)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |msg: String| {
			ConfigError::validation_error(
				msg,
				None,
				Some(HashMap::from([("trigger".to_string(), self.name.clone())])),
			)
		};

		if self.name.is_empty() {
			return Err(invalid("Trigger name is required".to_string()));
		}

		if self.config.channel_kind() != self.trigger_type {
			return Err(invalid(format!(
				"trigger_type {} does not match its config",
				self.trigger_type
			)));
		}

		match &self.config {
			TriggerTypeConfig::Script {
				language,
				script_path,
				timeout_ms,
				..
			} => validate_script_config(script_path, language, timeout_ms).map_err(invalid)?,
			TriggerTypeConfig::Webhook { url, method, .. } => {
				url::Url::parse(url).map_err(|e| invalid(format!("Invalid webhook URL: {}", e)))?;
				if let Some(method) = method {
					if !["GET", "POST", "PUT", "PATCH", "DELETE"]
						.contains(&method.to_uppercase().as_str())
					{
						return Err(invalid(format!("Unsupported HTTP method: {}", method)));
					}
				}
			}
			TriggerTypeConfig::Slack { slack_url: url, .. }
			| TriggerTypeConfig::Discord { discord_url: url, .. } => {
				url::Url::parse(url).map_err(|e| invalid(format!("Invalid URL: {}", e)))?;
			}
			TriggerTypeConfig::Email { recipients, .. } => {
				if recipients.is_empty() {
					return Err(invalid("Email trigger needs at least one recipient".to_string()));
				}
			}
			TriggerTypeConfig::Telegram { token, chat_id, .. } => {
				if token.is_empty() || chat_id.is_empty() {
					return Err(invalid("Telegram token and chat_id are required".to_string()));
				}
			}
		}

		if let Some(message) = self.config.message() {
			if message.title.is_empty() && message.body.is_empty() {
				return Err(invalid("Message template is empty".to_string()));
			}
		}

		Ok(())
	}
}
