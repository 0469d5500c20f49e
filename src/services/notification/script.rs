use std::collections::HashMap;

use crate::{
	models::{MonitorMatch, TriggerTypeConfig},
	services::notification::NotificationError,
	utils::script::{ScriptExecutorFactory, ScriptMap},
};

/// Runs a script trigger with `{"monitor_match", "args"}` on standard input.
///
/// Standard output is ignored. A non-zero exit surfaces the script's standard error.
pub struct ScriptNotifier<'a> {
	config: &'a TriggerTypeConfig,
}

impl<'a> ScriptNotifier<'a> {
	/// Creates a script notifier from a trigger configuration
	pub fn from_config(config: &'a TriggerTypeConfig) -> Option<Self> {
		match config {
			TriggerTypeConfig::Script { .. } => Some(Self { config }),
			_ => None,
		}
	}

	pub async fn notify(
		&self,
		monitor_match: &MonitorMatch,
		scripts: &ScriptMap,
	) -> Result<(), NotificationError> {
		let TriggerTypeConfig::Script {
			script_path,
			language,
			arguments,
			timeout_ms,
		} = self.config
		else {
			return Err(NotificationError::config_error(
				"Invalid configuration type for ScriptNotifier",
				None,
				None,
			));
		};

		let metadata = |extra: Option<(&str, String)>| {
			let mut metadata = HashMap::from([("script".to_string(), script_path.clone())]);
			if let Some((key, value)) = extra {
				metadata.insert(key.to_string(), value);
			}
			Some(metadata)
		};

		let Some((_, content)) = scripts.get(script_path) else {
			return Err(NotificationError::config_error(
				format!("Script {} was not loaded", script_path),
				None,
				metadata(None),
			));
		};

		let executor = ScriptExecutorFactory::create(language, content);
		executor
			.execute(monitor_match, timeout_ms, arguments.as_deref(), true)
			.await
			.map(|_| ())
			.map_err(|e| {
				let stderr = e.stderr().map(|s| ("stderr", s.to_string()));
				NotificationError::execution_error(
					"Trigger script failed",
					Some(Box::new(e)),
					metadata(stderr),
				)
			})
	}
}
