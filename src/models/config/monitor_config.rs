//! Monitor configuration loading and validation.

use lazy_static::lazy_static;
use regex::Regex;
use std::{collections::HashMap, path::Path};

use crate::{
	models::{
		config::{json_files_in, read_json},
		ConfigError, ConfigLoader, Monitor,
	},
	utils::script::validate_script_config,
};

lazy_static! {
	static ref SIGNATURE_RE: Regex =
		Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\([^()]*(\([^()]*\)[^()]*)*\)$")
			.expect("signature pattern is valid");
}

/// Whether `signature` has the `name(type,...)` shape
pub fn is_valid_signature(signature: &str) -> bool {
	SIGNATURE_RE.is_match(&signature.replace(' ', ""))
}

impl ConfigLoader for Monitor {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let monitor_dir = path.unwrap_or(Path::new("config/monitors"));
		let mut pairs = Vec::new();

		for file in json_files_in(monitor_dir)? {
			let monitor = Self::load_from_path(&file)?;
			pairs.push((monitor.name.clone(), monitor));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let config: Monitor = read_json(path)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let metadata = || HashMap::from([("monitor".to_string(), self.name.clone())]);

		if self.name.is_empty() {
			return Err(ConfigError::validation_error(
				"Monitor name is required",
				None,
				None,
			));
		}

		if self.networks.is_empty() {
			return Err(ConfigError::validation_error(
				"Monitor must reference at least one network",
				None,
				Some(metadata()),
			));
		}

		let signatures = self
			.match_conditions
			.functions
			.iter()
			.map(|f| &f.signature)
			.chain(self.match_conditions.events.iter().map(|e| &e.signature));

		for signature in signatures {
			if !is_valid_signature(signature) {
				return Err(ConfigError::validation_error(
					format!("Invalid signature format: {}", signature),
					None,
					Some(metadata()),
				));
			}
		}

		for condition in &self.trigger_conditions {
			validate_script_config(&condition.script_path, &condition.language, &condition.timeout_ms)
				.map_err(|msg| ConfigError::validation_error(msg, None, Some(metadata())))?;
		}

		Ok(())
	}
}
