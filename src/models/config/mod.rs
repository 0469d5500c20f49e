//! Configuration loading and validation.
//!
//! Monitors, networks and triggers are read from JSON files under a config directory.
//! Each type validates its own fields; cross references between them are checked by
//! the repositories.

use std::{collections::HashMap, path::Path};

mod error;
mod monitor_config;
mod network_config;
mod trigger_config;

pub use error::ConfigError;
pub use monitor_config::is_valid_signature;

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Load every configuration in `path`, keyed by its identifier
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	/// Load and validate a single file
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Validate the configuration on its own
	fn validate(&self) -> Result<(), ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}

/// JSON files directly inside `dir`, sorted by path
pub(crate) fn json_files_in(dir: &Path) -> Result<Vec<std::path::PathBuf>, ConfigError> {
	let path_metadata = || HashMap::from([("path".to_string(), dir.display().to_string())]);

	if !dir.exists() {
		return Err(ConfigError::file_error(
			"config directory not found",
			None,
			Some(path_metadata()),
		));
	}

	let pattern = dir.join("*.json");
	let entries = glob::glob(&pattern.to_string_lossy()).map_err(|e| {
		ConfigError::file_error(
			format!("invalid config path pattern: {}", e),
			Some(Box::new(e)),
			Some(path_metadata()),
		)
	})?;

	let mut files = Vec::new();
	for entry in entries {
		let path = entry.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read config entry: {}", e),
				Some(Box::new(e)),
				Some(path_metadata()),
			)
		})?;
		files.push(path);
	}
	files.sort();
	Ok(files)
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
	let path_metadata = || HashMap::from([("path".to_string(), path.display().to_string())]);

	let content = std::fs::read_to_string(path).map_err(|e| {
		ConfigError::file_error(
			format!("failed to read file: {}", e),
			Some(Box::new(e)),
			Some(path_metadata()),
		)
	})?;

	serde_json::from_str(&content).map_err(|e| {
		ConfigError::parse_error(
			format!("failed to parse JSON: {}", e),
			Some(Box::new(e)),
			Some(path_metadata()),
		)
	})
}
