//! Script execution for filter conditions and script notifications.
//!
//! Scripts are loaded once at startup and shared by the filter and trigger services.

mod error;
mod executor;

pub use error::ScriptError;
pub use executor::{
	process_script_output, BashScriptExecutor, JavaScriptScriptExecutor, PythonScriptExecutor,
	ScriptExecutor,
};

use std::{collections::HashMap, path::Path, sync::Arc};

use crate::models::ScriptLanguage;

/// Loaded scripts keyed by their configured path
pub type ScriptMap = HashMap<String, (ScriptLanguage, String)>;

/// Creates executors for the supported languages
pub struct ScriptExecutorFactory;

impl ScriptExecutorFactory {
	pub fn create(language: &ScriptLanguage, script_content: &str) -> Arc<dyn ScriptExecutor> {
		let script_content = script_content.to_string();
		match language {
			ScriptLanguage::Python => Arc::new(PythonScriptExecutor { script_content }),
			ScriptLanguage::JavaScript => Arc::new(JavaScriptScriptExecutor { script_content }),
			ScriptLanguage::Bash => Arc::new(BashScriptExecutor { script_content }),
		}
	}
}

/// Checks that a script exists, has the extension of its language and a usable timeout
pub fn validate_script_config(
	script_path: &str,
	language: &ScriptLanguage,
	timeout_ms: &u32,
) -> Result<(), String> {
	let path = Path::new(script_path);
	if !path.is_file() {
		return Err(format!("Script path does not exist: {}", script_path));
	}

	let expected = match language {
		ScriptLanguage::Python => "py",
		ScriptLanguage::JavaScript => "js",
		ScriptLanguage::Bash => "sh",
	};
	let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
	if extension != expected {
		return Err(format!(
			"Script {} does not match language {:?} (expected .{})",
			script_path, language, expected
		));
	}

	if *timeout_ms == 0 {
		return Err("Script timeout must be greater than 0".to_string());
	}

	Ok(())
}
