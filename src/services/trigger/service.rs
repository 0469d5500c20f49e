//! Trigger execution service implementation.
//!
//! Runs the triggers of one monitor for one match, strictly in the order the monitor
//! declares them. Each trigger gets its own template context, and a failing trigger is
//! recorded without stopping the ones after it.

use std::{collections::HashMap, sync::Arc};

use tracing::instrument;

use crate::{
	models::{Monitor, MonitorMatch, Trigger, TriggerTypeConfig},
	services::{
		notification::{NotifierFactory, ScriptNotifier},
		trigger::{
			error::TriggerError,
			template::{build_context, render_message},
		},
	},
	utils::script::ScriptMap,
};

/// Result of one trigger for one match
#[derive(Debug)]
pub struct TriggerOutcome {
	pub trigger: String,
	pub result: Result<(), TriggerError>,
}

impl TriggerOutcome {
	pub fn is_success(&self) -> bool {
		self.result.is_ok()
	}
}

/// Outcomes of every trigger of a match, in declared order
#[derive(Debug, Default)]
pub struct DispatchReport {
	pub results: Vec<TriggerOutcome>,
}

impl DispatchReport {
	pub fn failures(&self) -> usize {
		self.results.iter().filter(|r| !r.is_success()).count()
	}
}

/// Service for executing triggers with notifications
pub struct TriggerExecutionService {
	triggers: Arc<HashMap<String, Trigger>>,
	notifiers: Arc<dyn NotifierFactory>,
	scripts: Arc<ScriptMap>,
}

impl TriggerExecutionService {
	pub fn new(
		triggers: Arc<HashMap<String, Trigger>>,
		notifiers: Arc<dyn NotifierFactory>,
		scripts: Arc<ScriptMap>,
	) -> Self {
		Self {
			triggers,
			notifiers,
			scripts,
		}
	}

	/// Fires every trigger of `monitor` for `monitor_match`.
	///
	/// Never fails. Delivery errors are logged and reported per trigger.
	#[instrument(skip_all, fields(monitor = %monitor.name, network = %monitor_match.network_slug()))]
	pub async fn dispatch(&self, monitor: &Monitor, monitor_match: &MonitorMatch) -> DispatchReport {
		let mut report = DispatchReport::default();

		for name in &monitor.triggers {
			let result = self.run_trigger(name, monitor, monitor_match).await;
			if let Err(e) = &result {
				tracing::warn!(trigger = %name, error = %e, "Trigger delivery failed");
			}
			report.results.push(TriggerOutcome {
				trigger: name.clone(),
				result,
			});
		}

		report
	}

	async fn run_trigger(
		&self,
		name: &str,
		monitor: &Monitor,
		monitor_match: &MonitorMatch,
	) -> Result<(), TriggerError> {
		let metadata = || {
			Some(HashMap::from([
				("trigger".to_string(), name.to_string()),
				("monitor".to_string(), monitor.name.clone()),
				(
					"network".to_string(),
					monitor_match.network_slug().to_string(),
				),
			]))
		};

		let trigger = self.triggers.get(name).ok_or_else(|| {
			TriggerError::not_found(format!("Unknown trigger {}", name), None, metadata())
		})?;

		if let TriggerTypeConfig::Script { .. } = trigger.config {
			let notifier = ScriptNotifier::from_config(&trigger.config).ok_or_else(|| {
				TriggerError::configuration_error("Invalid script trigger", None, metadata())
			})?;
			return notifier
				.notify(monitor_match, &self.scripts)
				.await
				.map_err(|e| {
					TriggerError::execution_error(
						format!("Script trigger failed: {}", e),
						Some(Box::new(e)),
						metadata(),
					)
				});
		}

		let template = trigger.config.message().ok_or_else(|| {
			TriggerError::configuration_error("Trigger has no message template", None, metadata())
		})?;
		let context = build_context(monitor, monitor_match, trigger);
		let message = render_message(template, &context);

		let notifier = self.notifiers.create(trigger).map_err(|e| {
			TriggerError::configuration_error(
				"Failed to create notifier",
				Some(Box::new(e)),
				metadata(),
			)
		})?;
		notifier.send(&message).await.map_err(|e| {
			TriggerError::execution_error("Notification failed", Some(Box::new(e)), metadata())
		})
	}
}
