//! Monitor configuration repository implementation.
//!
//! Monitors are only accepted once every network and trigger they reference exists and
//! every expression they carry refers to declared parameters. Scripts used by monitors
//! and their triggers are read here, once, into the shared script map.

use std::{collections::HashMap, marker::PhantomData, path::Path};

use crate::{
	models::{ConfigLoader, Monitor, Network, Trigger, TriggerTypeConfig},
	repositories::{
		error::RepositoryError,
		network::{NetworkRepositoryTrait, NetworkService},
		trigger::{TriggerRepositoryTrait, TriggerService},
	},
	services::filter::validate_monitor,
	utils::script::ScriptMap,
};

/// Repository for storing and retrieving monitor configurations
#[derive(Clone)]
pub struct MonitorRepository<N: NetworkRepositoryTrait, T: TriggerRepositoryTrait> {
	/// Map of monitor names to their configurations
	pub monitors: HashMap<String, Monitor>,
	_network_repository: PhantomData<N>,
	_trigger_repository: PhantomData<T>,
}

impl<N: NetworkRepositoryTrait, T: TriggerRepositoryTrait> MonitorRepository<N, T> {
	pub fn new(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<Self, RepositoryError> {
		let monitors =
			<Self as MonitorRepositoryTrait<N, T>>::load_all(path, network_service, trigger_service)?;
		Ok(Self::new_with_monitors(monitors))
	}

	pub fn new_with_monitors(monitors: HashMap<String, Monitor>) -> Self {
		MonitorRepository {
			monitors,
			_network_repository: PhantomData,
			_trigger_repository: PhantomData,
		}
	}

	/// Checks every monitor against the loaded networks and triggers.
	///
	/// All problems are collected and reported together.
	pub fn validate_monitor_references(
		monitors: &HashMap<String, Monitor>,
		triggers: &HashMap<String, Trigger>,
		networks: &HashMap<String, Network>,
	) -> Result<(), RepositoryError> {
		let mut validation_errors = Vec::new();

		let mut names: Vec<_> = monitors.keys().collect();
		names.sort();

		for name in names {
			let monitor = &monitors[name];

			for trigger in &monitor.triggers {
				if !triggers.contains_key(trigger) {
					validation_errors.push(format!(
						"Monitor '{}' references non-existent trigger '{}'",
						name, trigger
					));
				}
			}

			for network in &monitor.networks {
				if !networks.contains_key(network) {
					validation_errors.push(format!(
						"Monitor '{}' references non-existent network '{}'",
						name, network
					));
				}
			}

			if let Err(e) = validate_monitor(monitor) {
				validation_errors.push(format!("Monitor '{}': {}", name, e));
			}
		}

		if !validation_errors.is_empty() {
			return Err(RepositoryError::validation_error(
				format!(
					"Configuration validation failed:\n{}",
					validation_errors.join("\n")
				),
				None,
				None,
			));
		}

		Ok(())
	}
}

/// Interface for monitor repository implementations
pub trait MonitorRepositoryTrait<N: NetworkRepositoryTrait, T: TriggerRepositoryTrait>:
	Clone
{
	fn new(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<Self, RepositoryError>
	where
		Self: Sized;

	/// Load every monitor in `path` (`config/monitors` when `None`) and check its
	/// references. Networks and triggers are loaded from their default directories when
	/// no service is given.
	fn load_all(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<HashMap<String, Monitor>, RepositoryError>;

	fn get(&self, monitor_name: &str) -> Option<Monitor>;

	fn get_all(&self) -> HashMap<String, Monitor>;
}

impl<N: NetworkRepositoryTrait, T: TriggerRepositoryTrait> MonitorRepositoryTrait<N, T>
	for MonitorRepository<N, T>
{
	fn new(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<Self, RepositoryError> {
		MonitorRepository::new(path, network_service, trigger_service)
	}

	fn load_all(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<HashMap<String, Monitor>, RepositoryError> {
		let monitors: HashMap<String, Monitor> = Monitor::load_all(path).map_err(|e| {
			RepositoryError::load_error("Failed to load monitors", Some(Box::new(e)), None)
		})?;

		let networks = match network_service {
			Some(service) => service.get_all(),
			None => N::load_all(None)?,
		};
		let triggers = match trigger_service {
			Some(service) => service.get_all(),
			None => T::load_all(None)?,
		};

		Self::validate_monitor_references(&monitors, &triggers, &networks)?;
		Ok(monitors)
	}

	fn get(&self, monitor_name: &str) -> Option<Monitor> {
		self.monitors.get(monitor_name).cloned()
	}

	fn get_all(&self) -> HashMap<String, Monitor> {
		self.monitors.clone()
	}
}

/// Service layer for monitor repository operations
#[derive(Clone)]
pub struct MonitorService<
	M: MonitorRepositoryTrait<N, T>,
	N: NetworkRepositoryTrait,
	T: TriggerRepositoryTrait,
> {
	repository: M,
	_network_repository: PhantomData<N>,
	_trigger_repository: PhantomData<T>,
}

impl<M: MonitorRepositoryTrait<N, T>, N: NetworkRepositoryTrait, T: TriggerRepositoryTrait>
	MonitorService<M, N, T>
{
	pub fn new(
		path: Option<&Path>,
		network_service: Option<NetworkService<N>>,
		trigger_service: Option<TriggerService<T>>,
	) -> Result<Self, RepositoryError> {
		let repository = M::new(path, network_service, trigger_service)?;
		Ok(Self::new_with_repository(repository))
	}

	pub fn new_with_repository(repository: M) -> Self {
		MonitorService {
			repository,
			_network_repository: PhantomData,
			_trigger_repository: PhantomData,
		}
	}

	pub fn get(&self, monitor_name: &str) -> Option<Monitor> {
		self.repository.get(monitor_name)
	}

	pub fn get_all(&self) -> HashMap<String, Monitor> {
		self.repository.get_all()
	}

	/// Reads every filter script of the monitors and every script trigger they use
	pub fn load_scripts(
		&self,
		triggers: &HashMap<String, Trigger>,
	) -> Result<ScriptMap, RepositoryError> {
		let mut scripts = ScriptMap::new();

		for monitor in self.get_all().values() {
			let filter_scripts = monitor
				.trigger_conditions
				.iter()
				.map(|c| (c.language, c.script_path.as_str()));
			let trigger_scripts = monitor
				.triggers
				.iter()
				.filter_map(|name| triggers.get(name))
				.filter_map(|trigger| match &trigger.config {
					TriggerTypeConfig::Script {
						language,
						script_path,
						..
					} => Some((*language, script_path.as_str())),
					_ => None,
				});

			for (language, path) in filter_scripts.chain(trigger_scripts) {
				if scripts.contains_key(path) {
					continue;
				}
				let content = std::fs::read_to_string(path).map_err(|e| {
					RepositoryError::load_error(
						format!("Failed to read script {}", path),
						Some(Box::new(e)),
						Some(HashMap::from([
							("monitor".to_string(), monitor.name.clone()),
							("script".to_string(), path.to_string()),
						])),
					)
				})?;
				scripts.insert(path.to_string(), (language, content));
			}
		}

		tracing::debug!(count = scripts.len(), "Loaded scripts");
		Ok(scripts)
	}
}
