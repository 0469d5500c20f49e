//! Trigger configuration repository implementation.
//!
//! Loads trigger definitions (channel kind, channel settings, message template) from
//! JSON files keyed by trigger name.

use std::{collections::HashMap, path::Path};

use crate::{
	models::{ConfigLoader, Trigger},
	repositories::error::RepositoryError,
};

/// Repository for storing and retrieving trigger configurations
#[derive(Clone)]
pub struct TriggerRepository {
	/// Map of trigger names to their configurations
	pub triggers: HashMap<String, Trigger>,
}

impl TriggerRepository {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let triggers = <Self as TriggerRepositoryTrait>::load_all(path)?;
		Ok(TriggerRepository { triggers })
	}
}

/// Interface for trigger repository implementations
pub trait TriggerRepositoryTrait: Clone {
	fn new(path: Option<&Path>) -> Result<Self, RepositoryError>
	where
		Self: Sized;

	/// Load every trigger in `path` (`config/triggers` when `None`)
	fn load_all(path: Option<&Path>) -> Result<HashMap<String, Trigger>, RepositoryError>;

	fn get(&self, trigger_name: &str) -> Option<Trigger>;

	fn get_all(&self) -> HashMap<String, Trigger>;
}

impl TriggerRepositoryTrait for TriggerRepository {
	fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		TriggerRepository::new(path)
	}

	fn load_all(path: Option<&Path>) -> Result<HashMap<String, Trigger>, RepositoryError> {
		Trigger::load_all(path).map_err(|e| {
			RepositoryError::load_error("Failed to load triggers", Some(Box::new(e)), None)
		})
	}

	fn get(&self, trigger_name: &str) -> Option<Trigger> {
		self.triggers.get(trigger_name).cloned()
	}

	fn get_all(&self) -> HashMap<String, Trigger> {
		self.triggers.clone()
	}
}

/// Service layer for trigger repository operations
#[derive(Clone)]
pub struct TriggerService<T: TriggerRepositoryTrait> {
	repository: T,
}

impl<T: TriggerRepositoryTrait> TriggerService<T> {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		Ok(TriggerService {
			repository: T::new(path)?,
		})
	}

	pub fn new_with_repository(repository: T) -> Self {
		TriggerService { repository }
	}

	pub fn get(&self, trigger_name: &str) -> Option<Trigger> {
		self.repository.get(trigger_name)
	}

	pub fn get_all(&self) -> HashMap<String, Trigger> {
		self.repository.get_all()
	}
}
