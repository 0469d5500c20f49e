//! Network configuration repository implementation.
//!
//! Loads network definitions (RPC endpoints, block timing, schedule) from JSON files.

use std::{collections::HashMap, path::Path};

use crate::{
	models::{ConfigLoader, Network},
	repositories::error::RepositoryError,
};

/// Repository for storing and retrieving network configurations
#[derive(Clone)]
pub struct NetworkRepository {
	/// Map of network slugs to their configurations
	pub networks: HashMap<String, Network>,
}

impl NetworkRepository {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let networks = <Self as NetworkRepositoryTrait>::load_all(path)?;
		Ok(NetworkRepository { networks })
	}
}

/// Interface for network repository implementations
pub trait NetworkRepositoryTrait: Clone {
	fn new(path: Option<&Path>) -> Result<Self, RepositoryError>
	where
		Self: Sized;

	/// Load every network in `path` (`config/networks` when `None`)
	fn load_all(path: Option<&Path>) -> Result<HashMap<String, Network>, RepositoryError>;

	fn get(&self, network_slug: &str) -> Option<Network>;

	fn get_all(&self) -> HashMap<String, Network>;
}

impl NetworkRepositoryTrait for NetworkRepository {
	fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		NetworkRepository::new(path)
	}

	fn load_all(path: Option<&Path>) -> Result<HashMap<String, Network>, RepositoryError> {
		Network::load_all(path).map_err(|e| {
			RepositoryError::load_error("Failed to load networks", Some(Box::new(e)), None)
		})
	}

	fn get(&self, network_slug: &str) -> Option<Network> {
		self.networks.get(network_slug).cloned()
	}

	fn get_all(&self) -> HashMap<String, Network> {
		self.networks.clone()
	}
}

/// Service layer for network repository operations
#[derive(Clone)]
pub struct NetworkService<T: NetworkRepositoryTrait> {
	repository: T,
}

impl<T: NetworkRepositoryTrait> NetworkService<T> {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		Ok(NetworkService {
			repository: T::new(path)?,
		})
	}

	pub fn new_with_repository(repository: T) -> Self {
		NetworkService { repository }
	}

	pub fn get(&self, network_slug: &str) -> Option<Network> {
		self.repository.get(network_slug)
	}

	pub fn get_all(&self) -> HashMap<String, Network> {
		self.repository.get_all()
	}
}
