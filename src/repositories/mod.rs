//! Configuration repositories.
//!
//! - `network`: network definitions
//! - `trigger`: trigger definitions
//! - `monitor`: monitors, checked against the loaded networks and triggers

mod error;
mod monitor;
mod network;
mod trigger;

pub use error::RepositoryError;
pub use monitor::{MonitorRepository, MonitorRepositoryTrait, MonitorService};
pub use network::{NetworkRepository, NetworkRepositoryTrait, NetworkService};
pub use trigger::{TriggerRepository, TriggerRepositoryTrait, TriggerService};
