//! Block watcher service implementation.
//!
//! Schedules one watch cycle per network, tracks per-network progress and persists the
//! checkpoint after each fully dispatched range.

mod error;
mod service;
mod storage;
mod tracker;

pub use error::BlockWatcherError;
pub use service::{
	BlockWatcherService, CycleOutcome, JobSchedulerTrait, NetworkWatcher, WatcherState,
};
pub use storage::{BlockStorage, FileBlockStorage};
pub use tracker::{plan_range, BlockRange, ProgressTracker};
