//! Test helper utilities
//!
//! - `builders`: Test helper utilities for creating test instances of models

pub mod builders {
	// Chain specific test helpers
	pub mod evm;
	pub mod stellar;

	// Chain agnostic test helpers
	pub mod monitor;
	pub mod network;
	pub mod trigger;
}

pub use builders::*;
pub use builders::{monitor::MonitorBuilder, network::NetworkBuilder, trigger::TriggerBuilder};
