//! Utility modules for common functionality.
//!
//! - cron_utils: cron schedule intervals and the default look-back window
//! - logging: tracing setup and the structured error context
//! - script: filter and notification script execution
//! - tests: builders for test fixtures

mod cron_utils;

pub mod logging;
pub mod script;
pub mod tests;

pub use cron_utils::*;
