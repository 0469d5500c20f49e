//! Trigger service implementation.
//!
//! Triggers are the notification actions a monitor fires when it matches. This module
//! renders their message templates and runs them through the notification channels.

mod error;
mod service;
mod template;

pub use error::TriggerError;
pub use service::{DispatchReport, TriggerExecutionService, TriggerOutcome};
pub use template::{build_context, render, render_message};
