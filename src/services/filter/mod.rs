//! Condition evaluation.
//!
//! Implements the matching side of the pipeline:
//! - Expression parsing and evaluation over decoded arguments
//! - Block filters for EVM and Stellar
//! - The filter script stage and load-time expression validation

mod error;
mod filters;
mod validation;

pub mod expression;

pub use error::FilterError;
pub use filters::{
	evm::{evm_value_kind, helpers as evm_helpers, EVMArgsEvaluator},
	stellar::{helpers as stellar_helpers, stellar_value_kind, StellarArgsEvaluator},
	BlockEvaluation, EVMBlockFilter, FilterService, StellarBlockFilter,
};
pub use validation::validate_monitor;
