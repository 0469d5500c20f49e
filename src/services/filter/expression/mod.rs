//! Boolean expressions over decoded arguments.
//!
//! `amount > 1000 AND (to == 0xabc OR memo contains 'refund')`
//!
//! Parsing is chain agnostic; each network kind supplies a [`ConditionEvaluator`] that
//! resolves parameter names and maps declared types onto comparison categories.

mod ast;
mod error;
mod evaluation;
mod parsing;

pub use ast::{
	Accessor, ComparisonOperator, Condition, Expression, LiteralValue, LogicalOperator,
	VariablePath,
};
pub use error::EvaluationError;
pub use evaluation::{compare_values, evaluate, ConditionEvaluator, ValueKind};
pub use parsing::{parse, MAX_NESTING_DEPTH};
