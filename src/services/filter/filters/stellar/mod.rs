//! Stellar filtering over JSON-rendered ledger data.

mod evaluator;
mod filter;
pub mod helpers;

pub use evaluator::{stellar_value_kind, StellarArgsEvaluator};
pub use filter::StellarBlockFilter;
