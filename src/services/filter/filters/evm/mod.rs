//! EVM filtering: ABI decoding, selector and topic matching.

mod evaluator;
mod filter;
pub mod helpers;

pub use evaluator::{evm_value_kind, EVMArgsEvaluator};
pub use filter::EVMBlockFilter;
