//! Blockchain monitoring library.
//!
//! Watches EVM and Stellar networks on a schedule, evaluates monitor conditions against
//! each confirmed block and fires the monitors' triggers in order.
//!
//! - `bootstrap`: wiring of services and network watchers
//! - `models`: configuration and blockchain data types
//! - `repositories`: configuration loading and cross validation
//! - `services`: the fetch, evaluate, dispatch and commit pipeline
//! - `utils`: logging, cron helpers, script execution and test builders

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
