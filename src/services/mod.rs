//! Core services implementing the monitoring pipeline.
//!
//! - `blockchain`: RPC clients, the endpoint pool and the block fetcher
//! - `blockwatcher`: per-network scheduling, progress tracking and checkpoint storage
//! - `filter`: condition evaluation against blocks
//! - `notification`: notification channels
//! - `trigger`: ordered trigger dispatch for matches

pub mod blockchain;
pub mod blockwatcher;
pub mod filter;
pub mod notification;
pub mod trigger;
