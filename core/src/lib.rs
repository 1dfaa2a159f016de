//! Scanning and serving for `discover`.
//!
//! The pipeline is strictly linear: [`scanner`] probes the local subnet and
//! freezes its hits into a [`discovery::DiscoveryResult`], which [`server`] then
//! publishes over HTTP for a bounded lifetime.

pub mod discovery;
pub mod network;
pub mod scanner;
pub mod server;
