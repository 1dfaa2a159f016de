//! Shared building blocks for the `discover` workspace.
//!
//! * [`config`]: runtime configuration and the `discover://` invocation grammar.
//! * [`error`]: the error taxonomy shared by the scanner and the API server.
//! * [`network`]: address ranges, endpoints and local subnet resolution.

pub mod config;
pub mod error;
pub mod network;
