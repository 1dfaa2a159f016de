use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that escape the discovery pipeline.
///
/// Individual probe failures are not represented here: a host that refuses or
/// times out is simply absent from the result.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No interface is up, non-loopback and carrying an IPv4 address.
    #[error("no active IPv4 interface found")]
    NoInterfaceFound,

    #[error("failed to bind API listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("API server error: {0}")]
    Serve(#[source] io::Error),

    #[error("failed to encode discovery result: {0}")]
    Encode(#[from] serde_json::Error),
}
