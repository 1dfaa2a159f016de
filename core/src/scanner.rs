//! # Concurrent Subnet Scanner
//!
//! Fans out one probe per address of a subnet and fans the hits back in.
//!
//! Every address between the network and the broadcast address (both included)
//! is probed. Probes run in parallel, each bounded by its own timeout, and the
//! scan only returns once all of them have reported. A failed probe is not an
//! error, the host is simply left out of the [`DiscoveryResult`].
//!
//! The transport used to probe a host sits behind the [`Prober`] trait so the
//! fan-out logic can be exercised against synthetic subnets.

use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discover_common::config::ScanOptions;
use discover_common::error::DiscoveryError;
use discover_common::network::endpoint::DiscoveredEndpoint;
use discover_common::network::interface;
use discover_common::network::range::{self, Ipv4Range};
use pnet::ipnetwork::Ipv4Network;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::discovery::DiscoveryResult;
use crate::network::tcp::TcpProber;

/// Decides whether a single target is reachable.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Returns `true` when `target` accepted a connection within `timeout`.
    async fn probe(&self, target: SocketAddrV4, timeout: Duration) -> bool;
}

/// Resolves the local subnet and scans it with TCP handshakes.
pub async fn discover_local(options: &ScanOptions) -> Result<DiscoveryResult, DiscoveryError> {
    let subnet: Ipv4Network = interface::resolve_local_subnet()?;
    Ok(scan(subnet, options).await)
}

pub async fn scan(subnet: Ipv4Network, options: &ScanOptions) -> DiscoveryResult {
    scan_with(subnet, options, Arc::new(TcpProber)).await
}

/// Probes every address of `subnet` on `options.port` using `prober`.
pub async fn scan_with<P: Prober>(
    subnet: Ipv4Network,
    options: &ScanOptions,
    prober: Arc<P>,
) -> DiscoveryResult {
    let targets: Ipv4Range = range::subnet_range(subnet);
    info!(
        "Scanning subnet: {}/{} for port {}...",
        subnet.network(),
        subnet.prefix(),
        options.port
    );
    debug!("{} addresses to probe", targets.len());

    let limiter: Option<Arc<Semaphore>> = options
        .max_in_flight
        .map(|cap| Arc::new(Semaphore::new(cap.max(1))));

    let mut probes: JoinSet<Option<DiscoveredEndpoint>> = JoinSet::new();
    for ip in targets.to_iter() {
        let target: SocketAddrV4 = SocketAddrV4::new(ip, options.port);
        let prober: Arc<P> = Arc::clone(&prober);
        let limiter: Option<Arc<Semaphore>> = limiter.clone();
        let probe_timeout: Duration = options.timeout;

        probes.spawn(async move {
            let _permit: Option<OwnedSemaphorePermit> = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            prober
                .probe(target, probe_timeout)
                .await
                .then(|| DiscoveredEndpoint::from(target))
        });
    }

    // Only this loop touches `found`, so hits are merged by a single writer.
    let mut found: Vec<DiscoveredEndpoint> = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(Some(endpoint)) => {
                info!("Active server found: {endpoint}");
                found.push(endpoint);
            }
            Ok(None) => {}
            Err(e) => warn!("Probe task failed: {e}"),
        }
    }

    found.into_iter().collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
