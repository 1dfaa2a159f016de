//! # Bounded API Server
//!
//! Publishes a [`DiscoveryResult`] over HTTP for a limited lifetime.
//!
//! # Endpoints
//!
//! - `GET /getIP` - the discovered endpoints as a JSON array of `"ip:port"` strings
//! - `OPTIONS *` - CORS preflight, answered with `200` and never counted
//!
//! The server winds down after `max_requests` counted requests (plus a short
//! delay so the last response can flush) or once `timeout` has elapsed since
//! start, whichever comes first. Shutdown is graceful within
//! `shutdown_grace`, after which the connections still open are aborted.

mod connections;
mod handlers;
mod routes;
mod shutdown;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use discover_common::config::ServerOptions;
use discover_common::error::DiscoveryError;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::discovery::DiscoveryResult;
pub use shutdown::{ShutdownReason, ShutdownTrigger};

/// Shared state of one server run.
pub struct ApiState {
    result: Arc<DiscoveryResult>,
    /// `result` encoded once; every response is identical.
    body: String,
    requests: AtomicUsize,
    max_requests: usize,
    budget_reached: AtomicBool,
    shutdown_delay: Duration,
    trigger: ShutdownTrigger,
}

impl ApiState {
    fn new(result: Arc<DiscoveryResult>, options: &ServerOptions) -> Result<Self, DiscoveryError> {
        let body: String = result.to_json()?;
        Ok(Self {
            result,
            body,
            requests: AtomicUsize::new(0),
            max_requests: options.max_requests,
            budget_reached: AtomicBool::new(false),
            shutdown_delay: options.shutdown_delay,
            trigger: ShutdownTrigger::default(),
        })
    }

    /// Counts one request and schedules the shutdown once the budget is spent.
    fn record_request(&self) -> usize {
        let count: usize = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.max_requests && !self.budget_reached.swap(true, Ordering::SeqCst) {
            info!("Max requests reached. Shutting down...");
            self.trigger.fire_after(self.shutdown_delay);
        }
        count
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Outcome of a completed server run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub reason: ShutdownReason,
    /// Counted requests, preflights excluded.
    pub requests: usize,
}

pub struct BoundedApiServer {
    listener: TcpListener,
    state: Arc<ApiState>,
    options: ServerOptions,
}

impl BoundedApiServer {
    /// Binds the listener without serving yet.
    pub async fn bind(
        addr: SocketAddr,
        result: impl Into<Arc<DiscoveryResult>>,
        options: ServerOptions,
    ) -> Result<Self, DiscoveryError> {
        let listener: TcpListener = TcpListener::bind(addr)
            .await
            .map_err(|source| DiscoveryError::Bind { addr, source })?;
        let state: ApiState = ApiState::new(result.into(), &options)?;

        Ok(Self {
            listener,
            state: Arc::new(state),
            options,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DiscoveryError> {
        self.listener.local_addr().map_err(DiscoveryError::Serve)
    }

    /// Serves until the request budget or the timeout ends the run.
    pub async fn run(self) -> Result<ShutdownReport, DiscoveryError> {
        let BoundedApiServer {
            listener,
            state,
            options,
        } = self;
        let deadline: Instant = Instant::now() + options.timeout;

        announce(&listener, &state, &options);

        let app: Router = routes::build_router(Arc::clone(&state));
        let (stop_tx, stop_rx) = watch::channel::<bool>(false);
        let server: JoinHandle<()> = tokio::spawn(connections::serve_connections(
            listener,
            app,
            stop_rx,
            options.shutdown_grace,
        ));

        let reason: ShutdownReason = shutdown::wait_for_shutdown(&state.trigger, deadline).await;
        info!("Shutting down ({reason})");
        let _ = stop_tx.send(true);
        server
            .await
            .map_err(|e| DiscoveryError::Serve(std::io::Error::other(e)))?;

        info!("Server stopped.");
        Ok(ShutdownReport {
            reason,
            requests: state.requests(),
        })
    }
}

/// Binds on all interfaces at `options.port` and serves `result` until shutdown.
pub async fn serve(
    result: DiscoveryResult,
    options: &ServerOptions,
) -> Result<ShutdownReport, DiscoveryError> {
    let addr: SocketAddr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, options.port));
    let server: BoundedApiServer = BoundedApiServer::bind(addr, result, *options).await?;
    server.run().await
}

fn announce(listener: &TcpListener, state: &ApiState, options: &ServerOptions) {
    match listener.local_addr() {
        Ok(addr) => info!("API server started on port {}", addr.port()),
        Err(_) => info!("API server started"),
    }

    if state.result.is_empty() {
        info!("No IPs discovered - will return empty array");
    } else {
        let listed: Vec<String> = state.result.iter().map(ToString::to_string).collect();
        info!("Discovered IPs: [{}]", listed.join(", "));
    }

    info!(
        "Waiting for up to {} requests or {:?} timeout...",
        options.max_requests, options.timeout
    );
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
