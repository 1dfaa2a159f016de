//! Accept loop that owns every connection task.
//!
//! Each accepted socket is served on its own task inside a [`JoinSet`], so
//! when the grace period runs out the tasks can be aborted and their sockets
//! dropped along with them.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Extension, Router, extract::ConnectInfo};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::shutdown;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Serves `app` until `stop` flips, then stops accepting and drains the
/// open connections within `grace`.
///
/// The listener is dropped before draining, so new connections are refused
/// for the whole graceful phase.
pub async fn serve_connections(
    listener: TcpListener,
    app: Router,
    mut stop: watch::Receiver<bool>,
    grace: Duration,
) {
    let mut connections: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    connections.spawn(serve_connection(stream, peer, app.clone(), stop.clone()));
                }
                Err(e) => {
                    warn!("Failed to accept connection: {e}");
                    sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    shutdown::drain(connections, grace).await;
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    app: Router,
    mut stop: watch::Receiver<bool>,
) {
    let service = TowerToHyperService::new(app.layer(Extension(ConnectInfo(peer))));
    let builder: Builder<TokioExecutor> = Builder::new(TokioExecutor::new());
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let served = tokio::select! {
        served = connection.as_mut() => served,
        _ = stop.changed() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = served {
        debug!("Connection from {peer} closed with error: {e}");
    }
}
