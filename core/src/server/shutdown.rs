//! Lifetime control of the API server.
//!
//! Two independent sources can end a run: the request budget, which fires a
//! [`ShutdownTrigger`], and the wall-clock deadline. [`wait_for_shutdown`]
//! resolves on whichever comes first. [`drain`] then bounds the graceful phase.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The configured number of requests has been served.
    RequestBudget,
    /// The server lifetime elapsed first.
    Timeout,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::RequestBudget => write!(f, "request budget spent"),
            ShutdownReason::Timeout => write!(f, "timeout elapsed"),
        }
    }
}

/// One-shot signal raised when the request budget is spent.
///
/// Firing before anyone waits is not lost: the permit is kept until
/// [`wait_for_shutdown`] consumes it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownTrigger {
    notify: Arc<Notify>,
}

impl ShutdownTrigger {
    pub fn fire(&self) {
        self.notify.notify_one();
    }

    pub fn fire_after(&self, delay: Duration) {
        let trigger: ShutdownTrigger = self.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            trigger.fire();
        });
    }
}

pub async fn wait_for_shutdown(trigger: &ShutdownTrigger, deadline: Instant) -> ShutdownReason {
    tokio::select! {
        _ = trigger.notify.notified() => ShutdownReason::RequestBudget,
        _ = sleep_until(deadline) => ShutdownReason::Timeout,
    }
}

/// Waits up to `grace` for every connection to finish, then aborts the rest.
///
/// Returns only once all connection tasks are gone, so no socket outlives it.
pub async fn drain(mut connections: JoinSet<()>, grace: Duration) {
    let finished = timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if finished.is_ok() {
        debug!("Connections drained gracefully");
        return;
    }

    warn!(
        "{} connection(s) still open after {grace:?}, forcing close",
        connections.len()
    );
    connections.shutdown().await;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot::error::TryRecvError;

    #[tokio::test(start_paused = true)]
    async fn deadline_should_win_without_trigger() {
        let trigger: ShutdownTrigger = ShutdownTrigger::default();
        let started: Instant = Instant::now();

        let reason: ShutdownReason =
            wait_for_shutdown(&trigger, started + Duration::from_millis(200)).await;

        assert_eq!(reason, ShutdownReason::Timeout);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_fired_early_should_not_be_lost() {
        let trigger: ShutdownTrigger = ShutdownTrigger::default();
        trigger.fire();

        let reason: ShutdownReason =
            wait_for_shutdown(&trigger, Instant::now() + Duration::from_secs(5)).await;

        assert_eq!(reason, ShutdownReason::RequestBudget);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_trigger_should_beat_later_deadline() {
        let trigger: ShutdownTrigger = ShutdownTrigger::default();
        let started: Instant = Instant::now();
        trigger.fire_after(Duration::from_millis(100));

        let reason: ShutdownReason =
            wait_for_shutdown(&trigger, started + Duration::from_secs(5)).await;

        assert_eq!(reason, ShutdownReason::RequestBudget);
        let elapsed: Duration = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn drain_should_abort_stuck_connections() {
        let mut connections: JoinSet<()> = JoinSet::new();
        let (held_tx, mut held_rx) = tokio::sync::oneshot::channel::<()>();
        connections.spawn(async move {
            let _held = held_tx;
            sleep(Duration::from_secs(3600)).await;
        });
        let started: Instant = Instant::now();

        drain(connections, Duration::from_secs(1)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(
            matches!(held_rx.try_recv(), Err(TryRecvError::Closed)),
            "connection task survived the drain"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drain_should_wait_for_finishing_connections() {
        let mut connections: JoinSet<()> = JoinSet::new();
        connections.spawn(sleep(Duration::from_millis(300)));
        let started: Instant = Instant::now();

        drain(connections, Duration::from_secs(1)).await;

        let elapsed: Duration = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(1));
    }
}
