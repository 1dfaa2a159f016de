use std::time::{Duration, Instant};

use discover_common::config::Config;
use discover_core::discovery::DiscoveryResult;
use discover_core::server::{self, ShutdownReport};
use discover_core::scanner;
use tracing::{debug, error};

use crate::terminal::print;

/// Scans the local subnet and, when asked to, serves the result.
///
/// Failing to find a usable interface aborts the run. A server that cannot
/// bind is reported but does not fail the command, the scan already ran.
pub async fn discover(cfg: &Config) -> anyhow::Result<()> {
    let start_time: Instant = Instant::now();
    let result: DiscoveryResult = scanner::discover_local(&cfg.scan_options()).await?;
    discovery_ends(&result, start_time.elapsed());

    if !cfg.serve {
        return Ok(());
    }

    print::header("starting api server");
    match server::serve(result, &cfg.server_options()).await {
        Ok(ShutdownReport { reason, requests }) => {
            debug!("Server ended after {requests} request(s): {reason}");
        }
        Err(e) => error!("Server error: {e}"),
    }
    Ok(())
}

fn discovery_ends(result: &DiscoveryResult, total_time: Duration) {
    if result.is_empty() {
        print::header("zero servers detected");
        print::no_results();
        return;
    }

    print::header("network discovery");
    print::endpoints(result);
    print::summary(result.len(), total_time);
}
