//! # Runtime Configuration
//!
//! The tool takes a single optional argument. When it is a `discover://` URI the
//! query string may override the scan port, the API port and whether the API is
//! served at all:
//!
//! ```text
//! discover://<ignored-host>?port=<scanPort>&serve=<true|false>&apiPort=<apiPort>
//! ```
//!
//! Anything that does not parse falls back to the defaults, field by field.

use std::time::Duration;

use tracing::debug;
use url::Url;

pub const URI_SCHEME_PREFIX: &str = "discover://";

pub const DEFAULT_SCAN_PORT: u16 = 3000;
pub const DEFAULT_API_PORT: u16 = 7370;
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(1);
pub const MAX_API_REQUESTS: usize = 3;
pub const API_SERVER_TIMEOUT: Duration = Duration::from_secs(5);
/// Delay between reaching the request budget and starting the shutdown.
pub const SHUTDOWN_DELAY: Duration = Duration::from_millis(100);
/// Grace period for in-flight connections once the shutdown has started.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port probed on every host of the subnet.
    pub scan_port: u16,
    /// Port the bounded API server listens on.
    pub api_port: u16,
    /// Serve the result over HTTP once the scan completes.
    pub serve: bool,
    /// Upper bound on concurrent probes. `None` probes every address at once.
    pub max_in_flight: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_port: DEFAULT_SCAN_PORT,
            api_port: DEFAULT_API_PORT,
            serve: false,
            max_in_flight: None,
        }
    }
}

impl Config {
    /// Builds a configuration from the optional positional argument.
    ///
    /// Surrounding quote characters are stripped first. Arguments that are not
    /// `discover://` URIs, or that fail to parse, yield the defaults.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let mut cfg = Self::default();
        let Some(arg) = arg else {
            return cfg;
        };

        let arg: &str = arg.trim_matches(|c: char| c == '"' || c == '\'');
        if !arg.starts_with(URI_SCHEME_PREFIX) {
            debug!("Argument is not a discover URI, using defaults");
            return cfg;
        }

        let uri: Url = match Url::parse(arg) {
            Ok(uri) => uri,
            Err(e) => {
                debug!("Unparseable discover URI ({e}), using defaults");
                return cfg;
            }
        };

        if let Some(port) = query_value(&uri, "port").and_then(|p| p.parse::<u16>().ok()) {
            cfg.scan_port = port;
        }
        if query_value(&uri, "serve").as_deref() == Some("true") {
            cfg.serve = true;
        }
        if let Some(port) = query_value(&uri, "apiPort").and_then(|p| p.parse::<u16>().ok()) {
            cfg.api_port = port;
        }

        cfg
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            port: self.scan_port,
            max_in_flight: self.max_in_flight,
            ..ScanOptions::default()
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            port: self.api_port,
            ..ServerOptions::default()
        }
    }
}

/// First non-empty value of `key` in the query string.
fn query_value(uri: &Url, key: &str) -> Option<String> {
    uri.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Knobs for a single subnet scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub port: u16,
    /// Per-probe connect timeout.
    pub timeout: Duration,
    pub max_in_flight: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_SCAN_PORT,
            timeout: SCAN_TIMEOUT,
            max_in_flight: None,
        }
    }
}

/// Lifetime policy of the bounded API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub port: u16,
    /// Number of counted `GET` requests after which the server winds down.
    pub max_requests: usize,
    /// Wall-clock lifetime measured from server start.
    pub timeout: Duration,
    pub shutdown_delay: Duration,
    pub shutdown_grace: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_API_PORT,
            max_requests: MAX_API_REQUESTS,
            timeout: API_SERVER_TIMEOUT,
            shutdown_delay: SHUTDOWN_DELAY,
            shutdown_grace: SHUTDOWN_TIMEOUT,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
