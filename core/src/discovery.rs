//! # Discovery Result
//!
//! The frozen outcome of one subnet scan.
//!
//! A [`DiscoveryResult`] is built once, when every probe has reported, and is
//! never mutated afterwards. The API server holds it behind an `Arc` and reads
//! it from every request handler without further synchronisation.

use std::collections::BTreeSet;

use discover_common::error::DiscoveryError;
use discover_common::network::endpoint::DiscoveredEndpoint;
use serde::Serialize;

/// Reachable endpoints, deduplicated and ordered by address.
///
/// Serializes as a JSON array of `"ip:port"` strings. An empty result is a
/// valid outcome and serializes as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscoveryResult {
    endpoints: Vec<DiscoveredEndpoint>,
}

impl DiscoveryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredEndpoint> {
        self.endpoints.iter()
    }

    pub fn contains(&self, endpoint: &DiscoveredEndpoint) -> bool {
        self.endpoints.binary_search(endpoint).is_ok()
    }

    pub fn to_json(&self) -> Result<String, DiscoveryError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FromIterator<DiscoveredEndpoint> for DiscoveryResult {
    fn from_iter<I: IntoIterator<Item = DiscoveredEndpoint>>(iter: I) -> Self {
        let unique: BTreeSet<DiscoveredEndpoint> = iter.into_iter().collect();
        Self {
            endpoints: unique.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DiscoveryResult {
    type Item = &'a DiscoveredEndpoint;
    type IntoIter = std::slice::Iter<'a, DiscoveredEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
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
