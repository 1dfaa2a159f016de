//! # Subnet Resolution
//!
//! Picks the IPv4 subnet to scan from the host's network interfaces: the first
//! interface that is up, is not a loopback device and carries an IPv4 address.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

use crate::error::DiscoveryError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is administratively down.
    IsDown,
    IsLoopback,
    /// The interface carries no IPv4 address.
    NoIpv4,
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Resolves the subnet of the first usable interface on this host.
pub fn resolve_local_subnet() -> Result<Ipv4Network, DiscoveryError> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    debug!("Identified {} network interface(s)", interfaces.len());
    select_subnet(&interfaces).ok_or(DiscoveryError::NoInterfaceFound)
}

/// Returns the first IPv4 network of the first viable interface, in the order given.
pub fn select_subnet(interfaces: &[NetworkInterface]) -> Option<Ipv4Network> {
    interfaces
        .iter()
        .find_map(|interface| match scan_network_of(interface) {
            Ok(net) => {
                debug!("Selected interface {} ({})", interface.name, net);
                Some(net)
            }
            Err(reason) => {
                debug!("Skipping interface {}: {:?}", interface.name, reason);
                None
            }
        })
}

fn scan_network_of(interface: &NetworkInterface) -> Result<Ipv4Network, ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    interface
        .get_ipv4_nets()
        .into_iter()
        .next()
        .ok_or(ViabilityError::NoIpv4)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
