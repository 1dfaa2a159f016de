#![cfg(test)]
use discover_common::config::ScanOptions;
use discover_common::error::DiscoveryError;
use discover_common::network::endpoint::DiscoveredEndpoint;
use discover_common::network::interface;
use discover_core::discovery::DiscoveryResult;
use discover_core::scanner;
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpListener;

const IFF_UP: u32 = 1;
const IFF_LOOPBACK: u32 = 1 << 3;

fn ni(name: &str, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: "".into(),
        index: 0,
        mac: None,
        ips: ips.to_vec(),
        flags,
    }
}

fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

fn scan_options(port: u16) -> ScanOptions {
    ScanOptions {
        port,
        timeout: Duration::from_millis(500),
        max_in_flight: None,
    }
}

/// Resolves a subnet from mock interfaces and scans it for a real listener.
#[tokio::test]
async fn resolved_subnet_scan_finds_listener() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();

    let interfaces: Vec<NetworkInterface> = vec![
        ni("lo", &[v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK),
        ni("eth0", &[v4(127, 0, 0, 1, 32)], IFF_UP),
    ];
    let subnet: Ipv4Network = interface::select_subnet(&interfaces).expect("no subnet selected");

    let result: DiscoveryResult = scanner::scan(subnet, &scan_options(port)).await;

    assert_eq!(result.len(), 1);
    assert!(result.contains(&DiscoveredEndpoint::new(Ipv4Addr::LOCALHOST, port)));
    assert_eq!(result.to_json().unwrap(), format!("[\"127.0.0.1:{port}\"]"));
}

#[tokio::test]
async fn closed_port_yields_empty_result() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    drop(listener);

    let subnet: Ipv4Network = Ipv4Network::new(Ipv4Addr::LOCALHOST, 32).unwrap();
    let result: DiscoveryResult = scanner::scan(subnet, &scan_options(port)).await;

    assert!(result.is_empty());
    assert_eq!(result.to_json().unwrap(), "[]");
}

#[tokio::test]
async fn repeated_loopback_scans_agree() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    let subnet: Ipv4Network = Ipv4Network::new(Ipv4Addr::LOCALHOST, 32).unwrap();

    let first: DiscoveryResult = scanner::scan(subnet, &scan_options(port)).await;
    let second: DiscoveryResult = scanner::scan(subnet, &scan_options(port)).await;

    assert_eq!(first, second);
}

#[test]
fn only_loopback_interfaces_yield_no_subnet() {
    let interfaces: Vec<NetworkInterface> =
        vec![ni("lo", &[v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK)];
    assert!(interface::select_subnet(&interfaces).is_none());
}

/// Scans the real local subnet; depends on the host network.
#[tokio::test]
#[ignore]
async fn discover_local_runs_on_host_network() {
    let result: Result<DiscoveryResult, DiscoveryError> =
        scanner::discover_local(&scan_options(3000)).await;
    match result {
        Ok(found) => println!("Found {} endpoint(s)", found.len()),
        Err(DiscoveryError::NoInterfaceFound) => eprintln!("WARNING: no usable IPv4 interface"),
        Err(e) => panic!("unexpected error: {e}"),
    }
}
