#![cfg(test)]
use discover_common::config::{ScanOptions, ServerOptions};
use discover_core::discovery::DiscoveryResult;
use discover_core::scanner;
use discover_core::server::{BoundedApiServer, ShutdownReason, ShutdownReport};
use pnet::ipnetwork::Ipv4Network;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;

/// Full pipeline: scan loopback, hand the frozen result to the server, read it back.
#[tokio::test(flavor = "multi_thread")]
async fn scanned_result_is_served_until_budget_is_spent() -> anyhow::Result<()> {
    let service: TcpListener = TcpListener::bind("127.0.0.1:0").await?;
    let service_port: u16 = service.local_addr()?.port();

    let subnet: Ipv4Network = Ipv4Network::new(Ipv4Addr::LOCALHOST, 32)?;
    let scan: ScanOptions = ScanOptions {
        port: service_port,
        timeout: Duration::from_millis(500),
        max_in_flight: None,
    };
    let result: DiscoveryResult = scanner::scan(subnet, &scan).await;
    assert_eq!(result.len(), 1);

    let options: ServerOptions = ServerOptions {
        port: 0,
        max_requests: 2,
        timeout: Duration::from_secs(10),
        shutdown_delay: Duration::from_millis(50),
        shutdown_grace: Duration::from_secs(1),
    };
    let server: BoundedApiServer =
        BoundedApiServer::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)), result, options).await?;
    let url: String = format!("http://{}/getIP", server.local_addr()?);
    let handle = tokio::spawn(server.run());

    let http: reqwest::Client = reqwest::Client::builder().no_proxy().build()?;
    let expected: Vec<String> = vec![format!("127.0.0.1:{service_port}")];
    for _ in 0..2 {
        let body: Vec<String> = http.get(&url).send().await?.json().await?;
        assert_eq!(body, expected);
    }

    let report: ShutdownReport = tokio::time::timeout(Duration::from_secs(5), handle).await???;
    assert_eq!(report.reason, ShutdownReason::RequestBudget);
    assert_eq!(report.requests, 2);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stopped_server_refuses_connections() -> anyhow::Result<()> {
    let options: ServerOptions = ServerOptions {
        port: 0,
        max_requests: 3,
        timeout: Duration::from_millis(150),
        shutdown_delay: Duration::from_millis(10),
        shutdown_grace: Duration::from_millis(200),
    };
    let loopback: SocketAddr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    let server: BoundedApiServer =
        BoundedApiServer::bind(loopback, DiscoveryResult::empty(), options).await?;
    let url: String = format!("http://{}/getIP", server.local_addr()?);

    let report: ShutdownReport = server.run().await?;
    assert_eq!(report.reason, ShutdownReason::Timeout);

    let http: reqwest::Client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(2))
        .build()?;
    let after = http.get(&url).send().await;
    assert!(after.is_err(), "server still answering after shutdown");

    Ok(())
}
