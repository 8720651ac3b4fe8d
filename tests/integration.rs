//! Integration tests for fleetgrep
//!
//! Boots real query nodes on loopback ports and drives the coordinator
//! through the full gRPC path.

use fleetgrep::common::NodeDescriptor;
use fleetgrep::coordinator::GrpcNodeTransport;
use fleetgrep::node::{GrepEngine, LogQueryService};
use fleetgrep::Dispatcher;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Bind an ephemeral port, then release it for the node to take over.
fn free_port_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn start_node(machine_id: &str, log_dir: &Path) -> SocketAddr {
    let addr = free_port_addr();
    let service = LogQueryService::new(
        machine_id.to_string(),
        log_dir.join(format!("machine.{}.log", machine_id)),
        GrepEngine::new(),
    );

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service.into_server())
            .serve(addr)
            .await
            .unwrap();
    });

    // Wait until the node accepts connections
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return addr;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("node on {} never came up", addr);
}

fn descriptor(node_id: &str, addr: SocketAddr) -> NodeDescriptor {
    NodeDescriptor {
        node_id: node_id.to_string(),
        address: addr.to_string(),
    }
}

#[tokio::test]
async fn test_distributed_query() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("machine.9101.log"),
        "ERROR first\nINFO skip\nERROR second\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("machine.9102.log"), "INFO only\n").unwrap();

    let addr1 = start_node("9101", dir.path()).await;
    let addr2 = start_node("9102", dir.path()).await;
    let roster = vec![descriptor("9101", addr1), descriptor("9102", addr2)];

    let dispatcher = Dispatcher::new(GrpcNodeTransport, Duration::from_secs(5));
    let report = dispatcher.dispatch("ERROR", "", &roster).await.unwrap();

    assert_eq!(report.per_node.len(), 2);
    assert_eq!(report.successful_count, 2);
    assert_eq!(report.failed_count, 0);
    assert_eq!(report.total_lines, 2);
    // Zero matches on 9102 is a success, not a failure
    assert_eq!(report.per_node["9101"].line_count(), 2);
    assert_eq!(report.per_node["9102"].line_count(), 0);
    assert!(report.per_node["9102"].is_success());
}

#[tokio::test]
async fn test_unreachable_node_is_contained() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("machine.9201.log"), "ERROR hit\n").unwrap();

    let addr = start_node("9201", dir.path()).await;
    // Released ephemeral port with nothing listening behind it
    let dead = free_port_addr();
    let roster = vec![descriptor("9201", addr), descriptor("9299", dead)];

    let dispatcher = Dispatcher::new(GrpcNodeTransport, Duration::from_secs(5));
    let report = dispatcher.dispatch("ERROR", "", &roster).await.unwrap();

    assert_eq!(report.per_node.len(), 2);
    assert_eq!(report.successful_count, 1);
    assert_eq!(report.failed_count, 1);
    assert!(report.per_node["9201"].is_success());
    assert!(report.per_node["9299"].error_detail().is_some());
}
