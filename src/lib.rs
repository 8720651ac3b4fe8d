//! # fleetgrep
//!
//! Distributed log search across a fixed fleet of machines, without
//! centralizing the logs:
//! - Each machine runs a query node owning one log shard
//! - A coordinator fans a single search out to every node concurrently
//! - Per-node faults are contained; the report always covers the full roster
//! - gRPC between coordinator and nodes; grep as the match engine
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │          Coordinator (CLI)           │
//! │  one concurrent task per node,       │
//! │  per-node deadline, results keyed    │
//! │  by node_id, report sorted           │
//! └───────────┬──────────────────────────┘
//!             │ gRPC (scatter/gather)
//!   ┌─────────┴──────────┬──────────────┐
//!   │                    │              │
//! ┌─▼──────────┐   ┌─────▼──────┐   ┌──▼───────────┐
//! │ Node 8080  │   │ Node 8081  │   │ Node 8082    │
//! │ machine.   │   │ machine.   │   │ machine.     │
//! │ 8080.log   │   │ 8081.log   │   │ 8082.log     │
//! └────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start a query node
//! ```bash
//! fleetgrep-node --machine 8080 --port 8080 --log-dir ./logs
//! ```
//!
//! ### Query the fleet
//! ```bash
//! fleetgrep-query \
//!   --pattern "ERROR" \
//!   --options "-i" \
//!   --servers localhost:8080,localhost:8081,localhost:8082 \
//!   --timeout 10s
//! ```

pub mod common;
pub mod coordinator;
pub mod node;

// Re-export commonly used types
pub use common::{Error, NodeDescriptor, Result};
pub use coordinator::{AggregateReport, Dispatcher};
pub use node::QueryNode;

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("fleetgrep");
}

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
