//! Coordinator implementation
//!
//! The coordinator is responsible for:
//! - Fanning one query out to every roster node concurrently
//! - Enforcing a per-node deadline without cancelling sibling tasks
//! - Folding responses and faults into a node_id-keyed aggregate report
//! - Rendering the report for the operator

pub mod dispatch;
pub mod node_client;
pub mod report;

pub use dispatch::Dispatcher;
pub use node_client::{GrpcNodeTransport, NodeTransport};
pub use report::{AggregateReport, NodeResult};
