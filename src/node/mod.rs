//! Query node implementation
//!
//! Each node owns exactly one log shard and answers pattern searches
//! against it:
//! - Stateless per-request handler; every failure is encoded in the response
//! - External grep engine invoked through an argument vector, never a shell
//! - Fixed execution deadline on each engine run

pub mod engine;
pub mod grpc;
pub mod server;

pub use engine::GrepEngine;
pub use grpc::LogQueryService;
pub use server::QueryNode;
