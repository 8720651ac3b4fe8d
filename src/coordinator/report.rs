//! Aggregate report assembly and rendering

use crate::common::format_elapsed;
use crate::proto::QueryResponse;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

/// What one node contributed to the report: either a well-formed response
/// (which may itself carry an application failure) or a transport-level
/// fault that prevented any response from arriving.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NodeResult {
    Response(QueryResponse),
    Fault { error: String },
}

impl NodeResult {
    /// Transport succeeded and the node reported a successful search.
    pub fn is_success(&self) -> bool {
        matches!(self, NodeResult::Response(r) if r.success)
    }

    pub fn line_count(&self) -> u64 {
        match self {
            NodeResult::Response(r) if r.success => r.line_count.max(0) as u64,
            _ => 0,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            NodeResult::Response(r) if !r.success => Some(&r.error),
            NodeResult::Fault { error } => Some(error),
            _ => None,
        }
    }
}

/// Merged outcome of one query run. `per_node` holds exactly one entry for
/// every dispatched node; the BTreeMap keeps entries in node_id order.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub pattern: String,
    pub per_node: BTreeMap<String, NodeResult>,
    pub total_lines: u64,
    pub successful_count: usize,
    pub failed_count: usize,
    pub elapsed_ms: u64,
}

impl AggregateReport {
    pub fn new(pattern: &str, per_node: BTreeMap<String, NodeResult>, elapsed: Duration) -> Self {
        let successful_count = per_node.values().filter(|r| r.is_success()).count();
        let total_lines = per_node.values().map(|r| r.line_count()).sum();

        Self {
            pattern: pattern.to_string(),
            failed_count: per_node.len() - successful_count,
            total_lines,
            successful_count,
            per_node,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Render the report for the operator's terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "=== Distributed Log Query Results ===");
        let _ = writeln!(out, "Pattern: {}", self.pattern);
        let _ = writeln!(out, "Servers queried: {}\n", self.per_node.len());

        for (node_id, result) in &self.per_node {
            match result {
                NodeResult::Fault { error } => {
                    let _ = writeln!(out, "✗ MACHINE_{}: Error - {}", node_id, error);
                }
                NodeResult::Response(r) if !r.success => {
                    let _ = writeln!(out, "✗ MACHINE_{}: {}", node_id, r.error);
                }
                NodeResult::Response(r) if r.line_count == 0 => {
                    let _ = writeln!(
                        out,
                        "MACHINE_{}: No matches found in {} (0 lines)",
                        node_id, r.filename
                    );
                }
                NodeResult::Response(r) => {
                    let _ = writeln!(
                        out,
                        "✓ MACHINE_{}: Found {} matching lines in {}",
                        node_id, r.line_count, r.filename
                    );
                    for line in &r.lines {
                        let _ = writeln!(out, "   MACHINE_{}:{}", node_id, line);
                    }
                }
            }
        }

        let _ = writeln!(out, "\n=== Summary ===");
        let _ = writeln!(out, "Total matching lines: {}", self.total_lines);
        let _ = writeln!(
            out,
            "Successful servers: {}/{}",
            self.successful_count,
            self.per_node.len()
        );
        let _ = writeln!(out, "Failed servers: {}", self.failed_count);
        let _ = writeln!(
            out,
            "Query time: {}",
            format_elapsed(Duration::from_millis(self.elapsed_ms))
        );

        out
    }
}
