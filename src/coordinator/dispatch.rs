//! Scatter-gather dispatch across the roster
//!
//! One concurrent task per roster node, each bounded by the per-node
//! deadline. A fault on one node never aborts or delays the others, and
//! every dispatched node contributes exactly one entry to the report.

use crate::common::{Error, NodeDescriptor, Result};
use crate::coordinator::node_client::NodeTransport;
use crate::coordinator::report::{AggregateReport, NodeResult};
use crate::proto::QueryRequest;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

pub struct Dispatcher<T: NodeTransport> {
    transport: Arc<T>,
    per_node_timeout: Duration,
}

impl<T: NodeTransport> Dispatcher<T> {
    pub fn new(transport: T, per_node_timeout: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            per_node_timeout,
        }
    }

    /// Query every node in the roster concurrently and fold the outcomes
    /// into one report. Always returns a full report once dispatch begins;
    /// only a blank pattern is an error, raised before any node is
    /// contacted.
    pub async fn dispatch(
        &self,
        pattern: &str,
        options: &str,
        roster: &[NodeDescriptor],
    ) -> Result<AggregateReport> {
        if pattern.trim().is_empty() {
            return Err(Error::EmptyPattern);
        }

        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for node in roster {
            let node = node.clone();
            let transport = self.transport.clone();
            let timeout = self.per_node_timeout;
            let request = QueryRequest {
                pattern: pattern.to_string(),
                options: options.to_string(),
                node_id: node.node_id.clone(),
            };

            tasks.spawn(async move {
                let outcome =
                    match tokio::time::timeout(timeout, transport.query(&node, request)).await {
                        Ok(Ok(response)) => NodeResult::Response(response),
                        Ok(Err(e)) => NodeResult::Fault {
                            error: e.to_string(),
                        },
                        Err(_) => NodeResult::Fault {
                            error: Error::NodeTimeout {
                                node: node.node_id.clone(),
                                timeout,
                            }
                            .to_string(),
                        },
                    };
                // Results are correlated by node_id, never by roster
                // position; completion order is arbitrary.
                (node.node_id, outcome)
            });
        }

        let mut per_node: BTreeMap<String, NodeResult> = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((node_id, outcome)) => {
                    per_node.insert(node_id, outcome);
                }
                Err(e) => tracing::error!("query task failed to join: {}", e),
            }
        }

        // A panicked task cannot carry its node_id through the join error,
        // so backfill from the roster to keep one entry per dispatched node.
        for node in roster {
            per_node
                .entry(node.node_id.clone())
                .or_insert_with(|| NodeResult::Fault {
                    error: "query task aborted".to_string(),
                });
        }

        Ok(AggregateReport::new(pattern, per_node, started.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::QueryResponse;
    use std::collections::HashMap;

    enum Behavior {
        Lines(Vec<&'static str>),
        AppFailure(&'static str),
        Unreachable,
        Hang,
    }

    struct MockTransport {
        behaviors: HashMap<String, Behavior>,
    }

    impl MockTransport {
        fn new(behaviors: Vec<(&str, Behavior)>) -> Self {
            Self {
                behaviors: behaviors
                    .into_iter()
                    .map(|(id, b)| (id.to_string(), b))
                    .collect(),
            }
        }
    }

    #[tonic::async_trait]
    impl NodeTransport for MockTransport {
        async fn query(
            &self,
            node: &NodeDescriptor,
            request: QueryRequest,
        ) -> Result<QueryResponse> {
            assert_eq!(request.node_id, node.node_id);

            match self.behaviors.get(&node.node_id) {
                Some(Behavior::Lines(lines)) => Ok(QueryResponse {
                    node_id: node.node_id.clone(),
                    success: true,
                    error: String::new(),
                    filename: format!("machine.{}.log", node.node_id),
                    line_count: lines.len() as i32,
                    lines: lines.iter().map(|s| s.to_string()).collect(),
                }),
                Some(Behavior::AppFailure(msg)) => Ok(QueryResponse {
                    node_id: node.node_id.clone(),
                    success: false,
                    error: msg.to_string(),
                    filename: format!("machine.{}.log", node.node_id),
                    line_count: 0,
                    lines: vec![],
                }),
                Some(Behavior::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(Error::Other("woke from hang".into()))
                }
                Some(Behavior::Unreachable) | None => Err(Error::NodeUnreachable {
                    node: node.node_id.clone(),
                    address: node.address.clone(),
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    fn roster(ids: &[&str]) -> Vec<NodeDescriptor> {
        ids.iter()
            .map(|id| NodeDescriptor {
                node_id: id.to_string(),
                address: format!("localhost:{}", id),
            })
            .collect()
    }

    fn dispatcher(behaviors: Vec<(&str, Behavior)>) -> Dispatcher<MockTransport> {
        Dispatcher::new(MockTransport::new(behaviors), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn all_nodes_successful() {
        // 5 + 4 + 3 matching lines across three machines
        let d = dispatcher(vec![
            ("8080", Behavior::Lines(vec!["a", "b", "c", "d", "e"])),
            ("8081", Behavior::Lines(vec!["a", "b", "c", "d"])),
            ("8082", Behavior::Lines(vec!["a", "b", "c"])),
        ]);

        let report = d
            .dispatch("ERROR", "", &roster(&["8080", "8081", "8082"]))
            .await
            .unwrap();

        assert_eq!(report.per_node.len(), 3);
        assert_eq!(report.total_lines, 12);
        assert_eq!(report.successful_count, 3);
        assert_eq!(report.failed_count, 0);

        let counts: Vec<u64> = report.per_node.values().map(|r| r.line_count()).collect();
        assert_eq!(counts, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn one_unreachable_node_is_isolated() {
        let d = dispatcher(vec![
            ("8080", Behavior::Lines(vec!["a", "b", "c", "d", "e"])),
            ("8081", Behavior::Lines(vec!["a", "b", "c", "d"])),
            ("8082", Behavior::Unreachable),
        ]);

        let report = d
            .dispatch("ERROR", "", &roster(&["8080", "8081", "8082"]))
            .await
            .unwrap();

        assert_eq!(report.per_node.len(), 3);
        assert_eq!(report.successful_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.total_lines, 9);

        let fault = &report.per_node["8082"];
        assert!(!fault.is_success());
        assert!(fault.error_detail().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn every_node_unreachable_still_yields_full_report() {
        let d = dispatcher(vec![
            ("1", Behavior::Unreachable),
            ("2", Behavior::Unreachable),
            ("3", Behavior::Unreachable),
        ]);

        let report = d.dispatch("x", "", &roster(&["1", "2", "3"])).await.unwrap();
        assert_eq!(report.per_node.len(), 3);
        assert_eq!(report.successful_count, 0);
        assert_eq!(report.failed_count, 3);
    }

    #[tokio::test]
    async fn empty_roster_yields_empty_report() {
        let d = dispatcher(vec![]);
        let report = d.dispatch("x", "", &[]).await.unwrap();
        assert!(report.per_node.is_empty());
        assert_eq!(report.failed_count, 0);
    }

    #[tokio::test]
    async fn blank_pattern_rejected_before_dispatch() {
        let d = dispatcher(vec![("1", Behavior::Lines(vec!["a"]))]);
        assert!(matches!(
            d.dispatch("   ", "", &roster(&["1"])).await,
            Err(Error::EmptyPattern)
        ));
    }

    #[tokio::test]
    async fn application_failure_is_a_failed_entry() {
        let d = dispatcher(vec![
            ("1", Behavior::AppFailure("log file 'machine.1.log' not found")),
            ("2", Behavior::Lines(vec!["hit"])),
        ]);

        let report = d.dispatch("hit", "", &roster(&["1", "2"])).await.unwrap();
        assert_eq!(report.successful_count, 1);
        assert_eq!(report.failed_count, 1);
        assert!(report.per_node["1"]
            .error_detail()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_on_one_node_does_not_delay_others() {
        let d = dispatcher(vec![
            ("8080", Behavior::Hang),
            ("8081", Behavior::Lines(vec!["hit", "hit"])),
        ]);

        let report = d
            .dispatch("hit", "", &roster(&["8080", "8081"]))
            .await
            .unwrap();

        assert_eq!(report.per_node.len(), 2);
        assert_eq!(report.successful_count, 1);
        assert!(report.per_node["8080"]
            .error_detail()
            .unwrap()
            .contains("timed out"));
        assert_eq!(report.per_node["8081"].line_count(), 2);
    }

    #[tokio::test]
    async fn entries_sorted_by_node_id_regardless_of_roster_order() {
        let d = dispatcher(vec![
            ("9", Behavior::Lines(vec![])),
            ("1", Behavior::Lines(vec![])),
            ("5", Behavior::Lines(vec![])),
        ]);

        let report = d.dispatch("x", "", &roster(&["9", "1", "5"])).await.unwrap();
        let keys: Vec<&String> = report.per_node.keys().collect();
        assert_eq!(keys, vec!["1", "5", "9"]);
    }

    #[tokio::test]
    async fn repeated_queries_are_idempotent() {
        let d = dispatcher(vec![("1", Behavior::Lines(vec!["a", "b"]))]);
        let first = d.dispatch("x", "", &roster(&["1"])).await.unwrap();
        let second = d.dispatch("x", "", &roster(&["1"])).await.unwrap();

        assert_eq!(first.total_lines, second.total_lines);
        assert_eq!(
            serde_json::to_value(&first.per_node).unwrap(),
            serde_json::to_value(&second.per_node).unwrap()
        );
    }
}
