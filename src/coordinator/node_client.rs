//! gRPC client for query nodes

use crate::common::{Error, NodeDescriptor, Result};
use crate::proto::log_query_client::LogQueryClient;
use crate::proto::{QueryRequest, QueryResponse};

/// The coordinator's view of a node: one query in, one response out.
/// The seam exists so dispatch logic is testable without a live network.
#[tonic::async_trait]
pub trait NodeTransport: Send + Sync + 'static {
    async fn query(&self, node: &NodeDescriptor, request: QueryRequest) -> Result<QueryResponse>;
}

/// Production transport. Connects per query; queries are one-shot and
/// the roster is small, so there is nothing to gain from pooling.
pub struct GrpcNodeTransport;

#[tonic::async_trait]
impl NodeTransport for GrpcNodeTransport {
    async fn query(&self, node: &NodeDescriptor, request: QueryRequest) -> Result<QueryResponse> {
        let endpoint = format!("http://{}", node.address);

        let mut client =
            LogQueryClient::connect(endpoint)
                .await
                .map_err(|e| Error::NodeUnreachable {
                    node: node.node_id.clone(),
                    address: node.address.clone(),
                    reason: e.to_string(),
                })?;

        let response = client.query_logs(tonic::Request::new(request)).await?;
        Ok(response.into_inner())
    }
}
