//! gRPC service for the query node
//!
//! The handler is stateless: a pure function of (fixed log file, request).
//! Application faults (missing file, bad pattern, engine failure) are
//! encoded in the response, never raised as RPC errors.

use crate::node::engine::GrepEngine;
use crate::proto::log_query_server::{LogQuery, LogQueryServer};
use crate::proto::{QueryRequest, QueryResponse};
use std::path::PathBuf;
use tonic::{Request, Response, Status};

pub struct LogQueryService {
    machine_id: String,
    log_file: PathBuf,
    engine: GrepEngine,
}

impl LogQueryService {
    pub fn new(machine_id: String, log_file: PathBuf, engine: GrepEngine) -> Self {
        Self {
            machine_id,
            log_file,
            engine,
        }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> LogQueryServer<Self> {
        LogQueryServer::new(self)
    }

    pub async fn handle(&self, request: QueryRequest) -> QueryResponse {
        tracing::info!(
            pattern = %request.pattern,
            options = %request.options,
            "Received query"
        );

        if !tokio::fs::try_exists(&self.log_file).await.unwrap_or(false) {
            return self.failure(format!(
                "log file '{}' not found",
                self.log_file.display()
            ));
        }

        // Trim surrounding whitespace only; regex and option semantics
        // belong to the engine.
        let pattern = request.pattern.trim();
        if pattern.is_empty() {
            return self.failure("invalid or empty pattern".to_string());
        }

        match self
            .engine
            .run(pattern, &request.options, &self.log_file)
            .await
        {
            Ok(lines) => {
                tracing::info!(
                    matches = lines.len(),
                    file = %self.log_file.display(),
                    "Query complete"
                );
                QueryResponse {
                    node_id: self.machine_id.clone(),
                    success: true,
                    error: String::new(),
                    filename: self.log_file.display().to_string(),
                    line_count: lines.len() as i32,
                    lines,
                }
            }
            Err(e) => self.failure(format!("grep execution failed: {}", e)),
        }
    }

    fn failure(&self, error: String) -> QueryResponse {
        tracing::warn!(error = %error, "Query failed");
        QueryResponse {
            node_id: self.machine_id.clone(),
            success: false,
            error,
            filename: self.log_file.display().to_string(),
            line_count: 0,
            lines: vec![],
        }
    }
}

#[tonic::async_trait]
impl LogQuery for LogQueryService {
    async fn query_logs(
        &self,
        request: Request<QueryRequest>,
    ) -> Result<Response<QueryResponse>, Status> {
        Ok(Response::new(self.handle(request.into_inner()).await))
    }
}
