//! Query node server

use crate::common::{NodeConfig, Result};
use crate::node::engine::GrepEngine;
use crate::node::grpc::LogQueryService;

pub struct QueryNode {
    config: NodeConfig,
}

impl QueryNode {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr()?;
        let log_file = self.config.log_file();

        tracing::info!("Starting query node: {}", self.config.machine_id);
        tracing::info!("  Listening on: {}", addr);
        tracing::info!("  Log file: {}", log_file.display());

        if !log_file.exists() {
            tracing::warn!(
                "Log file {} does not exist yet; queries will fail until it appears",
                log_file.display()
            );
        }

        let service =
            LogQueryService::new(self.config.machine_id.clone(), log_file, GrepEngine::new());

        tracing::info!("✓ Query node ready");

        tonic::transport::Server::builder()
            .add_service(service.into_server())
            .serve_with_shutdown(addr, shutdown_signal())
            .await?;

        tracing::info!("Query node stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
