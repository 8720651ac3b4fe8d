//! Configuration for fleetgrep components

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// One machine in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Unique identifier within a roster
    pub node_id: String,

    /// host:port the node listens on
    pub address: String,
}

/// Coordinator-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Fixed set of nodes to query
    #[serde(default)]
    pub roster: Vec<NodeDescriptor>,

    /// Per-node query deadline, milliseconds
    #[serde(default = "default_timeout_ms")]
    pub per_node_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            per_node_timeout_ms: default_timeout_ms(),
        }
    }
}

impl CoordinatorConfig {
    pub fn per_node_timeout(&self) -> Duration {
        Duration::from_millis(self.per_node_timeout_ms)
    }

    /// Load from the JSON file named by `FLEETGREP_CONFIG`, if set.
    /// CLI flags take priority over anything loaded here.
    pub fn load() -> Option<Self> {
        let path = std::env::var("FLEETGREP_CONFIG").ok()?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring malformed config file {}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path, e);
                None
            }
        }
    }
}

/// Query node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Machine identifier; determines the log file name
    pub machine_id: String,

    /// Port to listen on
    pub port: u16,

    /// Directory holding the machine log file
    pub log_dir: PathBuf,
}

impl NodeConfig {
    pub fn new(machine_id: String, port: u16, log_dir: PathBuf) -> Result<Self> {
        if machine_id.trim().is_empty() {
            return Err(Error::InvalidConfig("machine id cannot be empty".into()));
        }
        Ok(Self {
            machine_id,
            port,
            log_dir,
        })
    }

    /// The node's log shard, a fixed function of the machine id.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(format!("machine.{}.log", self.machine_id))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("0.0.0.0:{}", self.port)
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("invalid bind address: {}", e)))
    }
}

/// Parse a comma-separated `host:port` list into a roster. The machine
/// identifier is the port segment, falling back to "1" when the address
/// carries no port.
pub fn parse_roster(servers: &str) -> Result<Vec<NodeDescriptor>> {
    let mut roster = Vec::new();

    for raw in servers.split(',') {
        let address = raw.trim();
        if address.is_empty() {
            continue;
        }

        let node_id = match address.rsplit_once(':') {
            Some((_, port)) if !port.is_empty() => port.to_string(),
            _ => "1".to_string(),
        };

        roster.push(NodeDescriptor {
            node_id,
            address: address.to_string(),
        });
    }

    validate_roster(&roster)?;
    Ok(roster)
}

/// Check roster invariants before dispatch: at least one node, and
/// non-blank, unique node ids. A duplicate id would collapse two nodes
/// into one report entry, so every roster source goes through here,
/// config files included.
pub fn validate_roster(roster: &[NodeDescriptor]) -> Result<()> {
    if roster.is_empty() {
        return Err(Error::InvalidConfig("no servers given".into()));
    }

    let mut seen = std::collections::HashSet::new();
    for node in roster {
        if node.node_id.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "blank node id for address '{}'",
                node.address
            )));
        }
        if !seen.insert(node.node_id.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "duplicate node id '{}' in roster",
                node.node_id
            )));
        }
    }

    Ok(())
}
