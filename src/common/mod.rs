//! Common utilities and types shared across fleetgrep

pub mod config;
pub mod error;
pub mod utils;

pub use config::{parse_roster, validate_roster, CoordinatorConfig, NodeConfig, NodeDescriptor};
pub use error::{Error, Result};
pub use utils::{format_elapsed, parse_duration};
