//! Controller configuration.
//!
//! Parsed with clap from the command line, falling back to environment
//! variables and then to defaults. The namespace is the only positional
//! argument.
//!
//! | Flag | Variable | Default |
//! |---|---|---|
//! | `<NAMESPACE>` | `RESTART_CONTROLLER_NAMESPACE` | `default` |
//! | `--cooldown-secs` | `RESTART_CONTROLLER_COOLDOWN_SECS` | `60` |
//! | `--listen-addr` | `RESTART_CONTROLLER_LISTEN_ADDR` | `0.0.0.0:8080` |
//! | `--queue-capacity` | `RESTART_CONTROLLER_QUEUE_CAPACITY` | `100` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use crate::state::DEFAULT_COOLDOWN_SECS;

pub const NAMESPACE_VAR: &str = "RESTART_CONTROLLER_NAMESPACE";
pub const COOLDOWN_SECS_VAR: &str = "RESTART_CONTROLLER_COOLDOWN_SECS";
pub const LISTEN_ADDR_VAR: &str = "RESTART_CONTROLLER_LISTEN_ADDR";
pub const QUEUE_CAPACITY_VAR: &str = "RESTART_CONTROLLER_QUEUE_CAPACITY";

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Restart controller
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "restart-controller")]
#[command(about = "Restarts dependent deployments when a parent's pods are replaced")]
#[command(version)]
pub struct ControllerConfig {
    /// Namespace whose pods and deployments are watched
    #[arg(env = NAMESPACE_VAR, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Minimum seconds between two controller restarts of one deployment
    #[arg(long, env = COOLDOWN_SECS_VAR, default_value_t = DEFAULT_COOLDOWN_SECS)]
    pub cooldown_secs: u64,

    /// Address of the health/diagnostics HTTP server
    #[arg(long, env = LISTEN_ADDR_VAR, default_value_t = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Buffer size of the watcher -> worker channel
    #[arg(
        long,
        env = QUEUE_CAPACITY_VAR,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = parse_queue_capacity
    )]
    pub queue_capacity: usize,
}

impl ControllerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

// `mpsc::channel(0)` panics, so the channel needs room for at least one trigger.
fn parse_queue_capacity(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(e.to_string()),
    }
}
