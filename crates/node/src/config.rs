use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use tether::{ConfigError, ControllerConfig, DEFAULT_PORT, DEFAULT_TICK_RATE, Role};

use crate::Args;
use crate::device::Motion;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub role: Role,
    pub bind_addr: String,
    pub peer_addr: SocketAddr,
    pub controller: ControllerConfig,
    pub tick_rate: u32,
    pub duration: Option<Duration>,
    pub log_dir: Option<PathBuf>,
    pub loss_percent: f32,
    pub motion: Motion,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Primary,
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            peer_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT + 1)),
            controller: ControllerConfig::default(),
            tick_rate: DEFAULT_TICK_RATE,
            duration: None,
            log_dir: None,
            loss_percent: 0.0,
            motion: Motion::Hold,
        }
    }
}

impl NodeConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let role: Role = args.role.parse()?;

        let controller = ControllerConfig {
            history_capacity: args.history,
            perceptual_k: args.k,
            epsilon: args.epsilon,
            strength: args.strength,
            charge: args.charge,
        };
        controller.validate()?;

        if args.tick_rate == 0 {
            return Err(ConfigError::InvalidConstant {
                name: "tick_rate",
                value: 0.0,
            });
        }

        if !(0.0..=100.0).contains(&args.loss_percent) {
            return Err(ConfigError::InvalidConstant {
                name: "loss_percent",
                value: args.loss_percent as f64,
            });
        }

        Ok(Self {
            role,
            bind_addr: args.bind.clone(),
            peer_addr: resolve_peer(&args.peer)?,
            controller,
            tick_rate: args.tick_rate,
            duration: args.duration.map(Duration::from_secs_f64),
            log_dir: args.log_dir.clone(),
            loss_percent: args.loss_percent,
            motion: args.motion,
        })
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }
}

fn resolve_peer(peer: &str) -> Result<SocketAddr, ConfigError> {
    peer.to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::UnresolvablePeer(peer.to_string()))
}
