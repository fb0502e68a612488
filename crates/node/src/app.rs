use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::DVec3;

use tether::{
    Channel, CsvEventLog, NetworkStats, PacketLossSimulation, Role, SessionController,
    SessionStats,
};

use crate::config::NodeConfig;
use crate::device::{Motion, SimulatedDevice};

const SUMMARY_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot of everything the dashboard and the headless summary show.
#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub role: Role,
    pub motion: Motion,
    pub uptime_secs: u64,
    pub overruns: u64,
    pub session: SessionStats,
    pub network: NetworkStats,
    pub highest_sequence: u32,
    pub pos_delta: f64,
    pub position: DVec3,
}

/// Running node: one controller, one device, and the fixed-rate pacing
/// between them.
pub struct App {
    controller: SessionController,
    device: SimulatedDevice,
    running: Arc<AtomicBool>,
    tick_period: Duration,
    next_deadline: Instant,
    overruns: u64,
    start_time: Instant,
    duration: Option<Duration>,
    last_summary: Instant,
}

impl App {
    pub fn new(config: NodeConfig) -> Result<Self> {
        let mut channel = Channel::bind(config.bind_addr.as_str(), config.peer_addr)
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;

        if config.loss_percent > 0.0 {
            channel.set_loss_simulation(PacketLossSimulation::with_loss(config.loss_percent));
        }

        let mut controller = SessionController::new(config.role, channel, &config.controller);
        if let Some(dir) = &config.log_dir {
            let events = CsvEventLog::create(dir)
                .with_context(|| format!("failed to create event log in {}", dir.display()))?;
            controller = controller.with_event_sink(Box::new(events));
        }

        let now = Instant::now();
        Ok(Self {
            controller,
            device: SimulatedDevice::new(config.motion, config.tick_rate),
            running: Arc::new(AtomicBool::new(true)),
            tick_period: config.tick_period(),
            next_deadline: now,
            overruns: 0,
            start_time: now,
            duration: config.duration,
            last_summary: now,
        })
    }

    pub fn role(&self) -> Role {
        self.controller.role()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.controller.channel().local_addr()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.controller.channel().peer_addr()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Headless loop; logs a summary once per second.
    pub fn run(&mut self) {
        while self.is_running() {
            self.tick_once();

            if self.last_summary.elapsed() >= SUMMARY_INTERVAL {
                self.last_summary = Instant::now();
                log_summary(&self.status());
            }

            self.wait_for_next_tick();
        }
    }

    /// One controller tick followed by one device integration step.
    pub fn tick_once(&mut self) {
        self.controller.tick(&mut self.device);
        self.device.step();

        if let Some(duration) = self.duration {
            if self.start_time.elapsed() >= duration {
                log::info!("run duration of {:?} reached", duration);
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Sleeps until the next tick deadline. A tick that overruns a whole
    /// period restarts the schedule instead of bursting to catch up.
    pub fn wait_for_next_tick(&mut self) {
        self.next_deadline += self.tick_period;
        let now = Instant::now();

        if self.next_deadline > now {
            thread::sleep(self.next_deadline - now);
        } else if now - self.next_deadline > self.tick_period {
            self.overruns += 1;
            log::debug!("tick overran by {:?}", now - self.next_deadline);
            self.next_deadline = now;
        }
    }

    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            role: self.controller.role(),
            motion: self.device.motion(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            overruns: self.overruns,
            session: self.controller.stats().clone(),
            network: self.controller.channel().stats().clone(),
            highest_sequence: self.controller.channel().highest_sequence_seen(),
            pos_delta: self.controller.pos_delta(),
            position: self.device.position(),
        }
    }

    /// Stops the loop, closes the link, then lets go of the device.
    pub fn shutdown(self) {
        let App {
            controller,
            mut device,
            running,
            ..
        } = self;

        running.store(false, Ordering::SeqCst);
        controller.shutdown();
        device.release();
    }
}

pub fn log_summary(status: &NodeStatus) {
    let session = &status.session;
    let network = &status.network;
    log::info!(
        "{} tick {} | sent {} suppressed {} | recv {} lost {} ({:.1}%) | fresh {} predicted {} | force {:.4}",
        status.role.alias(),
        session.ticks,
        session.transmitted,
        session.suppressed,
        network.packets_received(),
        network.loss.lost(),
        network.packet_loss_percent(),
        session.fresh_updates,
        session.predicted_updates,
        session.last_force.length(),
    );
}
