use glam::DVec3;

use super::config::ControllerConfig;
use super::coupling::SpringCoupling;
use super::history::BoundedHistory;
use super::predictor::{PerceptualGate, latest_delta, predict};
use super::role::{Phase, Role};
use crate::device::{HapticDevice, PositionSource};
use crate::event::{EventSink, NullSink, ReceiveEvent, SendEvent};
use crate::net::{Channel, Packet};
use crate::time::now_micros;

#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub ticks: u64,
    pub transmitted: u64,
    pub suppressed: u64,
    pub send_failures: u64,
    pub fresh_updates: u64,
    pub predicted_updates: u64,
    pub stale_ignored: u64,
    pub last_target: DVec3,
    pub last_force: DVec3,
}

impl SessionStats {
    /// Share of send phases that actually went out.
    pub fn transmit_ratio(&self) -> f64 {
        let attempts = self.transmitted + self.suppressed + self.send_failures;
        if attempts == 0 {
            0.0
        } else {
            self.transmitted as f64 / attempts as f64
        }
    }
}

/// One end of the bilateral link.
///
/// Every tick reads the local device, forwards the position to the peer when
/// the peer could not have guessed it, and pulls the device towards the
/// peer's freshest (or extrapolated) position.
pub struct SessionController {
    role: Role,
    channel: Channel,
    gate: PerceptualGate,
    coupling: SpringCoupling,
    sent_history: BoundedHistory<Packet>,
    received_history: BoundedHistory<Packet>,
    pos_delta: f64,
    next_sequence: u32,
    target: Option<DVec3>,
    events: Box<dyn EventSink>,
    stats: SessionStats,
}

impl SessionController {
    /// `config` is expected to have passed [`ControllerConfig::validate`].
    pub fn new(role: Role, channel: Channel, config: &ControllerConfig) -> Self {
        Self {
            role,
            channel,
            gate: config.gate(),
            coupling: config.coupling(),
            sent_history: BoundedHistory::new(config.history_capacity),
            received_history: BoundedHistory::new(config.history_capacity),
            pos_delta: 0.0,
            next_sequence: 1,
            target: None,
            events: Box::new(NullSink),
            stats: SessionStats::default(),
        }
    }

    pub fn with_event_sink(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut Channel {
        &mut self.channel
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn pos_delta(&self) -> f64 {
        self.pos_delta
    }

    /// Sequence the next transmitted packet will carry.
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Peer position the last update phase pulled towards.
    pub fn target(&self) -> Option<DVec3> {
        self.target
    }

    pub fn sent_history(&self) -> &BoundedHistory<Packet> {
        &self.sent_history
    }

    pub fn received_history(&self) -> &BoundedHistory<Packet> {
        &self.received_history
    }

    /// Runs both phases in role order.
    pub fn tick<D: HapticDevice>(&mut self, device: &mut D) {
        for phase in self.role.phases() {
            match phase {
                Phase::Send => self.send_phase(device),
                Phase::Update => self.update_phase(device),
            }
        }
        self.stats.ticks += 1;
    }

    pub fn send_phase<S: PositionSource>(&mut self, source: &mut S) {
        let position = source.read_position();
        let packet = Packet::new(position, self.next_sequence);

        let perceptible = match self.sent_history.latest() {
            // The peer has nothing yet, so anything is news.
            None => true,
            Some(last_sent) => {
                let predicted = predict(last_sent.position(), &self.sent_history);
                self.gate.should_send(predicted, position, self.pos_delta)
            }
        };

        if !perceptible {
            self.stats.suppressed += 1;
            self.events.record_send(&SendEvent {
                suppressed: true,
                packet_time: packet.timestamp(),
                sequence: packet.sequence(),
                position,
            });
            return;
        }

        match self.channel.send(&packet) {
            Ok(()) => {
                self.sent_history.push(packet);
                self.next_sequence = self.next_sequence.wrapping_add(1);
                self.stats.transmitted += 1;
                self.events.record_send(&SendEvent {
                    suppressed: false,
                    packet_time: packet.timestamp(),
                    sequence: packet.sequence(),
                    position,
                });
            }
            Err(e) => {
                // Dropped; next tick sends a fresher sample anyway.
                self.stats.send_failures += 1;
                log::warn!("{} {}", self.role.alias(), e);
                self.events.record_error(&e.to_string());
            }
        }
    }

    pub fn update_phase<D: HapticDevice>(&mut self, device: &mut D) {
        let current = device.read_position();

        let fresh = match self.channel.receive_latest() {
            Some(packet) if self.channel.is_latest(&packet) => Some(packet),
            Some(packet) => {
                log::trace!(
                    "{} ignoring stale packet {} (latest {})",
                    self.role.alias(),
                    packet.sequence(),
                    self.channel.highest_sequence_seen()
                );
                self.stats.stale_ignored += 1;
                None
            }
            None => None,
        };

        let (target, predicted, packet_time, sequence) = match fresh {
            Some(packet) => {
                self.received_history.push(packet);
                self.pos_delta = latest_delta(&self.received_history);
                self.stats.fresh_updates += 1;
                (packet.position(), false, packet.timestamp(), packet.sequence())
            }
            None => {
                // Last known position, never an earlier extrapolation.
                let base = self
                    .received_history
                    .latest()
                    .map_or(current, Packet::position);
                self.stats.predicted_updates += 1;
                (
                    predict(base, &self.received_history),
                    true,
                    now_micros(),
                    self.channel.highest_sequence_seen(),
                )
            }
        };

        let force = self.coupling.force(current, target);
        device.apply_force(force);

        self.target = Some(target);
        self.stats.last_target = target;
        self.stats.last_force = force;

        self.events.record_receive(&ReceiveEvent {
            predicted,
            packet_time,
            sequence,
            position: target,
            loss_ratio: self.channel.stats().loss.loss_ratio(),
        });
    }

    /// Consumes the controller, closing the socket.
    pub fn shutdown(mut self) {
        self.events.flush();
        log::info!(
            "{} closing link {} -> {}",
            self.role.alias(),
            self.channel.local_addr(),
            self.channel.peer_addr()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingDevice;
    use std::net::{SocketAddr, UdpSocket};
    use std::thread;
    use std::time::Duration;

    fn controller_with_peer(role: Role, config: &ControllerConfig) -> (SessionController, UdpSocket) {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_nonblocking(true).unwrap();
        let channel = Channel::bind("127.0.0.1:0", peer.local_addr().unwrap()).unwrap();
        (SessionController::new(role, channel, config), peer)
    }

    fn packet_at(x: f64, sequence: u32) -> Packet {
        Packet::with_timestamp(DVec3::new(x, 0.0, 0.0), sequence, 0)
    }

    fn deliver(peer: &UdpSocket, packet: Packet, to: SocketAddr) {
        peer.send_to(&packet.encode(), to).unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    #[test]
    fn test_first_send_always_transmits() {
        let (mut controller, _peer) =
            controller_with_peer(Role::Primary, &ControllerConfig::default());
        let mut device = RecordingDevice::at(DVec3::new(1.0, 2.0, 3.0));

        controller.send_phase(&mut device);

        assert_eq!(controller.stats().transmitted, 1);
        assert_eq!(controller.next_sequence(), 2);
        assert_eq!(controller.sent_history().len(), 1);
    }

    #[test]
    fn test_suppressed_send_keeps_sequence() {
        let config = ControllerConfig {
            perceptual_k: 1.0,
            epsilon: 0.5,
            ..Default::default()
        };
        let (mut controller, _peer) = controller_with_peer(Role::Primary, &config);
        let mut device = RecordingDevice::at(DVec3::ZERO);

        controller.send_phase(&mut device);
        // Predicted position is still the origin; 0.1 < 1.0 * (0 + 0.5).
        device.position = DVec3::new(0.1, 0.0, 0.0);
        controller.send_phase(&mut device);

        assert_eq!(controller.stats().transmitted, 1);
        assert_eq!(controller.stats().suppressed, 1);
        assert_eq!(controller.next_sequence(), 2);
        assert_eq!(controller.sent_history().len(), 1);

        device.position = DVec3::new(0.6, 0.0, 0.0);
        controller.send_phase(&mut device);

        assert_eq!(controller.stats().transmitted, 2);
        assert_eq!(controller.next_sequence(), 3);
    }

    #[test]
    fn test_predicted_target_when_nothing_arrives() {
        let config = ControllerConfig {
            strength: 2.0,
            ..Default::default()
        };
        let (mut controller, _peer) = controller_with_peer(Role::Secondary, &config);
        controller.received_history.push(packet_at(0.0, 1));
        controller.received_history.push(packet_at(1.0, 2));
        controller.received_history.push(packet_at(3.0, 3));

        let mut device = RecordingDevice::at(DVec3::ZERO);
        for _ in 0..5 {
            controller.update_phase(&mut device);

            // One step past the last known position, however long the silence.
            let target = controller.target().unwrap();
            assert!((target.x - 4.5).abs() < 1e-9);
            let force = device.last_force().unwrap();
            assert!((force.x - 9.0).abs() < 1e-9);
        }

        assert_eq!(device.forces.len(), 5);
        assert_eq!(controller.stats().predicted_updates, 5);
        assert_eq!(controller.received_history().len(), 3);
    }

    #[test]
    fn test_no_knowledge_means_no_force() {
        let (mut controller, _peer) =
            controller_with_peer(Role::Secondary, &ControllerConfig::default());
        let mut device = RecordingDevice::at(DVec3::new(5.0, 5.0, 5.0));

        controller.update_phase(&mut device);

        assert_eq!(device.last_force(), Some(DVec3::ZERO));
    }

    #[test]
    fn test_fresh_packet_drives_force_and_delta() {
        let config = ControllerConfig {
            strength: 0.5,
            ..Default::default()
        };
        let (mut controller, peer) = controller_with_peer(Role::Secondary, &config);
        let local = controller.channel().local_addr();

        deliver(&peer, packet_at(2.0, 1), local);
        let mut device = RecordingDevice::at(DVec3::ZERO);
        controller.update_phase(&mut device);

        assert_eq!(controller.target(), Some(DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(device.last_force(), Some(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(controller.pos_delta(), 0.0);

        deliver(&peer, packet_at(5.0, 2), local);
        controller.update_phase(&mut device);

        assert!((controller.pos_delta() - 3.0).abs() < 1e-12);
        assert_eq!(controller.stats().fresh_updates, 2);
    }

    #[test]
    fn test_stale_packet_is_ignored() {
        let (mut controller, peer) =
            controller_with_peer(Role::Secondary, &ControllerConfig::default());
        let local = controller.channel().local_addr();
        let mut device = RecordingDevice::at(DVec3::ZERO);

        deliver(&peer, packet_at(9.0, 9), local);
        controller.update_phase(&mut device);
        deliver(&peer, packet_at(-50.0, 4), local);
        controller.update_phase(&mut device);

        assert_eq!(controller.stats().stale_ignored, 1);
        assert_eq!(controller.received_history().len(), 1);
        assert_eq!(controller.target(), Some(DVec3::new(9.0, 0.0, 0.0)));
    }
}
