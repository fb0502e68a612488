use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::protocol::{MAX_DATAGRAM_SIZE, Packet};
use super::stats::{NetworkStats, PacketLossSimulation};
use super::tracking::FreshnessTracker;

#[derive(Debug, thiserror::Error)]
#[error("send to {peer} failed: {source}")]
pub struct SendFailure {
    pub peer: SocketAddr,
    #[source]
    pub source: io::Error,
}

/// Non-blocking datagram link to a single peer.
///
/// Nothing here ever waits: sends either go out immediately or fail, and
/// [`Channel::receive_latest`] only drains what the kernel already buffered.
pub struct Channel {
    socket: UdpSocket,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    freshness: FreshnessTracker,
    stats: NetworkStats,
    recv_buffer: [u8; MAX_DATAGRAM_SIZE],
    loss_sim: PacketLossSimulation,
}

impl Channel {
    pub fn bind<A: ToSocketAddrs>(addr: A, peer_addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            peer_addr,
            freshness: FreshnessTracker::new(),
            stats: NetworkStats::default(),
            recv_buffer: [0u8; MAX_DATAGRAM_SIZE],
            loss_sim: PacketLossSimulation::default(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn highest_sequence_seen(&self) -> u32 {
        self.freshness.highest_seen()
    }

    pub fn set_loss_simulation(&mut self, sim: PacketLossSimulation) {
        self.loss_sim = sim;
    }

    pub fn send(&mut self, packet: &Packet) -> Result<(), SendFailure> {
        if self.loss_sim.should_drop() {
            self.stats.simulated_drops += 1;
            return Ok(());
        }

        let data = packet.encode();
        match self.socket.send_to(&data, self.peer_addr) {
            Ok(bytes) => {
                self.stats.packets_sent += 1;
                self.stats.bytes_sent += bytes as u64;
                Ok(())
            }
            Err(source) => {
                self.stats.send_failures += 1;
                Err(SendFailure {
                    peer: self.peer_addr,
                    source,
                })
            }
        }
    }

    /// Drains every datagram currently queued on the socket and returns the
    /// freshest decodable one.
    ///
    /// All decoded packets count towards loss accounting and freshness, but
    /// only the one with the highest sequence in this drain is handed back
    /// (the last one on ties). Wrong-size datagrams are dropped. Socket
    /// errors end the drain early and are never propagated.
    pub fn receive_latest(&mut self) -> Option<Packet> {
        let mut freshest: Option<Packet> = None;
        let mut decoded = 0u32;

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => {
                    self.stats.bytes_received += size as u64;

                    let packet = match Packet::decode(&self.recv_buffer[..size]) {
                        Ok(packet) => packet,
                        Err(e) => {
                            self.stats.malformed_dropped += 1;
                            log::debug!("Dropping datagram from {}: {}", addr, e);
                            continue;
                        }
                    };

                    decoded += 1;
                    self.stats.loss.record(packet.sequence());
                    self.freshness.observe(packet.sequence());

                    if freshest.is_none_or(|kept| packet.sequence() >= kept.sequence()) {
                        freshest = Some(packet);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    // Peer not listening yet; the platform surfaces the ICMP
                    // error on the next read.
                    log::debug!("Peer {} unreachable: {}", self.peer_addr, e);
                    break;
                }
                Err(e) => {
                    log::warn!("Receive on {} failed: {}", self.local_addr, e);
                    break;
                }
            }
        }

        if decoded > 1 {
            log::trace!(
                "Drained {} packets, kept sequence {:?}",
                decoded,
                freshest.map(|p| p.sequence())
            );
        }

        freshest
    }

    pub fn is_latest(&self, packet: &Packet) -> bool {
        self.freshness.is_latest(packet.sequence())
    }
}
