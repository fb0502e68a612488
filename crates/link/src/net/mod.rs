mod channel;
mod protocol;
mod stats;
mod tracking;

pub use channel::{Channel, SendFailure};
pub use protocol::{
    DEFAULT_PORT, DEFAULT_TICK_RATE, MAX_DATAGRAM_SIZE, PACKET_SIZE, Packet, PacketError, encode,
};
pub use stats::{LossCounters, NetworkStats, PacketLossSimulation};
pub use tracking::FreshnessTracker;
