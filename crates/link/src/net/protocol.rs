use glam::DVec3;

use crate::time::now_micros;

pub const DEFAULT_PORT: u16 = 25000;
pub const DEFAULT_TICK_RATE: u32 = 1000;

/// Large enough that an oversized datagram is seen at its real length
/// (up to this bound) instead of being truncated to a valid-looking record.
pub const MAX_DATAGRAM_SIZE: usize = 1200;

const POSITION_OFFSET: usize = 0;
const SEQUENCE_OFFSET: usize = POSITION_OFFSET + 3 * size_of::<f64>();
const TIMESTAMP_OFFSET: usize = SEQUENCE_OFFSET + size_of::<u32>();

/// Encoded size of a [`Packet`] on the wire.
pub const PACKET_SIZE: usize = TIMESTAMP_OFFSET + size_of::<u64>();

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("malformed packet: expected {PACKET_SIZE} bytes, got {len}")]
    Malformed { len: usize },
}

/// One position sample as exchanged between peers.
///
/// Layout (native byte order, no padding):
///
/// ```text
/// 0        8        16       24     28          36
/// | pos.x  | pos.y  | pos.z  | seq  | timestamp |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packet {
    position: DVec3,
    sequence: u32,
    timestamp: u64,
}

impl Packet {
    /// Builds a packet stamped with the current time.
    pub fn new(position: DVec3, sequence: u32) -> Self {
        Self::with_timestamp(position, sequence, now_micros())
    }

    pub fn with_timestamp(position: DVec3, sequence: u32, timestamp: u64) -> Self {
        Self {
            position,
            sequence,
            timestamp,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Capture time in microseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn encode(&self) -> [u8; PACKET_SIZE] {
        let mut buf = [0u8; PACKET_SIZE];
        for (i, component) in self.position.to_array().into_iter().enumerate() {
            let start = POSITION_OFFSET + i * size_of::<f64>();
            buf[start..start + size_of::<f64>()].copy_from_slice(&component.to_ne_bytes());
        }
        buf[SEQUENCE_OFFSET..TIMESTAMP_OFFSET].copy_from_slice(&self.sequence.to_ne_bytes());
        buf[TIMESTAMP_OFFSET..PACKET_SIZE].copy_from_slice(&self.timestamp.to_ne_bytes());
        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        let buf: &[u8; PACKET_SIZE] = data
            .try_into()
            .map_err(|_| PacketError::Malformed { len: data.len() })?;

        let mut position = [0.0f64; 3];
        for (i, component) in position.iter_mut().enumerate() {
            let start = POSITION_OFFSET + i * size_of::<f64>();
            *component = f64::from_ne_bytes(read_array(buf, start));
        }

        Ok(Self {
            position: DVec3::from_array(position),
            sequence: u32::from_ne_bytes(read_array(buf, SEQUENCE_OFFSET)),
            timestamp: u64::from_ne_bytes(read_array(buf, TIMESTAMP_OFFSET)),
        })
    }
}

/// Encodes a fresh sample, stamping it with the current time.
pub fn encode(position: DVec3, sequence: u32) -> [u8; PACKET_SIZE] {
    Packet::new(position, sequence).encode()
}

fn read_array<const N: usize>(buf: &[u8; PACKET_SIZE], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}
