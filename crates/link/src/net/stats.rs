use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::time::Instant;

/// Drops outbound packets on purpose so the prediction path can be exercised
/// on a perfect local link.
#[derive(Debug, Clone, Default)]
pub struct PacketLossSimulation {
    pub enabled: bool,
    pub loss_percent: f32,
}

impl PacketLossSimulation {
    pub fn with_loss(loss_percent: f32) -> Self {
        Self {
            enabled: loss_percent > 0.0,
            loss_percent,
        }
    }

    pub fn should_drop(&self) -> bool {
        if !self.enabled || self.loss_percent <= 0.0 {
            return false;
        }
        if self.loss_percent >= 100.0 {
            return true;
        }
        roll() * 100.0 < self.loss_percent
    }
}

/// Uniform draw in `[0, 1)`, keyed fresh on every call.
fn roll() -> f32 {
    let mut hasher = RandomState::new().build_hasher();
    Instant::now().hash(&mut hasher);
    // Top 24 bits fit an f32 mantissa exactly.
    (hasher.finish() >> 40) as f32 / (1u32 << 24) as f32
}

/// Received-versus-expected accounting for one inbound stream.
///
/// The peer numbers its transmissions 1, 2, 3, ... so the highest sequence
/// seen is the number of packets it has sent so far, and whatever we did not
/// physically receive was lost (or is still in flight).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LossCounters {
    pub received: u64,
    pub highest_sequence: u32,
}

impl LossCounters {
    pub fn record(&mut self, sequence: u32) {
        self.received += 1;
        self.highest_sequence = self.highest_sequence.max(sequence);
    }

    pub fn lost(&self) -> u64 {
        u64::from(self.highest_sequence).saturating_sub(self.received)
    }

    pub fn loss_ratio(&self) -> f64 {
        if self.highest_sequence == 0 {
            0.0
        } else {
            self.lost() as f64 / f64::from(self.highest_sequence)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub send_failures: u64,
    pub malformed_dropped: u64,
    pub simulated_drops: u64,
    pub loss: LossCounters,
}

impl NetworkStats {
    pub fn packets_received(&self) -> u64 {
        self.loss.received
    }

    pub fn packet_loss_percent(&self) -> f64 {
        self.loss.loss_ratio() * 100.0
    }
}
