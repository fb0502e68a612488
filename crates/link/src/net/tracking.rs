/// Highest inbound sequence number observed on a channel.
///
/// Never decreases. A packet is "fresh" when its sequence equals the stored
/// value, which is what lets the controller ignore late or duplicated
/// datagrams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreshnessTracker {
    highest_seen: u32,
}

impl FreshnessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an inbound sequence. Returns true if it raised the high mark.
    pub fn observe(&mut self, sequence: u32) -> bool {
        if sequence > self.highest_seen {
            self.highest_seen = sequence;
            true
        } else {
            false
        }
    }

    pub fn highest_seen(&self) -> u32 {
        self.highest_seen
    }

    pub fn is_latest(&self, sequence: u32) -> bool {
        sequence == self.highest_seen
    }
}
