use glam::DVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendEvent {
    /// True when the perceptual gate held the sample back.
    pub suppressed: bool,
    pub packet_time: u64,
    pub sequence: u32,
    pub position: DVec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiveEvent {
    /// True when the target came from extrapolation rather than a fresh packet.
    pub predicted: bool,
    pub packet_time: u64,
    pub sequence: u32,
    pub position: DVec3,
    pub loss_ratio: f64,
}

/// Optional observer of controller activity. The controller behaves the same
/// whether or not anything is listening.
pub trait EventSink {
    fn record_send(&mut self, event: &SendEvent);
    fn record_receive(&mut self, event: &ReceiveEvent);
    fn record_error(&mut self, message: &str);

    fn flush(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record_send(&mut self, _event: &SendEvent) {}
    fn record_receive(&mut self, _event: &ReceiveEvent) {}
    fn record_error(&mut self, _message: &str) {}
}
