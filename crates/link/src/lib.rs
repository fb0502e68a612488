pub mod control;
pub mod device;
pub mod event;
pub mod net;
pub mod time;

pub use control::{
    BoundedHistory, ConfigError, ControllerConfig, PerceptualGate, Phase, Role, SessionController,
    SessionStats, SpringCoupling, predict,
};
pub use device::{ForceSink, HapticDevice, PositionSource, RecordingDevice};
pub use event::{CsvEventLog, EventSink, NullSink, ReceiveEvent, SendEvent};
pub use net::{
    Channel, DEFAULT_PORT, DEFAULT_TICK_RATE, FreshnessTracker, LossCounters, NetworkStats,
    PACKET_SIZE, Packet, PacketError, PacketLossSimulation, SendFailure,
};
