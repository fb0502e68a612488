//! Seams to the physical haptic device.
//!
//! Both calls happen on the real-time thread every tick, so implementations
//! must be cheap and must not block.

use glam::DVec3;

pub trait PositionSource {
    /// Current end-effector position in device coordinates.
    fn read_position(&mut self) -> DVec3;
}

pub trait ForceSink {
    fn apply_force(&mut self, force: DVec3);
}

pub trait HapticDevice: PositionSource + ForceSink {}

impl<T: PositionSource + ForceSink> HapticDevice for T {}

/// Stand-in device for driving a controller without hardware: reports a
/// settable position and remembers every force it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    pub position: DVec3,
    pub forces: Vec<DVec3>,
}

impl RecordingDevice {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            forces: Vec::new(),
        }
    }

    pub fn last_force(&self) -> Option<DVec3> {
        self.forces.last().copied()
    }
}

impl PositionSource for RecordingDevice {
    fn read_position(&mut self) -> DVec3 {
        self.position
    }
}

impl ForceSink for RecordingDevice {
    fn apply_force(&mut self, force: DVec3) {
        self.forces.push(force);
    }
}
