use std::f64::consts::TAU;

use clap::ValueEnum;
use glam::DVec3;

use tether::{ForceSink, PositionSource};

const MASS: f64 = 1.0;
const HAND_STIFFNESS: f64 = 400.0;
// Critical damping for the mass and stiffness above.
const HAND_DAMPING: f64 = 40.0;

const CIRCLE_RADIUS: f64 = 0.05;
const CIRCLE_PERIOD_SECS: f64 = 2.0;

/// Scripted hand the simulated operator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Motion {
    /// Hold the stylus at the origin.
    #[default]
    Hold,
    /// Trace a horizontal circle around the origin.
    Circle,
}

impl Motion {
    pub fn hand_position(self, elapsed_secs: f64) -> DVec3 {
        match self {
            Motion::Hold => DVec3::ZERO,
            Motion::Circle => {
                let angle = TAU * elapsed_secs / CIRCLE_PERIOD_SECS;
                DVec3::new(angle.cos(), angle.sin(), 0.0) * CIRCLE_RADIUS
            }
        }
    }
}

/// Point-mass stylus held by a scripted hand.
///
/// The hand acts as a spring-damper pulling the mass along the motion
/// pattern; the last force from the link is added on top. `step` advances
/// the simulation by one tick period.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    motion: Motion,
    position: DVec3,
    velocity: DVec3,
    applied_force: DVec3,
    elapsed_secs: f64,
    dt: f64,
}

impl SimulatedDevice {
    pub fn new(motion: Motion, tick_rate: u32) -> Self {
        Self {
            motion,
            position: motion.hand_position(0.0),
            velocity: DVec3::ZERO,
            applied_force: DVec3::ZERO,
            elapsed_secs: 0.0,
            dt: 1.0 / tick_rate.max(1) as f64,
        }
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn step(&mut self) {
        self.elapsed_secs += self.dt;
        let hand = self.motion.hand_position(self.elapsed_secs);

        let spring = HAND_STIFFNESS * (hand - self.position);
        let damping = -HAND_DAMPING * self.velocity;
        let acceleration = (spring + damping + self.applied_force) / MASS;

        // Semi-implicit Euler.
        self.velocity += acceleration * self.dt;
        self.position += self.velocity * self.dt;
    }

    /// Stops pushing on the stylus.
    pub fn release(&mut self) {
        self.applied_force = DVec3::ZERO;
        log::info!("device released at {:?}", self.position);
    }
}

impl PositionSource for SimulatedDevice {
    fn read_position(&mut self) -> DVec3 {
        self.position
    }
}

impl ForceSink for SimulatedDevice {
    fn apply_force(&mut self, force: DVec3) {
        self.applied_force = force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_stylus_stays_put() {
        let mut device = SimulatedDevice::new(Motion::Hold, 1000);
        for _ in 0..1000 {
            device.step();
        }
        assert_eq!(device.read_position(), DVec3::ZERO);
    }

    #[test]
    fn test_circle_follows_hand() {
        let mut device = SimulatedDevice::new(Motion::Circle, 1000);
        assert!((device.position() - DVec3::new(CIRCLE_RADIUS, 0.0, 0.0)).length() < 1e-12);

        for _ in 0..500 {
            device.step();
        }

        // A quarter period in; the stylus lags slightly behind the hand.
        let hand = Motion::Circle.hand_position(0.5);
        assert!((device.position() - hand).length() < CIRCLE_RADIUS * 0.5);
        assert!(device.position().y > 0.0);
    }

    #[test]
    fn test_applied_force_displaces_stylus() {
        let mut device = SimulatedDevice::new(Motion::Hold, 1000);
        device.apply_force(DVec3::new(8.0, 0.0, 0.0));
        for _ in 0..2000 {
            device.step();
        }

        // Settles where the hand spring balances the push.
        let expected = 8.0 / HAND_STIFFNESS;
        assert!((device.position().x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_release_clears_force() {
        let mut device = SimulatedDevice::new(Motion::Hold, 1000);
        device.apply_force(DVec3::ONE);
        device.release();
        assert_eq!(device.applied_force, DVec3::ZERO);
    }

    #[test]
    fn test_circle_hand_is_periodic() {
        let start = Motion::Circle.hand_position(0.0);
        let later = Motion::Circle.hand_position(CIRCLE_PERIOD_SECS);
        assert!((start - later).length() < 1e-12);
        assert!((start.length() - CIRCLE_RADIUS).abs() < 1e-12);
    }
}
