use glam::DVec3;

use super::history::BoundedHistory;
use crate::net::Packet;

/// Keeps the threshold above zero when the device is standing still.
pub const DEFAULT_EPSILON: f64 = 1e-3;
/// Weber fraction used when none is configured.
pub const DEFAULT_PERCEPTUAL_K: f64 = 0.1;

/// Linear dead reckoning: continues the mean step of `history` for one more
/// step from `base`.
///
/// With fewer than two samples there is no trend, so `base` comes back
/// unchanged.
pub fn predict(base: DVec3, history: &BoundedHistory<Packet>) -> DVec3 {
    base + mean_step(history.iter().map(Packet::position))
}

/// Mean of consecutive differences of `positions`, or zero when fewer than
/// two positions are given.
pub fn mean_step<I>(positions: I) -> DVec3
where
    I: IntoIterator<Item = DVec3>,
{
    let mut positions = positions.into_iter();
    let Some(mut prev) = positions.next() else {
        return DVec3::ZERO;
    };

    let mut total = DVec3::ZERO;
    let mut steps = 0u32;
    for position in positions {
        total += position - prev;
        prev = position;
        steps += 1;
    }

    if steps == 0 {
        DVec3::ZERO
    } else {
        total / f64::from(steps)
    }
}

/// Magnitude of the most recent step in `history`, zero with fewer than two
/// entries.
pub fn latest_delta(history: &BoundedHistory<Packet>) -> f64 {
    history
        .latest_pair()
        .map_or(0.0, |(prev, latest)| {
            (latest.position() - prev.position()).length()
        })
}

/// Suppresses updates the far end could not tell apart from its own
/// extrapolation.
///
/// The just-noticeable difference scales with how much the device has been
/// moving (Weber's law): `k * (pos_delta + epsilon)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptualGate {
    pub k: f64,
    pub epsilon: f64,
}

impl Default for PerceptualGate {
    fn default() -> Self {
        Self {
            k: DEFAULT_PERCEPTUAL_K,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl PerceptualGate {
    pub fn new(k: f64, epsilon: f64) -> Self {
        Self { k, epsilon }
    }

    pub fn threshold(&self, pos_delta: f64) -> f64 {
        self.k * (pos_delta + self.epsilon)
    }

    pub fn should_send(&self, predicted: DVec3, actual: DVec3, pos_delta: f64) -> bool {
        (predicted - actual).length() >= self.threshold(pos_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(positions: &[[f64; 3]]) -> BoundedHistory<Packet> {
        let mut history = BoundedHistory::new(positions.len().max(1));
        for (i, p) in positions.iter().enumerate() {
            history.push(Packet::with_timestamp(
                DVec3::from_array(*p),
                i as u32 + 1,
                0,
            ));
        }
        history
    }

    #[test]
    fn test_short_history_returns_base() {
        let base = DVec3::new(4.0, -2.0, 9.0);

        assert_eq!(predict(base, &history_of(&[])), base);
        assert_eq!(predict(base, &history_of(&[[100.0, 100.0, 100.0]])), base);
    }

    #[test]
    fn test_mean_velocity_extrapolation() {
        let history = history_of(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);

        let predicted = predict(DVec3::ZERO, &history);

        assert_eq!(predicted, DVec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_extrapolation_from_moved_base() {
        let history = history_of(&[[0.0, 0.0, 0.0], [0.0, 2.0, -1.0]]);

        let predicted = predict(DVec3::new(10.0, 10.0, 10.0), &history);

        assert_eq!(predicted, DVec3::new(10.0, 12.0, 9.0));
    }

    #[test]
    fn test_latest_delta_uses_two_newest() {
        let history = history_of(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 3.0, 4.0]]);
        assert!((latest_delta(&history) - 5.0).abs() < 1e-12);

        assert_eq!(latest_delta(&history_of(&[[1.0, 1.0, 1.0]])), 0.0);
    }

    #[test]
    fn test_gate_threshold_boundary() {
        let gate = PerceptualGate::new(0.5, 0.0);
        let actual = DVec3::ZERO;

        // threshold = 0.5 * 2.0 = 1.0
        assert!(!gate.should_send(DVec3::new(0.999, 0.0, 0.0), actual, 2.0));
        assert!(gate.should_send(DVec3::new(1.0, 0.0, 0.0), actual, 2.0));
        assert!(gate.should_send(DVec3::new(0.0, 3.0, 0.0), actual, 2.0));
    }

    #[test]
    fn test_gate_epsilon_when_stationary() {
        let gate = PerceptualGate::new(1.0, 0.01);

        assert!(!gate.should_send(DVec3::new(0.005, 0.0, 0.0), DVec3::ZERO, 0.0));
        assert!(gate.should_send(DVec3::new(0.02, 0.0, 0.0), DVec3::ZERO, 0.0));
    }

    #[test]
    fn test_gate_with_zero_k_always_sends() {
        let gate = PerceptualGate::new(0.0, DEFAULT_EPSILON);

        assert!(gate.should_send(DVec3::ZERO, DVec3::ZERO, 123.0));
    }
}
