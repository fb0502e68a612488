use super::coupling::{DEFAULT_CHARGE, DEFAULT_STRENGTH, SpringCoupling};
use super::predictor::{DEFAULT_EPSILON, DEFAULT_PERCEPTUAL_K, PerceptualGate};

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid role {0:?}, expected primary or secondary")]
    InvalidRole(String),
    #[error("cannot resolve peer address {0:?}")]
    UnresolvablePeer(String),
    #[error("history capacity must be at least 1, got {0}")]
    InvalidHistoryCapacity(usize),
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub history_capacity: usize,
    pub perceptual_k: f64,
    pub epsilon: f64,
    pub strength: f64,
    /// Signed; negative inverts the coupling.
    pub charge: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            perceptual_k: DEFAULT_PERCEPTUAL_K,
            epsilon: DEFAULT_EPSILON,
            strength: DEFAULT_STRENGTH,
            charge: DEFAULT_CHARGE,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity(self.history_capacity));
        }

        for (name, value) in [
            ("perceptual_k", self.perceptual_k),
            ("epsilon", self.epsilon),
            ("strength", self.strength),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }

        if !self.charge.is_finite() {
            return Err(ConfigError::InvalidConstant {
                name: "charge",
                value: self.charge,
            });
        }

        Ok(())
    }

    pub fn gate(&self) -> PerceptualGate {
        PerceptualGate::new(self.perceptual_k, self.epsilon)
    }

    pub fn coupling(&self) -> SpringCoupling {
        SpringCoupling::new(self.strength, self.charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_history() {
        let config = ControllerConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidHistoryCapacity(0))
        );
    }

    #[test]
    fn test_rejects_negative_k() {
        let config = ControllerConfig {
            perceptual_k: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConstant { name: "perceptual_k", .. })
        ));
    }

    #[test]
    fn test_negative_charge_is_allowed() {
        let config = ControllerConfig {
            charge: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_nan_charge() {
        let config = ControllerConfig {
            charge: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
