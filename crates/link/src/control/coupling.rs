use glam::DVec3;

pub const DEFAULT_STRENGTH: f64 = 0.1;
pub const DEFAULT_CHARGE: f64 = 1.0;

/// Virtual spring between the local device and the peer's position.
///
/// A positive `charge` pulls towards the peer; a negative one pushes away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringCoupling {
    pub strength: f64,
    pub charge: f64,
}

impl Default for SpringCoupling {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            charge: DEFAULT_CHARGE,
        }
    }
}

impl SpringCoupling {
    pub fn new(strength: f64, charge: f64) -> Self {
        Self { strength, charge }
    }

    pub fn force(&self, current: DVec3, target: DVec3) -> DVec3 {
        -self.strength * (current - target) * self.charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attracts_towards_target() {
        let spring = SpringCoupling::new(0.5, 1.0);

        let force = spring.force(DVec3::new(2.0, 0.0, -4.0), DVec3::ZERO);

        assert_eq!(force, DVec3::new(-1.0, 0.0, 2.0));
    }

    #[test]
    fn test_negative_charge_repels() {
        let spring = SpringCoupling::new(0.5, -1.0);

        let force = spring.force(DVec3::new(2.0, 0.0, 0.0), DVec3::ZERO);

        assert_eq!(force, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_error_zero_force() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(SpringCoupling::default().force(p, p), DVec3::ZERO);
    }
}
