use crate::{Vector3, VehicleState};

/// Maps a world-space target to a wheel steer value in `[-1, 1]`.
///
/// A value near zero means the car is facing the target.
pub trait Steering {
    fn steer(&self, vehicle: &VehicleState, target: Vector3) -> f64;
}

/// Proportional steering on the angle to the target in the car's frame.
#[derive(Clone, Copy, Debug)]
pub struct SteerToward {
    pub gain: f64,
}

impl Default for SteerToward {
    fn default() -> Self {
        Self { gain: 5.0 }
    }
}

impl Steering for SteerToward {
    fn steer(&self, vehicle: &VehicleState, target: Vector3) -> f64 {
        let local = vehicle.local(target);
        let angle = local.y.atan2(local.x);
        (angle * self.gain).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_ahead() {
        let car = VehicleState::default();
        let steer = SteerToward::default().steer(&car, Vector3::new(1000.0, 0.0, 0.0));
        assert_eq!(steer, 0.0);
    }

    #[test]
    fn test_saturates() {
        let car = VehicleState::default();
        let steering = SteerToward::default();
        assert_eq!(steering.steer(&car, Vector3::new(0.0, 1000.0, 0.0)), 1.0);
        assert_eq!(steering.steer(&car, Vector3::new(-10.0, -1000.0, 0.0)), -1.0);
    }
}
