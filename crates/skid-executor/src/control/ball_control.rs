use skid_core::{flat_dist, BallState, SpeedSettings, Vector3, VehicleState};

/// What to do with a ball resting on the nose of the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallControl {
    None,
    /// Jump to pop the ball up.
    Pop,
    /// Keep the nose slightly down to hold possession.
    Nudge,
}

/// Decide the ball-control action for this tick.
///
/// The ball must be low and centered in front of the car. A nearby target
/// means pop, which needs wheel contact. A distant one means nudge.
pub fn ball_control(
    vehicle: &VehicleState,
    ball: &BallState,
    target: Vector3,
    settings: &SpeedSettings,
) -> BallControl {
    let local = vehicle.local(ball.location);
    let low = ball.location.z < settings.ball_control_height;
    let centered = local.x > 0.0
        && local.x < settings.ball_control_reach
        && local.y.abs() < settings.ball_control_half_width;
    if !(low && centered) {
        return BallControl::None;
    }

    let close = flat_dist(vehicle.location, target) < settings.pop_distance;
    if !close {
        BallControl::Nudge
    } else if vehicle.has_wheel_contact {
        BallControl::Pop
    } else {
        BallControl::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> VehicleState {
        VehicleState {
            location: Vector3::new(0.0, 0.0, 17.0),
            has_wheel_contact: true,
            ..Default::default()
        }
    }

    fn ball_at(x: f64, y: f64, z: f64) -> BallState {
        BallState {
            location: Vector3::new(x, y, z),
            velocity: Vector3::zeros(),
        }
    }

    #[test]
    fn test_pop_when_close() {
        let s = SpeedSettings::default();
        let result = ball_control(&car(), &ball_at(150.0, 10.0, 100.0), Vector3::new(200.0, 0.0, 0.0), &s);
        assert_eq!(result, BallControl::Pop);
    }

    #[test]
    fn test_nudge_when_far() {
        let s = SpeedSettings::default();
        let result = ball_control(&car(), &ball_at(150.0, 10.0, 100.0), Vector3::new(3000.0, 0.0, 0.0), &s);
        assert_eq!(result, BallControl::Nudge);
    }

    #[test]
    fn test_no_pop_or_nudge_in_air_near_target() {
        let s = SpeedSettings::default();
        let mut car = car();
        car.has_wheel_contact = false;
        let result = ball_control(&car, &ball_at(150.0, 10.0, 100.0), Vector3::new(200.0, 0.0, 0.0), &s);
        assert_eq!(result, BallControl::None);
    }

    #[test]
    fn test_nudge_in_air_far_from_target() {
        let s = SpeedSettings::default();
        let mut car = car();
        car.has_wheel_contact = false;
        let result = ball_control(&car, &ball_at(150.0, 10.0, 100.0), Vector3::new(3000.0, 0.0, 0.0), &s);
        assert_eq!(result, BallControl::Nudge);
    }

    #[test]
    fn test_no_control_off_center_or_high() {
        let s = SpeedSettings::default();
        let target = Vector3::new(200.0, 0.0, 0.0);
        assert_eq!(ball_control(&car(), &ball_at(150.0, 120.0, 100.0), target, &s), BallControl::None);
        assert_eq!(ball_control(&car(), &ball_at(-150.0, 0.0, 100.0), target, &s), BallControl::None);
        assert_eq!(ball_control(&car(), &ball_at(150.0, 0.0, 400.0), target, &s), BallControl::None);
    }
}
