use skid_core::{flat_dist, BallState, ControlCommand, SpeedSettings, Vector3, VehicleState};

use super::{ball_control, BallControl};

/// Turns a target and an optional time budget into throttle, boost and handbrake.
pub struct SpeedController {
    settings: SpeedSettings,
}

impl SpeedController {
    pub fn new(settings: SpeedSettings) -> Self {
        Self { settings }
    }

    pub fn update_settings(&mut self, settings: SpeedSettings) {
        self.settings = settings;
    }

    /// Angle (rad) between the car's nose and the target, positive to the right.
    pub fn heading_error(vehicle: &VehicleState, target: Vector3) -> f64 {
        let local = vehicle.local(target);
        local.y.atan2(local.x)
    }

    /// Speed the car should be travelling at, in uu/s.
    pub fn desired_speed(&self, distance: f64, heading_error: f64, time_budget: Option<f64>) -> f64 {
        let s = &self.settings;
        match time_budget {
            Some(budget) if budget > 0.0 => (distance / budget).clamp(s.min_speed, s.max_speed),
            _ => {
                let base = if heading_error.abs() < s.aligned_angle {
                    s.aligned_speed
                } else {
                    s.turning_speed
                };
                base.min((distance * s.short_range_factor).max(s.min_speed))
            }
        }
    }

    pub fn throttle(&self, desired_speed: f64, forward_speed: f64) -> f64 {
        ((desired_speed - forward_speed) / self.settings.throttle_gain).clamp(-1.0, 1.0)
    }

    /// Boost only to gain a lot of speed while facing the target.
    pub fn should_boost(
        &self,
        desired_speed: f64,
        forward_speed: f64,
        heading_error: f64,
        boost_amount: f64,
    ) -> bool {
        let s = &self.settings;
        desired_speed > s.boost_min_speed
            && heading_error.abs() < s.aligned_angle
            && desired_speed - forward_speed > s.boost_min_deficit
            && boost_amount > 0.0
    }

    /// Handbrake only for sharp turns at low speed.
    pub fn should_handbrake(&self, speed: f64, heading_error: f64) -> bool {
        heading_error.abs() > self.settings.handbrake_angle
            && speed < self.settings.handbrake_max_speed
    }

    pub fn synthesize(
        &self,
        vehicle: &VehicleState,
        target: Vector3,
        time_budget: Option<f64>,
        ball: &BallState,
        steer: f64,
    ) -> ControlCommand {
        let distance = flat_dist(vehicle.location, target);
        let heading = Self::heading_error(vehicle, target);
        let forward_speed = vehicle.forward_speed();
        let desired = self.desired_speed(distance, heading, time_budget);

        let mut cmd = ControlCommand {
            steer,
            throttle: self.throttle(desired, forward_speed),
            boost: self.should_boost(desired, forward_speed, heading, vehicle.boost),
            handbrake: self.should_handbrake(vehicle.velocity.norm(), heading),
            ..Default::default()
        };

        match ball_control(vehicle, ball, target, &self.settings) {
            BallControl::Pop => cmd.jump = true,
            BallControl::Nudge => cmd.pitch = self.settings.nudge_pitch,
            BallControl::None => {}
        }

        log::trace!(
            "distance {:.0} heading {:.2} desired {:.0} forward {:.0}",
            distance,
            heading,
            desired,
            forward_speed
        );
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> SpeedController {
        SpeedController::new(SpeedSettings::default())
    }

    fn car(speed: f64) -> VehicleState {
        VehicleState {
            location: Vector3::new(0.0, 0.0, 17.0),
            velocity: Vector3::new(speed, 0.0, 0.0),
            boost: 50.0,
            has_wheel_contact: true,
            ..Default::default()
        }
    }

    fn far_ball() -> BallState {
        BallState {
            location: Vector3::new(-3000.0, 3000.0, 93.0),
            velocity: Vector3::zeros(),
        }
    }

    #[test]
    fn test_desired_speed_from_budget() {
        let c = controller();
        assert_relative_eq!(c.desired_speed(3000.0, 0.0, Some(2.0)), 1500.0);
        assert_eq!(c.desired_speed(100.0, 0.0, Some(2.0)), 700.0);
        assert_eq!(c.desired_speed(9000.0, 0.0, Some(1.0)), 2200.0);
    }

    #[test]
    fn test_desired_speed_without_budget() {
        let c = controller();
        assert_eq!(c.desired_speed(5000.0, 0.1, None), 1900.0);
        assert_eq!(c.desired_speed(5000.0, 1.0, None), 1500.0);
        assert_relative_eq!(c.desired_speed(1000.0, 0.1, None), 1200.0);
        assert_eq!(c.desired_speed(100.0, 0.1, None), 700.0);
        // Non-positive budgets are ignored.
        assert_eq!(c.desired_speed(5000.0, 0.1, Some(0.0)), 1900.0);
        assert_eq!(c.desired_speed(5000.0, 0.1, Some(-1.0)), 1900.0);
    }

    #[test]
    fn test_throttle_is_clamped() {
        let c = controller();
        assert_eq!(c.throttle(1900.0, 0.0), 1.0);
        assert_eq!(c.throttle(700.0, 2000.0), -1.0);
        assert_relative_eq!(c.throttle(1500.0, 1250.0), 0.5);
    }

    #[test]
    fn test_boost_thresholds() {
        let c = controller();
        assert!(c.should_boost(1500.0, 0.0, 0.0, 50.0));
        // Desired speed at the threshold.
        assert!(!c.should_boost(1200.0, 0.0, 0.0, 50.0));
        assert!(c.should_boost(1200.5, 0.0, 0.0, 50.0));
        // Heading at the threshold.
        assert!(!c.should_boost(1500.0, 0.0, 0.35, 50.0));
        assert!(c.should_boost(1500.0, 0.0, 0.3499, 50.0));
        assert!(!c.should_boost(1500.0, 0.0, -0.35, 50.0));
        // Deficit at the threshold.
        assert!(!c.should_boost(1500.0, 1100.0, 0.0, 50.0));
        assert!(c.should_boost(1500.0, 1099.0, 0.0, 50.0));
        // Empty tank.
        assert!(!c.should_boost(1500.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_handbrake_only_for_slow_sharp_turns() {
        let c = controller();
        assert!(c.should_handbrake(300.0, 2.0));
        assert!(!c.should_handbrake(1200.0, 2.0));
        assert!(!c.should_handbrake(300.0, 1.0));
    }

    #[test]
    fn test_synthesize_full_speed_ahead() {
        let cmd = controller().synthesize(
            &car(0.0),
            Vector3::new(4000.0, 0.0, 0.0),
            None,
            &far_ball(),
            0.0,
        );
        assert_eq!(cmd.throttle, 1.0);
        assert!(cmd.boost);
        assert!(!cmd.handbrake);
        assert!(!cmd.jump);
        assert_eq!(cmd.pitch, 0.0);
    }

    #[test]
    fn test_synthesize_target_behind() {
        let cmd = controller().synthesize(
            &car(200.0),
            Vector3::new(-2000.0, 100.0, 0.0),
            None,
            &far_ball(),
            1.0,
        );
        assert_eq!(cmd.steer, 1.0);
        assert!(!cmd.boost);
        assert!(cmd.handbrake);
    }

    #[test]
    fn test_synthesize_brakes_when_early() {
        let cmd = controller().synthesize(
            &car(2000.0),
            Vector3::new(1000.0, 0.0, 0.0),
            Some(2.0),
            &far_ball(),
            0.0,
        );
        assert_eq!(cmd.throttle, -1.0);
        assert!(!cmd.boost);
    }

    #[test]
    fn test_synthesize_pops_carried_ball() {
        let ball = BallState {
            location: Vector3::new(120.0, 0.0, 110.0),
            velocity: Vector3::zeros(),
        };
        let cmd = controller().synthesize(&car(500.0), Vector3::new(200.0, 0.0, 0.0), None, &ball, 0.0);
        assert!(cmd.jump);
        assert_eq!(cmd.pitch, 0.0);

        let cmd = controller().synthesize(&car(500.0), Vector3::new(3000.0, 0.0, 0.0), None, &ball, 0.0);
        assert!(!cmd.jump);
        assert_eq!(cmd.pitch, -0.2);
    }
}
