use skid_core::{flat, flat_dist, BallTrajectory, InterceptSettings, TrajectorySample, VehicleState};

/// Picks the earliest predicted ball position the car can plausibly reach.
pub struct InterceptionSelector {
    settings: InterceptSettings,
}

impl InterceptionSelector {
    pub fn new(settings: InterceptSettings) -> Self {
        Self { settings }
    }

    pub fn update_settings(&mut self, settings: InterceptSettings) {
        self.settings = settings;
    }

    /// Optimistic speed used for travel-time estimates.
    pub fn effective_speed(&self, vehicle: &VehicleState) -> f64 {
        let speed = flat(vehicle.velocity).norm() + self.settings.acceleration_allowance;
        speed.clamp(self.settings.min_speed, self.settings.max_speed)
    }

    /// Scan the trajectory with a fixed stride and return the first reachable sample.
    ///
    /// Samples above the height ceiling and samples not in the future are skipped.
    /// Returns `None` if there is no trajectory or nothing in it is reachable.
    pub fn select(
        &self,
        trajectory: Option<&BallTrajectory>,
        vehicle: &VehicleState,
        now: f64,
    ) -> Option<TrajectorySample> {
        let trajectory = trajectory?;
        let speed = self.effective_speed(vehicle);

        trajectory
            .samples
            .iter()
            .step_by(self.settings.stride.max(1))
            .filter(|sample| sample.location.z <= self.settings.max_height)
            .find(|sample| {
                let time_left = sample.time - now;
                if time_left <= 0.0 {
                    return false;
                }
                let travel_time = flat_dist(vehicle.location, sample.location) / speed;
                travel_time < time_left + self.settings.slack
            })
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skid_core::Vector3;

    fn selector() -> InterceptionSelector {
        InterceptionSelector::new(InterceptSettings::default())
    }

    /// Ball rolling along +y from the origin at the given speed, sampled at 120 Hz.
    fn rolling_ball(speed: f64, height: impl Fn(f64) -> f64) -> BallTrajectory {
        BallTrajectory::new(
            (1..=720)
                .map(|i| {
                    let t = i as f64 / 120.0;
                    TrajectorySample {
                        time: t,
                        location: Vector3::new(0.0, speed * t, height(t)),
                    }
                })
                .collect(),
        )
    }

    fn car_at(x: f64, y: f64) -> VehicleState {
        VehicleState {
            location: Vector3::new(x, y, 17.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_trajectory() {
        assert!(selector().select(None, &car_at(0.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn test_effective_speed_is_clamped() {
        let sel = selector();
        let mut car = car_at(0.0, 0.0);
        assert_eq!(sel.effective_speed(&car), 1000.0);
        car.velocity = Vector3::new(2200.0, 0.0, 0.0);
        assert_eq!(sel.effective_speed(&car), 2300.0);
        car.velocity = Vector3::new(800.0, 0.0, 500.0);
        assert_eq!(sel.effective_speed(&car), 1400.0);
    }

    #[test]
    fn test_picks_earliest_reachable() {
        let trajectory = rolling_ball(500.0, |_| 93.0);
        let car = car_at(2000.0, 0.0);
        let sample = selector().select(Some(&trajectory), &car, 0.0).unwrap();

        let travel = flat_dist(car.location, sample.location) / 1000.0;
        assert!(travel < sample.time + 0.1);

        // Every strided sample before the chosen one is out of reach.
        for earlier in trajectory.samples.iter().step_by(4) {
            if earlier.time >= sample.time {
                break;
            }
            let travel = flat_dist(car.location, earlier.location) / 1000.0;
            assert!(travel >= earlier.time + 0.1);
        }
    }

    #[test]
    fn test_skips_high_samples() {
        // Ball in the air for the first two seconds.
        let trajectory = rolling_ball(0.0, |t| if t < 2.0 { 800.0 } else { 93.0 });
        let sample = selector()
            .select(Some(&trajectory), &car_at(100.0, 0.0), 0.0)
            .unwrap();
        assert!(sample.location.z <= 300.0);
        assert!(sample.time >= 2.0);
    }

    #[test]
    fn test_unreachable() {
        let trajectory = rolling_ball(3000.0, |_| 93.0);
        let car = car_at(0.0, -4000.0);
        assert!(selector().select(Some(&trajectory), &car, 0.0).is_none());
    }

    #[test]
    fn test_ignores_past_samples() {
        let trajectory = rolling_ball(0.0, |_| 93.0);
        let sample = selector()
            .select(Some(&trajectory), &car_at(0.0, 0.0), 3.0)
            .unwrap();
        assert!(sample.time > 3.0);
    }

    #[test]
    fn test_zero_stride_is_treated_as_one() {
        let sel = InterceptionSelector::new(InterceptSettings {
            stride: 0,
            ..Default::default()
        });
        let trajectory = rolling_ball(0.0, |_| 93.0);
        let sample = sel.select(Some(&trajectory), &car_at(0.0, 0.0), 0.0).unwrap();
        assert_eq!(sample.time, 1.0 / 120.0);
    }
}
