use skid_core::{flat_direction, PolicySettings, Vector3};

/// Which side of the base point the car should come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApproachSide {
    /// Stand off on the far side from the goal we attack.
    AwayFrom(Vector3),
    /// Stand off towards the goal we defend.
    Towards(Vector3),
}

/// Offset `base` by the stand-off distance on the requested side.
///
/// The offset is horizontal; the height of `base` is kept and clamped to the ground.
pub fn approach_point(base: Vector3, side: ApproachSide, settings: &PolicySettings) -> Vector3 {
    let standoff = if base.z > settings.high_ball_height {
        settings.high_ball_standoff
    } else {
        settings.standoff
    };

    let offset = match side {
        ApproachSide::AwayFrom(goal) => -flat_direction(base, goal) * standoff,
        ApproachSide::Towards(goal) => flat_direction(base, goal) * standoff,
    };

    let mut aim = base + offset;
    aim.z = aim.z.max(0.0);
    aim
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_behind_ground_ball() {
        let settings = PolicySettings::default();
        let aim = approach_point(
            Vector3::new(0.0, 1000.0, 93.0),
            ApproachSide::AwayFrom(Vector3::new(0.0, 5120.0, 0.0)),
            &settings,
        );
        assert_relative_eq!(aim, Vector3::new(0.0, 760.0, 93.0), epsilon = 1e-9);
    }

    #[test]
    fn test_high_ball_uses_larger_standoff() {
        let settings = PolicySettings::default();
        let aim = approach_point(
            Vector3::new(0.0, 1000.0, 400.0),
            ApproachSide::Towards(Vector3::new(0.0, -5120.0, 0.0)),
            &settings,
        );
        assert_relative_eq!(aim, Vector3::new(0.0, 680.0, 400.0), epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_goal_falls_back_to_x() {
        let settings = PolicySettings::default();
        let goal = Vector3::new(0.0, 5120.0, 0.0);
        let aim = approach_point(Vector3::new(0.3, 5120.2, 93.0), ApproachSide::AwayFrom(goal), &settings);
        assert!(aim.iter().all(|c| c.is_finite()));
        assert_relative_eq!(aim.x, 0.3 - 240.0, epsilon = 1e-9);
        assert_relative_eq!(aim.y, 5120.2, epsilon = 1e-9);
    }

    #[test]
    fn test_height_is_clamped() {
        let settings = PolicySettings::default();
        let aim = approach_point(
            Vector3::new(0.0, 0.0, -20.0),
            ApproachSide::AwayFrom(Vector3::new(0.0, 5120.0, 0.0)),
            &settings,
        );
        assert_eq!(aim.z, 0.0);
    }
}
