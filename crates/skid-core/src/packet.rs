use serde::{Deserialize, Serialize};

use crate::{Orientation, Rotator, Team, Vector3};

/// Physics state of one car in a single frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position in world coordinates (uu)
    pub location: Vector3,
    /// Velocity in world coordinates (uu/s)
    pub velocity: Vector3,
    pub rotation: Rotator,
    /// Remaining boost, 0 to 100
    pub boost: f64,
    /// Whether all wheels touch a surface
    pub has_wheel_contact: bool,
    pub team: Team,
}

impl VehicleState {
    /// Basis vectors of the car, derived from the snapshot rotation.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_rotator(self.rotation)
    }

    /// Speed along the car's nose.
    pub fn forward_speed(&self) -> f64 {
        self.velocity.dot(&self.orientation().forward)
    }

    /// Target expressed in the car's local frame.
    pub fn local(&self, target: Vector3) -> Vector3 {
        self.orientation().relative_location(self.location, target)
    }
}

/// Physics state of the ball in a single frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BallState {
    pub location: Vector3,
    pub velocity: Vector3,
}

/// Match clock and round status.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GameInfo {
    /// Simulation time in seconds
    pub seconds_elapsed: f64,
    pub is_round_active: bool,
    #[serde(default)]
    pub is_kickoff_pause: bool,
}

/// Runtime state of a boost pad, indexed like [`crate::FieldInfo::boost_pads`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BoostPadState {
    pub is_active: bool,
    /// Seconds until the pad is active again
    #[serde(default)]
    pub timer: f64,
}

/// Everything the agent sees in one tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub cars: Vec<VehicleState>,
    pub ball: BallState,
    pub game_info: GameInfo,
    #[serde(default)]
    pub boost_pad_states: Vec<BoostPadState>,
}
