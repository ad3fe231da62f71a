use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Euler rotation of a body as reported by the game, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotator {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Orthonormal basis of a body, derived from its [`Rotator`].
///
/// This is a pure function of the snapshot and is recomputed every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Direction the nose points to.
    pub forward: Vector3,
    /// Direction of the right side.
    pub right: Vector3,
    /// Direction of the roof.
    pub up: Vector3,
}

impl Orientation {
    pub fn from_rotator(rotation: Rotator) -> Self {
        let (sp, cp) = rotation.pitch.sin_cos();
        let (sy, cy) = rotation.yaw.sin_cos();
        let (sr, cr) = rotation.roll.sin_cos();

        Self {
            forward: Vector3::new(cp * cy, cp * sy, sp),
            right: Vector3::new(cy * sp * sr - cr * sy, sy * sp * sr + cr * cy, -cp * sr),
            up: Vector3::new(-cr * cy * sp - sr * sy, -cr * sy * sp + sr * cy, cp * cr),
        }
    }

    /// Expresses `target` in the local frame of a body located at `center`.
    ///
    /// `x` is forward, `y` is right and `z` is up.
    pub fn relative_location(&self, center: Vector3, target: Vector3) -> Vector3 {
        let offset = target - center;
        Vector3::new(
            offset.dot(&self.forward),
            offset.dot(&self.right),
            offset.dot(&self.up),
        )
    }
}
