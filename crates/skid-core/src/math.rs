use crate::Vector3;

/// Horizontal distance below which a direction is considered degenerate.
pub const DEGENERATE_DISTANCE: f64 = 1.0;

/// Projects a vector onto the ground plane.
pub fn flat(v: Vector3) -> Vector3 {
    Vector3::new(v.x, v.y, 0.0)
}

/// Euclidean distance between two points.
pub fn dist(a: Vector3, b: Vector3) -> f64 {
    (a - b).norm()
}

/// Distance between two points ignoring height.
pub fn flat_dist(a: Vector3, b: Vector3) -> f64 {
    flat(a - b).norm()
}

/// Returns a vector with the same direction as `v` and the given length.
///
/// A zero vector stays zero.
pub fn rescale(v: Vector3, length: f64) -> Vector3 {
    let norm = v.norm();
    if norm == 0.0 {
        Vector3::zeros()
    } else {
        v * (length / norm)
    }
}

/// Unit horizontal direction pointing from `from` to `to`.
///
/// Falls back to the `+x` axis when the two points (nearly) coincide on the ground
/// plane, so callers can offset along the result without checking its length.
pub fn flat_direction(from: Vector3, to: Vector3) -> Vector3 {
    let delta = flat(to - from);
    let length = delta.norm();
    if length < DEGENERATE_DISTANCE {
        Vector3::x()
    } else {
        delta / length
    }
}
