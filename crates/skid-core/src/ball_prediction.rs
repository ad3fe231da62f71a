use serde::{Deserialize, Serialize};

use crate::Vector3;

/// A predicted ball position at a future simulation time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Simulation time of the sample in seconds
    pub time: f64,
    pub location: Vector3,
}

/// Future ball path produced by the external predictor, regenerated every tick.
///
/// Sample times are non-decreasing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BallTrajectory {
    pub samples: Vec<TrajectorySample>,
}

impl BallTrajectory {
    pub fn new(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the first sample at or after `time`, if the prediction reaches that far.
    pub fn slice_at_time(&self, time: f64) -> Option<&TrajectorySample> {
        let idx = self.samples.partition_point(|s| s.time < time);
        self.samples.get(idx)
    }
}
