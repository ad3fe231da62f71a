use serde::{Deserialize, Serialize};

/// Controller state returned to the game for one tick.
///
/// Analog values are in `[-1, 1]`. The default value is neutral input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub steer: f64,
    pub throttle: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
}

impl ControlCommand {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = throttle;
        self
    }
}

/// One-shot chat messages the agent may emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickChat {
    InformationIGotIt,
}
