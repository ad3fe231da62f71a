mod flip;
mod sequence;

pub use flip::front_flip;
pub use sequence::{ControlSequence, ControlStep};

use skid_core::ControlCommand;

/// The progress of a scripted maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceProgress {
    Continue(ControlCommand),
    Done,
}

impl SequenceProgress {
    /// The command to send this tick, if the maneuver is still running.
    pub fn command(self) -> Option<ControlCommand> {
        match self {
            SequenceProgress::Continue(cmd) => Some(cmd),
            SequenceProgress::Done => None,
        }
    }
}
