use skid_core::ControlCommand;

use super::{ControlSequence, ControlStep};

/// Jump, release, jump again with the nose down, then wait for the landing.
pub fn front_flip() -> ControlSequence {
    ControlSequence::new(vec![
        ControlStep::new(0.05, ControlCommand::neutral().with_jump(true)),
        ControlStep::new(0.05, ControlCommand::neutral()),
        ControlStep::new(
            0.2,
            ControlCommand::neutral().with_jump(true).with_pitch(-1.0),
        ),
        ControlStep::new(0.8, ControlCommand::neutral()),
    ])
}
