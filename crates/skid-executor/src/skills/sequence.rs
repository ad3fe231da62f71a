use skid_core::ControlCommand;

use super::SequenceProgress;

/// A command held for a fixed amount of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlStep {
    /// Duration in seconds
    pub duration: f64,
    pub controls: ControlCommand,
}

impl ControlStep {
    pub fn new(duration: f64, controls: ControlCommand) -> Self {
        Self { duration, controls }
    }
}

/// An uninterruptible list of timed steps.
///
/// Each step owns the window `[start, start + duration)` of the time accumulated since
/// the first tick. Once the accumulated time reaches the total duration the sequence
/// is done and stays done.
#[derive(Debug, Clone)]
pub struct ControlSequence {
    steps: Vec<ControlStep>,
    elapsed: f64,
    done: bool,
}

impl ControlSequence {
    pub fn new(steps: Vec<ControlStep>) -> Self {
        let done = steps.is_empty();
        Self {
            steps,
            elapsed: 0.0,
            done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Time accumulated over all ticks so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn total_duration(&self) -> f64 {
        self.steps.iter().map(|step| step.duration).sum()
    }

    /// Advance the sequence by `dt` seconds and return the command for the new time.
    ///
    /// Negative `dt` values are treated as zero.
    pub fn tick(&mut self, dt: f64) -> SequenceProgress {
        if self.done {
            return SequenceProgress::Done;
        }
        self.elapsed += dt.max(0.0);

        let mut window_end = 0.0;
        for step in &self.steps {
            window_end += step.duration;
            if self.elapsed < window_end {
                return SequenceProgress::Continue(step.controls);
            }
        }

        self.done = true;
        SequenceProgress::Done
    }
}
