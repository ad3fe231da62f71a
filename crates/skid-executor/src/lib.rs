//! Per-tick decision loop for a single car.
//!
//! Each tick the [`Agent`] either continues a committed maneuver or runs the
//! interception → target → speed control pipeline and returns one command.

pub mod control;
pub mod intercept;
pub mod skills;
pub mod strategy;

use skid_core::{
    debug_line, debug_rect, debug_remove, debug_string, debug_text, debug_value, AgentSettings,
    BallState,
    BallTrajectory, BoostPadTable, ControlCommand, DebugColor, FieldInfo, QuickChat, Steering,
    SteerToward, TrajectorySample, VehicleState, WorldSnapshot,
};

use control::SpeedController;
use intercept::InterceptionSelector;
use skills::{front_flip, ControlSequence, SequenceProgress};
use strategy::{PolicyCtx, TacticalPolicy, Target, TargetKind};

/// How far ahead (s) the ball is drawn when there is no intercept.
const PREVIEW_TIME: f64 = 1.5;

/// The control loop for one car.
pub struct Agent {
    index: usize,
    selector: InterceptionSelector,
    policy: TacticalPolicy,
    controller: SpeedController,
    steering: Box<dyn Steering + Send>,
    boost_pads: BoostPadTable,

    active_sequence: Option<ControlSequence>,
    last_tick_time: Option<f64>,
    /// Set once the kickoff flip has been issued, cleared when the kickoff is over.
    kickoff_flip_used: bool,
    last_target: Option<Target>,
    quick_chats: Vec<QuickChat>,
}

impl Agent {
    /// Create an agent controlling the car at `index` in the snapshot's car list.
    pub fn new(index: usize, field: &FieldInfo, settings: &AgentSettings) -> Self {
        Self {
            index,
            selector: InterceptionSelector::new(settings.intercept.clone()),
            policy: TacticalPolicy::new(settings.policy.clone()),
            controller: SpeedController::new(settings.speed.clone()),
            steering: Box::new(SteerToward::default()),
            boost_pads: BoostPadTable::new(field),
            active_sequence: None,
            last_tick_time: None,
            kickoff_flip_used: false,
            last_target: None,
            quick_chats: Vec::new(),
        }
    }

    /// Replace the steering function.
    pub fn with_steering(mut self, steering: impl Steering + Send + 'static) -> Self {
        self.steering = Box::new(steering);
        self
    }

    /// Swap in new tuning. Running maneuvers and the kickoff latch are kept.
    pub fn update_settings(&mut self, settings: &AgentSettings) {
        self.selector.update_settings(settings.intercept.clone());
        self.policy.update_settings(settings.policy.clone());
        self.controller.update_settings(settings.speed.clone());
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether a committed maneuver is running.
    pub fn in_maneuver(&self) -> bool {
        self.active_sequence
            .as_ref()
            .map_or(false, |sequence| !sequence.is_done())
    }

    /// The target chosen on the last tick that ran the policy.
    pub fn last_target(&self) -> Option<&Target> {
        self.last_target.as_ref()
    }

    /// Get the quick chats that need to be sent. This removes them from the internal
    /// queue.
    pub fn quick_chats(&mut self) -> Vec<QuickChat> {
        std::mem::take(&mut self.quick_chats)
    }

    /// Run one tick. Never fails: missing data degrades to a neutral command.
    pub fn tick(
        &mut self,
        snapshot: &WorldSnapshot,
        prediction: Option<&BallTrajectory>,
    ) -> ControlCommand {
        let now = snapshot.game_info.seconds_elapsed;
        let dt = self
            .last_tick_time
            .map(|last| (now - last).max(0.0))
            .unwrap_or(0.0);
        self.last_tick_time = Some(now);

        self.boost_pads.update_status(snapshot);

        if let Some(sequence) = self.active_sequence.as_mut() {
            match sequence.tick(dt) {
                SequenceProgress::Continue(cmd) => return cmd,
                SequenceProgress::Done => {
                    log::debug!(
                        "p{} maneuver finished after {:.2}s",
                        self.index,
                        sequence.elapsed()
                    );
                    self.active_sequence = None;
                }
            }
        }

        let Some(vehicle) = snapshot.cars.get(self.index) else {
            log::warn!("Car {} missing from snapshot, sending neutral input", self.index);
            return ControlCommand::neutral();
        };

        let intercept = self.selector.select(prediction, vehicle, now);
        let ctx = PolicyCtx {
            vehicle,
            ball: &snapshot.ball,
            intercept,
            boost_pads: &self.boost_pads,
            game_info: &snapshot.game_info,
        };
        let target = self.policy.choose_target(&ctx);
        self.set_last_target(target);

        if target.kind != TargetKind::Kickoff {
            self.kickoff_flip_used = false;
        }
        if target.wants_flip && !self.kickoff_flip_used {
            self.kickoff_flip_used = true;
            return self.begin_front_flip();
        }

        self.draw(vehicle, &snapshot.ball, intercept, &target, prediction, now);

        let steer = self.steering.steer(vehicle, target.location);
        self.controller.synthesize(
            vehicle,
            target.location,
            target.time_budget,
            &snapshot.ball,
            steer,
        )
    }

    /// Commit to a front flip. The policy is suspended until the flip is over.
    fn begin_front_flip(&mut self) -> ControlCommand {
        let mut sequence = front_flip();
        log::debug!(
            "p{} starting front flip ({:.2}s)",
            self.index,
            sequence.total_duration()
        );
        self.quick_chats.push(QuickChat::InformationIGotIt);

        let cmd = sequence.tick(0.0).command().unwrap_or_default();
        self.active_sequence = Some(sequence);
        cmd
    }

    fn set_last_target(&mut self, target: Target) {
        let previous = self.last_target.map(|t| t.kind);
        if previous != Some(target.kind) {
            log::debug!(
                "p{} target kind {} -> {}",
                self.index,
                previous.map(|k| k.as_str()).unwrap_or("none"),
                target.kind.as_str()
            );
        }
        self.last_target = Some(target);
    }

    fn draw(
        &self,
        vehicle: &VehicleState,
        ball: &BallState,
        intercept: Option<TrajectorySample>,
        target: &Target,
        prediction: Option<&BallTrajectory>,
        now: f64,
    ) {
        let p = self.index;
        debug_line(
            format!("p{p}.target_line"),
            vehicle.location,
            target.location,
            DebugColor::White,
        );
        let color = match target.kind {
            TargetKind::Shadow => DebugColor::Red,
            TargetKind::BoostPad => DebugColor::Green,
            _ => DebugColor::Cyan,
        };
        debug_rect(format!("p{p}.target"), target.location, 8.0, true, color);
        debug_text(
            format!("p{p}.speed"),
            vehicle.location,
            format!("Speed: {:.1}", vehicle.velocity.norm()),
        );
        debug_string(format!("p{p}.target_kind"), target.kind.as_str());
        match target.time_budget {
            Some(budget) => debug_value(format!("p{p}.time_budget"), budget),
            None => debug_remove(format!("p{p}.time_budget")),
        }

        let ahead = intercept
            .map(|sample| sample.location)
            .or_else(|| {
                prediction
                    .and_then(|p| p.slice_at_time(now + PREVIEW_TIME))
                    .map(|sample| sample.location)
            });
        match ahead {
            Some(location) => {
                debug_line(format!("p{p}.ball_ahead"), ball.location, location, DebugColor::Cyan)
            }
            None => debug_remove(format!("p{p}.ball_ahead")),
        }
    }
}
