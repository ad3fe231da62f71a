//! Tactical target selection.
//!
//! Rules are applied in strict precedence: kickoff, then the defensive shadow base,
//! then boost routing, then the offensive approach offset.

mod boost_routing;
mod kickoff;
mod offense;
mod shadow;

pub use boost_routing::pick_pad;
pub use kickoff::is_kickoff;
pub use offense::{approach_point, ApproachSide};
pub use shadow::shadow_point;

use skid_core::{
    flat_dist, BallState, BoostPadTable, GameInfo, PolicySettings, TrajectorySample, Vector3,
    VehicleState,
};

/// Everything the policy looks at in one tick.
#[derive(Clone, Copy)]
pub struct PolicyCtx<'a> {
    pub vehicle: &'a VehicleState,
    pub ball: &'a BallState,
    pub intercept: Option<TrajectorySample>,
    pub boost_pads: &'a BoostPadTable,
    pub game_info: &'a GameInfo,
}

/// Why a target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Kickoff,
    Shadow,
    BoostPad,
    Intercept,
    Ball,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Kickoff => "kickoff",
            TargetKind::Shadow => "shadow",
            TargetKind::BoostPad => "boost_pad",
            TargetKind::Intercept => "intercept",
            TargetKind::Ball => "ball",
        }
    }
}

/// The aim point for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub location: Vector3,
    pub kind: TargetKind,
    /// Seconds until the ball reaches the chosen intercept, if the target is tied to one.
    pub time_budget: Option<f64>,
    /// Set on kickoff once the car is close enough to flip into the ball.
    pub wants_flip: bool,
}

impl Target {
    fn new(mut location: Vector3, kind: TargetKind) -> Self {
        location.z = location.z.max(0.0);
        Self {
            location,
            kind,
            time_budget: None,
            wants_flip: false,
        }
    }
}

pub struct TacticalPolicy {
    settings: PolicySettings,
}

impl TacticalPolicy {
    pub fn new(settings: PolicySettings) -> Self {
        Self { settings }
    }

    pub fn update_settings(&mut self, settings: PolicySettings) {
        self.settings = settings;
    }

    pub fn choose_target(&self, ctx: &PolicyCtx<'_>) -> Target {
        let settings = &self.settings;
        let vehicle = ctx.vehicle;

        if is_kickoff(ctx, settings) {
            let mut target = Target::new(ctx.ball.location, TargetKind::Kickoff);
            target.wants_flip =
                flat_dist(vehicle.location, ctx.ball.location) < settings.kickoff_flip_distance;
            return target;
        }

        let now = ctx.game_info.seconds_elapsed;
        let (base, kind, time_budget, side) = if let Some(point) = shadow_point(ctx, settings) {
            let side = ApproachSide::Towards(vehicle.team.own_goal());
            (point, TargetKind::Shadow, None, side)
        } else {
            let side = ApproachSide::AwayFrom(vehicle.team.opponent_goal());
            match ctx.intercept {
                Some(sample) => (
                    sample.location,
                    TargetKind::Intercept,
                    Some(sample.time - now),
                    side,
                ),
                None => (ctx.ball.location, TargetKind::Ball, None, side),
            }
        };

        if let Some(pad) = pick_pad(ctx, base, settings) {
            log::trace!("Routing to boost pad at {:?}", pad.location);
            return Target::new(pad.location, TargetKind::BoostPad);
        }

        let mut target = Target::new(approach_point(base, side, settings), kind);
        target.time_budget = time_budget;
        target
    }
}
