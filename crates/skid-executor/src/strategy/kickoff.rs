use skid_core::{flat, PolicySettings};

use super::PolicyCtx;

/// Whether the round is live with the ball resting on the center spot.
pub fn is_kickoff(ctx: &PolicyCtx<'_>, settings: &PolicySettings) -> bool {
    let ball = ctx.ball;
    let stationary = flat(ball.velocity).norm() < settings.stationary_speed;
    ctx.game_info.is_round_active
        && stationary
        && ball.location.x.abs() < settings.kickoff_center_radius
        && ball.location.y.abs() < settings.kickoff_center_radius
}
