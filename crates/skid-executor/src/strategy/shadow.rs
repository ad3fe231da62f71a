use skid_core::{flat, flat_dist, flat_direction, PolicySettings, Vector3};

use super::PolicyCtx;

/// Defensive point between the ball and our goal, if the ball is coming at us.
///
/// The point sits on the goal-ball line, behind the ball by a fraction of the
/// goal-ball distance (clamped), at ground level.
pub fn shadow_point(ctx: &PolicyCtx<'_>, settings: &PolicySettings) -> Option<Vector3> {
    let goal = ctx.vehicle.team.own_goal();
    let ball = ctx.ball;

    let to_goal = flat_direction(ball.location, goal);
    let approach_speed = ball.velocity.dot(&to_goal);
    let goal_distance = flat_dist(goal, ball.location);
    if approach_speed <= settings.shadow_min_approach_speed
        || goal_distance > settings.shadow_max_goal_distance
    {
        return None;
    }

    let offset = (settings.shadow_distance_ratio * goal_distance)
        .clamp(settings.shadow_min_offset, settings.shadow_max_offset);
    Some(flat(ball.location) + to_goal * offset)
}
