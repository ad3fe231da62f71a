use skid_core::{dist, flat_dist, BoostPad, PolicySettings, Vector3};

use super::PolicyCtx;

/// Pick the active full pad that is cheapest to grab on the way to `target`.
///
/// Returns `None` when the car has enough boost or no pad qualifies.
pub fn pick_pad<'a>(
    ctx: &PolicyCtx<'a>,
    target: Vector3,
    settings: &PolicySettings,
) -> Option<&'a BoostPad> {
    if ctx.vehicle.boost >= settings.low_boost {
        return None;
    }

    let car = ctx.vehicle.location;
    let defending =
        flat_dist(ctx.ball.location, ctx.vehicle.team.own_goal()) < settings.active_defense_distance;

    ctx.boost_pads
        .full_boosts()
        .filter(|pad| pad.is_active)
        .filter(|pad| !defending || dist(car, pad.location) <= settings.defensive_pad_radius)
        .map(|pad| {
            let score =
                dist(car, pad.location) + settings.pad_target_weight * dist(pad.location, target);
            (score, pad)
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, pad)| pad)
}
