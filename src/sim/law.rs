//! Physical laws applied to actors every tick: gravity and stamina

use super::actor::Body;
use super::state::Player;
use crate::consts::*;

/// Accelerate an airborne body downward, capped at terminal velocity.
///
/// Grounded bodies are left alone; whether a body is grounded is decided
/// by the collision pass, never here.
pub fn apply_gravitation(body: &mut Body) {
    if body.on_ground {
        return;
    }
    body.vel.y = (body.vel.y + GRAVITY).min(TERMINAL_VELOCITY);
}

/// Whether the player is spending stamina this tick
#[inline]
pub fn is_exerting(player: &Player) -> bool {
    player.body.running || player.is_striking()
}

/// Drain stamina while running or striking.
///
/// Returns `true` if stamina was spent. Reaching zero marks the player
/// exhausted.
pub fn update_stamina(player: &mut Player) -> bool {
    if !is_exerting(player) {
        return false;
    }
    let mut cost = 0.0;
    if player.body.running {
        cost += STAMINA_RUN_DRAIN;
    }
    if player.is_striking() {
        cost += STAMINA_STRIKE_DRAIN;
    }
    let spent = player.body.drain_stamina(cost);
    if player.body.stamina() <= 0.0 {
        player.body.exhausted = true;
    }
    spent > 0.0
}

/// Regenerate stamina while the player is not exerting.
///
/// Returns `true` if stamina was restored. Exhaustion lifts once stamina
/// climbs back above [`EXHAUSTION_RECOVERY`].
pub fn regenerate(player: &mut Player) -> bool {
    if is_exerting(player) {
        return false;
    }
    let restored = player.body.restore_stamina(STAMINA_REGEN);
    if player.body.exhausted && player.body.stamina() >= EXHAUSTION_RECOVERY {
        player.body.exhausted = false;
    }
    restored > 0.0
}
