//! Enemy behaviour
//!
//! Each enemy runs a small state machine:
//!
//! ```text
//!   Idle --timer--> Patrol
//!   Idle/Patrol --player within detection radius--> Chase
//!   Chase --player within attack range--> Attack
//!   Chase --player beyond disengage radius--> Patrol
//!   Attack --swing over--> Chase (or Idle if player dead / gone)
//! ```
//!
//! The controller only decides velocity and facing. Gravity has already
//! been applied by the time it runs, and movement goes through the same
//! collision resolver as the player.

use super::aabb::Aabb;
use super::actor::{Actor, Facing, Swing};
use super::collision::{self, Contacts};
use super::state::{AiState, Enemy, PLAYER_ID, Player};
use super::tick::GameEvent;

/// Advance one enemy by one tick.
///
/// Must run after the player has been moved this tick; distances are
/// measured against the player's resolved position.
pub fn update(
    enemy: &mut Enemy,
    player: &mut Player,
    geometry: &[Aabb],
    events: &mut Vec<GameEvent>,
) {
    if enemy.body.is_dead() {
        enemy.body.vel.x = 0.0;
        enemy.swing = None;
        enemy.resolve_collision(geometry);
        return;
    }

    // Horizontal distance only; jumping over an enemy does not shake it off
    let distance = (player.body.pos.x - enemy.body.pos.x).abs();
    let next = transition(enemy, distance, !player.body.is_dead());
    enemy.set_state(next);
    enemy.ai_timer = enemy.ai_timer.saturating_add(1);
    if enemy.ai != AiState::Attack {
        enemy.cooldown = enemy.cooldown.saturating_sub(1);
    }

    steer(enemy, player, geometry);
    let contacts = enemy.resolve_collision(geometry);
    react(enemy, contacts);

    if enemy.ai == AiState::Attack {
        swing(enemy, player, events);
    }
}

/// Pick the state for this tick
pub fn transition(enemy: &Enemy, distance: f32, player_alive: bool) -> AiState {
    let profile = enemy.profile();
    let detected = player_alive && distance < profile.detection_radius;
    let lost = !player_alive || distance > profile.disengage_radius;

    match enemy.ai {
        AiState::Idle if detected => AiState::Chase,
        AiState::Idle if enemy.ai_timer >= profile.idle_ticks => AiState::Patrol,
        AiState::Idle => AiState::Idle,
        AiState::Patrol if detected => AiState::Chase,
        AiState::Patrol => AiState::Patrol,
        AiState::Chase if lost => AiState::Patrol,
        AiState::Chase if distance < profile.attack_range && enemy.cooldown == 0 => AiState::Attack,
        AiState::Chase => AiState::Chase,
        AiState::Attack if enemy.swing.is_some() => AiState::Attack,
        AiState::Attack if lost => AiState::Idle,
        AiState::Attack => AiState::Chase,
    }
}

/// Set velocity and facing for the current state
fn steer(enemy: &mut Enemy, player: &Player, geometry: &[Aabb]) {
    let profile = enemy.profile();
    let body = &mut enemy.body;

    match enemy.ai {
        AiState::Idle => body.vel.x = 0.0,
        AiState::Patrol => {
            let offset = body.pos.x - enemy.home_x;
            let at_bound = offset * body.facing.sign() >= profile.patrol_range;
            let at_ledge = body.supported
                && !collision::has_ground_ahead(body, body.facing.sign(), geometry);
            if at_bound || at_ledge {
                body.facing = body.facing.flipped();
            }
            body.vel.x = body.facing.sign() * profile.patrol_speed;
        }
        AiState::Chase => {
            body.facing = body.facing.toward(body.pos.x, player.body.pos.x);
            let gap = (player.body.pos.x - body.pos.x).abs();
            let at_ledge = body.supported
                && !collision::has_ground_ahead(body, body.facing.sign(), geometry);
            // In reach but still recovering, or the player is across a drop
            let hold = gap < profile.attack_range || at_ledge;
            body.vel.x = if hold {
                0.0
            } else {
                body.facing.sign() * profile.chase_speed.min(gap)
            };
        }
        AiState::Attack => {
            body.facing = body.facing.toward(body.pos.x, player.body.pos.x);
            body.vel.x = 0.0;
        }
    }
    body.walking = body.vel.x != 0.0;
}

/// Respond to collision feedback
fn react(enemy: &mut Enemy, contacts: Contacts) {
    if enemy.ai != AiState::Patrol {
        return;
    }
    let blocked_ahead = match enemy.body.facing {
        Facing::Right => contacts.blocked_right,
        Facing::Left => contacts.blocked_left,
    };
    if blocked_ahead {
        enemy.body.facing = enemy.body.facing.flipped();
    }
}

/// Start or continue a swing, damaging the player at most once per swing
fn swing(enemy: &mut Enemy, player: &mut Player, events: &mut Vec<GameEvent>) {
    let profile = enemy.profile();
    if enemy.swing.is_none() {
        enemy.swing = Some(Swing::new(profile.swing_ticks));
    }

    let weapon = enemy.weapon_hitbox();
    let Some(active) = enemy.swing.as_mut() else {
        return;
    };

    if let Some(weapon) = weapon {
        let connects = weapon.overlaps(&player.body.hitbox());
        if connects && !player.body.is_dead() && active.strike(PLAYER_ID) {
            let killed = player.take_damage(profile.swing_damage);
            log::debug!(
                "enemy {} hit player for {} (health {})",
                enemy.id,
                profile.swing_damage,
                player.body.health()
            );
            events.push(GameEvent::PlayerHit {
                by: enemy.id,
                damage: profile.swing_damage,
                killed,
            });
        }
    }

    if !active.advance() {
        enemy.swing = None;
        enemy.cooldown = profile.attack_cooldown;
    }
}
