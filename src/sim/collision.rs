//! Collision resolution between actors and level geometry
//!
//! Motion is applied one axis at a time: first horizontally, then
//! vertically. Resolving each axis separately keeps fast diagonal motion
//! from tunnelling through corners and stops actors from snagging on the
//! seams between adjacent ground segments.

use glam::Vec2;

use super::aabb::Aabb;
use super::actor::Body;

/// Overlap smaller than this is treated as touching
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Contacts found while resolving one body for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub blocked_left: bool,
    pub blocked_right: bool,
    /// Came to rest on top of geometry
    pub landed: bool,
    /// Hit a ceiling while moving up
    pub bumped_head: bool,
}

impl Contacts {
    pub fn blocked_horizontally(&self) -> bool {
        self.blocked_left || self.blocked_right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Move `body` by its velocity and push it out of `geometry`.
///
/// Horizontal blocking zeroes `vel.x`. Landing on a surface sets
/// `on_ground`, zeroes `vel.y` and ends a jump; hitting a ceiling only
/// zeroes `vel.y`.
pub fn resolve(body: &mut Body, geometry: &[Aabb]) -> Contacts {
    let mut contacts = Contacts::default();

    // --- Horizontal pass ---
    let vx = body.vel.x;
    body.pos.x += vx;
    if let Some(push) = separate(body, geometry, Axis::X, vx) {
        if push < 0.0 {
            contacts.blocked_right = true;
        } else {
            contacts.blocked_left = true;
        }
        body.vel.x = 0.0;
    }

    // --- Vertical pass ---
    let vy = body.vel.y;
    body.pos.y += vy;
    if let Some(push) = separate(body, geometry, Axis::Y, vy) {
        if push < 0.0 {
            // Pushed up: standing on something
            contacts.landed = true;
            body.on_ground = true;
            body.jumping = false;
        } else {
            contacts.bumped_head = true;
        }
        body.vel.y = 0.0;
    }

    contacts
}

/// Push `body` out of every overlapping piece along `axis`.
///
/// Pieces are handled smallest separation first; each push is re-checked
/// against the remaining geometry. Returns the last push applied.
fn separate(body: &mut Body, geometry: &[Aabb], axis: Axis, motion: f32) -> Option<f32> {
    let mut last_push = None;

    // Each iteration clears at least one piece, so this always terminates
    for _ in 0..=geometry.len() {
        let hitbox = body.hitbox();
        let smallest = geometry
            .iter()
            .filter(|g| hitbox.penetration(g, CONTACT_EPSILON).is_some())
            .map(|g| push_out(&hitbox, g, axis, motion))
            .min_by(|a, b| a.abs().total_cmp(&b.abs()));

        let Some(push) = smallest else { break };
        match axis {
            Axis::X => body.pos.x += push,
            Axis::Y => body.pos.y += push,
        }
        last_push = Some(push);
    }

    last_push
}

/// Signed offset along `axis` that moves `hitbox` clear of `other`.
///
/// A moving body is pushed back the way it came. A body with no motion on
/// this axis is pushed out through the nearest side.
fn push_out(hitbox: &Aabb, other: &Aabb, axis: Axis, motion: f32) -> f32 {
    let (lo, hi, other_lo, other_hi) = match axis {
        Axis::X => (hitbox.min.x, hitbox.max.x, other.min.x, other.max.x),
        Axis::Y => (hitbox.min.y, hitbox.max.y, other.min.y, other.max.y),
    };
    let back = other_lo - hi; // negative: toward min
    let forward = other_hi - lo; // positive: toward max
    if motion > 0.0 {
        back
    } else if motion < 0.0 {
        forward
    } else if back.abs() <= forward.abs() {
        back
    } else {
        forward
    }
}

/// Whether any piece of geometry overlaps `hitbox`
pub fn overlaps_any(hitbox: &Aabb, geometry: &[Aabb]) -> bool {
    geometry
        .iter()
        .any(|g| hitbox.penetration(g, CONTACT_EPSILON).is_some())
}

/// Whether there is ground one body-width ahead of `body` in `direction`
///
/// `direction` is -1.0 or 1.0. A zero direction probes directly below.
pub fn has_ground_ahead(body: &Body, direction: f32, geometry: &[Aabb]) -> bool {
    let probe = body
        .hitbox()
        .translated(Vec2::new(direction * body.size.x, 1.0));
    overlaps_any(&probe, geometry)
}
