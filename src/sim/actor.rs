//! Shared kinematic and combat state for every actor
//!
//! Player and enemies both own a [`Body`]; the [`Actor`] trait exposes the
//! capabilities the tick pipeline needs (gravity, collision, damage) without
//! an inheritance chain.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::{self, Contacts};
use super::law;
use crate::consts::STAMINA_MAX;

/// Direction an actor is looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Direction from `from` toward `to`, keeping `self` when they coincide
    pub fn toward(self, from: f32, to: f32) -> Self {
        if to > from {
            Facing::Right
        } else if to < from {
            Facing::Left
        } else {
            self
        }
    }
}

/// Kinematic body: position, velocity, vitals and movement flags
///
/// `pos` is the bottom-centre of the actor. Health and stamina are only
/// mutated through methods that clamp them, so `0 <= health <= max_health`
/// and `0 <= stamina <= STAMINA_MAX` hold by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub on_ground: bool,
    pub jumping: bool,
    pub crouching: bool,
    pub running: bool,
    pub walking: bool,
    pub exhausted: bool,
    /// Whether the body stood on ground at the end of the previous tick
    #[serde(default)]
    pub supported: bool,
    health: i32,
    max_health: i32,
    stamina: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, max_health: i32) -> Self {
        let max_health = max_health.max(1);
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            facing: Facing::Right,
            on_ground: false,
            jumping: false,
            crouching: false,
            running: false,
            walking: false,
            exhausted: false,
            supported: false,
            health: max_health,
            max_health,
            stamina: STAMINA_MAX,
        }
    }

    /// Current hitbox, always derived from position
    #[inline]
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_feet(self.pos, self.size)
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    #[inline]
    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Clear the per-tick transient flags.
    ///
    /// `on_ground` is remembered in `supported` and then cleared; the
    /// collision pass re-asserts it only when the body lands on something.
    pub fn reset(&mut self) {
        self.supported = self.on_ground;
        self.on_ground = false;
        self.walking = false;
        self.running = false;
        self.crouching = false;
    }

    /// Apply damage, returning `true` when this hit killed the body
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() || amount <= 0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.is_dead()
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_dead() || amount <= 0 {
            return;
        }
        self.health = (self.health + amount).clamp(0, self.max_health);
    }

    pub fn kill(&mut self) {
        self.health = 0;
    }

    /// Remove stamina, returning the amount actually drained
    pub fn drain_stamina(&mut self, amount: f32) -> f32 {
        let before = self.stamina;
        self.stamina = (self.stamina - amount.max(0.0)).clamp(0.0, STAMINA_MAX);
        before - self.stamina
    }

    /// Add stamina, returning the amount actually restored
    pub fn restore_stamina(&mut self, amount: f32) -> f32 {
        let before = self.stamina;
        self.stamina = (self.stamina + amount.max(0.0)).clamp(0.0, STAMINA_MAX);
        self.stamina - before
    }

    pub fn check_invariants(&self) {
        debug_assert!(
            (0..=self.max_health).contains(&self.health),
            "health {} out of range",
            self.health
        );
        debug_assert!(
            (0.0..=STAMINA_MAX).contains(&self.stamina),
            "stamina {} out of range",
            self.stamina
        );
        debug_assert!(self.pos.is_finite() && self.vel.is_finite());
    }
}

/// An active weapon swing
///
/// Each target may be struck at most once per swing, no matter how many
/// ticks the weapon keeps overlapping it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Swing {
    pub ticks_left: u32,
    struck: Vec<u32>,
}

impl Swing {
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks_left: ticks.max(1),
            struck: Vec::new(),
        }
    }

    pub fn has_struck(&self, target: u32) -> bool {
        self.struck.contains(&target)
    }

    /// Register a hit on `target`; `false` if it was already struck
    pub fn strike(&mut self, target: u32) -> bool {
        if self.has_struck(target) {
            return false;
        }
        self.struck.push(target);
        true
    }

    /// Advance one tick, returning `true` while the swing is still active
    pub fn advance(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        self.ticks_left > 0
    }
}

/// Capabilities shared by every simulated actor
pub trait Actor {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn apply_gravity(&mut self) {
        law::apply_gravitation(self.body_mut());
    }

    fn resolve_collision(&mut self, geometry: &[Aabb]) -> Contacts {
        collision::resolve(self.body_mut(), geometry)
    }

    fn take_damage(&mut self, amount: i32) -> bool {
        self.body_mut().take_damage(amount)
    }
}
