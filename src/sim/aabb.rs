//! Axis-aligned bounding boxes
//!
//! Every hitbox in the game is an AABB in world space (y grows downward).
//! Actor hitboxes are never stored; they are derived from the actor's feet
//! position and its fixed size whenever they are needed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Rectangle from its top-left corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Rectangle standing on `feet` (bottom-centre point)
    pub fn from_feet(feet: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(feet.x - size.x / 2.0, feet.y - size.y),
            max: Vec2::new(feet.x + size.x / 2.0, feet.y),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test. Rectangles that merely touch do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Penetration depth on each axis, `None` unless both exceed `epsilon`
    pub fn penetration(&self, other: &Aabb, epsilon: f32) -> Option<Vec2> {
        let dx = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let dy = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        (dx > epsilon && dy > epsilon).then_some(Vec2::new(dx, dy))
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
