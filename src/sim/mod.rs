//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (enemies by id)
//! - No rendering, audio or platform dependencies

pub mod aabb;
pub mod actor;
pub mod ai;
pub mod collision;
pub mod law;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use actor::{Actor, Body, Facing, Swing};
pub use collision::{CONTACT_EPSILON, Contacts, resolve};
pub use state::{
    AiState, Camera, Enemy, EnemyKind, EnemyProfile, GamePhase, MatchConfig, MatchOutcome,
    MatchResult, MatchState, PLAYER_ID, Player,
};
pub use tick::{GameEvent, STAGES, Stage, TickInput, TickReport, tick};
