//! Match state and actor types
//!
//! Everything the tick pipeline reads or writes lives in [`MatchState`],
//! one value per match. Rendering only ever sees it through a shared
//! reference between ticks.

use chrono::{DateTime, Utc};
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::actor::{Actor, Body, Facing, Swing};
use crate::consts::*;
use crate::level::Level;

/// Target id used for the player in swing bookkeeping
pub const PLAYER_ID: u32 = 0;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Pause menu open, no ticks run
    Paused,
    /// Player reached the end of the level
    Won,
    /// Player died
    Lost,
    /// Player left to the lobby
    Quit,
}

impl GamePhase {
    /// Whether the match is over
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost | GamePhase::Quit)
    }
}

/// Terminal outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Won,
    Lost,
}

/// Produced exactly once, on the tick that ends the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub score: u64,
    pub player_name: String,
    pub timestamp: DateTime<Utc>,
    /// Ticks simulated before the match ended
    pub ticks: u64,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub score: u64,
    /// Active sword strike, if any
    pub swing: Option<Swing>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT), PLAYER_MAX_HEALTH),
            score: 0,
            swing: None,
        }
    }

    #[inline]
    pub fn is_striking(&self) -> bool {
        self.swing.is_some()
    }

    /// Sword hitbox in front of the player, derived from facing and position
    pub fn sword_hitbox(&self) -> Aabb {
        weapon_hitbox(&self.body, Vec2::new(SWORD_WIDTH, SWORD_HEIGHT))
    }

    /// Add (or with a negative delta, remove) score; never drops below zero
    pub fn add_score(&mut self, delta: i64) {
        self.score = if delta >= 0 {
            self.score.saturating_add(delta as u64)
        } else {
            self.score.saturating_sub(delta.unsigned_abs())
        };
    }
}

impl Actor for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Weapon box held at chest height (lower while crouching) on the facing side
fn weapon_hitbox(body: &Body, size: Vec2) -> Aabb {
    let hb = body.hitbox();
    let grip = if body.crouching { 0.6 } else { 0.35 };
    let y = hb.min.y + hb.height() * grip - size.y / 2.0;
    let x = match body.facing {
        Facing::Right => hb.max.x,
        Facing::Left => hb.min.x - size.x,
    };
    Aabb::new(x, y, size.x, size.y)
}

/// Enemy variants. Data only; behaviour is selected from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    #[default]
    Knight,
}

/// Tuning for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub size: Vec2,
    pub max_health: i32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Player closer than this starts a chase
    pub detection_radius: f32,
    /// Player farther than this ends a chase
    pub disengage_radius: f32,
    /// Player closer than this gets attacked
    pub attack_range: f32,
    /// Half-width of the patrol route around the spawn point
    pub patrol_range: f32,
    pub idle_ticks: u32,
    pub swing_ticks: u32,
    pub swing_damage: i32,
    pub attack_cooldown: u32,
    /// Weapon size, `None` for unarmed enemies
    pub weapon: Option<Vec2>,
}

impl EnemyKind {
    pub fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Knight => EnemyProfile {
                size: Vec2::new(100.0, 300.0),
                max_health: 100,
                patrol_speed: 2.0,
                chase_speed: 3.0,
                detection_radius: 600.0,
                disengage_radius: 900.0,
                attack_range: 150.0,
                patrol_range: 300.0,
                idle_ticks: 60,
                swing_ticks: 30,
                swing_damage: 10,
                attack_cooldown: 45,
                weapon: Some(Vec2::new(110.0, 30.0)),
            },
        }
    }
}

/// Enemy behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
}

/// An enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub ai: AiState,
    /// Ticks spent in the current AI state
    pub ai_timer: u32,
    /// Ticks before another swing may start
    pub cooldown: u32,
    pub swing: Option<Swing>,
    /// Centre of the patrol route
    pub home_x: f32,
    damaged: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        let profile = kind.profile();
        let mut body = Body::new(pos, profile.size, profile.max_health);
        body.facing = Facing::Left;
        Self {
            id,
            kind,
            body,
            ai: AiState::Idle,
            ai_timer: 0,
            cooldown: 0,
            swing: None,
            home_x: pos.x,
            damaged: false,
        }
    }

    #[inline]
    pub fn profile(&self) -> EnemyProfile {
        self.kind.profile()
    }

    /// Weapon hitbox, if this kind carries one
    pub fn weapon_hitbox(&self) -> Option<Aabb> {
        self.profile()
            .weapon
            .map(|size| weapon_hitbox(&self.body, size))
    }

    /// Health bars are only painted for wounded, living enemies
    pub fn paints_health_bar(&self) -> bool {
        self.damaged && !self.body.is_dead()
    }

    pub(crate) fn set_state(&mut self, state: AiState) {
        if self.ai != state {
            log::trace!("enemy {} {:?} -> {:?}", self.id, self.ai, state);
            self.ai = state;
            self.ai_timer = 0;
        }
    }
}

impl Actor for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn take_damage(&mut self, amount: i32) -> bool {
        self.damaged = true;
        self.body.take_damage(amount)
    }
}

/// Horizontal view offset tracking the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    /// Centre on `target_x`, clamped to the level
    pub fn follow(&mut self, target_x: f32, level_length: f32, viewport_width: f32) {
        let max_x = (level_length - viewport_width).max(0.0);
        self.x = (target_x - viewport_width / 2.0).clamp(0.0, max_x);
    }
}

/// Per-match tuning
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub player_name: String,
    pub seed: u64,
    /// Chance per tick that the score decays by one point
    pub score_decay_chance: f64,
    pub viewport_width: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            seed: 0,
            score_decay_chance: SCORE_DECAY_CHANCE,
            viewport_width: VIEWPORT_WIDTH,
        }
    }
}

/// Complete state of one match
#[derive(Debug, Clone)]
pub struct MatchState {
    pub level: Level,
    pub player: Player,
    /// Live enemies, sorted by id
    pub enemies: Vec<Enemy>,
    pub camera: Camera,
    pub phase: GamePhase,
    /// Debug overlay requested by input
    pub debug: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub config: MatchConfig,
    pub(crate) rng: Pcg32,
    /// Set exactly once, when the match ends
    pub result: Option<MatchResult>,
}

impl MatchState {
    pub fn new(level: Level, config: MatchConfig) -> Self {
        let player = Player::new(level.spawn);
        let enemies = level
            .enemy_spawns
            .iter()
            .enumerate()
            .map(|(i, spawn)| Enemy::new(i as u32 + 1, spawn.kind, spawn.pos))
            .collect();
        let mut camera = Camera::default();
        camera.follow(player.body.pos.x, level.length, config.viewport_width);

        log::info!(
            "Match started on '{}' for {} (seed {})",
            level.name,
            config.player_name,
            config.seed
        );

        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            level,
            player,
            enemies,
            camera,
            phase: GamePhase::Running,
            debug: false,
            time_ticks: 0,
            config,
            result: None,
        }
    }

    /// Leave the pause menu
    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Running;
            return true;
        }
        false
    }

    /// Back to the lobby. No result is produced for a quit match.
    pub fn quit(&mut self) {
        if !self.phase.is_over() {
            self.phase = GamePhase::Quit;
        }
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| !e.body.is_dead()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_never_negative() {
        let mut p = Player::new(Vec2::ZERO);
        p.add_score(3);
        p.add_score(-10);
        assert_eq!(p.score, 0);
        p.add_score(5);
        p.add_score(-1);
        assert_eq!(p.score, 4);
    }

    #[test]
    fn test_sword_follows_facing() {
        let mut p = Player::new(Vec2::new(500.0, 800.0));
        let hb = p.body.hitbox();
        assert_eq!(p.sword_hitbox().min.x, hb.max.x);
        p.body.facing = Facing::Left;
        assert_eq!(p.sword_hitbox().max.x, hb.min.x);
        assert!(p.sword_hitbox().min.y > hb.min.y);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let mut cam = Camera::default();
        cam.follow(100.0, 5000.0, 1280.0);
        assert_eq!(cam.x, 0.0);
        cam.follow(2000.0, 5000.0, 1280.0);
        assert_eq!(cam.x, 1360.0);
        cam.follow(4900.0, 5000.0, 1280.0);
        assert_eq!(cam.x, 5000.0 - 1280.0);
        // Level shorter than the viewport
        cam.follow(400.0, 800.0, 1280.0);
        assert_eq!(cam.x, 0.0);
    }

    #[test]
    fn test_enemy_health_bar_after_damage() {
        let mut e = Enemy::new(1, EnemyKind::Knight, Vec2::new(0.0, 800.0));
        assert!(!e.paints_health_bar());
        e.take_damage(10);
        assert!(e.paints_health_bar());
        e.take_damage(1000);
        assert!(!e.paints_health_bar());
        assert!(e.weapon_hitbox().is_some());
    }
}
