//! Fixed timestep simulation tick
//!
//! One tick runs a fixed pipeline of stages. The order matters: the AI
//! reads the player's resolved position, stamina reads the flags set by
//! input, and terminal checks see the fully committed tick.

use chrono::Utc;
use rand::Rng;

use super::actor::{Actor, Facing, Swing};
use super::ai;
use super::law;
use super::state::{GamePhase, MatchOutcome, MatchResult, MatchState};
use crate::consts::*;

/// Input intents for a single tick
///
/// Edge detection (e.g. "pause pressed this frame") is the input source's
/// job; the toggles here are already one-shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub run: bool,
    pub strike: bool,
    pub toggle_pause: bool,
    pub toggle_debug: bool,
}

/// Named stages of one tick, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Clear transient per-tick flags on every actor
    Reset,
    /// Turn input into player intent and velocity
    Input,
    /// Gravity on the player and every enemy
    Gravity,
    /// Stamina drain or regeneration
    Stamina,
    /// Move the player and resolve against level geometry
    PlayerCollision,
    /// Enemy behaviour, movement and attacks
    Ai,
    /// Player sword against enemies
    Combat,
    /// Random score decay
    ScoreDecay,
    /// Kill plane, camera and bookkeeping
    Commit,
    /// Death / level clear detection
    Terminal,
}

/// The tick pipeline
pub const STAGES: [Stage; 10] = [
    Stage::Reset,
    Stage::Input,
    Stage::Gravity,
    Stage::Stamina,
    Stage::PlayerCollision,
    Stage::Ai,
    Stage::Combat,
    Stage::ScoreDecay,
    Stage::Commit,
    Stage::Terminal,
];

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Landed,
    SwordSwung,
    PlayerHit { by: u32, damage: i32, killed: bool },
    EnemyHit { id: u32, damage: i32 },
    EnemyKilled { id: u32 },
    Paused,
    Resumed,
    DebugToggled(bool),
    MatchEnded(MatchOutcome),
}

/// Output of one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Present only on the tick that ended the match
    pub result: Option<MatchResult>,
    pause_requested: bool,
}

impl TickReport {
    pub fn ended(&self) -> bool {
        self.result.is_some()
    }
}

/// Advance the match by one fixed timestep.
///
/// Does nothing while paused or once the match is over, so extra ticks
/// after the end never re-score or re-emit the result.
pub fn tick(state: &mut MatchState, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();
    if state.phase != GamePhase::Running {
        return report;
    }

    state.time_ticks += 1;
    for stage in STAGES {
        run_stage(state, stage, input, &mut report);
    }

    // A pause requested this tick takes effect once the tick is complete
    if report.pause_requested && state.phase == GamePhase::Running {
        state.phase = GamePhase::Paused;
        report.events.push(GameEvent::Paused);
    }

    report
}

/// Run a single stage
pub fn run_stage(state: &mut MatchState, stage: Stage, input: &TickInput, report: &mut TickReport) {
    match stage {
        Stage::Reset => reset(state),
        Stage::Input => apply_input(state, input, report),
        Stage::Gravity => apply_gravity(state),
        Stage::Stamina => {
            // Both decide from the same flags, so at most one changes stamina
            if !law::update_stamina(&mut state.player) {
                law::regenerate(&mut state.player);
            }
        }
        Stage::PlayerCollision => resolve_player(state, report),
        Stage::Ai => {
            let geometry = state.level.geometry();
            for enemy in &mut state.enemies {
                ai::update(enemy, &mut state.player, geometry, &mut report.events);
            }
        }
        Stage::Combat => combat(state, report),
        Stage::ScoreDecay => {
            if state.rng.random::<f64>() < state.config.score_decay_chance {
                state.player.add_score(-1);
            }
        }
        Stage::Commit => commit(state),
        Stage::Terminal => check_terminal(state, report),
    }
}

fn reset(state: &mut MatchState) {
    state.player.body.reset();
    for enemy in &mut state.enemies {
        enemy.body.reset();
    }
}

fn apply_input(state: &mut MatchState, input: &TickInput, report: &mut TickReport) {
    if input.toggle_debug {
        state.debug = !state.debug;
        report.events.push(GameEvent::DebugToggled(state.debug));
    }
    if input.toggle_pause {
        report.pause_requested = true;
    }

    let player = &mut state.player;
    if player.body.is_dead() {
        player.body.vel.x = 0.0;
        return;
    }

    if player.body.exhausted {
        player.swing = None;
    }

    let body = &mut player.body;
    let direction = input.move_right as i32 - input.move_left as i32;

    body.crouching = input.crouch && body.supported;
    body.walking = direction != 0;
    body.running = body.walking && input.run && !body.exhausted && !body.crouching;

    let speed = if body.crouching {
        CROUCH_SPEED
    } else if body.running {
        RUN_SPEED
    } else {
        WALK_SPEED
    };
    body.vel.x = direction as f32 * speed;
    if direction > 0 {
        body.facing = Facing::Right;
    } else if direction < 0 {
        body.facing = Facing::Left;
    }

    if input.jump && body.supported && !body.jumping && !body.crouching {
        body.vel.y = JUMP_VELOCITY;
        body.jumping = true;
        report.events.push(GameEvent::Jumped);
    }

    if input.strike && player.swing.is_none() && !player.body.exhausted {
        player.swing = Some(Swing::new(PLAYER_SWING_TICKS));
        report.events.push(GameEvent::SwordSwung);
    }
}

fn apply_gravity(state: &mut MatchState) {
    state.player.apply_gravity();
    for enemy in &mut state.enemies {
        enemy.apply_gravity();
    }
}

fn resolve_player(state: &mut MatchState, report: &mut TickReport) {
    let was_supported = state.player.body.supported;
    let contacts = state.player.resolve_collision(state.level.geometry());
    if contacts.landed && !was_supported {
        report.events.push(GameEvent::Landed);
    }

    // The level's left edge is a wall
    let body = &mut state.player.body;
    let left = body.hitbox().min.x;
    if left < 0.0 {
        body.pos.x -= left;
        body.vel.x = 0.0;
    }
}

fn combat(state: &mut MatchState, report: &mut TickReport) {
    let player = &mut state.player;
    let sword = player.sword_hitbox();
    let Some(swing) = player.swing.as_mut() else {
        return;
    };

    for enemy in &mut state.enemies {
        if enemy.body.is_dead() || !sword.overlaps(&enemy.body.hitbox()) {
            continue;
        }
        if !swing.strike(enemy.id) {
            continue;
        }
        let killed = enemy.take_damage(SWORD_DAMAGE);
        report.events.push(GameEvent::EnemyHit {
            id: enemy.id,
            damage: SWORD_DAMAGE,
        });
        if killed {
            log::debug!("enemy {} killed", enemy.id);
            player.score = player.score.saturating_add(KILL_SCORE);
            report.events.push(GameEvent::EnemyKilled { id: enemy.id });
        }
    }

    if !swing.advance() {
        player.swing = None;
    }
}

fn commit(state: &mut MatchState) {
    let kill_plane = state.level.kill_plane_y;
    if state.player.body.pos.y > kill_plane && !state.player.body.is_dead() {
        log::debug!("player fell out of the level");
        state.player.body.kill();
    }
    for enemy in &mut state.enemies {
        if enemy.body.pos.y > kill_plane {
            enemy.body.kill();
        }
    }

    state.camera.follow(
        state.player.body.pos.x,
        state.level.length,
        state.config.viewport_width,
    );

    if cfg!(debug_assertions) {
        state.player.body.check_invariants();
        for enemy in &state.enemies {
            enemy.body.check_invariants();
        }
    }
}

fn check_terminal(state: &mut MatchState, report: &mut TickReport) {
    if state.result.is_some() {
        return;
    }

    let player = &mut state.player;
    let outcome = if player.body.is_dead() {
        MatchOutcome::Lost
    } else if player.body.pos.x + state.config.viewport_width / 2.0 > state.level.length
        && player.body.pos.y < WIN_MAX_Y
    {
        player.score = player.score.saturating_add(state.level.base_score);
        MatchOutcome::Won
    } else {
        return;
    };

    state.phase = match outcome {
        MatchOutcome::Won => GamePhase::Won,
        MatchOutcome::Lost => GamePhase::Lost,
    };
    let result = MatchResult {
        outcome,
        score: player.score,
        player_name: state.config.player_name.clone(),
        timestamp: Utc::now(),
        ticks: state.time_ticks,
    };
    log::info!(
        "Match over: {:?} with score {} after {} ticks",
        outcome,
        result.score,
        result.ticks
    );
    state.result = Some(result.clone());
    report.result = Some(result);
    report.events.push(GameEvent::MatchEnded(outcome));
}
