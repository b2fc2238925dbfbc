//! Rendering seam
//!
//! The simulation exposes a read-only [`RenderSnapshot`] once per loop
//! iteration. Drawing it (sprites, health bars, the pause menu) is the
//! renderer's business; a failed frame is logged and the loop moves on.

use crate::clock::FrameStats;
use crate::consts::TICK_RATE;
use crate::error::RenderError;
use crate::level::Level;
use crate::sim::{Aabb, Camera, Enemy, GamePhase, MatchState, Player};

/// Read-only view of one match, taken between ticks
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot<'a> {
    pub level: &'a Level,
    pub camera: Camera,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub debug: bool,
    pub stats: FrameStats,
    pub phase: GamePhase,
    pub viewport_width: f32,
    /// Ticks simulated so far
    pub tick: u64,
}

impl<'a> RenderSnapshot<'a> {
    pub fn new(state: &'a MatchState, stats: FrameStats) -> Self {
        Self {
            level: &state.level,
            camera: state.camera,
            player: &state.player,
            enemies: &state.enemies,
            debug: state.debug,
            stats,
            phase: state.phase,
            viewport_width: state.config.viewport_width,
            tick: state.time_ticks,
        }
    }

    /// Whether `hitbox` intersects the visible slice of the level
    pub fn is_visible(&self, hitbox: &Aabb) -> bool {
        hitbox.max.x >= self.camera.x && hitbox.min.x <= self.camera.x + self.viewport_width
    }

    /// Enemies worth drawing this frame
    pub fn visible_enemies(&self) -> impl Iterator<Item = &'a Enemy> + '_ {
        let enemies: &'a [Enemy] = self.enemies;
        enemies.iter().filter(move |e| self.is_visible(&e.body.hitbox()))
    }
}

/// Presents frames
pub trait Renderer {
    fn draw(&mut self, snapshot: &RenderSnapshot<'_>) -> Result<(), RenderError>;
}

/// Text of the debug overlay, one entry per line
pub fn debug_lines(snapshot: &RenderSnapshot<'_>) -> Vec<String> {
    let body = &snapshot.player.body;
    let flag = |on: bool| if on { "yes" } else { "no" };
    vec![
        format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("UPS: {}  FPS: {}", snapshot.stats.ups, snapshot.stats.fps),
        format!("Position: ({:.1}, {:.1})", body.pos.x, body.pos.y),
        format!("Velocity: ({:.2}, {:.2})", body.vel.x, body.vel.y),
        format!(
            "Health: {}/{}  Stamina: {:.0}",
            body.health(),
            body.max_health(),
            body.stamina()
        ),
        format!(
            "Ground: {}  Jumping: {}  Crouching: {}",
            flag(body.on_ground),
            flag(body.jumping),
            flag(body.crouching)
        ),
        format!(
            "Walking: {}  Running: {}  Exhausted: {}",
            flag(body.walking),
            flag(body.running),
            flag(body.exhausted)
        ),
    ]
}

/// Headless renderer that reports to the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    last_phase: Option<GamePhase>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn draw(&mut self, snapshot: &RenderSnapshot<'_>) -> Result<(), RenderError> {
        self.frames += 1;
        if snapshot.level.background.is_empty() {
            return Err(RenderError::Asset(format!("background of {}", snapshot.level.name)));
        }

        if self.last_phase != Some(snapshot.phase) {
            log::info!("[{}] {:?}", snapshot.level.name, snapshot.phase);
            self.last_phase = Some(snapshot.phase);
        }

        // Roughly once a second while keeping up
        if snapshot.debug && self.frames % u64::from(TICK_RATE) == 1 {
            for line in debug_lines(snapshot) {
                log::debug!("{line}");
            }
            log::debug!(
                "Score: {}  Enemies on screen: {}",
                snapshot.player.score,
                snapshot.visible_enemies().count()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MatchConfig;

    fn demo_state() -> MatchState {
        MatchState::new(Level::demo(), MatchConfig::default())
    }

    #[test]
    fn test_debug_lines() {
        let state = demo_state();
        let stats = FrameStats { ups: 120, fps: 60 };
        let lines = debug_lines(&RenderSnapshot::new(&state, stats));
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("castle-run v"));
        assert_eq!(lines[1], "UPS: 120  FPS: 60");
        assert_eq!(lines[2], "Position: (640.0, 800.0)");
        assert!(lines[4].starts_with("Health: 100/100"));
    }

    #[test]
    fn test_only_nearby_enemies_visible() {
        let state = demo_state();
        let snapshot = RenderSnapshot::new(&state, FrameStats::default());
        // Camera starts at x = 0; every demo knight is further right
        assert_eq!(snapshot.visible_enemies().count(), 0);

        let mut state = demo_state();
        state.camera.follow(2100.0, state.level.length, state.config.viewport_width);
        let snapshot = RenderSnapshot::new(&state, FrameStats::default());
        let visible: Vec<u32> = snapshot.visible_enemies().map(|e| e.id).collect();
        assert_eq!(visible, vec![1]);
    }

    #[test]
    fn test_log_renderer_counts_frames() {
        let state = demo_state();
        let mut renderer = LogRenderer::new();
        let snapshot = RenderSnapshot::new(&state, FrameStats::default());
        renderer.draw(&snapshot).unwrap();
        renderer.draw(&snapshot).unwrap();
        assert_eq!(renderer.frames(), 2);
    }

    #[test]
    fn test_missing_background_fails_frame() {
        let mut state = demo_state();
        state.level.background.clear();
        let mut renderer = LogRenderer::new();
        let err = renderer
            .draw(&RenderSnapshot::new(&state, FrameStats::default()))
            .unwrap_err();
        assert!(matches!(err, RenderError::Asset(_)));
    }
}
