//! Match controller
//!
//! Owns one match and its collaborators. The clock calls into it through
//! [`Simulation`]; every side effect the match has on the outside world
//! (music, effects, the high score write, frames) goes out from here.

use crate::audio::{AudioCue, AudioSink, SoundEffect};
use crate::clock::{FrameStats, LoopStatus, Simulation};
use crate::persistence::ScoreRecorder;
use crate::platform::InputSource;
use crate::render::{RenderSnapshot, Renderer};
use crate::sim::{self, GameEvent, GamePhase, MatchOutcome, MatchState, TickReport};

pub struct MatchController {
    state: MatchState,
    input: Box<dyn InputSource>,
    renderer: Box<dyn Renderer>,
    audio: Box<dyn AudioSink>,
    recorder: ScoreRecorder,
    /// Quit after this many ticks
    tick_limit: Option<u64>,
    render_failures: u64,
}

impl MatchController {
    /// Wire up a match. Background music starts right away.
    pub fn new(
        state: MatchState,
        input: Box<dyn InputSource>,
        renderer: Box<dyn Renderer>,
        audio: Box<dyn AudioSink>,
        recorder: ScoreRecorder,
    ) -> Self {
        let mut controller = Self {
            state,
            input,
            renderer,
            audio,
            recorder,
            tick_limit: None,
            render_failures: 0,
        };
        controller.audio.cue(AudioCue::MusicStart);
        controller
    }

    pub fn with_tick_limit(mut self, limit: Option<u64>) -> Self {
        self.tick_limit = limit;
        self
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn recorder_mut(&mut self) -> &mut ScoreRecorder {
        &mut self.recorder
    }

    /// Hand back the recorder so shutdown can wait for the score write
    pub fn into_recorder(self) -> ScoreRecorder {
        self.recorder
    }

    /// Frames the renderer failed to present
    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }

    /// Poll input once and run one tick
    pub fn step(&mut self) -> TickReport {
        let input = self.input.poll();
        let report = sim::tick(&mut self.state, &input);
        self.dispatch(&report);

        if let Some(limit) = self.tick_limit {
            if self.state.time_ticks >= limit && !self.state.phase.is_over() {
                log::info!("Tick limit of {limit} reached");
                self.quit();
            }
        }
        report
    }

    /// Back to the lobby: music off, nothing recorded
    pub fn quit(&mut self) {
        if self.state.phase.is_over() {
            return;
        }
        self.state.quit();
        for cue in [
            AudioCue::MusicStop,
            AudioCue::MusicCull,
            AudioCue::StopEffect(SoundEffect::Death),
            AudioCue::StopEffect(SoundEffect::Victory),
        ] {
            self.audio.cue(cue);
        }
        log::info!("Match abandoned after {} ticks", self.state.time_ticks);
    }

    fn dispatch(&mut self, report: &TickReport) {
        for &event in &report.events {
            self.on_event(event);
        }

        if let Some(result) = &report.result {
            self.recorder.record(result.clone());
        }
    }

    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Paused => self.audio.cue(AudioCue::MusicPause),
            GameEvent::Resumed => self.audio.cue(AudioCue::MusicResume),
            GameEvent::MatchEnded(outcome) => {
                self.audio.cue(AudioCue::MusicStop);
                self.audio.cue(AudioCue::MusicCull);
                let effect = match outcome {
                    MatchOutcome::Won => SoundEffect::Victory,
                    MatchOutcome::Lost => SoundEffect::Death,
                };
                self.audio.cue(AudioCue::Effect(effect));
            }
            GameEvent::PlayerHit { by, damage, killed } => {
                log::debug!("Player took {damage} from enemy {by} (killed: {killed})");
            }
            other => log::trace!("{other:?}"),
        }
    }
}

impl Simulation for MatchController {
    fn tick(&mut self) {
        self.step();
    }

    fn render(&mut self, stats: FrameStats) {
        self.recorder.poll();
        let snapshot = RenderSnapshot::new(&self.state, stats);
        if let Err(e) = self.renderer.draw(&snapshot) {
            self.render_failures += 1;
            log::warn!("Frame dropped: {e}");
        }
    }

    fn status(&self) -> LoopStatus {
        match self.state.phase {
            GamePhase::Running => LoopStatus::Running,
            GamePhase::Paused => LoopStatus::Paused,
            GamePhase::Won | GamePhase::Lost | GamePhase::Quit => LoopStatus::Stopped,
        }
    }

    fn poll_paused(&mut self) {
        let input = self.input.poll();
        if input.toggle_debug {
            self.state.debug = !self.state.debug;
        }
        if input.toggle_pause && !self.state.player.body.is_dead() && self.state.resume() {
            log::debug!("Resumed at tick {}", self.state.time_ticks);
            self.on_event(GameEvent::Resumed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimulationClock;
    use crate::error::RenderError;
    use crate::level::Level;
    use crate::persistence::{MemoryStore, RecordOutcome, RecorderStatus};
    use crate::consts::TICK_RATE;
    use crate::platform::{ManualTime, ScriptStep, ScriptedInput};
    use crate::settings::Settings;
    use crate::sim::{MatchConfig, TickInput};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Cues(Arc<Mutex<Vec<AudioCue>>>);

    impl AudioSink for Cues {
        fn cue(&mut self, cue: AudioCue) {
            self.0.lock().unwrap().push(cue);
        }
    }

    impl Cues {
        fn taken(&self) -> Vec<AudioCue> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct FlakyRenderer {
        frames: u32,
    }

    impl Renderer for FlakyRenderer {
        fn draw(&mut self, _snapshot: &RenderSnapshot<'_>) -> Result<(), RenderError> {
            self.frames += 1;
            if self.frames % 2 == 0 {
                return Err(RenderError::SurfaceLost);
            }
            Ok(())
        }
    }

    fn level(length: f32, ground: f32) -> Level {
        Level::from_json(&format!(
            r#"{{
                "name": "test",
                "background": "bg.png",
                "length": {length},
                "base_score": 1000,
                "spawn": [640, 800],
                "grounds": [{{ "x": 0, "y": 800, "width": {ground}, "height": 200 }}]
            }}"#
        ))
        .unwrap()
    }

    fn walk_right() -> TickInput {
        TickInput {
            move_right: true,
            ..TickInput::default()
        }
    }

    struct Rig {
        controller: MatchController,
        cues: Cues,
        store: Arc<Mutex<MemoryStore>>,
    }

    fn rig(level: Level, script: Vec<ScriptStep>) -> Rig {
        let cues = Cues::default();
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let config = MatchConfig {
            player_name: "ada".to_string(),
            score_decay_chance: 0.0,
            ..MatchConfig::default()
        };
        let controller = MatchController::new(
            MatchState::new(level, config),
            Box::new(ScriptedInput::new(script).looping()),
            Box::new(FlakyRenderer { frames: 0 }),
            Box::new(cues.clone()),
            ScoreRecorder::shared(store.clone()),
        );
        Rig {
            controller,
            cues,
            store,
        }
    }

    #[test]
    fn test_win_records_score_once() {
        let mut rig = rig(level(1500.0, 1500.0), vec![ScriptStep::new(1, walk_right())]);
        let mut clock = SimulationClock::with_time_source(ManualTime::new(), 8);
        clock.run_until_stopped(&mut rig.controller);

        assert_eq!(rig.controller.state().phase, GamePhase::Won);
        assert_eq!(
            rig.cues.taken(),
            vec![
                AudioCue::MusicStart,
                AudioCue::MusicStop,
                AudioCue::MusicCull,
                AudioCue::Effect(SoundEffect::Victory),
            ]
        );
        assert!(rig.controller.render_failures() > 0);

        // Ticks after the end change nothing
        for _ in 0..10 {
            let report = rig.controller.step();
            assert!(!report.ended());
        }
        assert!(rig.cues.taken().is_empty());

        let mut recorder = rig.controller.into_recorder();
        let outcome = recorder.finish(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, Some(RecordOutcome::Inserted));
        let store = rig.store.lock().unwrap();
        assert_eq!(store.scores().len(), 1);
        assert_eq!(store.scores().get("ada").unwrap().score, 1000);
    }

    #[test]
    fn test_death_plays_death_effect() {
        let mut rig = rig(level(5000.0, 1000.0), vec![ScriptStep::new(1, walk_right())]);
        while rig.controller.status() == LoopStatus::Running {
            rig.controller.step();
        }
        assert_eq!(rig.controller.state().phase, GamePhase::Lost);
        assert!(rig.cues.taken().contains(&AudioCue::Effect(SoundEffect::Death)));

        let mut recorder = rig.controller.into_recorder();
        recorder.finish(Duration::from_secs(5)).unwrap();
        assert_eq!(rig.store.lock().unwrap().scores().get("ada").unwrap().score, 0);
    }

    #[test]
    fn test_pause_and_resume_through_input() {
        let pause = TickInput {
            toggle_pause: true,
            ..TickInput::default()
        };
        let mut rig = rig(
            level(5000.0, 5000.0),
            vec![
                ScriptStep::new(1, pause),
                ScriptStep::new(3, TickInput::default()),
                ScriptStep::new(1, pause),
                ScriptStep::new(100, TickInput::default()),
            ],
        );
        rig.controller.step();
        assert_eq!(rig.controller.status(), LoopStatus::Paused);

        for _ in 0..3 {
            rig.controller.poll_paused();
            assert_eq!(rig.controller.status(), LoopStatus::Paused);
        }
        rig.controller.poll_paused();
        assert_eq!(rig.controller.status(), LoopStatus::Running);
        assert_eq!(
            rig.cues.taken(),
            vec![AudioCue::MusicStart, AudioCue::MusicPause, AudioCue::MusicResume]
        );
    }

    #[test]
    fn test_quit_records_nothing() {
        let mut rig = rig(level(5000.0, 5000.0), vec![ScriptStep::new(1, walk_right())]);
        rig.controller.step();
        rig.controller.quit();
        rig.controller.quit();
        assert_eq!(rig.controller.status(), LoopStatus::Stopped);
        assert_eq!(rig.controller.state().phase, GamePhase::Quit);

        let cues = rig.cues.taken();
        assert_eq!(cues.len(), 5);
        assert!(cues.contains(&AudioCue::StopEffect(SoundEffect::Death)));
        assert_eq!(rig.controller.recorder_mut().status(), RecorderStatus::Idle);
        assert!(rig.store.lock().unwrap().scores().is_empty());
    }

    #[test]
    fn test_tick_limit_quits() {
        let mut rig = rig(level(50000.0, 50000.0), vec![ScriptStep::new(1, walk_right())]);
        rig.controller = rig.controller.with_tick_limit(Some(50));
        let mut clock = SimulationClock::with_time_source(ManualTime::new(), 8);
        clock.run_until_stopped(&mut rig.controller);

        assert_eq!(rig.controller.state().time_ticks, 50);
        assert_eq!(rig.controller.state().phase, GamePhase::Quit);
        assert!(rig.controller.state().result.is_none());
        assert_eq!(clock.ticks_run(), 50);
    }

    /// Walk right for one second of wall time, one frame every 1/60 s
    fn walk_one_second(settings: &Settings) -> (f32, u64) {
        let mut rig = rig(Level::demo(), vec![ScriptStep::new(1, walk_right())]);
        let start = rig.controller.state().player.body.pos.x;
        let mut clock = settings.clock(ManualTime::new());
        let frame = Duration::from_secs(1) / 60;
        for _ in 0..60 {
            clock.step(&mut rig.controller, frame);
        }
        let walked = rig.controller.state().player.body.pos.x - start;
        (walked, clock.ticks_run())
    }

    #[test]
    fn test_walking_speed_ignores_configured_rate() {
        let defaults = Settings::default();
        // A stale rate from an older settings file has no effect
        let stale: Settings = serde_json::from_str(r#"{ "tick_rate": 60 }"#).unwrap();

        let (walked, ticks) = walk_one_second(&defaults);
        assert_eq!(ticks, u64::from(TICK_RATE));
        assert!(walked > 0.0);
        assert_eq!(walk_one_second(&stale), (walked, ticks));
    }
}
