//! Castle Run entry point
//!
//! Headless runner: loads settings and a level, plays the scripted demo
//! input through the real game loop and records the result.

use std::path::PathBuf;
use std::process::ExitCode;

use castle_run::MatchController;
use castle_run::consts::TICK_RATE;
use castle_run::error::PersistenceError;
use castle_run::level::Level;
use castle_run::persistence::{JsonFileStore, ScoreRecorder};
use castle_run::platform::{MonotonicTime, ScriptedInput};
use castle_run::render::LogRenderer;
use castle_run::settings::Settings;
use castle_run::sim::MatchState;
use clap::Parser;

/// Headless runs give up after two minutes of game time
const DEMO_TICK_LIMIT: u64 = TICK_RATE as u64 * 120;

#[derive(Parser, Debug)]
#[command(name = "castle-run")]
#[command(about = "Play the Castle Run demo headless and record the score")]
struct Cli {
    /// Settings file; defaults are used if it does not exist
    #[arg(default_value = "settings.json")]
    settings: PathBuf,
    /// Level file; the built-in demo level if omitted
    level: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Castle Run (headless) starting...");

    let cli = Cli::parse();

    let settings = match Settings::load(&cli.settings) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Cannot load settings from {}: {e}", cli.settings.display());
            return ExitCode::FAILURE;
        }
    };

    let level = match cli.level {
        Some(path) => match Level::load(&path) {
            Ok(level) => level,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Level::demo(),
    };

    let store = match JsonFileStore::open(&settings.highscore_path) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Cannot open high scores: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = MatchState::new(level, settings.match_config());
    state.debug = settings.show_debug;

    let mut controller = MatchController::new(
        state,
        Box::new(ScriptedInput::demo()),
        Box::new(LogRenderer::new()),
        Box::new(settings.audio_manager()),
        ScoreRecorder::new(store),
    )
    .with_tick_limit(Some(settings.max_match_ticks.unwrap_or(DEMO_TICK_LIMIT)));

    let mut clock = settings.clock(MonotonicTime::new());
    clock.run_until_stopped(&mut controller);

    let state = controller.state();
    match &state.result {
        Some(result) => log::info!(
            "{} {:?} with {} points in {} ticks",
            result.player_name,
            result.outcome,
            result.score,
            result.ticks
        ),
        None => log::info!("Match ended without a result ({:?})", state.phase),
    }

    let mut recorder = controller.into_recorder();
    match recorder.finish(settings.persist_timeout()) {
        Ok(Some(outcome)) => log::info!("High score: {outcome:?}"),
        Ok(None) => {}
        // The result stands even if it could not be saved
        Err(e @ PersistenceError::Timeout(_)) => log::warn!("Gave up waiting: {e}"),
        Err(e) => log::warn!("High score not saved: {e}"),
    }

    ExitCode::SUCCESS
}
