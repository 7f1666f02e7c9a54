//! Terminal runner (default binary).
//!
//! Configuration comes from the JSON file named by `BLOCKFALL_CONFIG`, or
//! from `BLOCKFALL_*` variables. Logs go to the file named by `BLOCKFALL_LOG`
//! (stdout belongs to the renderer); without it nothing is logged.

use std::fs::File;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use blockfall::engine::config::ENV_CONFIG;
use blockfall::engine::{Game, GameConfig, LockEvent, Session};
use blockfall::input::TerminalInput;
use blockfall::term::{GameView, TerminalSurface};
use blockfall::types::TICK_MS;

const ENV_LOG: &str = "BLOCKFALL_LOG";

fn main() -> Result<()> {
    init_logging()?;
    let config = load_config()?;
    let mut game = Game::new(config).context("invalid game configuration")?;

    let mut surface = TerminalSurface::new(GameView::default());
    surface.enter()?;

    let clock = Instant::now();
    game.start(0);
    let mut session = Session::new(game, TerminalInput::new(), surface, |event: &LockEvent| {
        if event.lines_cleared > 0 {
            info!(
                delta = event.score_delta,
                score = event.score,
                level = event.level,
                "lines cleared"
            );
        }
    });

    let result = run(&mut session, clock);

    // Always try to restore terminal state.
    let _ = session.surface_mut().exit();
    if let Err(err) = &result {
        warn!(error = %err, "runner stopped with an error");
    }
    result
}

fn run<S>(session: &mut Session<TerminalInput, TerminalSurface, S>, clock: Instant) -> Result<()>
where
    S: blockfall::engine::ScoreBoard,
{
    let tick = Duration::from_millis(TICK_MS);
    let mut next_tick = Instant::now();

    loop {
        let now_ms = clock.elapsed().as_millis() as u64;
        session.frame(now_ms)?;

        if session.input().quit_requested() {
            if let Some(err) = session.input_mut().take_error() {
                return Err(err).context("reading terminal input");
            }
            info!("quit requested");
            return Ok(());
        }

        next_tick += tick;
        if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        } else {
            next_tick = Instant::now();
        }
    }
}

fn load_config() -> Result<GameConfig> {
    match std::env::var(ENV_CONFIG) {
        Ok(path) if !path.trim().is_empty() => {
            let config = GameConfig::load(path.trim())
                .with_context(|| format!("loading {ENV_CONFIG}={path}"))?;
            info!(path = %path.trim(), "loaded config file");
            Ok(config)
        }
        _ => Ok(GameConfig::from_env()),
    }
}

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var(ENV_LOG) else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}
