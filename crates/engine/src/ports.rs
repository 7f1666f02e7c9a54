//! Collaborator ports
//!
//! The engine never reads a keyboard, draws or shows a score itself. A host
//! plugs an [`InputSource`], a [`RenderSurface`] and a [`ScoreBoard`] into a
//! [`Session`] and drives it with [`Session::frame`].

use anyhow::Result;

use crate::core::{Grid, Piece};
use crate::game::{Game, GameStatus, LockEvent};
use crate::input::InputFrame;
use crate::types::PieceKind;

/// Supplies the held actions for a tick
pub trait InputSource {
    fn poll(&mut self, now_ms: u64) -> InputFrame;
}

/// Draws a read-only view of the game
pub trait RenderSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Receives the outcome of every lock
pub trait ScoreBoard {
    fn record(&mut self, event: &LockEvent);
}

impl<F: FnMut(&LockEvent)> ScoreBoard for F {
    fn record(&mut self, event: &LockEvent) {
        self(event)
    }
}

/// Everything a render surface may draw for one tick
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub grid: &'a Grid,
    pub active: Option<&'a Piece>,
    /// Landing row of the active piece's matrix top
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub next: PieceKind,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub status: GameStatus,
    /// Rows being wiped during `LineClearing`
    pub clearing_rows: Option<&'a [u8]>,
}

/// One game wired to its collaborators
pub struct Session<I, R, S> {
    game: Game,
    input: I,
    surface: R,
    scores: S,
}

impl<I, R, S> Session<I, R, S>
where
    I: InputSource,
    R: RenderSurface,
    S: ScoreBoard,
{
    pub fn new(game: Game, input: I, surface: R, scores: S) -> Self {
        Self {
            game,
            input,
            surface,
            scores,
        }
    }

    /// Poll input, advance the game, report any lock and present the result
    pub fn frame(&mut self, now_ms: u64) -> Result<Option<LockEvent>> {
        let input = self.input.poll(now_ms);
        let event = self.game.tick(now_ms, input);
        if let Some(event) = &event {
            self.scores.record(event);
        }
        self.surface.present(&self.game.frame())?;
        Ok(event)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn into_parts(self) -> (Game, I, R, S) {
        (self.game, self.input, self.surface, self.scores)
    }
}
