//! Game loop - gravity, lock delay and piece hand-off
//!
//! [`Game`] owns the grid, the active piece and the randomizer. The host
//! calls [`Game::tick`] at a fixed rate with a monotonic timestamp and the
//! held input; every cadence (gravity, soft drop, lock delay, line wipe,
//! auto-repeat) is derived by comparing that timestamp with stored
//! references, so the tick rate only affects granularity.
//!
//! ```text
//! NotStarted -> Playing <-> Paused
//!               Playing  -> LineClearing -> Playing
//!               Playing  -> GameOver -> (restart) -> Playing
//! ```

use tracing::{debug, info, trace};

use crate::config::{ConfigError, GameConfig};
use crate::core::{CommitOutcome, Grid, LineRemoval, Piece, Randomizer, RemovalProgress};
use crate::input::{AutoRepeat, InputFrame};
use crate::ports::Frame;
use crate::types::{
    interval_for_level, PieceKind, Shift, Spin, DEFAULT_ARR_MS, DEFAULT_DAS_MS,
    FALL_INTERVALS_MS, LOCK_DELAYS_MS, ROTATE_REPEAT_MS, SOFT_DROP_INTERVALS_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    NotStarted,
    Playing,
    Paused,
    /// Cleared rows are being wiped; the next piece spawns afterwards
    LineClearing,
    GameOver,
}

/// What one lock did, for score displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub score_delta: u32,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u8,
    pub total_lines: u32,
    pub tspin: bool,
    pub back_to_back: bool,
    /// Chain index after the lock; -1 when no chain is running
    pub combo: i32,
    pub game_over: bool,
}

/// Auto-repeat state for the four repeating actions
#[derive(Debug, Clone, Copy)]
struct Repeaters {
    left: AutoRepeat,
    right: AutoRepeat,
    rotate_left: AutoRepeat,
    rotate_right: AutoRepeat,
}

impl Repeaters {
    fn new() -> Self {
        Self {
            left: AutoRepeat::new(DEFAULT_DAS_MS, DEFAULT_ARR_MS),
            right: AutoRepeat::new(DEFAULT_DAS_MS, DEFAULT_ARR_MS),
            rotate_left: AutoRepeat::new(ROTATE_REPEAT_MS, ROTATE_REPEAT_MS),
            rotate_right: AutoRepeat::new(ROTATE_REPEAT_MS, ROTATE_REPEAT_MS),
        }
    }

    fn shift(&mut self, delta_ms: u64) {
        self.left.shift(delta_ms);
        self.right.shift(delta_ms);
        self.rotate_left.shift(delta_ms);
        self.rotate_right.shift(delta_ms);
    }
}

/// A running game
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    randomizer: Randomizer,
    active: Option<Piece>,
    /// Preview of the next spawn, drawn ahead
    next: PieceKind,
    hold: Option<Piece>,
    can_hold: bool,
    status: GameStatus,
    /// Pause start and the status to return to
    paused: Option<(u64, GameStatus)>,
    score: u32,
    lines: u32,
    level: u32,
    last_fall_ms: u64,
    /// Set while the active piece touches the stack
    lock_started_ms: Option<u64>,
    last_wipe_ms: u64,
    soft_drop_armed: bool,
    removal: Option<LineRemoval>,
    previous_input: InputFrame,
    repeaters: Repeaters,
}

impl Game {
    /// Create a game with an entropy-seeded randomizer
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_randomizer(config, Randomizer::new())
    }

    /// Create a game with a fixed piece sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_randomizer(config, Randomizer::from_seed(seed))
    }

    pub fn with_randomizer(
        config: GameConfig,
        mut randomizer: Randomizer,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.grid_size()?;
        let next = randomizer.next();
        let level = config.start_level;

        Ok(Self {
            grid: Grid::new(size),
            config,
            randomizer,
            active: None,
            next,
            hold: None,
            can_hold: true,
            status: GameStatus::NotStarted,
            paused: None,
            score: 0,
            lines: 0,
            level,
            last_fall_ms: 0,
            lock_started_ms: None,
            last_wipe_ms: 0,
            soft_drop_armed: false,
            removal: None,
            previous_input: InputFrame::IDLE,
            repeaters: Repeaters::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for puzzle setups and tests
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn hold_kind(&self) -> Option<PieceKind> {
        self.hold.map(|piece| piece.kind())
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Rows still being wiped, if a clear is in progress
    pub fn clearing_rows(&self) -> Option<&[u8]> {
        self.removal.as_ref().map(LineRemoval::rows)
    }

    pub fn fall_interval_ms(&self) -> u64 {
        interval_for_level(FALL_INTERVALS_MS, self.level)
    }

    pub fn soft_drop_interval_ms(&self) -> u64 {
        interval_for_level(SOFT_DROP_INTERVALS_MS, self.level)
    }

    pub fn lock_delay_ms(&self) -> u64 {
        interval_for_level(LOCK_DELAYS_MS, self.level)
    }

    /// Read-only view for a render surface
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: &self.grid,
            active: self.active.as_ref(),
            ghost_y: self.active.and_then(|piece| piece.ghost_y()),
            hold: self.hold_kind(),
            next: self.next,
            score: self.score,
            level: self.level,
            lines: self.lines,
            status: self.status,
            clearing_rows: self.clearing_rows(),
        }
    }

    /// Spawn the first piece. No-op once started.
    pub fn start(&mut self, now_ms: u64) {
        if self.status != GameStatus::NotStarted {
            return;
        }
        info!(width = self.config.width, height = self.config.height, "game started");
        self.set_status(GameStatus::Playing);
        self.spawn_next(now_ms);
    }

    /// Discard grid, pieces and score and play again from the start level
    pub fn restart(&mut self, now_ms: u64) {
        info!(score = self.score, lines = self.lines, "game restarted");
        self.grid.empty();
        self.randomizer.reset();
        self.next = self.randomizer.next();
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.paused = None;
        self.score = 0;
        self.lines = 0;
        self.level = self.config.start_level;
        self.lock_started_ms = None;
        self.soft_drop_armed = false;
        self.removal = None;
        self.repeaters = Repeaters::new();
        self.set_status(GameStatus::Playing);
        self.spawn_next(now_ms);
    }

    /// Replace the active piece, keeping its position (puzzle setups and
    /// tests). The ghost is recomputed when enabled.
    pub fn replace_active(&mut self, mut piece: Piece) {
        piece.refresh_contact(&self.grid);
        if self.config.ghost {
            piece.start_ghost(&self.grid);
        }
        self.active = Some(piece);
        self.lock_started_ms = None;
    }

    /// Advance the simulation to `now_ms` with the currently held input.
    ///
    /// Returns the lock that happened this tick, if any.
    pub fn tick(&mut self, now_ms: u64, input: InputFrame) -> Option<LockEvent> {
        let pressed = input.pressed_since(&self.previous_input);
        self.previous_input = input;

        if pressed.restart {
            if self.status == GameStatus::NotStarted {
                self.start(now_ms);
            } else {
                self.restart(now_ms);
            }
            return None;
        }
        if pressed.pause {
            self.toggle_pause(now_ms);
            return None;
        }

        match self.status {
            GameStatus::NotStarted | GameStatus::Paused | GameStatus::GameOver => None,
            GameStatus::LineClearing => {
                self.advance_removal(now_ms);
                None
            }
            GameStatus::Playing => self.play(now_ms, input, pressed),
        }
    }

    /// Enter or leave the pause state. Only `Playing` and `LineClearing`
    /// can pause; resuming shifts every timer by the paused duration.
    pub fn toggle_pause(&mut self, now_ms: u64) {
        if let Some((since, resume)) = self.paused.take() {
            let delta = now_ms.saturating_sub(since);
            self.last_fall_ms += delta;
            self.last_wipe_ms += delta;
            if let Some(started) = self.lock_started_ms.as_mut() {
                *started += delta;
            }
            self.repeaters.shift(delta);
            self.set_status(resume);
            return;
        }

        if matches!(self.status, GameStatus::Playing | GameStatus::LineClearing) {
            self.paused = Some((now_ms, self.status));
            self.set_status(GameStatus::Paused);
        }
    }

    fn play(&mut self, now_ms: u64, input: InputFrame, pressed: InputFrame) -> Option<LockEvent> {
        if pressed.hold {
            self.hold(now_ms);
        }

        let mut piece = self.active?;
        let grid = &self.grid;

        if self.repeaters.left.fire(input.move_left, now_ms) {
            piece.try_move(Shift::Left, grid);
        }
        if self.repeaters.right.fire(input.move_right, now_ms) {
            piece.try_move(Shift::Right, grid);
        }
        if self.repeaters.rotate_left.fire(input.rotate_left, now_ms) {
            piece.try_rotate(Spin::CounterClockwise, grid);
        }
        if self.repeaters.rotate_right.fire(input.rotate_right, now_ms) {
            piece.try_rotate(Spin::Clockwise, grid);
        }

        if pressed.hard_drop {
            piece.fall(true, grid);
            self.active = Some(piece);
            return self.lock(now_ms);
        }

        if !input.soft_drop {
            self.soft_drop_armed = false;
        } else if pressed.soft_drop && !piece.is_touching_bottom() {
            self.soft_drop_armed = true;
        }

        let interval = if self.soft_drop_armed {
            self.soft_drop_interval_ms()
        } else {
            self.fall_interval_ms()
        };
        if !piece.is_touching_bottom() && now_ms.saturating_sub(self.last_fall_ms) >= interval {
            piece.fall(false, grid);
            self.last_fall_ms = now_ms;
        }

        self.active = Some(piece);

        if !piece.is_touching_bottom() {
            self.lock_started_ms = None;
            return None;
        }
        if self.soft_drop_armed {
            return self.lock(now_ms);
        }
        let started = *self.lock_started_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(started) >= self.lock_delay_ms() {
            return self.lock(now_ms);
        }
        None
    }

    /// Swap the active piece with the held one; once per piece
    fn hold(&mut self, now_ms: u64) {
        if !self.can_hold {
            return;
        }
        let Some(mut outgoing) = self.active.take() else {
            return;
        };

        let mut incoming = match self.hold.take() {
            Some(piece) => piece,
            None => Piece::new(self.grid.size(), self.draw()),
        };
        incoming.reset_position(&self.grid);
        if self.config.ghost {
            incoming.start_ghost(&self.grid);
        }

        outgoing.stop_ghost();
        trace!(held = ?outgoing.kind(), active = ?incoming.kind(), "hold swap");
        self.hold = Some(outgoing);
        self.active = Some(incoming);
        self.can_hold = false;
        self.lock_started_ms = None;
        self.last_fall_ms = now_ms;
    }

    fn lock(&mut self, now_ms: u64) -> Option<LockEvent> {
        let piece = self.active.take()?;
        self.soft_drop_armed = false;
        self.lock_started_ms = None;
        self.can_hold = true;

        let mut event = LockEvent {
            score_delta: 0,
            score: self.score,
            level: self.level,
            lines_cleared: 0,
            total_lines: self.lines,
            tspin: false,
            back_to_back: false,
            combo: -1,
            game_over: false,
        };

        match self.grid.commit(&piece, self.level) {
            CommitOutcome::GameOver => {
                info!(score = self.score, lines = self.lines, level = self.level, "game over");
                event.game_over = true;
                event.combo = self.grid.combo();
                self.set_status(GameStatus::GameOver);
            }
            CommitOutcome::NoClear => {
                self.spawn_next(now_ms);
            }
            CommitOutcome::LinesCleared(clear) => {
                self.score = self.score.saturating_add(clear.score.total);
                self.lines += u32::from(clear.lines);
                self.update_level();

                event.score_delta = clear.score.total;
                event.score = self.score;
                event.level = self.level;
                event.lines_cleared = clear.lines;
                event.total_lines = self.lines;
                event.tspin = clear.tspin;
                event.back_to_back = clear.score.back_to_back;
                event.combo = clear.combo;

                self.removal = Some(clear.removal);
                self.last_wipe_ms = now_ms;
                self.set_status(GameStatus::LineClearing);
            }
        }

        debug!(
            kind = ?piece.kind(),
            lines = event.lines_cleared,
            score_delta = event.score_delta,
            combo = event.combo,
            tspin = event.tspin,
            back_to_back = event.back_to_back,
            "piece locked"
        );
        Some(event)
    }

    fn advance_removal(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_wipe_ms) < self.config.wipe_interval_ms {
            return;
        }
        self.last_wipe_ms = now_ms;

        let Some(removal) = self.removal.as_mut() else {
            self.set_status(GameStatus::Playing);
            self.spawn_next(now_ms);
            return;
        };
        if removal.step(&mut self.grid) == RemovalProgress::Done {
            self.removal = None;
            self.set_status(GameStatus::Playing);
            self.spawn_next(now_ms);
        }
    }

    fn update_level(&mut self) {
        let level = self.config.start_level + self.lines / self.config.lines_per_level;
        if level != self.level {
            info!(from = self.level, to = level, lines = self.lines, "level up");
            self.level = level;
        }
    }

    fn draw(&mut self) -> PieceKind {
        std::mem::replace(&mut self.next, self.randomizer.next())
    }

    fn spawn_next(&mut self, now_ms: u64) {
        let kind = self.draw();
        let mut piece = Piece::new(self.grid.size(), kind);
        piece.refresh_contact(&self.grid);
        if self.config.ghost {
            piece.start_ghost(&self.grid);
        }
        self.active = Some(piece);
        self.lock_started_ms = None;
        self.last_fall_ms = now_ms;
    }

    fn set_status(&mut self, status: GameStatus) {
        if self.status != status {
            trace!(from = ?self.status, to = ?status, "status");
            self.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;
    use crate::types::Rotation;

    fn game() -> Game {
        let mut game = Game::with_seed(GameConfig::default(), 1).unwrap();
        game.start(0);
        game
    }

    #[test]
    fn test_new_game_waits_for_start() {
        let mut game = Game::with_seed(GameConfig::default(), 1).unwrap();
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert!(game.active().is_none());
        assert_eq!(game.tick(1000, InputFrame::IDLE), None);

        let preview = game.next_kind();
        game.start(0);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.active().map(Piece::kind), Some(preview));
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            width: 2,
            ..GameConfig::default()
        };
        assert!(Game::with_seed(config, 1).is_err());
    }

    #[test]
    fn test_gravity_follows_fall_interval() {
        let mut game = game();
        let y = game.active().unwrap().y();
        game.tick(999, InputFrame::IDLE);
        assert_eq!(game.active().unwrap().y(), y);
        game.tick(1000, InputFrame::IDLE);
        assert_eq!(game.active().unwrap().y(), y + 1);
    }

    #[test]
    fn test_hard_drop_locks_same_tick() {
        let mut game = game();
        let event = game.tick(16, InputFrame::only(Action::HardDrop)).unwrap();
        assert!(!event.game_over);
        assert_eq!(event.lines_cleared, 0);
        assert_eq!(event.combo, -1);
        assert_eq!(game.grid().cells().iter().filter(|c| c.is_some()).count(), 4);
        assert!(game.active().is_some());
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut game = game();
        let first = game.active().unwrap().kind();
        let preview = game.next_kind();

        game.tick(16, InputFrame::only(Action::Hold));
        assert_eq!(game.hold_kind(), Some(first));
        assert_eq!(game.active().unwrap().kind(), preview);
        assert!(!game.can_hold());

        game.tick(32, InputFrame::IDLE);
        game.tick(48, InputFrame::only(Action::Hold));
        assert_eq!(game.hold_kind(), Some(first), "second hold ignored");

        game.tick(64, InputFrame::only(Action::HardDrop));
        assert!(game.can_hold());
    }

    #[test]
    fn test_pause_freezes_timers() {
        let mut game = game();
        let y = game.active().unwrap().y();

        game.tick(500, InputFrame::only(Action::Pause));
        assert_eq!(game.status(), GameStatus::Paused);
        game.tick(5000, InputFrame::IDLE);
        game.tick(10_000, InputFrame::only(Action::Pause));
        assert_eq!(game.status(), GameStatus::Playing);

        // 500ms had elapsed before the pause; 499 more is not enough.
        game.tick(10_499, InputFrame::IDLE);
        assert_eq!(game.active().unwrap().y(), y);
        game.tick(10_500, InputFrame::IDLE);
        assert_eq!(game.active().unwrap().y(), y + 1);
    }

    #[test]
    fn test_replace_active_projects_ghost() {
        let mut game = game();
        game.replace_active(Piece::placed(PieceKind::O, Rotation::North, 0, 0));
        assert_eq!(game.frame().ghost_y, Some(18));
    }
}
