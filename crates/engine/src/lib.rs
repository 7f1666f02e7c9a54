//! Game loop and collaborator ports
//!
//! `blockfall-core` knows the rules; this crate knows time. [`Game`] turns a
//! stream of timestamps and held inputs into gravity, lock delay, line wipes,
//! hold swaps and level changes, and reports each lock as a [`LockEvent`].
//! [`Session`] wires a game to an input source, a render surface and a
//! scoreboard.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Action, Game, GameConfig, GameStatus, InputFrame};
//!
//! let mut game = Game::with_seed(GameConfig::default(), 7).unwrap();
//! game.start(0);
//!
//! let event = game.tick(16, InputFrame::only(Action::HardDrop)).unwrap();
//! assert_eq!(event.lines_cleared, 0);
//! assert_eq!(game.status(), GameStatus::Playing);
//! ```

pub mod config;
pub mod game;
pub mod input;
pub mod ports;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use config::{ConfigError, GameConfig};
pub use game::{Game, GameStatus, LockEvent};
pub use input::{Action, AutoRepeat, InputFrame};
pub use ports::{Frame, InputSource, RenderSurface, ScoreBoard, Session};
