//! Core rules - pure, deterministic, and testable
//!
//! This crate holds the playfield rules with no notion of time, input or
//! output. Everything here is driven by explicit calls from the game loop in
//! `blockfall-engine`.
//!
//! # Module Structure
//!
//! - [`shapes`]: the seven tetrominoes, their rotation matrices, bounding boxes
//!   and SRS kick tables, all static
//! - [`piece`]: the active piece and its movement against the grid
//! - [`grid`]: the committed playfield, lock classification and staged row
//!   removal
//! - [`scoring`]: points for a clear with back-to-back and combo bonuses
//! - [`randomizer`]: double-bag piece generation
//!
//! # Example
//!
//! ```
//! use blockfall_core::{CommitOutcome, Grid, Piece};
//! use blockfall_core::types::{GridSize, PieceKind, Rotation};
//!
//! let size = GridSize::new(4, 6).unwrap();
//! let mut grid = Grid::new(size);
//!
//! // A flat I on the floor fills the whole bottom row.
//! let mut piece = Piece::placed(PieceKind::I, Rotation::North, 0, 0);
//! piece.fall(true, &grid);
//!
//! match grid.commit(&piece, 1) {
//!     CommitOutcome::LinesCleared(mut clear) => {
//!         assert_eq!(clear.score.total, 100);
//!         clear.removal.finish(&mut grid);
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(grid.cells().iter().all(Option::is_none));
//! ```

pub mod grid;
pub mod piece;
pub mod randomizer;
pub mod scoring;
pub mod shapes;

pub use blockfall_types as types;

pub use grid::{CommitOutcome, Grid, LineClear, LineRemoval, RemovalPhase, RemovalProgress};
pub use piece::Piece;
pub use randomizer::Randomizer;
pub use scoring::{calculate_score, ScoreResult};
pub use shapes::{shape, BoundingBox, Matrix, Shape};
