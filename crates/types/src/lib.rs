//! Shared types and gameplay constants
//!
//! Plain data used by every layer of the engine: piece kinds, rotation states,
//! movement directions, and the timing and scoring tables. Nothing here knows
//! about the grid or the game loop.
//!
//! # Field Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, top to bottom)
//! - Pieces spawn fully above row 0; row 0 and everything above it is the
//!   spawn buffer, so a lock that writes there ends the game.
//!
//! # Timing Tables
//!
//! Cadences are looked up by level through breakpoint tables of
//! `(first_level, milliseconds)` pairs. The last breakpoint whose level is
//! `<=` the current level wins:
//!
//! | Level | Fall | Soft drop | Lock delay |
//! |-------|------|-----------|------------|
//! | 1 | 1000ms | 50ms | 500ms |
//! | 5 | 400ms | 40ms | 500ms |
//! | 10 | 120ms | 30ms | 450ms |
//! | 15 | 80ms | 20ms | 400ms |
//! | 20+ | 40ms | 20ms | 350ms |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{interval_for_level, PieceKind, Rotation, Spin, FALL_INTERVALS_MS};
//!
//! let kind = PieceKind::from_str("t").unwrap();
//! assert_eq!(kind, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate(Spin::Clockwise), Rotation::East);
//! assert_eq!(interval_for_level(FALL_INTERVALS_MS, 1), 1000);
//! ```

use thiserror::Error;

/// Default field width in cells
pub const GRID_WIDTH: u8 = 10;

/// Default field height in cells
pub const GRID_HEIGHT: u8 = 20;

/// Smallest supported field edge
pub const MIN_GRID_EDGE: u8 = 4;

/// Largest supported field edge (coordinates are `i8`)
pub const MAX_GRID_EDGE: u8 = 64;

/// Fixed simulation step of the terminal runner (16ms ≈ 60 FPS)
pub const TICK_MS: u64 = 16;

/// Lines needed per level-up
pub const LINES_PER_LEVEL: u32 = 10;

/// Level a fresh game starts at (also the first score multiplier)
pub const START_LEVEL: u32 = 1;

/// Interval between two columns of the line-clear wipe
pub const LINE_CLEAR_WIPE_MS: u64 = 20;

/// Delay before a held move starts repeating
pub const DEFAULT_DAS_MS: u64 = 150;

/// Interval between repeated moves while held
pub const DEFAULT_ARR_MS: u64 = 50;

/// Interval between repeated rotations while held
pub const ROTATE_REPEAT_MS: u64 = 250;

/// Gravity interval per level: `(first_level, ms_per_row)`
pub const FALL_INTERVALS_MS: &[(u32, u64)] = &[
    (1, 1000),
    (2, 800),
    (3, 650),
    (4, 500),
    (5, 400),
    (6, 320),
    (7, 250),
    (8, 200),
    (9, 160),
    (10, 120),
    (13, 100),
    (15, 80),
    (18, 60),
    (20, 40),
];

/// Soft-drop interval per level
pub const SOFT_DROP_INTERVALS_MS: &[(u32, u64)] = &[(1, 50), (5, 40), (10, 30), (15, 20)];

/// Lock delay per level
pub const LOCK_DELAYS_MS: &[(u32, u64)] = &[(1, 500), (10, 450), (15, 400), (20, 350)];

/// Look up a breakpoint table.
///
/// Levels below the first breakpoint use the first entry.
///
/// ```
/// use blockfall_types::{interval_for_level, LOCK_DELAYS_MS};
///
/// assert_eq!(interval_for_level(LOCK_DELAYS_MS, 0), 500);
/// assert_eq!(interval_for_level(LOCK_DELAYS_MS, 12), 450);
/// assert_eq!(interval_for_level(LOCK_DELAYS_MS, 99), 350);
/// ```
pub fn interval_for_level(table: &[(u32, u64)], level: u32) -> u64 {
    table
        .iter()
        .take_while(|&&(first, _)| first <= level)
        .last()
        .or_else(|| table.first())
        .map(|&(_, ms)| ms)
        .unwrap_or(0)
}

/// Base points for 0..=4 ordinary lines
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Base points for 0..=3 T-spin lines
pub const TSPIN_SCORES: [u32; 4] = [0, 800, 1200, 1600];

/// Combo bonus per chain step (multiplied by combo and level)
pub const COMBO_BASE: u32 = 50;

/// Back-to-back multiplier numerator (3/2 = 1.5x)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back multiplier denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// The seven tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// Every kind, in table order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Position in [`PieceKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("I"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("z"), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

/// Rotation states in clockwise order.
///
/// North is the spawn state. The O piece only ever uses North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// State for an index, wrapping modulo 4
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// `(index + sign + 4) mod 4`
    pub fn rotate(self, spin: Spin) -> Self {
        let next = self.index() as i32 + spin.sign() as i32 + 4;
        Self::from_index((next % 4) as usize)
    }
}

/// A raw direction of zero (or anything without a sign) is caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid direction {0}: expected a negative or positive value")]
pub struct InvalidDirection(pub i32);

/// Horizontal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Left,
    Right,
}

impl Shift {
    pub fn sign(self) -> i8 {
        match self {
            Shift::Left => -1,
            Shift::Right => 1,
        }
    }
}

impl TryFrom<i32> for Shift {
    type Error = InvalidDirection;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value.signum() {
            -1 => Ok(Shift::Left),
            1 => Ok(Shift::Right),
            _ => Err(InvalidDirection(value)),
        }
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    pub fn sign(self) -> i8 {
        match self {
            Spin::Clockwise => 1,
            Spin::CounterClockwise => -1,
        }
    }
}

impl TryFrom<i32> for Spin {
    type Error = InvalidDirection;

    /// Positive values rotate clockwise, negative counter-clockwise.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value.signum() {
            1 => Ok(Spin::Clockwise),
            -1 => Ok(Spin::CounterClockwise),
            _ => Err(InvalidDirection(value)),
        }
    }
}

/// Most recent successful movement of the active piece.
///
/// T-spin detection only credits a lock whose last movement was a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LastMovement {
    #[default]
    None,
    Fall,
    Rotate,
    Move,
}

/// Category of the most recent line clear, for back-to-back chaining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClearKind {
    #[default]
    None,
    TSpin,
    Tetris,
}

/// A cell of the field: `None` is empty, `Some(kind)` is a locked block
pub type Cell = Option<PieceKind>;

/// A field edge outside `MIN_GRID_EDGE..=MAX_GRID_EDGE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("grid {axis} {value} is outside {}..={}", MIN_GRID_EDGE, MAX_GRID_EDGE)]
pub struct InvalidGridSize {
    pub axis: &'static str,
    pub value: u8,
}

/// Field dimensions in cells, both edges within `MIN_GRID_EDGE..=MAX_GRID_EDGE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    width: u8,
    height: u8,
}

impl GridSize {
    pub const fn new(width: u8, height: u8) -> Result<Self, InvalidGridSize> {
        if !edge_in_range(width) {
            return Err(InvalidGridSize { axis: "width", value: width });
        }
        if !edge_in_range(height) {
            return Err(InvalidGridSize { axis: "height", value: height });
        }
        Ok(Self { width, height })
    }

    pub const fn width(self) -> u8 {
        self.width
    }

    pub const fn height(self) -> u8 {
        self.height
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

const fn edge_in_range(edge: u8) -> bool {
    edge >= MIN_GRID_EDGE && edge <= MAX_GRID_EDGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Rotation::West.rotate(Spin::Clockwise), Rotation::North);
        assert_eq!(Rotation::North.rotate(Spin::CounterClockwise), Rotation::West);
        assert_eq!(Rotation::from_index(6), Rotation::South);
    }

    #[test]
    fn direction_from_raw_value_uses_sign() {
        assert_eq!(Shift::try_from(-3), Ok(Shift::Left));
        assert_eq!(Shift::try_from(7), Ok(Shift::Right));
        assert_eq!(Shift::try_from(0), Err(InvalidDirection(0)));
        assert_eq!(Spin::try_from(1), Ok(Spin::Clockwise));
        assert_eq!(Spin::try_from(-1), Ok(Spin::CounterClockwise));
        assert!(Spin::try_from(0).is_err());
    }

    #[test]
    fn grid_size_rejects_edges_out_of_range() {
        assert_eq!(GridSize::new(MIN_GRID_EDGE, MAX_GRID_EDGE).unwrap().height(), 64);
        assert_eq!(GridSize::new(0, 20), Err(InvalidGridSize { axis: "width", value: 0 }));
        assert_eq!(
            GridSize::new(10, 200),
            Err(InvalidGridSize { axis: "height", value: 200 })
        );
        assert_eq!(GridSize::default(), GridSize::new(10, 20).unwrap());
    }

    #[test]
    fn breakpoint_tables_get_faster_with_level() {
        for table in [FALL_INTERVALS_MS, SOFT_DROP_INTERVALS_MS, LOCK_DELAYS_MS] {
            let mut previous = u64::MAX;
            for level in 1..30 {
                let ms = interval_for_level(table, level);
                assert!(ms <= previous, "level {level} slower than level {}", level - 1);
                previous = ms;
            }
        }
    }

    #[test]
    fn piece_kind_index_matches_all() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(*kind));
        }
    }
}
