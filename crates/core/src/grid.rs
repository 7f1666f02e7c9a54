//! Grid module - the committed playfield
//!
//! The grid is a flat row-major array of cells plus the line-clear bookkeeping
//! that survives between locks: the combo counter and the category of the last
//! clear. Coordinates are `(x, y)` with `y = 0` at the top. Rows at or above
//! `y = 0` form the spawn buffer; a lock that writes there ends the game.
//!
//! Clearing is staged. [`Grid::commit`] merges a piece, scores the clear and
//! hands back a [`LineRemoval`] that the game loop steps on its own cadence:
//! one column of the cleared rows is blanked per step, then the rows are
//! spliced out and empty rows enter at the top.

use arrayvec::ArrayVec;

use crate::piece::Piece;
use crate::scoring::{calculate_score, ScoreResult};
use crate::shapes::Matrix;
use crate::types::{Cell, ClearKind, GridSize, LastMovement, PieceKind};

/// A piece spans at most four rows
pub const MAX_CLEARED_ROWS: usize = 4;

/// Corners of the T piece's 3x3 box, relative to its top-left cell
const T_CORNERS: [(i8, i8); 4] = [(0, 0), (2, 0), (0, 2), (2, 2)];

/// The playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    /// Row-major cells (y * width + x)
    cells: Vec<Cell>,
    /// Clear chain index; -1 when no chain is running
    combo: i32,
    last_clear: ClearKind,
}

/// Result of committing a piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The piece wrote into the spawn buffer. It is merged; nothing is scored.
    GameOver,
    NoClear,
    LinesCleared(LineClear),
}

/// A scored clear waiting for its rows to be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    pub lines: u8,
    pub score: ScoreResult,
    pub tspin: bool,
    /// Chain index after this clear (0 on the first clear of a chain)
    pub combo: i32,
    pub removal: LineRemoval,
}

/// Progress of a staged row removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPhase {
    /// Blanking columns; holds the next column to blank
    WipingColumn(u8),
    /// Rows spliced out, empty rows inserted on top
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalProgress {
    Pending,
    Done,
}

/// Staged removal of full rows, identified before anything moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRemoval {
    /// Target rows, ascending
    rows: ArrayVec<u8, MAX_CLEARED_ROWS>,
    phase: RemovalPhase,
}

impl LineRemoval {
    fn new(rows: ArrayVec<u8, MAX_CLEARED_ROWS>) -> Self {
        Self {
            rows,
            phase: RemovalPhase::WipingColumn(0),
        }
    }

    pub fn rows(&self) -> &[u8] {
        &self.rows
    }

    pub fn phase(&self) -> RemovalPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RemovalPhase::Done
    }

    /// Advance one step: blank the next column across every target row, or,
    /// once every column is blank, splice the rows out.
    pub fn step(&mut self, grid: &mut Grid) -> RemovalProgress {
        match self.phase {
            RemovalPhase::WipingColumn(column) if column < grid.width() => {
                for &row in &self.rows {
                    grid.set(column as i8, row as i8, None);
                }
                self.phase = RemovalPhase::WipingColumn(column + 1);
                RemovalProgress::Pending
            }
            RemovalPhase::WipingColumn(_) => {
                grid.remove_rows(&self.rows);
                self.phase = RemovalPhase::Done;
                RemovalProgress::Done
            }
            RemovalPhase::Done => RemovalProgress::Done,
        }
    }

    /// Step until done; returns the number of steps taken
    pub fn finish(&mut self, grid: &mut Grid) -> usize {
        let mut steps = 0;
        while !self.is_done() {
            self.step(grid);
            steps += 1;
        }
        steps
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.width() as usize * size.height() as usize],
            combo: -1,
            last_clear: ClearKind::None,
        }
    }

    /// Build a grid from text rows aligned to the bottom of the field.
    ///
    /// Piece letters (`I J L O S T Z`) are filled cells; anything else is
    /// empty. Rows longer than the width are truncated.
    ///
    /// ```
    /// use blockfall_core::Grid;
    /// use blockfall_core::types::{GridSize, PieceKind};
    ///
    /// let grid = Grid::from_pattern(GridSize::new(4, 4).unwrap(), &["I..Z", "IIII"]);
    /// assert_eq!(grid.get(3, 2), Some(Some(PieceKind::Z)));
    /// assert!(grid.is_row_full(3));
    /// ```
    pub fn from_pattern(size: GridSize, rows: &[&str]) -> Self {
        let mut grid = Self::new(size);
        let offset = size.height() as usize - rows.len().min(size.height() as usize);
        for (i, row) in rows.iter().take(size.height() as usize).enumerate() {
            let y = (offset + i) as i8;
            for (x, ch) in row.chars().take(size.width() as usize).enumerate() {
                let cell = PieceKind::from_str(ch.encode_utf8(&mut [0; 4]));
                grid.set(x as i8, y, cell);
            }
        }
        grid
    }

    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || y < 0 || x as u8 >= self.size.width() || y as u8 >= self.size.height() {
            return None;
        }
        Some(y as usize * self.size.width() as usize + x as usize)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> u8 {
        self.size.width()
    }

    pub fn height(&self) -> u8 {
        self.size.height()
    }

    /// Cell at `(x, y)`; `None` when out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set a cell; returns false when out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .map(|row| row.iter().all(Option::is_some))
            .unwrap_or(false)
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.size.height() as usize {
            return None;
        }
        let width = self.size.width() as usize;
        Some(&self.cells[y * width..(y + 1) * width])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.width() as usize)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn combo(&self) -> i32 {
        self.combo
    }

    pub fn last_clear_kind(&self) -> ClearKind {
        self.last_clear
    }

    /// Whether any filled cell of `matrix`, placed with its top-left at
    /// `(x, y)`, lands on a filled grid cell. Cells outside the grid never
    /// collide here; walls and floor are the caller's business.
    pub fn overlaps(&self, x: i8, y: i8, matrix: &Matrix) -> bool {
        matrix
            .cells()
            .any(|(dx, dy)| self.is_occupied(x + dx, y + dy))
    }

    /// Whether locking `piece` where it stands scores a T-spin: a T whose last
    /// movement was a rotation, with at least three of the four corners of its
    /// 3x3 box blocked. Corners past the side walls count as blocked.
    pub fn is_tspin(&self, piece: &Piece) -> bool {
        if piece.kind() != PieceKind::T || piece.last_movement() != LastMovement::Rotate {
            return false;
        }

        let width = self.size.width() as i8;
        let blocked = T_CORNERS
            .iter()
            .filter(|&&(cx, cy)| {
                let x = piece.x() + cx;
                let y = piece.y() + cy;
                x < 0 || x >= width || self.is_occupied(x, y)
            })
            .count();

        blocked >= 3
    }

    /// Merge `piece` into the grid and classify the lock.
    ///
    /// Full rows are only searched among the rows the piece touched, and they
    /// are all identified before anything is removed. The returned
    /// [`LineRemoval`] must be stepped to take them out.
    pub fn commit(&mut self, piece: &Piece, level: u32) -> CommitOutcome {
        let tspin = self.is_tspin(piece);
        let kind = piece.kind();

        let mut hit_top = false;
        let mut touched: ArrayVec<u8, MAX_CLEARED_ROWS> = ArrayVec::new();
        for (x, y) in piece.cells() {
            if y <= 0 {
                hit_top = true;
            }
            if self.set(x, y, Some(kind)) && !touched.contains(&(y as u8)) {
                let _ = touched.try_push(y as u8);
            }
        }

        if hit_top {
            return CommitOutcome::GameOver;
        }

        let mut full: ArrayVec<u8, MAX_CLEARED_ROWS> = touched
            .into_iter()
            .filter(|&y| self.is_row_full(y as usize))
            .collect();

        if full.is_empty() {
            self.combo = -1;
            return CommitOutcome::NoClear;
        }
        full.sort_unstable();

        self.combo += 1;
        let score = calculate_score(full.len(), level, tspin, self.combo, self.last_clear);
        self.last_clear = score.kind;

        CommitOutcome::LinesCleared(LineClear {
            lines: full.len() as u8,
            score,
            tspin,
            combo: self.combo,
            removal: LineRemoval::new(full),
        })
    }

    /// Splice out `rows` (ascending) and insert as many empty rows on top
    fn remove_rows(&mut self, rows: &[u8]) {
        let width = self.size.width() as usize;
        let height = self.size.height() as usize;
        let mut write_y = height;

        for read_y in (0..height).rev() {
            if rows.contains(&(read_y as u8)) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                self.cells.copy_within(src..src + width, write_y * width);
            }
        }

        self.cells[..write_y * width].fill(None);
    }

    /// Clear every cell and the clear bookkeeping (restart)
    pub fn empty(&mut self) {
        self.cells.fill(None);
        self.combo = -1;
        self.last_clear = ClearKind::None;
    }
}
