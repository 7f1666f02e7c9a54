//! Piece module - the active falling tetromino
//!
//! A [`Piece`] is a kind, a rotation state and the grid position of its
//! matrix's top-left cell. It never owns the grid: every operation borrows the
//! committed [`Grid`] to test collisions. Rejected moves and rotations are not
//! errors; they return `false` and leave the piece untouched.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::shapes::{self, BoundingBox, Kick, Matrix, ShapeState, KICKS_PER_TRANSITION};
use crate::types::{GridSize, LastMovement, PieceKind, Rotation, Shift, Spin};

/// The active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    /// Column of the matrix's left edge
    x: i8,
    /// Row of the matrix's top edge; negative while above the field
    y: i8,
    touching_bottom: bool,
    last_movement: LastMovement,
    /// Landing row of the matrix top, while a ghost projection is active
    ghost_y: Option<i8>,
}

impl Piece {
    /// Create a piece of `kind` at the spawn position for a field of `size`
    pub fn new(size: GridSize, kind: PieceKind) -> Self {
        let state = shapes::state(kind, Rotation::North);
        let (x, y) = spawn_position(size, state);
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
            touching_bottom: false,
            last_movement: LastMovement::None,
            ghost_y: None,
        }
    }

    /// Create a piece at an explicit position (setups and tests)
    pub fn placed(kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> Self {
        Self {
            kind,
            rotation: normalize(kind, rotation),
            x,
            y,
            touching_bottom: false,
            last_movement: LastMovement::None,
            ghost_y: None,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn is_touching_bottom(&self) -> bool {
        self.touching_bottom
    }

    pub fn last_movement(&self) -> LastMovement {
        self.last_movement
    }

    pub fn ghost_y(&self) -> Option<i8> {
        self.ghost_y
    }

    /// Current rotation matrix
    pub fn matrix(&self) -> &'static Matrix {
        &self.state().matrix
    }

    /// Bounding box of the current rotation matrix
    pub fn bounds(&self) -> BoundingBox {
        self.state().bounds
    }

    /// Absolute grid coordinates of the occupied cells
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.matrix()
            .cells()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Absolute cells of the ghost projection, if one is active
    pub fn ghost_cells(&self) -> Option<impl Iterator<Item = (i8, i8)> + '_> {
        let ghost_y = self.ghost_y?;
        Some(
            self.matrix()
                .cells()
                .map(move |(dx, dy)| (self.x + dx, ghost_y + dy)),
        )
    }

    fn state(&self) -> &'static ShapeState {
        shapes::state(self.kind, self.rotation)
    }

    /// Shift one column left or right.
    ///
    /// Succeeds only when the bounding box stays inside the field width and
    /// the matrix does not overlap committed cells.
    pub fn try_move(&mut self, shift: Shift, grid: &Grid) -> bool {
        let new_x = self.x + shift.sign();
        let bounds = self.bounds();
        let width = grid.width() as i8;

        if new_x + bounds.left < 0
            || new_x + bounds.right >= width
            || grid.overlaps(new_x, self.y, self.matrix())
        {
            return false;
        }

        self.x = new_x;
        self.touching_bottom = self.touches_ground(grid);
        self.last_movement = LastMovement::Move;
        self.refresh_ghost(grid);
        true
    }

    /// Rotate one state with kick resolution.
    ///
    /// Candidates are `(0, 0)` followed by the kick table entries for this
    /// transition; the first candidate that fits wins. If none fits the piece
    /// is unchanged. O never rotates.
    pub fn try_rotate(&mut self, spin: Spin, grid: &Grid) -> bool {
        let shape = shapes::shape(self.kind);
        if !shape.rotates() {
            return false;
        }

        let new_rotation = self.rotation.rotate(spin);
        let new_state = shape.state(new_rotation);

        let mut candidates: ArrayVec<Kick, { KICKS_PER_TRANSITION + 1 }> = ArrayVec::new();
        candidates.push((0, 0));
        if let Some(kicks) = shape.kicks(self.rotation, spin) {
            candidates.extend(kicks);
        }

        let accepted = candidates.into_iter().find(|&(dx, dy)| {
            fits(self.x + dx, self.y + dy, new_state, grid)
        });
        let Some((dx, dy)) = accepted else {
            return false;
        };

        self.rotation = new_rotation;
        self.x += dx;
        self.y += dy;
        self.touching_bottom = self.touches_ground(grid);
        self.last_movement = LastMovement::Rotate;
        self.refresh_ghost(grid);
        true
    }

    /// Move down one row, or to the landing row when `hard_drop` is set.
    ///
    /// Never locks: on landing it only sets `is_touching_bottom`. Returns the
    /// number of rows descended.
    pub fn fall(&mut self, hard_drop: bool, grid: &Grid) -> u8 {
        let mut rows = 0u8;
        loop {
            if self.touches_ground(grid) {
                self.touching_bottom = true;
                break;
            }
            self.y += 1;
            rows = rows.saturating_add(1);
            self.last_movement = LastMovement::Fall;
            self.touching_bottom = self.touches_ground(grid);
            if !hard_drop {
                break;
            }
        }
        rows
    }

    /// Re-derive the spawn position for the current matrix (hold swap)
    pub fn reset_position(&mut self, grid: &Grid) {
        let (x, y) = spawn_position(grid.size(), self.state());
        self.x = x;
        self.y = y;
        self.touching_bottom = false;
        self.last_movement = LastMovement::None;
        self.refresh_ghost(grid);
    }

    /// Recompute `is_touching_bottom` against `grid` without moving
    pub fn refresh_contact(&mut self, grid: &Grid) {
        self.touching_bottom = self.touches_ground(grid);
    }

    /// Begin projecting the landing row
    pub fn start_ghost(&mut self, grid: &Grid) {
        self.ghost_y = Some(self.landing_y(grid));
    }

    pub fn stop_ghost(&mut self) {
        self.ghost_y = None;
    }

    fn refresh_ghost(&mut self, grid: &Grid) {
        if self.ghost_y.is_some() {
            self.start_ghost(grid);
        }
    }

    /// Whether one more row down would reach past the floor or hit a block
    pub fn touches_ground(&self, grid: &Grid) -> bool {
        self.y + self.bounds().bottom >= grid.height() as i8 - 1
            || grid.overlaps(self.x, self.y + 1, self.matrix())
    }

    /// Lowest legal top row from the current position, against committed
    /// cells only
    pub fn landing_y(&self, grid: &Grid) -> i8 {
        let floor = grid.height() as i8 - 1;
        let bottom = self.bounds().bottom;
        let matrix = self.matrix();
        let mut y = self.y;
        while y + bottom < floor && !grid.overlaps(self.x, y + 1, matrix) {
            y += 1;
        }
        y
    }
}

/// Spawn column and row for a state: centred horizontally (rounding right),
/// with the lowest occupied row just above row 0.
pub fn spawn_position(size: GridSize, state: &ShapeState) -> (i8, i8) {
    let matrix_size = state.matrix.size() as i16;
    let x = (size.width() as i16 - matrix_size + 1).div_euclid(2);
    let y = -(state.bounds.bottom as i16 + 1);
    (x as i8, y as i8)
}

fn fits(x: i8, y: i8, state: &ShapeState, grid: &Grid) -> bool {
    let bounds = state.bounds;
    x + bounds.left >= 0
        && x + bounds.right < grid.width() as i8
        && y + bounds.bottom < grid.height() as i8
        && !grid.overlaps(x, y, &state.matrix)
}

fn normalize(kind: PieceKind, rotation: Rotation) -> Rotation {
    if shapes::shape(kind).rotates() {
        rotation
    } else {
        Rotation::North
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(GridSize::default())
    }

    #[test]
    fn spawn_is_centred_and_above_the_field() {
        let i = Piece::new(GridSize::default(), PieceKind::I);
        assert_eq!((i.x(), i.y()), (3, -2));

        let t = Piece::new(GridSize::default(), PieceKind::T);
        assert_eq!((t.x(), t.y()), (4, -2));

        let o = Piece::new(GridSize::default(), PieceKind::O);
        assert_eq!((o.x(), o.y()), (4, -2));
        assert!(o.cells().all(|(_, y)| y < 0));
    }

    #[test]
    fn move_stops_at_the_wall() {
        let grid = grid();
        let mut piece = Piece::placed(PieceKind::O, Rotation::North, 0, 5);
        let before = piece;
        assert!(!piece.try_move(Shift::Left, &grid));
        assert_eq!(piece, before);

        assert!(piece.try_move(Shift::Right, &grid));
        assert_eq!(piece.x(), 1);
        assert_eq!(piece.last_movement(), LastMovement::Move);
    }

    #[test]
    fn single_fall_advances_one_row() {
        let grid = grid();
        let mut piece = Piece::new(grid.size(), PieceKind::T);
        let y = piece.y();
        assert_eq!(piece.fall(false, &grid), 1);
        assert_eq!(piece.y(), y + 1);
        assert_eq!(piece.last_movement(), LastMovement::Fall);
        assert!(!piece.is_touching_bottom());
    }

    #[test]
    fn hard_drop_lands_on_the_floor() {
        let grid = grid();
        let mut piece = Piece::new(grid.size(), PieceKind::O);
        piece.fall(true, &grid);
        assert!(piece.is_touching_bottom());
        assert_eq!(piece.y() + piece.bounds().bottom, 19);
        // Landed pieces do not move further.
        assert_eq!(piece.fall(true, &grid), 0);
    }

    #[test]
    fn rotation_against_the_wall_kicks() {
        let grid = grid();
        // Vertical I hugging the left wall: the naive rotation pokes out.
        let mut piece = Piece::placed(PieceKind::I, Rotation::West, -1, 5);
        assert!(piece.try_rotate(Spin::CounterClockwise, &grid));
        assert_eq!(piece.rotation(), Rotation::South);
        assert!(piece.cells().all(|(x, _)| x >= 0));
        assert_eq!(piece.last_movement(), LastMovement::Rotate);
    }

    #[test]
    fn o_never_rotates() {
        let grid = grid();
        let mut piece = Piece::new(grid.size(), PieceKind::O);
        let before = piece;
        assert!(!piece.try_rotate(Spin::Clockwise, &grid));
        assert_eq!(piece, before);
    }

    #[test]
    fn ghost_follows_moves() {
        let mut grid = grid();
        grid.set(0, 19, Some(PieceKind::Z));
        let mut piece = Piece::placed(PieceKind::O, Rotation::North, 1, 0);
        piece.start_ghost(&grid);
        assert_eq!(piece.ghost_y(), Some(18));

        assert!(piece.try_move(Shift::Left, &grid));
        assert_eq!(piece.ghost_y(), Some(17));

        piece.stop_ghost();
        assert!(piece.try_move(Shift::Right, &grid));
        assert_eq!(piece.ghost_y(), None);
    }

    #[test]
    fn reset_position_keeps_rotation() {
        let grid = grid();
        let mut piece = Piece::placed(PieceKind::T, Rotation::East, 0, 10);
        piece.reset_position(&grid);
        assert_eq!(piece.rotation(), Rotation::East);
        assert_eq!(piece.x(), 4);
        assert_eq!(piece.y() + piece.bounds().bottom, -1);
        assert_eq!(piece.last_movement(), LastMovement::None);
    }
}
