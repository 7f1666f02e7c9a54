//! Shape library - rotation matrices and wall kick tables
//!
//! Every piece kind owns an ordered list of square occupancy matrices (one per
//! rotation state, clockwise from the spawn state) and, except for O, a kick
//! table. Bounding boxes are derived at compile time and stored next to each
//! matrix, so nothing is recomputed per frame.
//!
//! Coordinates are y-down: a positive `dy` moves toward the floor.
//!
//! # Kick tables
//!
//! Entry `s` lists the candidate offsets for the clockwise transition
//! `s -> s+1`, without the implicit `(0, 0)` first attempt. A
//! counter-clockwise rotation `s -> s-1` walks between the same two states in
//! the other direction, so it uses entry `s-1` with every offset negated.

use crate::types::{PieceKind, Rotation, Spin};

/// Largest matrix edge (the I piece)
pub const MAX_MATRIX_SIZE: usize = 4;

/// Number of kick candidates after the `(0, 0)` attempt
pub const KICKS_PER_TRANSITION: usize = 4;

/// A kick offset `(dx, dy)`
pub type Kick = (i8, i8);

/// Kick offsets for the four clockwise transitions
pub type KickTable = [[Kick; KICKS_PER_TRANSITION]; 4];

/// Square boolean occupancy grid of side `size` (stored in a 4x4 block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix {
    size: u8,
    rows: [[u8; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE],
}

impl Matrix {
    pub const fn new(size: u8, rows: [[u8; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE]) -> Self {
        Self { size, rows }
    }

    /// Edge length of the matrix
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether the cell at column `x`, row `y` is occupied
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size as usize && y < self.size as usize && self.rows[y][x] != 0
    }

    /// Occupied cells as `(column, row)` offsets, row-major
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let size = self.size as usize;
        (0..size).flat_map(move |y| {
            (0..size)
                .filter(move |&x| self.rows[y][x] != 0)
                .map(move |x| (x as i8, y as i8))
        })
    }
}

/// Inclusive extents of the occupied cells of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub left: i8,
    pub right: i8,
    pub top: i8,
    pub bottom: i8,
}

/// First and last occupied column and row of `matrix`.
///
/// An empty matrix is a programming error; in a const context it fails the
/// build.
pub const fn bounding_box(matrix: &Matrix) -> BoundingBox {
    let size = matrix.size as usize;
    let mut left = size;
    let mut right = 0;
    let mut top = size;
    let mut bottom = 0;
    let mut filled = false;

    let mut y = 0;
    while y < size {
        let mut x = 0;
        while x < size {
            if matrix.rows[y][x] != 0 {
                filled = true;
                if x < left {
                    left = x;
                }
                if x > right {
                    right = x;
                }
                if y < top {
                    top = y;
                }
                if y > bottom {
                    bottom = y;
                }
            }
            x += 1;
        }
        y += 1;
    }

    if !filled {
        panic!("shape matrix has no occupied cells");
    }

    BoundingBox {
        left: left as i8,
        right: right as i8,
        top: top as i8,
        bottom: bottom as i8,
    }
}

/// One rotation state: its matrix and precomputed bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeState {
    pub matrix: Matrix,
    pub bounds: BoundingBox,
}

impl ShapeState {
    const fn new(matrix: Matrix) -> Self {
        Self {
            bounds: bounding_box(&matrix),
            matrix,
        }
    }
}

/// All static data for one piece kind
#[derive(Debug)]
pub struct Shape {
    pub kind: PieceKind,
    states: &'static [ShapeState],
    kicks: Option<&'static KickTable>,
}

impl Shape {
    /// Number of rotation states (1 for O, 4 otherwise)
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// State for a rotation, wrapping when the kind has fewer states
    pub fn state(&self, rotation: Rotation) -> &'static ShapeState {
        &self.states[rotation.index() % self.states.len()]
    }

    /// Whether the kind has more than one rotation state
    pub fn rotates(&self) -> bool {
        self.states.len() > 1
    }

    /// Kick candidates for rotating away from `from` in direction `spin`,
    /// already scaled by the direction. `None` for kinds without a table.
    pub fn kicks(&self, from: Rotation, spin: Spin) -> Option<[Kick; KICKS_PER_TRANSITION]> {
        let table = self.kicks?;
        let transition = match spin {
            Spin::Clockwise => from.index(),
            Spin::CounterClockwise => (from.index() + 3) % 4,
        };
        let sign = spin.sign();
        let mut scaled = table[transition];
        for kick in scaled.iter_mut() {
            *kick = (kick.0 * sign, kick.1 * sign);
        }
        Some(scaled)
    }
}

/// Static shape data for a piece kind
pub fn shape(kind: PieceKind) -> &'static Shape {
    &SHAPES[kind.index()]
}

/// Matrix and bounds for a kind in a rotation state
pub fn state(kind: PieceKind, rotation: Rotation) -> &'static ShapeState {
    shape(kind).state(rotation)
}

static SHAPES: [Shape; 7] = [
    Shape {
        kind: PieceKind::I,
        states: &I_STATES,
        kicks: Some(&I_KICKS),
    },
    Shape {
        kind: PieceKind::J,
        states: &J_STATES,
        kicks: Some(&JLSTZ_KICKS),
    },
    Shape {
        kind: PieceKind::L,
        states: &L_STATES,
        kicks: Some(&JLSTZ_KICKS),
    },
    Shape {
        kind: PieceKind::O,
        states: &O_STATES,
        kicks: None,
    },
    Shape {
        kind: PieceKind::S,
        states: &S_STATES,
        kicks: Some(&JLSTZ_KICKS),
    },
    Shape {
        kind: PieceKind::T,
        states: &T_STATES,
        kicks: Some(&JLSTZ_KICKS),
    },
    Shape {
        kind: PieceKind::Z,
        states: &Z_STATES,
        kicks: Some(&JLSTZ_KICKS),
    },
];

const fn m3(rows: [[u8; 3]; 3]) -> ShapeState {
    ShapeState::new(Matrix::new(
        3,
        [
            [rows[0][0], rows[0][1], rows[0][2], 0],
            [rows[1][0], rows[1][1], rows[1][2], 0],
            [rows[2][0], rows[2][1], rows[2][2], 0],
            [0, 0, 0, 0],
        ],
    ))
}

const fn m4(rows: [[u8; 4]; 4]) -> ShapeState {
    ShapeState::new(Matrix::new(4, rows))
}

static I_STATES: [ShapeState; 4] = [
    m4([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
    m4([[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]]),
    m4([[0, 0, 0, 0], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]]),
    m4([[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]]),
];

static J_STATES: [ShapeState; 4] = [
    m3([[1, 0, 0], [1, 1, 1], [0, 0, 0]]),
    m3([[0, 1, 1], [0, 1, 0], [0, 1, 0]]),
    m3([[0, 0, 0], [1, 1, 1], [0, 0, 1]]),
    m3([[0, 1, 0], [0, 1, 0], [1, 1, 0]]),
];

static L_STATES: [ShapeState; 4] = [
    m3([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),
    m3([[0, 1, 0], [0, 1, 0], [0, 1, 1]]),
    m3([[0, 0, 0], [1, 1, 1], [1, 0, 0]]),
    m3([[1, 1, 0], [0, 1, 0], [0, 1, 0]]),
];

static O_STATES: [ShapeState; 1] = [ShapeState::new(Matrix::new(
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
))];

static S_STATES: [ShapeState; 4] = [
    m3([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),
    m3([[0, 1, 0], [0, 1, 1], [0, 0, 1]]),
    m3([[0, 0, 0], [0, 1, 1], [1, 1, 0]]),
    m3([[1, 0, 0], [1, 1, 0], [0, 1, 0]]),
];

static T_STATES: [ShapeState; 4] = [
    m3([[0, 1, 0], [1, 1, 1], [0, 0, 0]]),
    m3([[0, 1, 0], [0, 1, 1], [0, 1, 0]]),
    m3([[0, 0, 0], [1, 1, 1], [0, 1, 0]]),
    m3([[0, 1, 0], [1, 1, 0], [0, 1, 0]]),
];

static Z_STATES: [ShapeState; 4] = [
    m3([[1, 1, 0], [0, 1, 1], [0, 0, 0]]),
    m3([[0, 0, 1], [0, 1, 1], [0, 1, 0]]),
    m3([[0, 0, 0], [1, 1, 0], [0, 1, 1]]),
    m3([[0, 1, 0], [1, 1, 0], [1, 0, 0]]),
];

/// J, L, S, T, Z kicks (y-down)
static JLSTZ_KICKS: KickTable = [
    // 0 -> 1
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 1 -> 2
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    // 2 -> 3
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    // 3 -> 0
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// I kicks (y-down)
static I_KICKS: KickTable = [
    // 0 -> 1
    [(-2, 0), (1, 0), (-2, 1), (1, -2)],
    // 1 -> 2
    [(-1, 0), (2, 0), (-1, -2), (2, 1)],
    // 2 -> 3
    [(2, 0), (-1, 0), (2, -1), (-1, 2)],
    // 3 -> 0
    [(1, 0), (-2, 0), (1, 2), (-2, -1)],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_four_cells() {
        for kind in PieceKind::ALL {
            let shape = shape(kind);
            for i in 0..shape.state_count() {
                let st = shape.state(Rotation::from_index(i));
                assert_eq!(st.matrix.cells().count(), 4, "{kind:?} state {i}");
            }
        }
    }

    #[test]
    fn bounding_box_of_vertical_i() {
        let st = state(PieceKind::I, Rotation::East);
        assert_eq!(
            st.bounds,
            BoundingBox {
                left: 2,
                right: 2,
                top: 0,
                bottom: 3
            }
        );
    }

    #[test]
    fn bounding_box_of_t_spawn() {
        let st = state(PieceKind::T, Rotation::North);
        assert_eq!(
            st.bounds,
            BoundingBox {
                left: 0,
                right: 2,
                top: 0,
                bottom: 1
            }
        );
    }

    #[test]
    fn o_has_a_single_state_and_no_kicks() {
        let o = shape(PieceKind::O);
        assert_eq!(o.state_count(), 1);
        assert!(!o.rotates());
        assert!(o.kicks(Rotation::North, Spin::Clockwise).is_none());
        assert_eq!(o.state(Rotation::South), o.state(Rotation::North));
    }

    #[test]
    fn counter_clockwise_kicks_negate_the_shared_transition() {
        let t = shape(PieceKind::T);
        // 1 -> 0 walks the 0 -> 1 transition backwards.
        let cw = t.kicks(Rotation::North, Spin::Clockwise).unwrap();
        let ccw = t.kicks(Rotation::East, Spin::CounterClockwise).unwrap();
        for (a, b) in cw.iter().zip(ccw.iter()) {
            assert_eq!((a.0, a.1), (-b.0, -b.1));
        }
    }

    #[test]
    fn t_corners_are_never_part_of_the_piece() {
        for i in 0..4 {
            let st = state(PieceKind::T, Rotation::from_index(i));
            for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
                assert!(!st.matrix.is_filled(x, y));
            }
        }
    }
}
