//! Piece tests - spawn, movement, rotation and kicks against a grid

use blockfall::core::{Grid, Piece};
use blockfall::types::{
    GridSize, InvalidGridSize, LastMovement, PieceKind, Rotation, Shift, Spin, MAX_GRID_EDGE,
};

fn grid() -> Grid {
    Grid::new(GridSize::default())
}

fn in_field(piece: &Piece, grid: &Grid) -> bool {
    piece
        .cells()
        .all(|(x, y)| x >= 0 && x < grid.width() as i8 && y < grid.height() as i8)
}

#[test]
fn test_every_kind_spawns_above_the_field() {
    let grid = grid();
    for kind in PieceKind::ALL {
        let piece = Piece::new(grid.size(), kind);
        assert_eq!(piece.rotation(), Rotation::North);
        assert!(piece.cells().all(|(_, y)| y < 0), "{kind:?}");
        assert!(in_field(&piece, &grid), "{kind:?}");
        assert!(!piece.is_touching_bottom());
        assert_eq!(piece.last_movement(), LastMovement::None);
    }
}

#[test]
fn test_spawn_on_odd_width_rounds_right() {
    let size = GridSize::new(7, 12).unwrap();
    let t = Piece::new(size, PieceKind::T);
    // (7 - 3 + 1) / 2
    assert_eq!(t.x(), 2);
    let i = Piece::new(size, PieceKind::I);
    assert_eq!(i.x(), 2);
}

#[test]
fn test_walk_to_each_wall() {
    let grid = grid();
    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 4, 5);

    let mut steps = 0;
    while piece.try_move(Shift::Left, &grid) {
        steps += 1;
    }
    assert_eq!(steps, 4);
    assert_eq!(piece.x() + piece.bounds().left, 0);

    while piece.try_move(Shift::Right, &grid) {}
    assert_eq!(piece.x() + piece.bounds().right, 9);
}

#[test]
fn test_move_blocked_by_committed_cells() {
    let mut grid = grid();
    grid.set(6, 11, Some(PieceKind::Z));
    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 3, 10);
    let before = piece;

    assert!(!piece.try_move(Shift::Right, &grid));
    assert_eq!(piece, before);
}

#[test]
fn test_rotation_in_open_space_uses_no_offset() {
    let grid = grid();
    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 4, 10);

    for expected in [Rotation::East, Rotation::South, Rotation::West, Rotation::North] {
        assert!(piece.try_rotate(Spin::Clockwise, &grid));
        assert_eq!(piece.rotation(), expected);
        assert_eq!((piece.x(), piece.y()), (4, 10));
    }
}

#[test]
fn test_rotation_takes_first_fitting_kick() {
    let mut grid = grid();
    // Blocks the in-place East state only.
    grid.set(5, 12, Some(PieceKind::Z));
    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 4, 10);

    assert!(piece.try_rotate(Spin::Clockwise, &grid));
    assert_eq!(piece.rotation(), Rotation::East);
    assert_eq!((piece.x(), piece.y()), (3, 10));
    assert_eq!(piece.last_movement(), LastMovement::Rotate);
}

#[test]
fn test_counter_clockwise_mirrors_clockwise_kicks() {
    let mut grid = grid();
    // Blocks the in-place West state; the first North -> West kick is (+1, 0).
    grid.set(5, 12, Some(PieceKind::Z));
    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 4, 10);

    assert!(piece.try_rotate(Spin::CounterClockwise, &grid));
    assert_eq!(piece.rotation(), Rotation::West);
    assert_eq!((piece.x(), piece.y()), (5, 10));
}

#[test]
fn test_rotation_fails_when_nothing_fits() {
    let mut grid = grid();
    let piece_cells = [(5, 10), (4, 11), (5, 11), (6, 11)];
    for y in 0..20 {
        for x in 0..10 {
            if !piece_cells.contains(&(x, y)) {
                grid.set(x, y, Some(PieceKind::Z));
            }
        }
    }

    let mut piece = Piece::placed(PieceKind::T, Rotation::North, 4, 10);
    let before = piece;
    assert!(!piece.try_rotate(Spin::Clockwise, &grid));
    assert!(!piece.try_rotate(Spin::CounterClockwise, &grid));
    assert_eq!(piece, before);
}

#[test]
fn test_i_kicks_off_the_right_wall() {
    let grid = grid();
    // Vertical I in the last column; North would stick out on the right.
    let mut piece = Piece::placed(PieceKind::I, Rotation::East, 7, 5);
    assert!(in_field(&piece, &grid));

    assert!(piece.try_rotate(Spin::CounterClockwise, &grid));
    assert_eq!(piece.rotation(), Rotation::North);
    assert!(in_field(&piece, &grid));
}

#[test]
fn test_hard_drop_stops_on_stack() {
    let mut grid = grid();
    grid.set(0, 10, Some(PieceKind::Z));
    let mut piece = Piece::placed(PieceKind::O, Rotation::North, 0, 0);

    assert_eq!(piece.landing_y(&grid), 8);
    assert_eq!(piece.fall(true, &grid), 8);
    assert_eq!(piece.y(), 8);
    assert!(piece.is_touching_bottom());
    assert!(piece.touches_ground(&grid));
}

#[test]
fn test_lateral_move_off_a_ledge_clears_contact() {
    let mut grid = grid();
    grid.set(0, 10, Some(PieceKind::Z));
    let mut piece = Piece::placed(PieceKind::O, Rotation::North, 0, 8);
    piece.refresh_contact(&grid);
    assert!(piece.is_touching_bottom());

    assert!(piece.try_move(Shift::Right, &grid));
    assert!(!piece.is_touching_bottom());
}

#[test]
fn test_ghost_cells_mirror_piece_at_landing_row() {
    let grid = grid();
    let mut piece = Piece::placed(PieceKind::L, Rotation::North, 2, 3);
    assert!(piece.ghost_cells().is_none());

    piece.start_ghost(&grid);
    let ghost_y = piece.ghost_y().unwrap();
    assert_eq!(ghost_y, 18);

    let ghost: Vec<_> = piece.ghost_cells().unwrap().collect();
    let cells: Vec<_> = piece.cells().map(|(x, y)| (x, y - 3 + ghost_y)).collect();
    assert_eq!(ghost, cells);
}

#[test]
fn test_tallest_field_drops_to_the_floor() {
    let size = GridSize::new(10, MAX_GRID_EDGE).unwrap();
    let grid = Grid::new(size);
    let mut o = Piece::new(size, PieceKind::O);

    assert_eq!(o.fall(true, &grid), 64);
    assert_eq!(o.y(), 62);
    assert!(o.is_touching_bottom());
}

#[test]
fn test_field_edges_outside_range_are_rejected() {
    assert_eq!(
        GridSize::new(10, 200),
        Err(InvalidGridSize { axis: "height", value: 200 })
    );
    assert_eq!(
        GridSize::new(0, 20),
        Err(InvalidGridSize { axis: "width", value: 0 })
    );
}
