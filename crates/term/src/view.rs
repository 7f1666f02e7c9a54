//! GameView: maps an engine [`Frame`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use blockfall_core::shapes;
use blockfall_engine::{Frame, GameStatus};
use blockfall_types::{PieceKind, Rotation};

use crate::fb::{FrameBuffer, Rgb, Style};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const FIELD_BG: Rgb = Rgb::new(30, 30, 40);
const BLOCK: char = '█';

/// Lays out the field, the side panel and overlays.
#[derive(Debug, Clone, Copy)]
pub struct GameView {
    /// Field cell width in terminal columns
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // Two columns per cell roughly squares the usual glyph aspect ratio.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, frame: &Frame<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(frame, viewport, &mut fb);
        fb
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, frame: &Frame<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Default::default());

        let cols = frame.grid.width() as u16;
        let rows = frame.grid.height() as u16;
        let frame_w = cols * self.cell_w + 2;
        let frame_h = rows + 2;
        let origin_x = viewport.width.saturating_sub(frame_w) / 2;
        let origin_y = viewport.height.saturating_sub(frame_h) / 2;
        let field = Field {
            x: origin_x + 1,
            y: origin_y + 1,
            cols,
            rows,
            cell_w: self.cell_w,
        };

        draw_border(fb, origin_x, origin_y, frame_w, frame_h);

        let empty = Style::new(Rgb::new(90, 90, 100), FIELD_BG).dim();
        let wipe = Style::new(Rgb::new(255, 255, 255), FIELD_BG).bold();
        let clearing = frame.clearing_rows.unwrap_or(&[]);
        for (y, row) in frame.grid.rows().enumerate() {
            let is_clearing = clearing.contains(&(y as u8));
            for (x, cell) in row.iter().enumerate() {
                match cell {
                    Some(kind) => field.fill(fb, x as i8, y as i8, BLOCK, piece_style(*kind)),
                    None if is_clearing => field.fill(fb, x as i8, y as i8, '░', wipe),
                    None => field.fill(fb, x as i8, y as i8, '·', empty),
                }
            }
        }

        if let Some(active) = frame.active {
            if let Some(ghost_y) = frame.ghost_y {
                let ghost = Style::new(Rgb::new(140, 140, 140), FIELD_BG).dim();
                for (dx, dy) in active.matrix().cells() {
                    field.fill(fb, active.x() + dx, ghost_y + dy, '░', ghost);
                }
            }
            for (x, y) in active.cells() {
                field.fill(fb, x, y, BLOCK, piece_style(active.kind()).bold());
            }
        }

        let panel_x = origin_x.saturating_add(frame_w).saturating_add(2);
        draw_panel(fb, frame, viewport, panel_x, origin_y);

        let overlay = match frame.status {
            GameStatus::Paused => Some("PAUSED"),
            GameStatus::GameOver => Some("GAME OVER"),
            GameStatus::NotStarted => Some("PRESS R"),
            GameStatus::Playing | GameStatus::LineClearing => None,
        };
        if let Some(text) = overlay {
            let text_w = text.chars().count() as u16;
            let x = origin_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
            let style = Style::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            fb.put_str(x, origin_y.saturating_add(frame_h / 2), text, style);
        }
    }
}

/// Placement of the playfield inside the framebuffer
struct Field {
    x: u16,
    y: u16,
    cols: u16,
    rows: u16,
    cell_w: u16,
}

impl Field {
    /// Fill one grid cell; cells outside the visible field are skipped
    fn fill(&self, fb: &mut FrameBuffer, x: i8, y: i8, ch: char, style: Style) {
        if x < 0 || y < 0 || x as u16 >= self.cols || y as u16 >= self.rows {
            return;
        }
        let px = self.x + x as u16 * self.cell_w;
        let py = self.y + y as u16;
        fb.fill_rect(px, py, self.cell_w, 1, ch, style);
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let style = Style::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_panel(fb: &mut FrameBuffer, frame: &Frame<'_>, viewport: Viewport, x: u16, top: u16) {
    if x.saturating_add(10) > viewport.width {
        return;
    }
    let label = Style::default().bold();
    let value = Style::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

    let mut y = top;
    for (name, number) in [
        ("SCORE", frame.score),
        ("LEVEL", frame.level),
        ("LINES", frame.lines),
    ] {
        fb.put_str(x, y, name, label);
        fb.put_u32(x, y + 1, number, value);
        y += 3;
    }

    fb.put_str(x, y, "NEXT", label);
    draw_preview(fb, x, y + 1, Some(frame.next));
    y += 4;

    fb.put_str(x, y, "HOLD", label);
    draw_preview(fb, x, y + 1, frame.hold);
}

/// Draw a kind in its spawn orientation, two rows tall
fn draw_preview(fb: &mut FrameBuffer, x: u16, y: u16, kind: Option<PieceKind>) {
    let Some(kind) = kind else {
        fb.put_str(x, y, "-", Style::default().dim());
        return;
    };
    let state = shapes::state(kind, Rotation::North);
    let top = state.bounds.top;
    for (dx, dy) in state.matrix.cells() {
        let px = x + (dx - state.bounds.left) as u16 * 2;
        let py = y + (dy - top) as u16;
        fb.fill_rect(px, py, 2, 1, BLOCK, piece_style(kind));
    }
}

fn piece_style(kind: PieceKind) -> Style {
    let fg = match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    };
    Style::new(fg, FIELD_BG)
}
