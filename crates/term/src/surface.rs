//! Render surface backed by the terminal.

use anyhow::Result;
use blockfall_engine::{Frame, RenderSurface};

use crate::fb::FrameBuffer;
use crate::renderer::TerminalRenderer;
use crate::view::{GameView, Viewport};

const FALLBACK_VIEWPORT: (u16, u16) = (80, 24);

/// Draws every presented frame to stdout
pub struct TerminalSurface {
    view: GameView,
    renderer: TerminalRenderer,
    fb: FrameBuffer,
}

impl TerminalSurface {
    pub fn new(view: GameView) -> Self {
        Self {
            view,
            renderer: TerminalRenderer::new(),
            fb: FrameBuffer::new(0, 0),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        self.renderer.enter()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.renderer.exit()
    }

    /// Redraw everything on the next frame (after a resize)
    pub fn invalidate(&mut self) {
        self.renderer.invalidate();
    }
}

impl RenderSurface for TerminalSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        let (w, h) = crossterm::terminal::size().unwrap_or(FALLBACK_VIEWPORT);
        self.view
            .render_into(frame, Viewport::new(w, h), &mut self.fb);
        self.renderer.draw(&self.fb)
    }
}
