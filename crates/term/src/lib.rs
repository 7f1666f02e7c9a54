//! Terminal rendering.
//!
//! [`GameView`] turns an engine [`Frame`](blockfall_engine::Frame) into a
//! [`FrameBuffer`] without any I/O; [`TerminalRenderer`] flushes framebuffers
//! to the terminal with crossterm, writing only what changed.
//! [`TerminalSurface`] combines the two behind the engine's render port.

pub mod fb;
pub mod renderer;
pub mod surface;
pub mod view;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use surface::TerminalSurface;
pub use view::{GameView, Viewport};
