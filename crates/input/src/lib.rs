//! Terminal input.
//!
//! Maps `crossterm` key events to engine [`Action`](blockfall_engine::Action)s
//! and tracks which of them are held, producing one
//! [`InputFrame`](blockfall_engine::InputFrame) per tick. Works on terminals
//! with and without key-release events.

pub mod held;
pub mod map;
pub mod terminal;

pub use held::{HeldKeys, KEY_RELEASE_TIMEOUT_MS};
pub use map::{map_key, should_quit};
pub use terminal::TerminalInput;
