//! Crossterm-backed input source.

use std::io;
use std::time::Duration;

use blockfall_engine::{InputFrame, InputSource};
use crossterm::event::{self, Event, KeyEventKind};

use crate::held::HeldKeys;
use crate::map::should_quit;

/// Drains pending terminal events on every poll
#[derive(Debug, Default)]
pub struct TerminalInput {
    keys: HeldKeys,
    quit: bool,
    error: Option<io::Error>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Esc or Ctrl-C was pressed, or the terminal stopped delivering events
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// The read error that ended input, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn drain(&mut self, now_ms: u64) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Release && should_quit(key) {
                        self.quit = true;
                        continue;
                    }
                    self.keys.handle(key, now_ms);
                }
                Event::FocusLost => self.keys.clear(),
                _ => {}
            }
        }
        Ok(())
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, now_ms: u64) -> InputFrame {
        if let Err(err) = self.drain(now_ms) {
            self.error = Some(err);
            self.quit = true;
        }
        self.keys.frame(now_ms)
    }
}
