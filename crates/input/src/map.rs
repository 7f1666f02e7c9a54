//! Key mapping from terminal events to game actions.

use blockfall_engine::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a key to the action it drives, if any.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::SoftDrop),

        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(Action::RotateLeft)
        }
        KeyCode::Up
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('x')
        | KeyCode::Char('X')
        | KeyCode::Char('e')
        | KeyCode::Char('E') => Some(Action::RotateRight),

        KeyCode::Char(' ') => Some(Action::HardDrop),
        KeyCode::Char('c') | KeyCode::Char('C')
            if !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::Hold)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),

        _ => None,
    }
}

/// Esc or Ctrl-C leave the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key.modifiers.contains(KeyModifiers::CONTROL))
}
