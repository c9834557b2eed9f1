//! Keyboard input.
//!
//! Maps terminal key events to player commands. Only presses count;
//! repeats and releases are ignored so holding a key does not fire a burst
//! of guesses.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::rules::Direction;

/// What the player asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Stop,
    Draw,
    Guess(Direction),
    Quit,
}

impl Command {
    /// Command for a terminal event, if any.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) => Self::from_key(key),
            _ => None,
        }
    }

    /// Command for a key event, if any.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::Up => Some(Command::Guess(Direction::Higher)),
            KeyCode::Down => Some(Command::Guess(Direction::Lower)),
            KeyCode::Enter => Some(Command::Start),
            KeyCode::Esc => Some(Command::Stop),
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// Command for a plain character key.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'w' | 'W' => Some(Command::Guess(Direction::Higher)),
            's' | 'S' => Some(Command::Guess(Direction::Lower)),
            'n' | 'N' => Some(Command::Start),
            'd' | 'D' => Some(Command::Draw),
            'x' | 'X' => Some(Command::Stop),
            'q' | 'Q' => Some(Command::Quit),
            _ => None,
        }
    }

    /// True for commands that only make sense during a running session.
    #[must_use]
    pub fn needs_session(self) -> bool {
        matches!(self, Command::Guess(_) | Command::Draw)
    }
}
