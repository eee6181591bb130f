//! Key bindings: WASD for player 1, arrows for player 2.

use crate::PlayerMode;
use crate::game::{Intent, PlayerSlot};
use crate::player::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play(PlayerSlot, Intent),
    Confirm,
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to action. With one player both key sets steer player 1.
pub fn key_to_action(key: KeyEvent, mode: PlayerMode) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    let arrows = match mode {
        PlayerMode::Single => PlayerSlot::One,
        PlayerMode::Versus => PlayerSlot::Two,
    };
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('a') => Action::Play(PlayerSlot::One, Intent::Move(Direction::Left)),
        KeyCode::Char('d') => Action::Play(PlayerSlot::One, Intent::Move(Direction::Right)),
        KeyCode::Char('w') => Action::Play(PlayerSlot::One, Intent::Drop),
        KeyCode::Char('s') => Action::Play(PlayerSlot::One, Intent::Rotate),
        KeyCode::Left => Action::Play(arrows, Intent::Move(Direction::Left)),
        KeyCode::Right => Action::Play(arrows, Intent::Move(Direction::Right)),
        KeyCode::Up => Action::Play(arrows, Intent::Drop),
        KeyCode::Down => Action::Play(arrows, Intent::Rotate),
        _ => Action::None,
    }
}
