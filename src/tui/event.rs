use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                return Ok(AppEvent::Key(key));
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    MoveUp,
    MoveDown,
    /// Open a story in the list, toggle collapse in the detail view.
    Select,
    ToggleBookmark,
    ToggleRead,
    OpenInBrowser,
    CycleSort,
    NextPage,
    Refresh,
    CycleAutoRefresh,
    RetryComment,
    /// Look up the author of the selected story or comment.
    AuthorInfo,
    /// Jump to feed category by index (keys 1-7).
    Category(usize),
    None,
}

impl From<KeyEvent> for Action {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Esc | KeyCode::Backspace => Action::Back,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
            KeyCode::Char('b') => Action::ToggleBookmark,
            KeyCode::Char('r') => Action::ToggleRead,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('s') => Action::CycleSort,
            KeyCode::Char('n') | KeyCode::PageDown => Action::NextPage,
            KeyCode::Char('R') => Action::Refresh,
            KeyCode::Char('a') => Action::CycleAutoRefresh,
            KeyCode::Char('x') => Action::RetryComment,
            KeyCode::Char('u') => Action::AuthorInfo,
            KeyCode::Char(c @ '1'..='7') => Action::Category(c as usize - '1' as usize),
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_category_keys_map_to_indices() {
        assert_eq!(Action::from(key(KeyCode::Char('1'))), Action::Category(0));
        assert_eq!(Action::from(key(KeyCode::Char('7'))), Action::Category(6));
        assert_eq!(Action::from(key(KeyCode::Char('8'))), Action::None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Action::from(key), Action::Quit);
    }
}
