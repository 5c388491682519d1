use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;

use crate::app::Result;
use crate::gesture::SwipeOutcome;

pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
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
            match event::read()? {
                // Windows also reports releases.
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(AppEvent::Key(key))
                }
                Event::Mouse(mouse) => return Ok(AppEvent::Mouse(mouse)),
                _ => {}
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Like,
    Skip,
    DeepDive,
    Back,
    ToggleView,
    ToggleSave,
    OpenInBrowser,
    Retry,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    RemoveSaved,
    Search,
    None,
}

impl Action {
    /// The swipe this key stands in for, if any.
    pub fn swipe_outcome(self) -> Option<SwipeOutcome> {
        match self {
            Action::Like => Some(SwipeOutcome::Like),
            Action::Skip => Some(SwipeOutcome::Skip),
            Action::DeepDive => Some(SwipeOutcome::DeepDive),
            _ => None,
        }
    }
}
