//! The control that opens the chat surface.

use ratatui::layout::{Position, Rect};

use crate::state::UiStateStore;

/// A trigger owns a handle to the store it was constructed with and, once
/// rendered, the screen region that acts as its click target. Activation
/// does exactly one thing: ask the store to open the chat surface.
pub struct ChatTrigger {
    store: UiStateStore,
    area: Option<Rect>,
}

impl ChatTrigger {
    pub fn new(store: UiStateStore) -> Self {
        Self { store, area: None }
    }

    pub fn activate(&self) {
        self.store.set_chat_open(true);
    }

    /// Record where the trigger was drawn. Called during render, consulted
    /// by mouse hit-testing.
    pub fn set_area(&mut self, area: Rect) {
        self.area = Some(area);
    }

    pub fn hit(&self, column: u16, row: u16) -> bool {
        self.area
            .map_or(false, |a| a.contains(Position::new(column, row)))
    }
}
