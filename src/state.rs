//! Shared, observable UI state.
//!
//! The store is constructed once at startup and handed (cloned) to every
//! component that reads or mutates shared state — there is no module-level
//! singleton. Mutation goes through the declared setters only; each setter
//! touches its own field, and observers obtained through [`UiStateStore::subscribe`]
//! see a consistent snapshot after every change.

use std::sync::Arc;
use tokio::sync::watch;

use crate::assist::Suggestion;

/// The shared UI state record. All fields default to their "nothing going
/// on" values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Whether the chat surface is open.
    pub chat_open: bool,
    /// A message queued to appear in the chat input when it next opens.
    pub prefilled_message: Option<String>,
    /// A pending AI recommendation. Opaque to the store.
    pub suggestion: Option<Suggestion>,
}

/// Cloneable handle to the shared state.
///
/// Backed by a watch channel: `send_modify` mutates the record under the
/// channel's single internal lock, so updates to different fields never
/// clobber each other and every receiver is woken once per logical change.
/// Setters notify even when the written value equals the old one; the
/// `clear_*` operations skip notification when the field is already absent.
#[derive(Clone)]
pub struct UiStateStore {
    tx: Arc<watch::Sender<UiState>>,
}

impl UiStateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UiState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> UiState {
        self.tx.borrow().clone()
    }

    /// Register an observer. The receiver yields a consistent snapshot of
    /// the whole record after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }

    pub fn set_chat_open(&self, open: bool) {
        self.tx.send_modify(|s| s.chat_open = open);
    }

    pub fn set_prefilled_message(&self, message: String) {
        self.tx.send_modify(|s| s.prefilled_message = Some(message));
    }

    pub fn clear_prefilled_message(&self) {
        self.tx
            .send_if_modified(|s| s.prefilled_message.take().is_some());
    }

    /// Remove and return the prefilled message, if any.
    pub fn take_prefilled_message(&self) -> Option<String> {
        let mut taken = None;
        self.tx.send_if_modified(|s| {
            taken = s.prefilled_message.take();
            taken.is_some()
        });
        taken
    }

    pub fn set_suggestion(&self, suggestion: Suggestion) {
        self.tx.send_modify(|s| s.suggestion = Some(suggestion));
    }

    pub fn clear_suggestion(&self) {
        self.tx.send_if_modified(|s| s.suggestion.take().is_some());
    }

    /// Remove and return the pending suggestion, if any.
    pub fn take_suggestion(&self) -> Option<Suggestion> {
        let mut taken = None;
        self.tx.send_if_modified(|s| {
            taken = s.suggestion.take();
            taken.is_some()
        });
        taken
    }
}

impl Default for UiStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(text: &str) -> Suggestion {
        Suggestion {
            text: text.to_string(),
            model: "test-model".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let store = UiStateStore::new();
        let state = store.get();
        assert!(!state.chat_open);
        assert_eq!(state.prefilled_message, None);
        assert_eq!(state.suggestion, None);
    }

    #[test]
    fn test_chat_open_round_trip() {
        let store = UiStateStore::new();
        for b in [true, false, true] {
            store.set_chat_open(b);
            assert_eq!(store.get().chat_open, b);
        }
    }

    #[test]
    fn test_prefilled_message_set_then_clear() {
        let store = UiStateStore::new();
        store.set_prefilled_message("how do I add a tenant?".to_string());
        assert_eq!(
            store.get().prefilled_message.as_deref(),
            Some("how do I add a tenant?")
        );

        store.clear_prefilled_message();
        assert_eq!(store.get().prefilled_message, None);
    }

    #[test]
    fn test_clear_when_already_absent_is_a_noop() {
        let store = UiStateStore::new();
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.clear_prefilled_message();
        store.clear_suggestion();

        assert_eq!(store.get().prefilled_message, None);
        assert_eq!(store.get().suggestion, None);
        // No notification fired for the no-op clears.
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_field_independence() {
        let store = UiStateStore::new();
        store.set_chat_open(true);
        store.set_prefilled_message("draft".to_string());

        store.set_suggestion(suggestion("try the usage report"));
        let state = store.get();
        assert!(state.chat_open);
        assert_eq!(state.prefilled_message.as_deref(), Some("draft"));

        store.set_chat_open(false);
        store.clear_prefilled_message();
        let state = store.get();
        assert_eq!(
            state.suggestion.as_ref().map(|s| s.text.as_str()),
            Some("try the usage report")
        );
    }

    #[test]
    fn test_take_consumes_the_field() {
        let store = UiStateStore::new();
        store.set_prefilled_message("draft".to_string());
        assert_eq!(store.take_prefilled_message().as_deref(), Some("draft"));
        assert_eq!(store.take_prefilled_message(), None);

        store.set_suggestion(suggestion("s"));
        assert!(store.take_suggestion().is_some());
        assert!(store.take_suggestion().is_none());
    }

    #[tokio::test]
    async fn test_subscriber_sees_each_change() {
        let store = UiStateStore::new();
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.set_chat_open(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().chat_open);

        store.set_prefilled_message("hello".to_string());
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        // Consistent snapshot: earlier write is still visible.
        assert!(snapshot.chat_open);
        assert_eq!(snapshot.prefilled_message.as_deref(), Some("hello"));
    }
}
