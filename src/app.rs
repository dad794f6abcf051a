use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::assist::{AssistClient, Suggestion};
use crate::config::Config;
use crate::plans::{self, PlanDetails, PlanId};
use crate::state::UiStateStore;
use crate::trigger::ChatTrigger;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Shared observable state and the control that opens the chat
    pub store: UiStateStore,
    pub trigger: ChatTrigger,

    // Plan under which this session runs
    pub plan_id: PlanId,
    pub plan: &'static PlanDetails,

    // Chat surface state
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub chat_messages: Vec<ChatMessage>,
    pub chat_scroll: u16,
    pub chat_height: u16, // height of the transcript area, set during render
    pub chat_width: u16,  // width of the transcript area, set during render
    pub query_loading: bool,
    pub query_task: Option<JoinHandle<anyhow::Result<String>>>,
    pub suggest_task: Option<JoinHandle<anyhow::Result<Suggestion>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Assist collaborator
    pub assist: AssistClient,
    pub selected_model: String,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config, store: UiStateStore, plan_id: PlanId) -> Self {
        let trigger = ChatTrigger::new(store.clone());

        let assist = AssistClient::new(
            config
                .assist_url
                .as_deref()
                .unwrap_or("http://localhost:11434"),
        );

        let selected_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| "gemma3:latest".to_string());

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,

            store,
            trigger,

            plan_id,
            plan: plans::lookup(plan_id),

            chat_input: String::new(),
            chat_cursor: 0,
            chat_messages: Vec::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            query_loading: false,
            query_task: None,
            suggest_task: None,

            animation_frame: 0,

            assist,
            selected_model,

            chat_area: None,
        }
    }

    /// Move a queued prefilled message into the chat input buffer. Called
    /// right after the chat surface opens.
    pub fn adopt_prefilled(&mut self) {
        if let Some(message) = self.store.take_prefilled_message() {
            self.chat_cursor = message.chars().count();
            self.chat_input = message;
        }
    }

    /// Accept the pending suggestion: queue its text as the prefilled
    /// message and open the chat surface.
    pub fn accept_suggestion(&mut self) {
        if let Some(suggestion) = self.store.take_suggestion() {
            tracing::info!(model = %suggestion.model, "suggestion accepted");
            self.store.set_prefilled_message(suggestion.text);
            self.trigger.activate();
        }
    }

    pub fn close_chat(&mut self) {
        self.store.set_chat_open(false);
        self.input_mode = InputMode::Normal;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.query_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll the transcript so the latest message (or the thinking
    /// indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.chat_messages {
            total_lines = total_lines.saturating_add(1); // role line
            for line in msg.content.lines() {
                // Character count, not byte length, for UTF-8 content
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 {
                    1
                } else {
                    ((char_count / wrap_width) + 1) as u16
                };
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }

        if self.query_loading {
            total_lines = total_lines.saturating_add(2); // role line + "Thinking..."
        }

        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible {
            self.chat_scroll = total_lines.saturating_sub(visible);
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Collect results of finished background tasks. Driven by the tick
    /// event, so a completed query lands in the transcript within one tick.
    pub async fn drain_finished_tasks(&mut self) {
        if self.query_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.query_task.take() {
                self.query_loading = false;
                let content = match task.await {
                    Ok(Ok(reply)) => reply,
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "assist query failed");
                        format!("Error: {}", err)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "assist query task panicked");
                        format!("Error: query task failed: {}", err)
                    }
                };
                self.chat_messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content,
                });
                self.scroll_chat_to_bottom();
            }
        }

        if self.suggest_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.suggest_task.take() {
                match task.await {
                    Ok(Ok(suggestion)) => self.store.set_suggestion(suggestion),
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "suggestion request failed")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "suggestion task panicked")
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UiStateStore;

    fn test_app() -> App {
        App::new(&Config::new(), UiStateStore::new(), PlanId::Free)
    }

    #[test]
    fn test_scroll_to_bottom_saturates_on_huge_transcripts() {
        let mut app = test_app();
        for _ in 0..30_000 {
            app.chat_messages.push(ChatMessage {
                role: ChatRole::User,
                content: "hola".to_string(),
            });
        }

        // Three display lines per message, far past u16::MAX in total
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX.saturating_sub(20));
    }

    #[test]
    fn test_close_chat_leaves_editing_mode() {
        let mut app = test_app();
        app.trigger.activate();
        app.input_mode = InputMode::Editing;

        app.close_chat();
        assert!(!app.store.get().chat_open);
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
