use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, ChatMessage, ChatRole, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.drain_finished_tasks().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let chat_open = app.store.get().chat_open;

    match key.code {
        KeyCode::Char('q') => {
            if chat_open {
                app.close_chat();
            } else {
                app.should_quit = true;
            }
        }
        KeyCode::Esc => {
            if chat_open {
                app.close_chat();
            }
        }

        // Open the chat surface
        KeyCode::Char('a') => {
            app.trigger.activate();
            app.adopt_prefilled();
            app.input_mode = InputMode::Editing;
        }

        // Return to the input line when the chat is already open
        KeyCode::Char('i') | KeyCode::Enter if chat_open => {
            app.input_mode = InputMode::Editing;
        }

        // Ask for a suggestion
        KeyCode::Char('s') => request_suggestion(app),

        // Accept / dismiss a pending suggestion
        KeyCode::Char('y') => {
            if app.store.get().suggestion.is_some() {
                app.accept_suggestion();
                app.adopt_prefilled();
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('x') => app.store.clear_suggestion(),

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down if chat_open => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up if chat_open => app.scroll_chat_up(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => submit_chat_input(app),
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.trigger.hit(mouse.column, mouse.row) {
                app.trigger.activate();
                app.adopt_prefilled();
                app.input_mode = InputMode::Editing;
            }
        }
        MouseEventKind::ScrollUp => {
            if over_chat(app, mouse.column, mouse.row) {
                app.scroll_chat_up();
            }
        }
        MouseEventKind::ScrollDown => {
            if over_chat(app, mouse.column, mouse.row) {
                app.scroll_chat_down();
            }
        }
        _ => {}
    }
}

fn over_chat(app: &App, column: u16, row: u16) -> bool {
    app.chat_area.is_some_and(|area| {
        column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height
    })
}

fn submit_chat_input(app: &mut App) {
    if app.chat_input.is_empty() || app.query_task.is_some() {
        return;
    }

    let user_message = app.chat_input.clone();
    app.chat_messages.push(ChatMessage {
        role: ChatRole::User,
        content: user_message,
    });

    let prompt = build_chat_prompt(&app.chat_messages, app.plan.name);

    app.chat_input.clear();
    app.chat_cursor = 0;
    app.query_loading = true;
    app.input_mode = InputMode::Normal;

    // Scroll to bottom so "Thinking..." is visible
    app.scroll_chat_to_bottom();

    let assist = app.assist.clone();
    let model = app.selected_model.clone();
    app.query_task = Some(tokio::spawn(
        async move { assist.query(&model, &prompt).await },
    ));
}

fn request_suggestion(app: &mut App) {
    if app.suggest_task.is_some() {
        return;
    }

    let context = build_suggestion_context(&app.chat_messages, app.plan.name);
    let assist = app.assist.clone();
    let model = app.selected_model.clone();
    app.suggest_task = Some(tokio::spawn(async move {
        assist.suggest(&model, &context).await
    }));
}

fn build_chat_prompt(chat_history: &[ChatMessage], plan_name: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are the in-app assistant of a modular business platform. \
         The user is on the {} plan. Answer concisely.\n\n",
        plan_name
    ));

    prompt.push_str("Conversation so far:\n");
    for msg in chat_history {
        let label = match msg.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        };
        prompt.push_str(&format!("{}: {}\n", label, msg.content));
    }
    prompt.push_str("Assistant:");

    prompt
}

fn build_suggestion_context(chat_history: &[ChatMessage], plan_name: &str) -> String {
    if chat_history.is_empty() {
        return format!(
            "The user just opened the assistant of a modular business platform \
             and is on the {} plan.",
            plan_name
        );
    }

    let mut context = String::new();
    // Only the tail of the conversation matters for a follow-up
    for msg in chat_history.iter().rev().take(6).rev() {
        let label = match msg.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        };
        context.push_str(&format!("{}: {}\n", label, msg.content));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::plans::PlanId;
    use crate::state::UiStateStore;

    fn test_app() -> App {
        App::new(&Config::new(), UiStateStore::new(), PlanId::Free)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "añc";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 1);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 5), s.len());
    }

    #[test]
    fn test_open_key_activates_trigger_and_enters_editing() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert!(app.store.get().chat_open);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_prefilled_message_lands_in_input_on_open() {
        let mut app = test_app();
        app.store
            .set_prefilled_message("how many users do I have left?".to_string());

        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();

        assert_eq!(app.chat_input, "how many users do I have left?");
        assert_eq!(app.chat_cursor, app.chat_input.chars().count());
        // Consumed, not left behind in the store.
        assert_eq!(app.store.get().prefilled_message, None);
    }

    #[test]
    fn test_escape_closes_chat() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        handle_key(&mut app, key(KeyCode::Esc)).unwrap(); // leave editing
        handle_key(&mut app, key(KeyCode::Esc)).unwrap(); // close chat
        assert!(!app.store.get().chat_open);
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        for c in "hola".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Left)).unwrap();
        handle_key(&mut app, key(KeyCode::Char('!'))).unwrap();
        assert_eq!(app.chat_input, "hol!a");
    }

    #[test]
    fn test_dismiss_suggestion() {
        let mut app = test_app();
        app.store.set_suggestion(crate::assist::Suggestion {
            text: "check your usage".to_string(),
            model: "test".to_string(),
        });

        handle_key(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.store.get().suggestion, None);
    }

    #[test]
    fn test_accept_suggestion_opens_chat_with_text() {
        let mut app = test_app();
        app.store.set_suggestion(crate::assist::Suggestion {
            text: "check your usage".to_string(),
            model: "test".to_string(),
        });

        handle_key(&mut app, key(KeyCode::Char('y'))).unwrap();

        let state = app.store.get();
        assert!(state.chat_open);
        assert_eq!(state.suggestion, None);
        assert_eq!(app.chat_input, "check your usage");
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_mouse_click_on_trigger_opens_chat() {
        let mut app = test_app();
        app.trigger.set_area(ratatui::layout::Rect::new(0, 23, 10, 1));

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 23,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, click);
        assert!(app.store.get().chat_open);

        let mut other = test_app();
        other.trigger.set_area(ratatui::layout::Rect::new(0, 23, 10, 1));
        let miss = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 40,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut other, miss);
        assert!(!other.store.get().chat_open);
    }
}
