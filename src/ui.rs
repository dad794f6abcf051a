use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use crate::app::{App, ChatRole, InputMode};
use crate::plans::{Limit, PlanLimits};
use crate::state::UiState;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let state = app.store.get();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if state.chat_open {
        let [main_area, chat_area] =
            Layout::horizontal([Constraint::Min(30), Constraint::Percentage(45)])
                .areas(body_area);
        render_main(app, &state, frame, main_area);
        render_chat(app, frame, chat_area);
    } else {
        app.chat_area = None;
        render_main(app, &state, frame, body_area);
    }

    render_footer(app, &state, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" concierge ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{} plan]", app.plan.name),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_main(app: &App, state: &UiState, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "  Your workspace",
            Style::default().fg(Color::White).bold(),
        )),
        Line::default(),
    ];

    lines.extend(limit_lines(&app.plan.limits));

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("  model ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.selected_model.clone(),
            Style::default().fg(Color::Magenta),
        ),
    ]));

    if let Some(suggestion) = &state.suggestion {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(" ✦ ", Style::default().fg(Color::Yellow)),
            Span::styled("Suggestion: ", Style::default().fg(Color::Yellow).bold()),
            Span::raw(suggestion.text.clone()),
        ]));
        lines.push(Line::from(Span::styled(
            "   y accept · x dismiss",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn limit_lines(limits: &PlanLimits) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::DarkGray);
    vec![
        Line::from(vec![
            Span::styled("  modules ", label_style),
            limit_span(limits.modules),
        ]),
        Line::from(vec![
            Span::styled("  tenants ", label_style),
            limit_span(limits.tenants),
        ]),
        Line::from(vec![
            Span::styled("  users   ", label_style),
            limit_span(limits.users),
        ]),
    ]
}

fn limit_span(limit: Limit) -> Span<'static> {
    let style = if limit.is_unbounded() {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Green)
    };
    Span::styled(limit.to_string(), style)
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let [transcript_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    render_transcript(app, frame, transcript_area);
    render_chat_input(app, frame, input_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Assistant ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);

    // Remember geometry for wrap and scroll calculations
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.chat_messages {
        let (label, style) = match msg.role {
            ChatRole::User => ("You:", Style::default().fg(Color::Green).bold()),
            ChatRole::Assistant => ("AI:", Style::default().fg(Color::Cyan).bold()),
        };
        lines.push(Line::from(Span::styled(label, style)));
        for text_line in msg.content.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.query_loading {
        let dots = ".".repeat((app.animation_frame + 1) as usize);
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Cyan).bold(),
        )));
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray),
        )));
    } else if app.chat_messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask anything about your workspace.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let transcript = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, area);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_style, title) = match app.input_mode {
        InputMode::Editing => (Style::default().fg(Color::Yellow), " Message (Enter to send) "),
        InputMode::Normal => (Style::default().fg(Color::DarkGray), " Message (i to edit) "),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);
    let inner = block.inner(area);

    let input = Paragraph::new(app.chat_input.clone()).block(block);
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing {
        let column = cursor_column(&app.chat_input, app.chat_cursor);
        let cursor_x = inner.x + column.min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(cursor_x, inner.y));
    }
}

/// Display column of the cursor: the rendered width of everything before
/// it, not the character count (wide CJK/emoji cells count double).
fn cursor_column(input: &str, cursor: usize) -> u16 {
    let prefix: String = input.chars().take(cursor).collect();
    prefix.width() as u16
}

fn render_footer(app: &mut App, state: &UiState, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::DarkGray);

    let mut spans = vec![];
    if state.chat_open {
        spans.extend([
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]);
    } else {
        spans.extend([
            Span::styled(" s ", key_style),
            Span::styled(" suggest ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]);
    }

    let hints = Paragraph::new(Line::from(spans));
    frame.render_widget(hints, area);

    // The trigger button sits at the right edge of the footer and is the
    // mouse click target for opening the chat.
    let button_label = " a  Ask AI ";
    let button_width = button_label.chars().count() as u16;
    let button_area = Rect::new(
        area.x + area.width.saturating_sub(button_width),
        area.y,
        button_width.min(area.width),
        1,
    );
    app.trigger.set_area(button_area);

    let button_style = if state.chat_open {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().bg(Color::Cyan).fg(Color::Black).bold()
    };
    let button = Paragraph::new(Span::styled(button_label, button_style));
    frame.render_widget(button, button_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_column_matches_display_width() {
        assert_eq!(cursor_column("hola", 0), 0);
        assert_eq!(cursor_column("hola", 4), 4);

        // Wide characters occupy two cells each
        assert_eq!(cursor_column("日本語", 2), 4);
        assert_eq!(cursor_column("日本語", 3), 6);
        assert_eq!(cursor_column("a日b", 2), 3);

        // Cursor past the end clamps to the full width
        assert_eq!(cursor_column("日本", 10), 4);
    }
}
