use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::transcript::Role;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // History sidebar on the left when the layout includes it; its absence
    // only removes the listing, the transcript itself is untouched.
    let chat_column = if app.show_history {
        let [history_area, chat_column] =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .areas(body_area);
        render_history(app, frame, history_area);
        chat_column
    } else {
        body_area
    };

    let [messages_area, input_row] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(chat_column);

    render_messages(app, frame, messages_area);
    render_input_row(app, frame, input_row);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Police Assistance Chat ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);

    // Inert account controls at the right edge; clicks are logged only
    let login_label = " Login ";
    let register_label = " Register ";
    let login_w = login_label.len() as u16;
    let register_w = register_label.len() as u16;

    if area.width > login_w + register_w + 30 {
        let register_x = area.x + area.width - register_w - 1;
        let login_x = register_x - login_w - 1;
        let login_area = Rect::new(login_x, area.y, login_w, 1);
        let register_area = Rect::new(register_x, area.y, register_w, 1);

        let stub_style = Style::default().bg(Color::Black).fg(Color::White);
        frame.render_widget(Paragraph::new(login_label).style(stub_style), login_area);
        frame.render_widget(Paragraph::new(register_label).style(stub_style), register_area);

        app.login_area = Some(login_area);
        app.register_area = Some(register_area);
    } else {
        app.login_area = None;
        app.register_area = None;
    }
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat_text = if app.transcript.is_empty() && !app.awaiting_reply {
        Text::from(Span::styled(
            "Ask the assistant a question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.transcript.messages() {
            let text_style = match msg.role {
                Role::User => Style::default().fg(Color::Cyan),
                Role::Assistant => Style::default(),
            };
            for line in msg.text.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), text_style)));
            }
            lines.push(Line::from(Span::styled(
                msg.clock_label(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::default());
        }

        if app.awaiting_reply {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Sending{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_history(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ");

    // Full rebuild from the transcript every frame, user questions only
    let items: Vec<ListItem> = app
        .transcript
        .user_messages()
        .map(|msg| {
            ListItem::new(vec![
                Line::from(msg.text.clone()),
                Line::from(Span::styled(
                    msg.clock_label(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    if items.is_empty() {
        let placeholder = Paragraph::new("No questions yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    frame.render_widget(List::new(items).block(block), area);
}

fn render_input_row(app: &mut App, frame: &mut Frame, area: Rect) {
    let (input_area, button_area) = if app.submit_binding.has_button() {
        let [input_area, button_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(14)]).areas(area);
        (input_area, Some(button_area))
    } else {
        (area, None)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Horizontal scroll keeps the cursor inside the visible slice
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    let cursor_x = (app.cursor - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));

    match button_area {
        Some(button_area) => {
            app.send_button_area = Some(button_area);

            let (label, style) = if app.awaiting_reply {
                ("Sending...", Style::default().fg(Color::DarkGray))
            } else {
                ("Send", Style::default().fg(Color::Green).bold())
            };

            let button = Paragraph::new(label)
                .alignment(Alignment::Center)
                .style(style)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                );
            frame.render_widget(button, button_area);
        }
        None => app.send_button_area = None,
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    if app.awaiting_reply {
        hints.push(Span::raw(" "));
        hints.push(Span::styled(
            " waiting for reply ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ));
    }

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}
