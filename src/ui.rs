use crate::app::{AppState, Focus, Status};
use ratatui::{prelude::*, widgets::*};

const SESSIONS_PANEL_WIDTH: u16 = 42;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

struct Palette {
    running: Color,
    paused: Color,
    saved: Color,
    border: Color,
    accent: Color,
}

const PALETTE: Palette = Palette {
    running: Color::Rgb(0, 255, 150),
    paused: Color::Rgb(255, 200, 0),
    saved: Color::Rgb(100, 181, 246),
    border: Color::Rgb(0, 200, 255),
    accent: Color::Rgb(255, 100, 0),
};

fn status_color(status: &Status) -> Color {
    match status {
        Status::Ready => Color::Gray,
        Status::Running => PALETTE.running,
        Status::Paused => PALETTE.paused,
        Status::Saved => PALETTE.saved,
        Status::Problem(_) => Color::Red,
    }
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { PALETTE.accent } else { PALETTE.border }))
}

pub fn render_ui(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    render_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(SESSIONS_PANEL_WIDTH)])
        .split(chunks[1]);

    render_timer(f, app, body[0]);
    render_sessions(f, app, body[1]);
    render_controls(f, app, chunks[2]);

    if app.show_help {
        render_help(f);
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let summary = format!(
        "{} sessions • {:.1} min logged",
        app.log.len(),
        app.log.total_minutes()
    );
    f.render_widget(
        Paragraph::new(Span::styled(summary, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center)
            .block(Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(PALETTE.border))
                .title(Span::styled(" 🎯 NODISTRACTIONS ", Style::default()
                    .fg(PALETTE.accent).add_modifier(Modifier::BOLD)))),
        area,
    );
}

fn render_timer(f: &mut Frame, app: &AppState, area: Rect) {
    let focused = matches!(app.focus, Focus::Timer | Focus::NameInput | Focus::DescriptionInput);
    let block = panel(" Focus ", focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(2),
            Constraint::Length(3), Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let color = status_color(&app.status);
    let mut clock = vec![Span::styled(
        app.timer.current_display_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if app.timer.is_running() {
        let frame = app.animation_frame as usize % SPINNER.len();
        clock.push(Span::raw("  "));
        clock.push(Span::styled(SPINNER[frame], Style::default().fg(PALETTE.running)));
    }
    f.render_widget(Paragraph::new(Line::from(clock)).alignment(Alignment::Center), sections[1]);

    f.render_widget(
        Paragraph::new(app.status.text())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    render_input(f, " Session Name ", &app.name_input, app.focus == Focus::NameInput, sections[5]);
    render_input(f, " Description ", &app.description_input, app.focus == Focus::DescriptionInput, sections[6]);
}

fn render_input(f: &mut Frame, title: &str, value: &str, active: bool, area: Rect) {
    let mut spans = vec![Span::styled(value, Style::default().fg(if active { Color::Green } else { Color::White }))];
    if active {
        spans.push(Span::styled("█", Style::default().fg(Color::Green)));
    } else if value.is_empty() {
        spans.push(Span::styled(title.trim(), Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).block(panel(title, active)),
        area,
    );
}

fn render_sessions(f: &mut Frame, app: &AppState, area: Rect) {
    let focused = matches!(
        app.focus,
        Focus::Sessions | Focus::EditName | Focus::EditDescription | Focus::ConfirmingDelete
    );
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(8)])
        .split(area);

    if app.log.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("  No sessions yet!", Style::default().fg(Color::DarkGray)))
                .block(panel(" Sessions ", focused)),
            rows[0],
        );
    } else {
        let items: Vec<ListItem> = app.log.sessions().iter().map(|s| {
            let mut lines = vec![
                Line::from(Span::styled(s.name.as_str(), Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(s.subtitle(), Style::default().fg(Color::Gray))),
            ];
            if !s.description.is_empty() {
                lines.push(Line::from(Span::styled(s.description.as_str(), Style::default().fg(Color::DarkGray))));
            }
            ListItem::new(lines)
        }).collect();

        let mut state = ListState::default();
        state.select(app.selected_index());
        f.render_stateful_widget(
            List::new(items)
                .block(panel(" Sessions ", focused))
                .highlight_style(Style::default().fg(PALETTE.accent).add_modifier(Modifier::BOLD))
                .highlight_symbol("► "),
            rows[0],
            &mut state,
        );
    }

    render_edit_panel(f, app, rows[1]);
}

fn render_edit_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let block = panel(" Edit ", false);
    if app.selected_session().is_none() {
        f.render_widget(
            Paragraph::new(Span::styled("  Select a session to edit", Style::default().fg(Color::DarkGray)))
                .block(block),
            area,
        );
        return;
    }

    let field = |label: &'static str, value: &str, active: bool| {
        let mut spans = vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::styled(value.to_string(), Style::default().fg(if active { Color::Green } else { Color::White })),
        ];
        if active {
            spans.push(Span::styled("█", Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    };

    let mut lines = vec![
        field("Name: ", &app.edit_name, app.focus == Focus::EditName),
        field("Desc: ", &app.edit_description, app.focus == Focus::EditDescription),
        Line::from(Span::styled(app.edit_duration_label(), Style::default().fg(Color::Gray))),
        Line::from(""),
    ];
    lines.push(match app.focus {
        Focus::ConfirmingDelete => Line::from(Span::styled(
            "Delete this session? y/n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Focus::EditName | Focus::EditDescription => Line::from(Span::styled(
            "Enter: Update • Tab: Switch • Esc: Cancel",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        _ => Line::from(Span::styled(
            "E: Edit • X: Delete",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    });

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn action<'a>(key: &'a str, label: &'a str, enabled: bool) -> Vec<Span<'a>> {
    let key_style = if enabled {
        Style::default().fg(PALETTE.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    vec![Span::styled(key, key_style), Span::raw(label)]
}

fn render_controls(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();
    spans.extend(action("S", " Start  •  ", app.can_start()));
    spans.extend(action("P", " Pause  •  ", app.can_pause()));
    spans.extend(action("V", " Save  •  ", app.can_save()));
    spans.extend(action("R", " Reset  •  ", app.can_reset()));
    spans.extend(action("Tab", " Sessions  •  ", true));
    spans.extend(action("?", " Help  •  ", true));
    spans.extend(action("Q", " Quit", true));

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(PALETTE.border))),
        area,
    );
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.size());
    let help_text = vec![
        Line::from(""),
        Line::from("  Timer:"),
        help_line("S / P", "Start / pause"),
        help_line("V", "Save the session to the work log"),
        help_line("R", "Reset the timer"),
        help_line("N / D", "Edit session name / description"),
        Line::from(""),
        Line::from("  Sessions panel:"),
        help_line("Tab", "Focus the sessions panel"),
        help_line("↑↓ / JK", "Select a session"),
        help_line("E / Enter", "Edit the selected session"),
        help_line("X / Del", "Delete the selected session"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Q / Esc", "Exit / Go back"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(help_text).block(panel(" Help ", true)), area);
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
