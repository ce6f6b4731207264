use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, HomeMode};
use crate::library::LibraryStatus;

use super::truncate;

const NAME_PREVIEW_LENGTH: usize = 40;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], app);
    render_library(frame, chunks[1], app);
    render_draft(frame, chunks[2], app);
    render_controls(frame, chunks[3], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let badge = match app.library().status() {
        LibraryStatus::NotLoaded => "loading...".to_string(),
        LibraryStatus::Ready => format!("{} quizzes", app.library().entries().len()),
        LibraryStatus::Offline(_) => "offline".to_string(),
    };

    let line = Line::from(vec![
        Span::styled("SMART QUIZ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("  ·  {}", badge), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_library(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Color::DarkGray)
        .title(" Library ")
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    if let LibraryStatus::Offline(reason) = app.library().status() {
        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Cannot connect to the quiz collection.",
                Style::default().fg(Color::Red).bold(),
            )),
            Line::from(Span::styled(reason.as_str(), Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("Press r to retry".fg(Color::DarkGray)),
        ];
        let widget = Paragraph::new(content).alignment(Alignment::Center).block(block);
        frame.render_widget(widget, area);
        return;
    }

    let entries = app.library().entries();
    if entries.is_empty() {
        let widget = Paragraph::new("No quizzes yet.")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray)
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let is_selected = index == app.selected_entry();
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_selected { ">" } else { " " };

            Line::from(vec![
                Span::styled(format!("{} ", marker), style),
                Span::styled(
                    format!("{:<width$}", truncate(&entry.name, NAME_PREVIEW_LENGTH), width = NAME_PREVIEW_LENGTH + 3),
                    style,
                ),
                Span::styled(
                    format!(
                        "  {}  ·  {} questions",
                        entry.created_at.format("%d/%m/%Y"),
                        entry.count
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let scroll = app.selected_entry().saturating_sub(area.height.saturating_sub(3) as usize);
    let widget = Paragraph::new(lines).block(block).scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn render_draft(frame: &mut Frame, area: Rect, app: &App) {
    let draft = app.library().draft().len();
    let settings = app.settings;

    let draft_text = if draft == 0 {
        Span::styled("no draft", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!("draft: {} questions", draft),
            Style::default().fg(Color::Yellow),
        )
    };

    let line = Line::from(vec![
        draft_text,
        Span::styled(
            format!(
                "  ·  time limit {} min  ·  shuffle {}",
                settings.time_limit_minutes,
                if settings.shuffle { "on" } else { "off" }
            ),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.home_mode {
        HomeMode::Naming(name) => Line::from(vec![
            Span::styled("Quiz name: ", Style::default().fg(Color::Cyan)),
            Span::styled(name.as_str(), Style::default().fg(Color::White).bold()),
            Span::styled("_  (enter save · esc cancel)", Style::default().fg(Color::DarkGray)),
        ]),
        HomeMode::OpenFile(path) => Line::from(vec![
            Span::styled("File: ", Style::default().fg(Color::Cyan)),
            Span::styled(path.as_str(), Style::default().fg(Color::White).bold()),
            Span::styled("_  (.txt .md .json · enter load · esc cancel)", Style::default().fg(Color::DarkGray)),
        ]),
        HomeMode::ConfirmDelete(_) => Line::from(Span::styled(
            "Delete this quiz permanently? y / any other key to cancel",
            Style::default().fg(Color::Red).bold(),
        )),
        HomeMode::Browse => Line::from(
            "paste text or o open file · enter play · n play draft · s save · d delete · r reload · +/- time · x shuffle · q quit"
                .fg(Color::DarkGray),
        ),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
