use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::QuizSession;

use super::option_label;

/// Below this many seconds the timer turns red.
const LOW_TIME_SECONDS: i64 = 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app);
    render_question_text(frame, chunks[1], &question.question);
    render_options(
        frame,
        chunks[2],
        &question.answers,
        app.selected_option(),
        session.current_answer(),
    );
    render_navigation(frame, chunks[3], session);
    render_controls(frame, chunks[4], session.is_last_question());
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let timer_color = if session.time_left_seconds() < LOW_TIME_SECONDS {
        Color::Red
    } else {
        Color::Green
    };

    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Length(34)]).split(area);

    let title = Paragraph::new(app.title()).fg(Color::Cyan).bold();
    frame.render_widget(title, chunks[0]);

    let status = Line::from(vec![
        Span::styled(
            format!(
                "{}/{} · {} answered  ",
                session.current_index() + 1,
                session.questions().len(),
                session.answered_count()
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            session.format_time_left(),
            Style::default().fg(timer_color).bold(),
        ),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Right), chunks[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String],
    cursor: usize,
    chosen: Option<usize>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == cursor;
        let is_chosen = chosen == Some(index);

        let style = match (is_chosen, is_cursor) {
            (true, _) => Style::default().fg(Color::Green).bold(),
            (false, true) => Style::default().fg(Color::Cyan).bold(),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let check = if is_chosen { "●" } else { "○" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} {} ", marker, check), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// One cell per question; answered ones are highlighted.
fn render_navigation(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let spans: Vec<Span> = session
        .answers()
        .iter()
        .enumerate()
        .map(|(index, answer)| {
            let style = if index == session.current_index() {
                Style::default().fg(Color::Black).bg(Color::Cyan).bold()
            } else if answer.is_some() {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {} ", index + 1), style)
        })
        .collect();

    let widget = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, is_last: bool) {
    let text = if is_last {
        "j/k choose · enter answer · h prev · 1-9 pgup/pgdn jump · s SUBMIT · esc home"
    } else {
        "j/k choose · enter answer · h/l prev/next · 1-9 pgup/pgdn jump · s submit · esc home"
    };

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
