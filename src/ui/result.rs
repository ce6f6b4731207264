use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::session::ScoreReport;

use super::{option_label, truncate};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.report() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], app, &report);
    render_question_breakdown(frame, chunks[2], app);
    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, app: &App, report: &ScoreReport) {
    let grade_color = get_grade_color(report.percentage());

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "RESULTS · {} · {} min",
                app.title(),
                app.session().time_limit_minutes()
            ),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / 10", report.display_score()),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(vec![
            Span::styled(
                format!("{} correct", report.correct),
                Style::default().fg(Color::Green),
            ),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} wrong", report.wrong()),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();

    let lines: Vec<Line> = session
        .answers()
        .iter()
        .zip(session.questions().iter())
        .enumerate()
        .map(|(index, (answer, question))| {
            let is_correct = question.is_correct(*answer);
            let (symbol, color) = if is_correct {
                ("+", Color::Green)
            } else {
                ("-", Color::Red)
            };

            let given = answer
                .map(|a| option_label(a).to_string())
                .unwrap_or_else(|| "–".to_string());

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate(&question.question, QUESTION_PREVIEW_LENGTH),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  [{} / {}]", given, option_label(question.correct)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((app.result_scroll() as u16, 0));
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r retake  ·  enter home  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
