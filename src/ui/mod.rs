mod home;
mod quiz;
mod result;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, NoticeKind, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

    match app.screen {
        Screen::Home => home::render(frame, chunks[0], app),
        Screen::Quiz => quiz::render(frame, chunks[0], app),
        Screen::Result => result::render(frame, chunks[0], app),
    }

    render_notice(frame, chunks[1], app);
}

fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.notice() else {
        return;
    };

    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };

    let widget = Paragraph::new(notice.message.as_str())
        .alignment(Alignment::Center)
        .fg(color);
    frame.render_widget(widget, area);
}

/// Shorten `text` to at most `max` characters.
fn truncate(text: &str, max: usize) -> String {
    let char_count = text.chars().count();
    if char_count > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// Display label for an answer position: A, B, C, ...
fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map(char::from)
        .unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Thủ đô", 10), "Thủ đô");
        assert_eq!(truncate("Thủ đô Việt Nam", 6), "Thủ đô...");
    }

    #[test]
    fn test_option_label() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
        assert_eq!(option_label(30), '?');
    }
}
