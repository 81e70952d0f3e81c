// Warning banner: missing credential or a failed request.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use suno_master_core::config::API_KEY_ENV;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(message) = banner_message(state) else {
        return;
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Warning "),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// The missing credential outranks a request error since it blocks every
/// further attempt.
pub fn banner_message(state: &ViewState) -> Option<String> {
    if state.credential_missing {
        return Some(format!(
            "No API key configured. Set {API_KEY_ENV} or config/credentials.toml. Generation is disabled."
        ));
    }
    state.error_message.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_text;

    #[test]
    fn no_banner_when_all_is_well() {
        assert!(banner_message(&ViewState::default()).is_none());
    }

    #[test]
    fn missing_key_takes_precedence() {
        let mut state = ViewState::new("rules".into(), true);
        state.error_message = Some("Generation failed.".into());
        let msg = banner_message(&state).unwrap();
        assert!(msg.contains(API_KEY_ENV));
    }

    #[test]
    fn renders_error_message() {
        let backend = ratatui::backend::TestBackend::new(80, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.error_message = Some("Request failed".into());
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();
        assert!(buffer_text(&terminal).contains("Request failed"));
    }
}
