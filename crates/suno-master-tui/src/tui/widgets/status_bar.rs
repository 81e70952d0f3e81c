// Status bar widget: app name, request status, token usage, finish time.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use suno_master_core::prompt::TRACK_COUNT;
use suno_master_core::protocol::LlmStatus;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [name] [status dot + label] [track count] [tokens] [finished at]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Suno Master Pro ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )];

    let (label, color) = status_indicator(state.status);
    spans.push(Span::styled(format!(" ● {label}"), Style::default().fg(color)));

    if state.status == LlmStatus::Complete {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("{}/{} tracks", state.tracks.len(), TRACK_COUNT),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("{} in / {} out tokens", state.input_tokens, state.output_tokens),
            Style::default().fg(Color::DarkGray),
        ));
        if let Some(at) = state.finished_at {
            spans.push(Span::styled(
                format!(" | done {}", at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if state.truncated {
            spans.push(Span::styled(
                " | truncated",
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn status_indicator(status: LlmStatus) -> (&'static str, Color) {
    match status {
        LlmStatus::Idle => ("ready", Color::DarkGray),
        LlmStatus::Streaming => ("generating...", Color::Yellow),
        LlmStatus::Complete => ("complete", Color::Green),
        LlmStatus::Error => ("error", Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_text;
    use suno_master_core::Track;

    #[test]
    fn status_indicator_values() {
        assert_eq!(status_indicator(LlmStatus::Idle), ("ready", Color::DarkGray));
        assert_eq!(status_indicator(LlmStatus::Streaming).0, "generating...");
        assert_eq!(status_indicator(LlmStatus::Complete).1, Color::Green);
        assert_eq!(status_indicator(LlmStatus::Error).1, Color::Red);
    }

    #[test]
    fn complete_shows_track_count_and_truncation() {
        let backend = ratatui::backend::TestBackend::new(120, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.status = LlmStatus::Complete;
        state.tracks = vec![Track {
            title: "A".into(),
            lyrics: "B".into(),
            style: "C".into(),
        }];
        state.truncated = true;
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("1/10 tracks"));
        assert!(text.contains("truncated"));
    }
}
