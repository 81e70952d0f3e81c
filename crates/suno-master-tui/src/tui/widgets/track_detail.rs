// Track detail: the selected track's fields, or the raw stream while
// generating.
//
// Auto-scrolls to the bottom while streaming; otherwise scrolls with
// PgUp/PgDn, clamped to the content.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use suno_master_core::protocol::LlmStatus;
use suno_master_core::Track;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;

    let (title, text) = if state.status == LlmStatus::Streaming {
        let raw = if state.raw_text.is_empty() {
            "Waiting for the first tokens...".to_string()
        } else {
            state.raw_text.clone()
        };
        (" Streaming ".to_string(), Text::raw(raw))
    } else if let Some(track) = state.selected_track() {
        (format!(" {} ", track.title), track_text(track))
    } else {
        (" Detail ".to_string(), Text::default())
    };

    // Rows after wrapping, counted before the block is attached so the
    // borders are not included.
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner_width);

    let max_scroll = rows.saturating_sub(inner_height);
    let scroll = if state.status == LlmStatus::Streaming {
        max_scroll
    } else {
        state.detail_scroll.min(max_scroll)
    };

    let border = match state.status {
        LlmStatus::Streaming => Style::default().fg(Color::Yellow),
        LlmStatus::Error => Style::default().fg(Color::Red),
        _ => Style::default(),
    };

    let paragraph = paragraph
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
                .border_style(border),
        )
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

/// Title, lyrics and style laid out with section headings.
pub fn track_text(track: &Track) -> Text<'static> {
    let heading = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled("TITLE", heading)),
        Line::from(track.title.clone()),
        Line::default(),
        Line::from(Span::styled("STYLE", heading)),
        Line::from(Span::styled(track.style.clone(), Style::default().fg(Color::Cyan))),
        Line::default(),
        Line::from(Span::styled("LYRICS", heading)),
    ];
    lines.extend(track.lyrics.lines().map(|l| Line::from(l.to_string())));
    Text::from(lines)
}
