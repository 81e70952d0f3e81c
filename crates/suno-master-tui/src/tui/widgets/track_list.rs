// Track list: numbered titles with a selection marker.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use suno_master_core::protocol::LlmStatus;

use super::focused_border_style;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" Tracks ({}) ", state.tracks.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .border_style(focused_border_style(focused, Style::default()));

    if state.tracks.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            empty_text(state.status),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(track.title.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn empty_text(status: LlmStatus) -> &'static str {
    match status {
        LlmStatus::Idle => "Write a brief and press Ctrl+G.",
        LlmStatus::Streaming => "Generating...",
        LlmStatus::Complete => "No results: the response held no complete track.",
        LlmStatus::Error => "No tracks.",
    }
}
