// Brief input: free-text description of the album to generate.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::ViewState;

const PLACEHOLDER: &str = "Describe the album: genre, mood, themes, language...";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let title = Line::from(vec![
        Span::styled(" Brief ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("({} chars) ", state.brief.chars().count()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(focused_border_style(focused, Style::default()));

    let paragraph = if state.brief.is_empty() && !focused {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let mut text = state.brief.clone();
        if focused {
            text.push('▏');
        }
        let inner_height = area.height.saturating_sub(2) as usize;
        let line_count = text.lines().count();
        let scroll = line_count.saturating_sub(inner_height) as u16;
        Paragraph::new(text).scroll((scroll, 0))
    };

    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}
