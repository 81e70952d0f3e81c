// Instruction editor: the system prompt preamble, collapsible.
//
// Collapsed it is a single hint row. Expanded it is a bordered text area.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let modified = state.instructions != state.default_instructions;

    if !state.instructions_expanded {
        let mut spans = vec![
            Span::styled("▸ Instructions", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(" (Ctrl+E to edit)", Style::default().fg(Color::DarkGray)),
        ];
        if modified {
            spans.push(Span::styled(" modified", Style::default().fg(Color::Yellow)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let mut title = vec![Span::styled(
        " ▾ Instructions ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if modified {
        title.push(Span::styled(
            "modified, Ctrl+R to reset ",
            Style::default().fg(Color::Yellow),
        ));
    }

    let mut text = state.instructions.clone();
    if focused {
        text.push('▏');
    }
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = if focused {
        text.lines().count().saturating_sub(inner_height) as u16
    } else {
        0
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(title))
                .border_style(focused_border_style(focused, Style::default())),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
