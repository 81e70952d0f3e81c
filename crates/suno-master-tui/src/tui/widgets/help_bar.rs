// Help bar: key hints for the focused panel, or a transient notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.notice {
        Some(notice) => Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            hints(state),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Black)),
        area,
    );
}

pub fn hints(state: &ViewState) -> String {
    let generate = if state.can_generate() { "^G generate  " } else { "" };
    match state.focus {
        Focus::Brief | Focus::Instructions => format!(
            " {generate}Tab focus  ^E instructions  ^R reset  Esc results  ^C quit"
        ),
        Focus::Results => format!(
            " {generate}j/k select  t/l/s/a copy title/lyrics/style/all  PgUp/PgDn scroll  Tab focus  q quit"
        ),
    }
}
