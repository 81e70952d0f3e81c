// TUI widget modules, one per screen panel.

pub mod banner;
pub mod brief_input;
pub mod help_bar;
pub mod instructions;
pub mod quit_confirm;
pub mod status_bar;
pub mod track_detail;
pub mod track_list;

use ratatui::style::{Color, Style};

/// Border style for a panel: cyan when it has keyboard focus, `base` otherwise.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        base
    }
}

/// Flatten a rendered test buffer into one string of cell symbols.
#[cfg(test)]
pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_border_overrides_base() {
        let base = Style::default().fg(Color::Red);
        assert_eq!(focused_border_style(true, base), Style::default().fg(Color::Cyan));
        assert_eq!(focused_border_style(false, base), base);
    }
}
