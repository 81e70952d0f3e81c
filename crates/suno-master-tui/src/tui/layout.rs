// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Warning Banner (3 rows, only when needed)         |
// +--------------------------------------------------+
// | Brief (6 rows)                                    |
// +--------------------------------------------------+
// | Instructions (1 row collapsed, 10 expanded)       |
// +----------------+---------------------------------+
// | Tracks (35%)   | Detail (65%)                    |
// +----------------+---------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const BANNER_HEIGHT: u16 = 3;
const BRIEF_HEIGHT: u16 = 6;
const INSTRUCTIONS_COLLAPSED: u16 = 1;
const INSTRUCTIONS_EXPANDED: u16 = 10;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    /// Present only when there is something to warn about.
    pub banner: Option<Rect>,
    pub brief: Rect,
    pub instructions: Rect,
    pub track_list: Rect,
    pub track_detail: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect, show_banner: bool, instructions_expanded: bool) -> AppLayout {
    let instructions_height = if instructions_expanded {
        INSTRUCTIONS_EXPANDED
    } else {
        INSTRUCTIONS_COLLAPSED
    };

    let mut constraints = vec![Constraint::Length(1)];
    if show_banner {
        constraints.push(Constraint::Length(BANNER_HEIGHT));
    }
    constraints.extend([
        Constraint::Length(BRIEF_HEIGHT),
        Constraint::Length(instructions_height),
        Constraint::Min(5),
        Constraint::Length(1),
    ]);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut rows = vertical.iter().copied();
    let status_bar = rows.next().unwrap_or_default();
    let banner = if show_banner { rows.next() } else { None };
    let brief = rows.next().unwrap_or_default();
    let instructions = rows.next().unwrap_or_default();
    let middle = rows.next().unwrap_or_default();
    let help_bar = rows.next().unwrap_or_default();

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(middle);

    AppLayout {
        status_bar,
        banner,
        brief,
        instructions,
        track_list: horizontal[0],
        track_detail: horizontal[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
