// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, clipboard copies, or local ViewState mutations (typing,
// focus changes, selection, scrolling).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use suno_master_core::protocol::UserCommand;

use super::{Focus, ViewState};

/// Rows moved by PgUp/PgDn in the detail pane.
const PAGE_SCROLL: usize = 10;

/// What a key press asks the TUI loop to do beyond mutating `ViewState`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// Forward to the app orchestrator.
    Command(UserCommand),
    /// Write `text` to the clipboard and confirm with `description`.
    Copy { description: String, text: String },
}

/// Handle a keyboard event.
///
/// Returns `None` when the key was handled locally (or ignored).
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<InputAction> {
    // Windows emits Press and Release for each key; only act on Press.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Notices last until the next key press.
    view_state.notice = None;

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits, even inside the confirmation dialog.
    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(InputAction::Command(UserCommand::Quit));
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if ctrl {
        return handle_ctrl(key_event.code, view_state);
    }

    match key_event.code {
        KeyCode::Tab => {
            view_state.focus = next_focus(view_state.focus, view_state.instructions_expanded);
            return None;
        }
        KeyCode::BackTab => {
            view_state.focus = prev_focus(view_state.focus, view_state.instructions_expanded);
            return None;
        }
        _ => {}
    }

    match view_state.focus {
        Focus::Brief => {
            edit_text(&mut view_state.brief, key_event);
            if key_event.code == KeyCode::Esc {
                view_state.focus = Focus::Results;
            }
            None
        }
        Focus::Instructions => {
            edit_text(&mut view_state.instructions, key_event);
            if key_event.code == KeyCode::Esc {
                view_state.focus = Focus::Results;
            }
            None
        }
        Focus::Results => handle_results_key(key_event.code, view_state),
    }
}

fn handle_ctrl(code: KeyCode, view_state: &mut ViewState) -> Option<InputAction> {
    match code {
        KeyCode::Char('g') => generate(view_state),
        KeyCode::Char('e') => {
            view_state.instructions_expanded = !view_state.instructions_expanded;
            if !view_state.instructions_expanded && view_state.focus == Focus::Instructions {
                view_state.focus = Focus::Brief;
            }
            None
        }
        KeyCode::Char('r') => {
            view_state.instructions = view_state.default_instructions.clone();
            view_state.notice = Some("Instructions reset".to_string());
            None
        }
        _ => None,
    }
}

/// Build a Generate command, or explain in the footer why generation is off.
fn generate(view_state: &mut ViewState) -> Option<InputAction> {
    if view_state.can_generate() {
        return Some(InputAction::Command(UserCommand::Generate {
            brief: view_state.brief.clone(),
            instructions: view_state.instructions.clone(),
        }));
    }

    view_state.notice = Some(
        if view_state.credential_missing {
            "Generation disabled: no API key configured"
        } else if view_state.brief.trim().is_empty() {
            "Write a brief first"
        } else {
            "A generation is already running"
        }
        .to_string(),
    );
    None
}

fn handle_results_key(code: KeyCode, view_state: &mut ViewState) -> Option<InputAction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => {
            if view_state.selected > 0 {
                view_state.selected -= 1;
                view_state.detail_scroll = 0;
            }
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.selected + 1 < view_state.tracks.len() {
                view_state.selected += 1;
                view_state.detail_scroll = 0;
            }
            None
        }
        KeyCode::PageUp => {
            view_state.detail_scroll = view_state.detail_scroll.saturating_sub(PAGE_SCROLL);
            None
        }
        KeyCode::PageDown => {
            view_state.detail_scroll = view_state.detail_scroll.saturating_add(PAGE_SCROLL);
            None
        }
        KeyCode::Char('t') => copy_field(view_state, "title", |t| t.title.clone()),
        KeyCode::Char('l') => copy_field(view_state, "lyrics", |t| t.lyrics.clone()),
        KeyCode::Char('s') => copy_field(view_state, "style prompt", |t| t.style.clone()),
        KeyCode::Char('a') => copy_field(view_state, "track", |t| t.to_clipboard_text()),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

fn copy_field(
    view_state: &mut ViewState,
    what: &str,
    field: impl Fn(&suno_master_core::Track) -> String,
) -> Option<InputAction> {
    match view_state.selected_track() {
        Some(track) => Some(InputAction::Copy {
            description: format!("{what} of \"{}\"", track.title),
            text: field(track),
        }),
        None => {
            view_state.notice = Some("No track selected".to_string());
            None
        }
    }
}

/// Append-only editing: printable characters, Enter for a newline, Backspace.
fn edit_text(buffer: &mut String, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::ALT) => buffer.push(c),
        KeyCode::Enter => buffer.push('\n'),
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => {}
    }
}

fn next_focus(focus: Focus, instructions_expanded: bool) -> Focus {
    match focus {
        Focus::Brief if instructions_expanded => Focus::Instructions,
        Focus::Brief | Focus::Instructions => Focus::Results,
        Focus::Results => Focus::Brief,
    }
}

fn prev_focus(focus: Focus, instructions_expanded: bool) -> Focus {
    match focus {
        Focus::Brief => Focus::Results,
        Focus::Instructions => Focus::Brief,
        Focus::Results if instructions_expanded => Focus::Instructions,
        Focus::Results => Focus::Brief,
    }
}

/// Quit dialog: `y`/`q` confirm, `n`/`Esc` cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<InputAction> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(InputAction::Command(UserCommand::Quit))
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use suno_master_core::protocol::LlmStatus;
    use suno_master_core::Track;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_str(state: &mut ViewState, s: &str) {
        for c in s.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn with_tracks(n: usize) -> ViewState {
        let mut state = ViewState::new("rules".to_string(), false);
        state.focus = Focus::Results;
        state.status = LlmStatus::Complete;
        state.tracks = (0..n)
            .map(|i| Track {
                title: format!("Song {i}"),
                lyrics: format!("lyrics {i}"),
                style: format!("style {i}"),
            })
            .collect();
        state
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut ev = key(KeyCode::Char('x'));
        ev.kind = KeyEventKind::Release;
        assert!(handle_key(ev, &mut state).is_none());
        assert!(state.brief.is_empty());
    }

    #[test]
    fn typing_edits_the_brief() {
        let mut state = ViewState::default();
        type_str(&mut state, "sad qt");
        handle_key(key(KeyCode::Backspace), &mut state);
        handle_key(key(KeyCode::Enter), &mut state);
        type_str(&mut state, "jazz");
        assert_eq!(state.brief, "sad q\njazz");
    }

    #[test]
    fn q_in_brief_is_text_not_quit() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert_eq!(state.brief, "q");
        assert!(!state.confirm_quit);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut state = ViewState::default();
        state.confirm_quit = true;
        assert_eq!(
            handle_key(ctrl('c'), &mut state),
            Some(InputAction::Command(UserCommand::Quit))
        );
    }

    #[test]
    fn ctrl_g_sends_generate_with_instructions() {
        let mut state = ViewState::new("my rules".to_string(), false);
        type_str(&mut state, "road trip anthems");
        let action = handle_key(ctrl('g'), &mut state);
        assert_eq!(
            action,
            Some(InputAction::Command(UserCommand::Generate {
                brief: "road trip anthems".to_string(),
                instructions: "my rules".to_string(),
            }))
        );
    }

    #[test]
    fn ctrl_g_is_disabled_without_key() {
        let mut state = ViewState::new("rules".to_string(), true);
        type_str(&mut state, "brief");
        assert!(handle_key(ctrl('g'), &mut state).is_none());
        assert!(state.notice.as_deref().unwrap().contains("no API key"));
    }

    #[test]
    fn ctrl_g_is_disabled_while_streaming() {
        let mut state = ViewState::default();
        type_str(&mut state, "brief");
        state.status = LlmStatus::Streaming;
        assert!(handle_key(ctrl('g'), &mut state).is_none());
    }

    #[test]
    fn ctrl_g_with_blank_brief_does_nothing() {
        let mut state = ViewState::default();
        type_str(&mut state, "   ");
        assert!(handle_key(ctrl('g'), &mut state).is_none());
        assert_eq!(state.notice.as_deref(), Some("Write a brief first"));
    }

    #[test]
    fn ctrl_e_toggles_instructions_and_tab_reaches_them() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Results, "collapsed editor is skipped");

        handle_key(ctrl('e'), &mut state);
        assert!(state.instructions_expanded);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Brief);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Instructions);
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.focus, Focus::Brief);

        handle_key(key(KeyCode::Tab), &mut state);
        handle_key(ctrl('e'), &mut state);
        assert!(!state.instructions_expanded);
        assert_eq!(state.focus, Focus::Brief, "focus leaves the collapsed editor");
    }

    #[test]
    fn ctrl_r_restores_default_instructions() {
        let mut state = ViewState::new("original".to_string(), false);
        state.instructions_expanded = true;
        state.focus = Focus::Instructions;
        type_str(&mut state, " edited");
        assert_eq!(state.instructions, "original edited");
        handle_key(ctrl('r'), &mut state);
        assert_eq!(state.instructions, "original");
    }

    #[test]
    fn selection_is_clamped() {
        let mut state = with_tracks(3);
        handle_key(key(KeyCode::Char('k')), &mut state);
        assert_eq!(state.selected, 0);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Char('j')), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.selected, 2);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn page_keys_scroll_detail() {
        let mut state = with_tracks(1);
        handle_key(key(KeyCode::PageDown), &mut state);
        assert_eq!(state.detail_scroll, PAGE_SCROLL);
        handle_key(key(KeyCode::PageUp), &mut state);
        handle_key(key(KeyCode::PageUp), &mut state);
        assert_eq!(state.detail_scroll, 0);
    }

    #[test]
    fn copy_keys_return_literal_fields() {
        let mut state = with_tracks(2);
        handle_key(key(KeyCode::Down), &mut state);

        let copy_text = |action: Option<InputAction>| match action {
            Some(InputAction::Copy { text, .. }) => text,
            other => panic!("expected copy, got {other:?}"),
        };

        assert_eq!(copy_text(handle_key(key(KeyCode::Char('t')), &mut state)), "Song 1");
        assert_eq!(copy_text(handle_key(key(KeyCode::Char('l')), &mut state)), "lyrics 1");
        assert_eq!(copy_text(handle_key(key(KeyCode::Char('s')), &mut state)), "style 1");
        assert_eq!(
            copy_text(handle_key(key(KeyCode::Char('a')), &mut state)),
            state.tracks[1].to_clipboard_text()
        );
    }

    #[test]
    fn copy_without_tracks_sets_notice() {
        let mut state = with_tracks(0);
        assert!(handle_key(key(KeyCode::Char('t')), &mut state).is_none());
        assert_eq!(state.notice.as_deref(), Some("No track selected"));
    }

    #[test]
    fn quit_confirmation_flow() {
        let mut state = with_tracks(0);
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert!(state.confirm_quit);

        // Other keys are blocked while the dialog is open.
        assert!(handle_key(key(KeyCode::Char('t')), &mut state).is_none());
        assert!(state.confirm_quit);

        handle_key(key(KeyCode::Esc), &mut state);
        assert!(!state.confirm_quit);

        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(InputAction::Command(UserCommand::Quit))
        );
    }

    #[test]
    fn esc_leaves_text_fields() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.focus, Focus::Results);
    }
}
