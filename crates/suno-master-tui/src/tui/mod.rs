// Terminal UI: view state, layout, input handling and widget rendering.
//
// The TUI owns a `ViewState` holding everything it draws. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them and re-renders at ~30 fps. Key presses either edit the view
// state locally, copy text to the clipboard, or become `UserCommand`s.

pub mod clipboard;
pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use suno_master_core::prompt::DEFAULT_INSTRUCTIONS;
use suno_master_core::protocol::{LlmStatus, UiUpdate, UserCommand};
use suno_master_core::track::Track;

use input::InputAction;
use layout::build_layout;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which panel receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Brief,
    Instructions,
    Results,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

pub struct ViewState {
    /// The user's free-text brief.
    pub brief: String,
    /// Instruction preamble sent as the system prompt; editable.
    pub instructions: String,
    /// What `Ctrl+R` restores the preamble to.
    pub default_instructions: String,
    pub instructions_expanded: bool,
    pub focus: Focus,
    pub status: LlmStatus,
    /// Streamed (then final) response text.
    pub raw_text: String,
    pub tracks: Vec<Track>,
    /// Index into `tracks` of the highlighted row.
    pub selected: usize,
    pub detail_scroll: usize,
    /// No API key: show a warning and keep generation disabled.
    pub credential_missing: bool,
    pub error_message: Option<String>,
    /// One-line feedback in the help bar (copy confirmations and the like).
    pub notice: Option<String>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub truncated: bool,
    pub finished_at: Option<DateTime<Local>>,
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(DEFAULT_INSTRUCTIONS.to_string(), false)
    }
}

impl ViewState {
    pub fn new(default_instructions: String, credential_missing: bool) -> Self {
        ViewState {
            brief: String::new(),
            instructions: default_instructions.clone(),
            default_instructions,
            instructions_expanded: false,
            focus: Focus::Brief,
            status: LlmStatus::Idle,
            raw_text: String::new(),
            tracks: Vec::new(),
            selected: 0,
            detail_scroll: 0,
            credential_missing,
            error_message: None,
            notice: None,
            input_tokens: 0,
            output_tokens: 0,
            truncated: false,
            finished_at: None,
            confirm_quit: false,
        }
    }

    /// Generation is allowed only with a key, with no request in flight, and
    /// with a non-blank brief.
    pub fn can_generate(&self) -> bool {
        !self.credential_missing
            && self.status != LlmStatus::Streaming
            && !self.brief.trim().is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::GenerationStarted => {
            state.status = LlmStatus::Streaming;
            state.raw_text.clear();
            state.tracks.clear();
            state.selected = 0;
            state.detail_scroll = 0;
            state.error_message = None;
            state.truncated = false;
            state.input_tokens = 0;
            state.output_tokens = 0;
            state.finished_at = None;
            state.focus = Focus::Results;
        }
        UiUpdate::Token(token) => {
            state.raw_text.push_str(&token);
            state.status = LlmStatus::Streaming;
        }
        UiUpdate::GenerationComplete(result) => {
            let result = *result;
            state.tracks = result.tracks;
            state.raw_text = result.raw_text;
            state.input_tokens = result.input_tokens;
            state.output_tokens = result.output_tokens;
            state.truncated = result.truncated;
            state.finished_at = Some(result.finished_at);
            state.selected = 0;
            state.detail_scroll = 0;
            state.status = LlmStatus::Complete;
        }
        UiUpdate::GenerationFailed(message) => {
            state.status = LlmStatus::Error;
            state.error_message = Some(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let show_banner = state.credential_missing || state.error_message.is_some();
    let layout = build_layout(frame.area(), show_banner, state.instructions_expanded);

    widgets::status_bar::render(frame, layout.status_bar, state);
    if let Some(area) = layout.banner {
        widgets::banner::render(frame, area, state);
    }
    widgets::brief_input::render(frame, layout.brief, state, state.focus == Focus::Brief);
    widgets::instructions::render(
        frame,
        layout.instructions,
        state,
        state.focus == Focus::Instructions,
    );
    widgets::track_list::render(frame, layout.track_list, state, state.focus == Focus::Results);
    widgets::track_detail::render(frame, layout.track_detail, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the app loop goes away.
///
/// Takes over the terminal (raw mode, alternate screen), installs a panic
/// hook that restores it, and restores it again on a clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        debug!("UI channel closed, leaving TUI loop");
                        break;
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        match input::handle_key(key_event, &mut view_state) {
                            Some(InputAction::Command(UserCommand::Quit)) => {
                                let _ = cmd_tx.send(UserCommand::Quit).await;
                                break;
                            }
                            Some(InputAction::Command(cmd)) => {
                                if cmd_tx.send(cmd).await.is_err() {
                                    warn!("App loop is gone, leaving TUI loop");
                                    break;
                                }
                            }
                            Some(InputAction::Copy { description, text }) => {
                                view_state.notice = Some(match clipboard::copy_to_clipboard(&text) {
                                    Ok(()) => format!("Copied {description}"),
                                    Err(e) => {
                                        warn!("Clipboard write failed: {}", e);
                                        format!("Clipboard write failed: {e}")
                                    }
                                });
                            }
                            None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
