// Application state and orchestration logic.
//
// The app loop sits between the TUI and the LLM task. It receives user
// commands, starts at most one generation request at a time, folds streamed
// LLM events into the current response, parses the finished text into
// tracks, and pushes `UiUpdate`s to the render loop.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use suno_master_core::config::Config;
use suno_master_core::prompt;
use suno_master_core::protocol::{GenerationResult, LlmEvent, LlmStatus, UiUpdate, UserCommand};
use suno_master_core::track::{parse_tracks, Track};
use suno_master_llm::LlmClient;

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

/// Shown when no API key is available. No request is ever sent in this state.
pub const MISSING_KEY_MESSAGE: &str =
    "No API key configured. Set ANTHROPIC_API_KEY or add config/credentials.toml, then restart.";

/// Shown for any network or provider failure. Details go to the log file.
pub const REQUEST_FAILED_MESSAGE: &str =
    "Generation failed. Check your connection and API key, then try again.";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Result of asking the app to start a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Started,
    /// A request is already in flight.
    Busy,
    EmptyBrief,
    NotConfigured,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    /// Shared with spawned request tasks.
    pub llm_client: Arc<LlmClient>,
    /// Spawned request tasks send their events through clones of this.
    pub llm_tx: mpsc::Sender<LlmEvent>,
    pub current_llm_task: Option<tokio::task::JoinHandle<()>>,
    /// Incremented for every request. Events tagged with an older value are
    /// discarded in `handle_llm_event`.
    pub llm_generation: u64,
    pub status: LlmStatus,
    pub raw_text: String,
    pub tracks: Vec<Track>,
}

impl AppState {
    pub fn new(config: Config, llm_client: LlmClient, llm_tx: mpsc::Sender<LlmEvent>) -> Self {
        AppState {
            config,
            llm_client: Arc::new(llm_client),
            llm_tx,
            current_llm_task: None,
            llm_generation: 0,
            status: LlmStatus::Idle,
            raw_text: String::new(),
            tracks: Vec::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status == LlmStatus::Streaming
    }

    pub fn cancel_llm_task(&mut self) {
        if let Some(handle) = self.current_llm_task.take() {
            handle.abort();
            info!("Cancelled in-flight generation request");
        }
    }

    /// Start a generation request for `brief` using `instructions` as the
    /// system prompt.
    ///
    /// Nothing is sent when the client is disabled, the brief is blank, or a
    /// previous request has not finished yet.
    pub fn trigger_generation(&mut self, brief: &str, instructions: &str) -> GenerateOutcome {
        if !self.llm_client.is_active() {
            return GenerateOutcome::NotConfigured;
        }
        if self.is_busy() {
            return GenerateOutcome::Busy;
        }
        if brief.trim().is_empty() {
            return GenerateOutcome::EmptyBrief;
        }

        self.llm_generation += 1;
        self.status = LlmStatus::Streaming;
        self.raw_text.clear();
        self.tracks.clear();

        let client = Arc::clone(&self.llm_client);
        let tx = self.llm_tx.clone();
        let generation = self.llm_generation;
        let max_tokens = self.config.llm.max_tokens;
        let system = instructions.to_string();
        let user_content = prompt::build_brief_prompt(brief);

        info!(
            generation,
            brief_len = brief.len(),
            instructions_len = system.len(),
            "Starting generation request"
        );

        let handle = tokio::spawn(async move {
            if let Err(e) = client
                .stream_message(&system, &user_content, max_tokens, tx, generation)
                .await
            {
                warn!("LLM task failed: {}", e);
            }
        });
        self.current_llm_task = Some(handle);

        GenerateOutcome::Started
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until the user quits or the command
/// channel closes.
pub async fn run(
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Once the LLM channel closes, stop polling it so select! doesn't spin.
    let mut llm_open = true;

    loop {
        tokio::select! {
            llm_event = llm_rx.recv(), if llm_open => {
                match llm_event {
                    Some(event) => handle_llm_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("LLM channel closed");
                        llm_open = false;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_llm_task();
    info!("Application event loop exiting");
    Ok(())
}

/// Fold one LLM event into the state and forward the matching UI update.
async fn handle_llm_event(state: &mut AppState, event: LlmEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    if event.generation() != state.llm_generation {
        debug!(
            "Discarding stale LLM event (event gen: {}, current gen: {})",
            event.generation(),
            state.llm_generation
        );
        return;
    }
    if state.status != LlmStatus::Streaming {
        debug!("Received LLM event with no request in flight, discarding");
        return;
    }

    match event {
        LlmEvent::Token { text, .. } => {
            state.raw_text.push_str(&text);
            let _ = ui_tx.send(UiUpdate::Token(text)).await;
        }
        LlmEvent::Complete {
            full_text,
            input_tokens,
            output_tokens,
            stop_reason,
            ..
        } => {
            let tracks = parse_tracks(&full_text);
            let truncated = stop_reason.as_deref() == Some("max_tokens");
            info!(
                tracks = tracks.len(),
                expected = prompt::TRACK_COUNT,
                input_tokens,
                output_tokens,
                truncated,
                "Generation complete"
            );
            if tracks.len() < prompt::TRACK_COUNT {
                debug!("Response held fewer complete tracks than requested");
            }

            state.raw_text = full_text.clone();
            state.tracks = tracks.clone();
            state.status = LlmStatus::Complete;
            state.current_llm_task = None;

            let result = GenerationResult {
                tracks,
                raw_text: full_text,
                input_tokens,
                output_tokens,
                truncated,
                finished_at: Local::now(),
            };
            let _ = ui_tx.send(UiUpdate::GenerationComplete(Box::new(result))).await;
        }
        LlmEvent::Error { message, .. } => {
            warn!("Generation request failed: {}", message);
            state.status = LlmStatus::Error;
            state.current_llm_task = None;
            let _ = ui_tx
                .send(UiUpdate::GenerationFailed(REQUEST_FAILED_MESSAGE.to_string()))
                .await;
        }
    }
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Generate {
            brief,
            instructions,
        } => match state.trigger_generation(&brief, &instructions) {
            GenerateOutcome::Started => {
                let _ = ui_tx.send(UiUpdate::GenerationStarted).await;
            }
            GenerateOutcome::NotConfigured => {
                warn!("Generate requested without an API key");
                let _ = ui_tx
                    .send(UiUpdate::GenerationFailed(MISSING_KEY_MESSAGE.to_string()))
                    .await;
            }
            GenerateOutcome::Busy => {
                info!("Generate ignored: a request is already in flight");
            }
            GenerateOutcome::EmptyBrief => {
                info!("Generate ignored: empty brief");
            }
        },
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
