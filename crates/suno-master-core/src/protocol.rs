// Message types passed between the LLM task, the app orchestrator and the TUI.

use chrono::{DateTime, Local};

use crate::track::Track;

// ---------------------------------------------------------------------------
// LLM -> app
// ---------------------------------------------------------------------------

/// Events emitted by a streaming LLM request.
///
/// Every variant carries the generation counter of the request that produced
/// it so the receiver can drop events from a superseded request.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    Token {
        text: String,
        generation: u64,
    },
    Complete {
        full_text: String,
        input_tokens: u32,
        output_tokens: u32,
        stop_reason: Option<String>,
        generation: u64,
    },
    Error {
        message: String,
        generation: u64,
    },
}

impl LlmEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LlmEvent::Token { generation, .. }
            | LlmEvent::Complete { generation, .. }
            | LlmEvent::Error { generation, .. } => *generation,
        }
    }
}

/// Lifecycle of the current generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Error,
}

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Send the brief with the given instruction preamble.
    Generate { brief: String, instructions: String },
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

/// Outcome of a completed request, parsed and ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub tracks: Vec<Track>,
    pub raw_text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// The model hit the token limit before finishing.
    pub truncated: bool,
    pub finished_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    GenerationStarted,
    Token(String),
    GenerationComplete(Box<GenerationResult>),
    /// User-facing failure message.
    GenerationFailed(String),
}
