// Streaming client for the Anthropic Messages API.
//
// A request is sent with `stream: true`. Each Server-Sent Event is decoded
// into a typed `StreamPayload` and folded by a `StreamAccumulator`; the
// resulting steps become `LlmEvent`s on an mpsc channel. A request ends with
// exactly one `Complete` or `Error` event unless the receiver goes away first.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use suno_master_core::config::Config;
use suno_master_core::protocol::LlmEvent;

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    stream: bool,
    system: &'a str,
    messages: [WireMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// The `data:` payload of one streamed event, keyed by its `type` field.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    MessageStart {
        message: MessageStart,
    },
    ContentBlockDelta {
        delta: ContentDelta,
    },
    MessageDelta {
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Usage,
    },
    MessageStop,
    Error {
        error: ApiError,
    },
    /// `ping`, `content_block_start`, `content_block_stop` and anything new.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, PartialEq)]
struct MessageStart {
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize, PartialEq, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, PartialEq)]
struct MessageDeltaBody {
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ApiError {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    message: String,
}

impl ApiError {
    fn describe(&self) -> String {
        format!(
            "API error ({}): {}",
            self.kind.as_deref().unwrap_or("error"),
            self.message
        )
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

// ---------------------------------------------------------------------------
// Stream accumulation
// ---------------------------------------------------------------------------

/// What the client should do after one payload.
#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Token(String),
    Finished,
    Failed(String),
}

/// Running totals for one streamed response.
#[derive(Debug, Default)]
struct StreamAccumulator {
    text: String,
    input_tokens: u32,
    output_tokens: u32,
    stop_reason: Option<String>,
}

impl StreamAccumulator {
    fn apply(&mut self, payload: StreamPayload) -> Step {
        match payload {
            StreamPayload::MessageStart { message } => {
                self.input_tokens = message.usage.input_tokens;
                Step::Continue
            }
            StreamPayload::ContentBlockDelta {
                delta: ContentDelta::TextDelta { text },
            } => {
                self.text.push_str(&text);
                Step::Token(text)
            }
            StreamPayload::ContentBlockDelta { .. } => Step::Continue,
            StreamPayload::MessageDelta { delta, usage } => {
                self.output_tokens = usage.output_tokens;
                if delta.stop_reason.is_some() {
                    self.stop_reason = delta.stop_reason;
                }
                Step::Continue
            }
            StreamPayload::MessageStop => Step::Finished,
            StreamPayload::Error { error } => Step::Failed(error.describe()),
            StreamPayload::Other => Step::Continue,
        }
    }

    fn into_complete(self, generation: u64) -> LlmEvent {
        LlmEvent::Complete {
            full_text: self.text,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            stop_reason: self.stop_reason,
            generation,
        }
    }
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String, api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            api_url,
        }
    }

    fn open_stream(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
    ) -> Result<EventSource, reqwest_eventsource::CannotCloneRequestError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            stream: true,
            system,
            messages: [WireMessage {
                role: "user",
                content: user_content,
            }],
        };

        debug!(
            model = %self.model,
            max_tokens,
            system_len = system.len(),
            user_len = user_content.len(),
            "opening message stream"
        );

        self.http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .eventsource()
    }

    /// Send `user_content` under the `system` prompt and forward the streamed
    /// reply over `tx`, tagging every event with `generation`.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        let fail = |message: String| LlmEvent::Error {
            message,
            generation,
        };

        if self.api_key.is_empty() {
            let _ = tx.send(fail("API key not configured".to_string())).await;
            return Ok(());
        }

        let mut source = match self.open_stream(system, user_content, max_tokens) {
            Ok(source) => source,
            Err(e) => {
                let _ = tx
                    .send(fail(format!("Failed to create event source: {e}")))
                    .await;
                return Ok(());
            }
        };

        let mut acc = StreamAccumulator::default();

        while let Some(event) = source.next().await {
            let step = match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                    Step::Continue
                }
                Ok(Event::Message(msg)) => match serde_json::from_str::<StreamPayload>(&msg.data) {
                    Ok(payload) => {
                        trace!(event = %msg.event, "stream payload");
                        acc.apply(payload)
                    }
                    Err(e) => {
                        warn!(event = %msg.event, error = %e, "skipping undecodable stream payload");
                        Step::Continue
                    }
                },
                // The event source would reconnect; one request is one stream.
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(err) => Step::Failed(describe_transport_error(err).await),
            };

            match step {
                Step::Continue => {}
                Step::Token(text) => {
                    if tx.send(LlmEvent::Token { text, generation }).await.is_err() {
                        debug!("event receiver dropped, abandoning stream");
                        source.close();
                        return Ok(());
                    }
                }
                Step::Finished => {
                    source.close();
                    debug!(
                        input_tokens = acc.input_tokens,
                        output_tokens = acc.output_tokens,
                        stop_reason = ?acc.stop_reason,
                        "message stream finished"
                    );
                    let _ = tx.send(acc.into_complete(generation)).await;
                    return Ok(());
                }
                Step::Failed(message) => {
                    source.close();
                    warn!(%message, "message stream failed");
                    let _ = tx.send(fail(message)).await;
                    return Ok(());
                }
            }
        }
        source.close();

        // The connection closed before `message_stop`.
        let last = if acc.text.is_empty() {
            fail("Stream ended unexpectedly without any content".to_string())
        } else {
            warn!("stream closed before message_stop, keeping partial text");
            acc.into_complete(generation)
        };
        let _ = tx.send(last).await;
        Ok(())
    }
}

/// Turn an event-source failure into a one-line message, reading the API's
/// error body for non-2xx responses.
async fn describe_transport_error(err: reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorEnvelope>(&body).ok())
                .map(|env| format!(": {}", env.error.message))
                .unwrap_or_default();
            format!("API returned status {status}{detail}")
        }
        reqwest_eventsource::Error::Transport(e) => format!("Network error: {e}"),
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// LlmClient
// ---------------------------------------------------------------------------

/// The client the app holds: a configured Claude client, or `Disabled` when
/// there is no API key.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> Self {
        config.api_key().map_or(LlmClient::Disabled, |key| {
            LlmClient::Active(ClaudeClient::new(
                key.to_string(),
                config.llm.model.clone(),
                config.llm.api_url.clone(),
            ))
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        let LlmClient::Active(client) = self else {
            let _ = tx
                .send(LlmEvent::Error {
                    message: "LLM not configured".to_string(),
                    generation,
                })
                .await;
            return Ok(());
        };
        client
            .stream_message(system, user_content, max_tokens, tx, generation)
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
