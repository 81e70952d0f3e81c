// Streaming Claude client for track generation.

pub mod client;

pub use client::{ClaudeClient, LlmClient};
