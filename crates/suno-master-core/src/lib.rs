// Core types shared by the LLM client and the terminal UI: track parsing,
// prompt text, configuration, and the inter-task message protocol.

pub mod config;
pub mod prompt;
pub mod protocol;
pub mod track;

pub use track::{parse_tracks, Track};
