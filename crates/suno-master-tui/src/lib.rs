// Suno Master Pro: terminal front end and app orchestrator.

pub mod app;
pub mod tui;
