// Instruction preamble and user-turn prompt for track generation.
//
// The preamble is sent as the system prompt and defines the block grammar
// that `track::parse_tracks` understands. Users may edit it at runtime; the
// brief is always sent separately as the user turn.

use crate::track::{END_MARKER, LYRICS_MARKER, START_MARKER, STYLE_MARKER, TITLE_MARKER};

/// Number of tracks the preamble asks the model for.
pub const TRACK_COUNT: usize = 10;

/// Built-in instruction preamble.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are a professional songwriter and music producer writing material for an AI music generator.

From the user's brief, write exactly 10 original songs. Every song must follow the brief's theme, mood, language and genre unless the brief says otherwise.

Output each song as one block in exactly this format, with no markdown and no extra commentary:

[[START_TRACK]]
TITLE: <song title>
LYRICS:
<full lyrics, using structure tags such as [Intro], [Verse], [Pre-Chorus], [Chorus], [Bridge], [Outro]>
STYLE_PROMPT: <one line, comma separated: genre, sub-genre, mood, tempo, key instruments, vocal type>
[[END_TRACK]]

Rules:
- The STYLE_PROMPT line must stay under 200 characters and must not name real artists.
- Lyrics go between LYRICS: and STYLE_PROMPT: and nowhere else.
- Do not number the blocks and do not write anything between them.";

/// Build the user turn for a generation request.
///
/// The brief is trimmed; an empty brief is the caller's responsibility to
/// reject before reaching this point.
pub fn build_brief_prompt(brief: &str) -> String {
    let mut prompt = String::with_capacity(brief.len() + 256);
    prompt.push_str("## BRIEF\n");
    prompt.push_str(brief.trim());
    prompt.push_str("\n\n## OUTPUT\n");
    prompt.push_str(&format!(
        "Write {TRACK_COUNT} songs. Wrap each one in {START_MARKER} / {END_MARKER} and \
         use the {TITLE_MARKER}, {LYRICS_MARKER} and {STYLE_MARKER} fields.\n"
    ));
    prompt
}

/// Resolve the instruction preamble: a custom text if one was loaded from
/// config, the built-in default otherwise.
pub fn default_instructions(custom: Option<&str>) -> String {
    match custom {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => DEFAULT_INSTRUCTIONS.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
