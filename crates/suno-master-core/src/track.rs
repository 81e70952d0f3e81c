// Track records and the model-response parser.
//
// The model is asked to emit each song as a delimited block:
//
//   [[START_TRACK]]
//   TITLE: <title>
//   LYRICS:
//   <lyrics, any number of lines>
//   STYLE_PROMPT: <style>
//   [[END_TRACK]]
//
// `parse_tracks` scans the response once and keeps only the blocks that carry
// all three fields. Anything outside a block (preamble chatter, closing
// remarks, text between blocks) is ignored.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

pub const START_MARKER: &str = "[[START_TRACK]]";
pub const END_MARKER: &str = "[[END_TRACK]]";
pub const TITLE_MARKER: &str = "TITLE:";
pub const LYRICS_MARKER: &str = "LYRICS:";
pub const STYLE_MARKER: &str = "STYLE_PROMPT:";

// TITLE: and STYLE_PROMPT: only count at the start of a line (leading
// blanks allowed), so `SUBTITLE:` or a lyric mentioning a marker mid-line
// is not mistaken for a field.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*TITLE:[ \t]*([^\r\n]*)").expect("valid title regex")
});

static LYRICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)LYRICS:(.*?)^[ \t]*STYLE_PROMPT:").expect("valid lyrics regex")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*STYLE_PROMPT:[ \t]*([^\r\n]*)").expect("valid style regex")
});

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// One song extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub lyrics: String,
    /// Style prompt to paste into the music generator.
    pub style: String,
}

impl Track {
    /// All three fields as a single block, for the "copy all" action.
    pub fn to_clipboard_text(&self) -> String {
        format!(
            "{TITLE_MARKER} {}\n\n{LYRICS_MARKER}\n{}\n\n{STYLE_MARKER} {}",
            self.title, self.lyrics, self.style
        )
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Extract every well-formed track block from `text`.
///
/// Text before the first start marker is discarded, and each segment is cut
/// at its end marker. A segment whose title, lyrics or style is missing or
/// blank is dropped; no partially filled `Track` is ever returned.
/// Returns an empty `Vec` when nothing matches.
pub fn parse_tracks(text: &str) -> Vec<Track> {
    let mut tracks = Vec::new();

    for (index, raw_segment) in text.split(START_MARKER).skip(1).enumerate() {
        let segment = match raw_segment.find(END_MARKER) {
            Some(end) => &raw_segment[..end],
            None => raw_segment,
        };

        match parse_segment(segment) {
            Some(track) => tracks.push(track),
            None => debug!(segment = index, "dropping incomplete track segment"),
        }
    }

    tracks
}

/// Parse the body of a single segment (markers already stripped).
fn parse_segment(segment: &str) -> Option<Track> {
    Some(Track {
        title: field(&TITLE_RE, segment)?,
        lyrics: field(&LYRICS_RE, segment)?,
        style: field(&STYLE_RE, segment)?,
    })
}

/// First capture of `re`, trimmed. A blank value counts as absent.
fn field(re: &Regex, segment: &str) -> Option<String> {
    let value = re.captures(segment)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
