// Clipboard writes through the terminal's OSC 52 escape sequence.

use std::io::{self, Write};

use crossterm::clipboard::CopyToClipboard;
use crossterm::execute;

/// Copy `text` to the system clipboard via the controlling terminal.
pub fn copy_to_clipboard(text: &str) -> io::Result<()> {
    copy_to(&mut io::stdout(), text)
}

pub fn copy_to<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    execute!(out, CopyToClipboard::to_clipboard_from(text))
}
