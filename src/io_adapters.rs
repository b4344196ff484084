//! Sources of input lines for the read-eval loop.

use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Read, Write};

/// Size of the input line buffer. A line keeps at most `MAX_LINE - 1` bytes.
pub const MAX_LINE: usize = 100;

/// Result of one attempt at reading a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line without its terminator. May be empty.
    Line(String),
    /// The user interrupted the edit (Ctrl-C); nothing was entered.
    Interrupted,
    /// The input stream is exhausted.
    Eof,
}

/// Something that shows a prompt and hands back one line of input.
pub trait LineSource {
    /// Show `prompt` and read the next line.
    ///
    /// `stdout` is the stream the interpreter prints to; sources that draw their
    /// own prompt may ignore it.
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> io::Result<Input>;
}

/// Reads a line one byte at a time from any [`Read`] implementation.
///
/// Bytes past the line bound are discarded up to the next newline. A read error
/// ends the current line instead of failing.
pub struct ByteSource<R> {
    reader: R,
}

impl<R: Read> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("read error ends the line: {e}");
                    return None;
                }
            }
        }
    }
}

impl<R: Read> LineSource for ByteSource<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> io::Result<Input> {
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut buf = Vec::new();
        let mut saw_any = false;
        let mut dropped = 0usize;
        while let Some(byte) = self.next_byte() {
            saw_any = true;
            if byte == b'\n' {
                break;
            }
            if buf.len() < MAX_LINE - 1 {
                buf.push(byte);
            } else {
                dropped += 1;
            }
        }

        if !saw_any {
            return Ok(Input::Eof);
        }
        if dropped > 0 {
            debug!("input line truncated, {dropped} byte(s) dropped");
        }
        Ok(Input::Line(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Interactive line editing on a terminal, backed by rustyline.
///
/// Lines are bounded the same way as [`ByteSource`]. Entered lines are also
/// added to the editor's own recall list so arrow keys work.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str, _stdout: &mut dyn Write) -> io::Result<Input> {
        match self.editor.readline(prompt) {
            Ok(mut line) => {
                truncate_line(&mut line);
                if !line.is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        debug!("editor recall not updated: {err}");
                    }
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => {
                warn!("terminal read failed: {err}");
                Ok(Input::Eof)
            }
        }
    }
}

/// Cut `line` to at most `MAX_LINE - 1` bytes, on a character boundary.
fn truncate_line(line: &mut String) {
    if line.len() < MAX_LINE {
        return;
    }
    let mut end = MAX_LINE - 1;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    debug!("input line truncated from {} to {} bytes", line.len(), end);
    line.truncate(end);
}
