//! ANSI colors for prompts and messages.

use std::fmt;

/// Clears the screen and moves the cursor to the top-left corner.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
    White,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::White => "\x1b[37m",
        }
    }
}

/// Decides whether text gets wrapped in color escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn colored() -> Self {
        Self { enabled: true }
    }

    /// A palette that leaves text untouched.
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn paint<'a>(&self, color: Color, text: &'a str) -> Painted<'a> {
        Painted {
            color: self.enabled.then_some(color),
            text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::colored()
    }
}

/// Text that renders with its color codes through [`fmt::Display`].
pub struct Painted<'a> {
    color: Option<Color>,
    text: &'a str,
}

impl fmt::Display for Painted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{}{}{}", color.code(), self.text, RESET),
            None => f.write_str(self.text),
        }
    }
}
