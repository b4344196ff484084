use crate::clock::{Clock, SystemClock};
use crate::history::History;
use crate::options::Options;
use crate::style::Palette;
use anyhow::{Context, Result};
use std::num::NonZeroUsize;

/// State shared by every command the interpreter runs.
///
/// The environment contains:
/// - `history`: the bounded log of lines typed in this session.
/// - `clock`: where the `time` command reads the uptime from.
/// - `palette`: whether messages are colored.
/// - `start_time`: seconds past midnight assumed at boot.
///
/// It lives exactly as long as the interpreter that owns it; nothing here is
/// persisted across restarts.
pub struct Environment {
    pub history: History,
    pub clock: Box<dyn Clock>,
    pub palette: Palette,
    pub start_time: i64,
}

impl Environment {
    /// Build the environment described by the command-line `options`.
    pub fn new(options: &Options) -> Result<Self> {
        let capacity = NonZeroUsize::new(options.history_size)
            .context("history size must be greater than zero")?;
        let palette = if options.no_color {
            Palette::plain()
        } else {
            Palette::colored()
        };
        Ok(Self {
            history: History::new(capacity),
            clock: Box::new(SystemClock::new()),
            palette,
            start_time: options.start_time,
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            history: History::default(),
            clock: Box::new(SystemClock::new()),
            palette: Palette::default(),
            start_time: 0,
        }
    }
}
