use crate::clock::wall_time;
use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::lexer::split_into_tokens;
use crate::style::{CLEAR_SCREEN, Color};
use anyhow::Result;
use std::borrow::Cow;
use std::io::Write;
use thiserror::Error;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are recognised from the raw input line, before it is tokenized,
/// and executed directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Recognise `line` as an invocation of this command.
    fn parse(line: &str) -> Option<Self>;

    /// Runs the command, writing its output to `stdout`.
    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        (*self).run(stdout, env)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, line: &str) -> Option<Box<dyn ExecutableCommand>> {
        T::parse(line).map(|cmd| Box::new(cmd) as Box<dyn ExecutableCommand>)
    }
}

/// Rewrite the aliases that stand for external programs.
///
/// `list` becomes `ls` and `read <path>` becomes `cat <path>`; every other line
/// is returned unchanged. The result goes through pipe detection as if typed.
pub(crate) fn expand_alias(line: &str) -> Cow<'_, str> {
    if line == "list" {
        return Cow::Borrowed("ls");
    }
    match line.strip_prefix("read ") {
        Some(path) => Cow::Owned(format!("cat {path}")),
        None => Cow::Borrowed(line),
    }
}

/// Leave the interpreter.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn parse(line: &str) -> Option<Self> {
        (line == "exit").then_some(Exit)
    }

    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "{}", env.palette.paint(Color::White, "\nShutting down..."))?;
        Ok(Flow::Exit)
    }
}

/// Clear the terminal.
pub struct Clear;

impl BuiltinCommand for Clear {
    fn parse(line: &str) -> Option<Self> {
        (line == "clear").then_some(Clear)
    }

    fn run(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        write!(stdout, "{CLEAR_SCREEN}")?;
        Ok(Flow::Continue)
    }
}

/// Print the most recent input lines with their sequence numbers.
pub struct ShowHistory;

impl BuiltinCommand for ShowHistory {
    fn parse(line: &str) -> Option<Self> {
        (line == "history").then_some(ShowHistory)
    }

    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "{}", env.palette.paint(Color::Cyan, "\nLast commands:"))?;
        for entry in env.history.list_recent() {
            writeln!(stdout, "{}  {}", entry.number, entry.line)?;
        }
        writeln!(stdout)?;
        Ok(Flow::Continue)
    }
}

const HELP_ENTRIES: &[&str] = &[
    "list",
    "read <file>",
    "calc n1 op n2",
    "time",
    "history",
    "clear",
    "help",
    "exit",
    "<program> [args] | <program> [args]",
];

/// Print the available commands.
pub struct Help;

impl BuiltinCommand for Help {
    fn parse(line: &str) -> Option<Self> {
        (line == "help").then_some(Help)
    }

    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "{}", env.palette.paint(Color::Cyan, "\nAvailable commands"))?;
        for entry in HELP_ENTRIES {
            writeln!(stdout, "{entry}")?;
        }
        writeln!(stdout)?;
        Ok(Flow::Continue)
    }
}

/// Why `calc` could not produce a result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("Usage: calc n1 op n2")]
    Usage,
    #[error("Invalid number: {0}")]
    InvalidOperand(String),
    /// Unsupported operator, division by zero or overflow.
    #[error("Invalid operation")]
    InvalidOperation,
}

/// Integer arithmetic: `calc <n1> <op> <n2>` with `op` one of `+ - * /`.
///
/// Only the first character of the operator token counts. Tokens after the
/// second operand are ignored.
pub struct Calc {
    args: Vec<String>,
}

impl Calc {
    fn evaluate(&self) -> Result<i64, CalcError> {
        let [lhs, op, rhs, ..] = self.args.as_slice() else {
            return Err(CalcError::Usage);
        };
        let a = parse_operand(lhs)?;
        let b = parse_operand(rhs)?;

        let value = match op.chars().next() {
            Some('+') => a.checked_add(b),
            Some('-') => a.checked_sub(b),
            Some('*') => a.checked_mul(b),
            Some('/') => a.checked_div(b),
            _ => None,
        };
        value.ok_or(CalcError::InvalidOperation)
    }
}

fn parse_operand(token: &str) -> Result<i64, CalcError> {
    token
        .parse()
        .map_err(|_| CalcError::InvalidOperand(token.to_string()))
}

impl BuiltinCommand for Calc {
    fn parse(line: &str) -> Option<Self> {
        line.strip_prefix("calc ").map(|rest| Calc {
            args: split_into_tokens(rest),
        })
    }

    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        match self.evaluate() {
            Ok(value) => writeln!(stdout, "{}{}", env.palette.paint(Color::Yellow, "Result: "), value)?,
            Err(err) => writeln!(stdout, "{}", env.palette.paint(Color::Red, &err.to_string()))?,
        }
        Ok(Flow::Continue)
    }
}

/// Print the simulated time of day as `HH:MM:SS`.
pub struct Time;

impl BuiltinCommand for Time {
    fn parse(line: &str) -> Option<Self> {
        (line == "time").then_some(Time)
    }

    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let now = wall_time(env.clock.uptime_ticks(), env.start_time);
        writeln!(stdout, "{}{}", env.palette.paint(Color::Yellow, "Current time: "), now)?;
        Ok(Flow::Continue)
    }
}
