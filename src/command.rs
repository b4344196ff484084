use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children terminated by a signal are reported as `128 + signal`, the way
/// POSIX shells do.
pub type ExitCode = i32;

/// What the read-eval loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Print the next prompt.
    Continue,
    /// Leave the loop; the interpreter process then ends with status 0.
    Exit,
}

/// Object-safe trait for a command recognised by the dispatcher.
///
/// Built-ins implement it through a blanket impl in the `builtin` module.
pub trait ExecutableCommand {
    /// Executes the command, writing any output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

/// Factory that tries to recognise a raw input line as one command.
///
/// Returns `None` when the line is not an invocation of the command this
/// factory knows about, letting the next factory in line have a look.
pub trait CommandFactory {
    /// Attempt to create a command instance for the raw, untokenized `line`.
    fn try_create(&self, line: &str) -> Option<Box<dyn ExecutableCommand>>;
}
