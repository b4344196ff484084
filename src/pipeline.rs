//! Runs a parsed [`Invocation`]: one program, or two programs joined by a pipe.

use crate::external::{Endpoint, ProcessService};
use crate::parser::Invocation;
use crate::style::{Color, Palette};
use log::debug;
use std::io::{self, Write};

const EXEC_ERROR: &str = "Error executing command";

/// Execute `invocation` and block until every program it started has exited.
///
/// Programs that fail to start are reported on `stdout` and treated as having
/// exited with status 1. Exit codes are not surfaced beyond the debug log.
pub(crate) fn execute<P: ProcessService>(
    processes: &mut P,
    invocation: Invocation,
    stdout: &mut dyn Write,
    palette: &Palette,
) -> io::Result<()> {
    match invocation {
        Invocation::Empty => Ok(()),
        Invocation::Simple(argv) => run_single(processes, &argv, stdout, palette),
        Invocation::Pipe { left, right } => run_pipe(processes, &left, &right, stdout, palette),
    }
}

fn run_single<P: ProcessService>(
    processes: &mut P,
    argv: &[String],
    stdout: &mut dyn Write,
    palette: &Palette,
) -> io::Result<()> {
    if let Some(child) = spawn_or_report(processes, argv, Endpoint::Terminal, Endpoint::Terminal, stdout, palette)? {
        let code = processes.wait(child)?;
        debug!("{:?} finished with {}", argv, code);
    }
    Ok(())
}

fn run_pipe<P: ProcessService>(
    processes: &mut P,
    left: &[String],
    right: &[String],
    stdout: &mut dyn Write,
    palette: &Palette,
) -> io::Result<()> {
    let (reader, writer) = io::pipe()?;

    // Both ends move into the spawns; after the second one the parent holds
    // neither, so the reader sees end-of-input as soon as the writer exits.
    let writer_child = spawn_or_report(
        processes,
        left,
        Endpoint::Terminal,
        Endpoint::PipeWrite(writer),
        stdout,
        palette,
    )?;
    let reader_child = spawn_or_report(
        processes,
        right,
        Endpoint::PipeRead(reader),
        Endpoint::Terminal,
        stdout,
        palette,
    )?;

    // Reap both children before reporting a failed wait, so neither is left defunct.
    let mut first_error = None;
    for child in [writer_child, reader_child].into_iter().flatten() {
        match processes.wait(child) {
            Ok(code) => debug!("pipe member finished with {}", code),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Spawn `argv`, printing the execution error if the program cannot start.
fn spawn_or_report<P: ProcessService>(
    processes: &mut P,
    argv: &[String],
    stdin: Endpoint,
    child_stdout: Endpoint,
    stdout: &mut dyn Write,
    palette: &Palette,
) -> io::Result<Option<P::Handle>> {
    // Anything we printed must reach the terminal before the child writes to it.
    stdout.flush()?;
    match processes.spawn(argv, stdin, child_stdout) {
        Ok(child) => Ok(Some(child)),
        Err(err) => {
            debug!("failed to start {:?}: {}", argv, err);
            writeln!(stdout, "{}", palette.paint(Color::Red, EXEC_ERROR))?;
            Ok(None)
        }
    }
}
