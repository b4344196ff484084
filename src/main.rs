use anyhow::Result;
use log::debug;
use pipesh::Interpreter;
use pipesh::env::Environment;
use pipesh::external::OsProcessService;
use pipesh::io_adapters::{ByteSource, EditorSource, LineSource};
use pipesh::options::Options;
use std::io::{self, IsTerminal, Read};

/// Standard input without std's read-ahead buffer, so bytes after the current
/// line stay available to the programs we start.
#[cfg(unix)]
fn unbuffered_stdin() -> io::Result<Box<dyn Read>> {
    use std::os::fd::AsFd;
    let fd = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(Box::new(std::fs::File::from(fd)))
}

#[cfg(not(unix))]
fn unbuffered_stdin() -> io::Result<Box<dyn Read>> {
    Ok(Box::new(io::stdin()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options: Options = argh::from_env();
    debug!("starting with {options:?}");

    let env = Environment::new(&options)?;
    let mut sh: Interpreter = Interpreter::with_builtins(env, OsProcessService::from_env());
    let mut stdout = io::stdout();

    let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
        Box::new(EditorSource::new()?)
    } else {
        Box::new(ByteSource::new(unbuffered_stdin()?))
    };

    sh.banner(&mut stdout)?;
    sh.repl(source.as_mut(), &mut stdout)
}
