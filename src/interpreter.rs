use crate::builtin::expand_alias;
use crate::command::{CommandFactory, Flow};
use crate::env::Environment;
use crate::external::{OsProcessService, ProcessService};
use crate::io_adapters::{Input, LineSource};
use crate::parser::parse_line;
use crate::pipeline;
use crate::style::Color;
use log::debug;
use std::io::Write;

/// Text shown before every line is read.
pub const PROMPT: &str = "pipesh ❯ ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, i.e. implementors of `BuiltinCommand`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that runs built-in and external commands.
///
/// The interpreter owns an [`Environment`] (history, clock, colors), an ordered
/// list of [`CommandFactory`] objects consulted for built-ins, and the
/// [`ProcessService`] that starts everything else.
///
/// Example
/// ```no_run
/// use pipesh::Interpreter;
/// let mut sh: Interpreter = Interpreter::default();
/// sh.eval("calc 4 + 5", &mut std::io::stdout()).unwrap();
/// ```
pub struct Interpreter<P: ProcessService = OsProcessService> {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    processes: P,
}

impl<P: ProcessService> Interpreter<P> {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>, processes: P) -> Self {
        Self {
            env,
            commands,
            processes,
        }
    }

    /// Create an interpreter with the built-in commands and the given services.
    pub fn with_builtins(env: Environment, processes: P) -> Self {
        Self::new(env, builtin_factories(), processes)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Handle one input line.
    ///
    /// Non-empty lines are recorded in the history first. Built-ins are tried
    /// in order; anything else is alias-expanded and handed to the process
    /// service, and this call returns once every started program has exited.
    pub fn eval(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        self.env.history.record(line);

        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(line) {
                debug!("built-in: {line:?}");
                return cmd.execute(stdout, &mut self.env);
            }
        }

        let line = expand_alias(line);
        let invocation = parse_line(&line);
        debug!("running {invocation:?}");
        pipeline::execute(&mut self.processes, invocation, stdout, &self.env.palette)?;
        Ok(Flow::Continue)
    }

    /// Print the greeting shown once at startup.
    pub fn banner(&self, stdout: &mut dyn Write) -> std::io::Result<()> {
        writeln!(stdout, "{}", self.env.palette.paint(Color::Cyan, "WELCOME TO PIPESH"))?;
        writeln!(stdout, "Type 'help' to see the available commands\n")
    }

    /// Read-Eval-Print Loop.
    ///
    /// Runs until the `exit` built-in is entered or `source` runs out of input.
    /// Errors from a single line are printed and the loop carries on.
    pub fn repl(&mut self, source: &mut dyn LineSource, stdout: &mut dyn Write) -> anyhow::Result<()> {
        let prompt = self.env.palette.paint(Color::Green, PROMPT).to_string();

        loop {
            let line = match source.read_line(&prompt, stdout)? {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Eof => {
                    debug!("end of input");
                    return Ok(());
                }
            };

            match self.eval(&line, stdout) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(err) => {
                    let message = format!("Error: {err:#}");
                    writeln!(stdout, "{}", self.env.palette.paint(Color::Red, &message))?;
                }
            }
            stdout.flush()?;
        }
    }
}

/// Built-ins in dispatch order.
fn builtin_factories() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<ShowHistory>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Calc>::default()),
        Box::new(Factory::<Time>::default()),
    ]
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `clear`, `history`, `help`, `calc`, `time`
    /// - external programs resolved through `PATH`
    fn default() -> Self {
        Self::with_builtins(Environment::default(), OsProcessService::from_env())
    }
}
