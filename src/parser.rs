use crate::lexer::split_into_tokens;

/// The pipe operator separating the two halves of a piped invocation.
pub const PIPE_OP: char = '|';

/// What a (possibly alias-expanded) input line asks the engine to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Nothing to run: the line had no tokens and no pipe.
    Empty,

    /// A **single program** with its arguments, `argv[0]` being the program.
    Simple(Vec<String>),

    /// Two programs connected by the pipe operator (`|`).
    ///
    /// The standard output of `left` becomes the standard input of `right`.
    /// Either side may be empty when the user typed nothing next to the `|`.
    Pipe {
        /// Writer side of the pipe.
        left: Vec<String>,
        /// Reader side of the pipe.
        right: Vec<String>,
    },
}

/// Parse a line into an [`Invocation`].
///
/// Only the first `|` splits the line. Any further `|` stays in the right-hand
/// segment and reaches the right program as an ordinary argument; chains of
/// more than two programs are not supported.
pub fn parse_line(line: &str) -> Invocation {
    match line.split_once(PIPE_OP) {
        Some((left, right)) => Invocation::Pipe {
            left: split_into_tokens(left),
            right: split_into_tokens(right.trim_start_matches(' ')),
        },
        None => {
            let argv = split_into_tokens(line);
            if argv.is_empty() {
                Invocation::Empty
            } else {
                Invocation::Simple(argv)
            }
        }
    }
}
