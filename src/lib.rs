//! A small interactive command interpreter.
//!
//! This crate reads one line at a time, runs it either as a built-in command
//! implemented in Rust or as an external program, and keeps a bounded history of
//! what was typed. Two programs can be connected with a single `|`.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`],
//! [`env`], [`external`] and [`io_adapters`] expose the seams used to plug in a
//! different process service, clock or input source (tests use these to run the
//! interpreter without a terminal).

mod builtin;
pub mod clock;
pub mod command;
pub mod env;
pub mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod options;
pub mod parser;
mod pipeline;
pub mod style;

/// Convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
