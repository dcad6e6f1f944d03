//! Turn-protocol runner for the dominion decision engine.
//!
//! Wires [`dominion_core`] to the line-oriented game protocol: a token
//! reader over stdin, a command formatter for stdout, and the
//! read-decide-write loop in between. Logs go to stderr; stdout is
//! reserved for commands.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod formatter;
pub mod protocol;
pub mod runner;
