//! Typed error taxonomy for the engine.
//!
//! Load-time problems (malformed scripts, unknown module kinds, broken
//! transition tables) are fatal for the affected cell and surface as
//! `ScriptError`/`AutomatonError`. Runtime "no match" never raises; it is
//! an ordinary [`crate::Code`] with `score == 0`.

use thiserror::Error;

/// A script document failed validation. Fatal at load time; the offending
/// cell must not be activated.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script is empty")]
    Empty,

    #[error("line {line}: \"in\" is missing or empty")]
    BadInput { line: usize },

    #[error("line {line}: \"out\" is missing or empty")]
    BadOutput { line: usize },

    #[error("line {line}: intent \"{intent}\" is already defined")]
    DuplicateIntent { line: usize, intent: String },

    #[error("line {line}: invalid pattern \"{pattern}\": {message}")]
    BadPattern {
        line: usize,
        pattern: String,
        message: String,
    },

    #[error("unknown module kind \"{0}\"")]
    UnknownKind(String),

    #[error("cell \"{0}\" appears more than once")]
    DuplicateCell(String),
}

/// A pushdown automaton misbehaved. Always a configuration bug, never
/// retried or swallowed.
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("loop cap exceeded in table \"{table}\" while reading \"{at}\"")]
    LoopCap { table: String, at: String },

    #[error("malformed transition table \"{table}\": {message}")]
    BadTable { table: String, message: String },
}
