//! Error type shared by every stage of a run.

use thiserror::Error;

/// Errors that abort a run.
///
/// Cards that fail the search gate or have an empty directive are not
/// errors; they simply produce no output.
#[derive(Debug, Error)]
pub enum VcfError {
    /// The format string ended after `%` (or `%+`) with no directive character.
    #[error("unexpected end of format string")]
    UnterminatedDirective,

    /// A directive character with no entry in the directive table.
    #[error("unknown formatting directive {0:?}")]
    UnknownDirective(char),

    /// A second modifier appeared before the directive character.
    #[error("already using modifier {0:?}")]
    DuplicateModifier(char),

    /// A `-d` entry that is not of the form `K=FIELD`.
    #[error("{0:?} is not of the format RUNE=FIELD")]
    MalformedDirectiveEntry(String),

    /// A `-s` entry that names no field.
    #[error("search fields cannot be empty")]
    EmptySearchField,

    /// The card stream is not well formed.
    #[error("could not read card: line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VcfError>;
