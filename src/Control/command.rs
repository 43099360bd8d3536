//! Console-surface error taxonomy.

use std::fmt;

/// Errors surfaced by the command router and handlers. These are ordinary
/// replies to the administrative caller; nothing here mutates state.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleError {
    EmptyLine,
    UnknownCommand,
    MissingArgument(&'static str),
    UnexpectedArgument(&'static str),
    InvalidValue(&'static str),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLine => write!(f, "empty command"),
            Self::UnknownCommand => write!(f, "unsupported command"),
            Self::MissingArgument(arg) => write!(f, "missing required argument: {arg}"),
            Self::UnexpectedArgument(arg) => write!(f, "unexpected argument after {arg}"),
            Self::InvalidValue(arg) => write!(f, "invalid value for argument {arg}"),
        }
    }
}

impl std::error::Error for ConsoleError {}
