//! Error types for parsing and writing database files.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The structural violation that aborted a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// A `DATA` row appeared before any `CLASS` marker.
    #[error("DATA found before CLASS")]
    DataBeforeClass,

    /// A `DATA` row appeared in a class that has no `FORMAT` yet.
    #[error("DATA found before FORMAT")]
    DataBeforeFormat,

    /// The text after the `DATA` keyword does not start with `|`.
    #[error("DATA row must start with '|'")]
    MissingSeparator,
}

/// A fatal parse failure with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    /// Name of the class being read when the fault was found, if any.
    pub class: Option<String>,
    pub fault: Fault,
}

impl ParseError {
    pub(crate) fn new(line: usize, class: Option<&str>, fault: Fault) -> Self {
        Self {
            line,
            class: class.map(str::to_string),
            fault,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.fault)?;
        if let Some(ref class) = self.class {
            write!(f, " in class '{}'", class)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum DatError {
    /// The file violates the grammar; it should be treated as not loaded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Reading or writing a database file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A convenience `Result` alias using [`DatError`].
pub type Result<T> = std::result::Result<T, DatError>;
