use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::str::Utf8Error;

#[derive(Debug)]
pub enum NwAlignError {
    /// The score matrix passed to traceback does not match the sequence lengths
    MatrixDimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// No traceback step explains the score stored in the given cell, i.e., the matrix was built
    /// with a different scoring model than the one given to traceback
    InconsistentMatrix { row: usize, col: usize },

    /// A sequence contained a symbol outside the expected alphabet
    InvalidSymbol {
        record: String,
        position: usize,
        symbol: u8,
    },

    /// A substitution matrix file could not be parsed
    MatrixParseError(String),

    /// No built-in substitution matrix with the given name
    UnknownMatrix(String),

    /// Error variant when we couldn't read from a file
    FileReadError { source: io::Error },

    /// Sequence identifiers must be valid UTF-8
    Utf8Error(Utf8Error),

    /// Other IO errors
    IOError(io::Error),

    /// Other miscellaneous errors
    Other,
}

impl Error for NwAlignError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::FileReadError { ref source } => Some(source),
            Self::IOError(ref source) => Some(source),
            Self::Utf8Error(ref source) => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for NwAlignError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<Utf8Error> for NwAlignError {
    fn from(value: Utf8Error) -> Self {
        Self::Utf8Error(value)
    }
}

impl Display for NwAlignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::MatrixDimensionMismatch { expected_rows, expected_cols, rows, cols } =>
                write!(f, "Score matrix has dimensions {rows}x{cols}, but the sequences require {expected_rows}x{expected_cols}!"),
            Self::InconsistentMatrix { row, col } =>
                write!(f, "Score matrix cell ({row}, {col}) can't be explained by the given scoring model!"),
            Self::InvalidSymbol { ref record, position, symbol } =>
                write!(f, "Invalid symbol '{}' at position {position} of sequence {record}!", symbol.escape_ascii()),
            Self::MatrixParseError(ref msg) =>
                write!(f, "Could not parse substitution matrix: {msg}"),
            Self::UnknownMatrix(ref name) =>
                write!(f, "Unknown substitution matrix '{name}'!"),
            Self::FileReadError { source: _ } =>
                write!(f, "Could not read from file!"),
            Self::Utf8Error(ref err) =>
                write!(f, "Sequence name is not valid UTF-8: {err}"),
            Self::IOError(ref err) =>
                err.fmt(f),
            Self::Other =>
                write!(f, "nwalign error!")
        }
    }
}
