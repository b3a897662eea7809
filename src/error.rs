//! Error type shared by the decoder, the encoder and [`PropertyTable`](crate::PropertyTable).

use std::io;

use thiserror::Error;

use crate::Position;

/// Every failure this crate can report.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// Reading from or writing to the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes could not be decoded with the selected charset.
    #[error("invalid input encoding at {0}")]
    InvalidInput(Position),

    /// The input ended in the middle of a multi-byte character.
    #[error("input ended inside a multi-byte character at {0}")]
    UnexpectedEof(Position),

    /// A `\uXXXX` escape contained a character that is not a hexadecimal digit.
    #[error("malformed \\uxxxx encoding at {position}: {found:?} is not a hex digit")]
    MalformedUnicodeEscape { position: Position, found: char },

    /// The input ended before all four digits of a `\uXXXX` escape were read.
    #[error("malformed \\uxxxx encoding at {position}: input ended inside the escape")]
    TruncatedUnicodeEscape { position: Position },

    /// A `\uXXXX` escape produced a utf-16 surrogate that has no partner.
    #[error("unpaired utf-16 surrogate \\u{value:04X} at {position}")]
    UnpairedSurrogate { position: Position, value: u16 },

    /// A high surrogate escape was followed by an escape that is not a low surrogate.
    #[error("invalid utf-16 surrogate pair \\u{high:04X}\\u{low:04X} at {position}")]
    InvalidSurrogatePair {
        position: Position,
        high: u16,
        low: u16,
    },

    /// A strict lookup asked for a key that is not in the table.
    #[error("no property named {0:?}")]
    MissingKey(String),
}

impl PropertiesError {
    /// True for errors caused by a malformed `\uXXXX` escape sequence.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedUnicodeEscape { .. }
                | Self::TruncatedUnicodeEscape { .. }
                | Self::UnpairedSurrogate { .. }
                | Self::InvalidSurrogatePair { .. }
        )
    }

    /// Where in the input the error was detected, if it came from the decoder.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::InvalidInput(position)
            | Self::UnexpectedEof(position)
            | Self::MalformedUnicodeEscape { position, .. }
            | Self::TruncatedUnicodeEscape { position }
            | Self::UnpairedSurrogate { position, .. }
            | Self::InvalidSurrogatePair { position, .. } => Some(*position),
            Self::Io(_) | Self::MissingKey(_) => None,
        }
    }
}

/// Shorthand for results carrying a [`PropertiesError`].
pub type Result<T> = std::result::Result<T, PropertiesError>;
