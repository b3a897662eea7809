//! Byte level code pages.
//!
//! The decoder and encoder only deal in `char`s. These adapters sit between them and a byte
//! stream: ISO-8859-1 is what `Properties#load(InputStream)` and `Properties#store(OutputStream)`
//! use, UTF-8 is what a `Reader`/`Writer` configured for UTF-8 would produce.

use std::io::{self, BufReader, BufWriter, Bytes, Read, Write};

use crate::decode::{CharacterInput, CharacterInputError};
use crate::encode::CharacterOutput;

/// Code page used to turn bytes into characters and back.
#[derive(Debug, Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub enum Charset {
    /// ISO-8859-1: every byte is the code point of the same value.
    /// On output everything outside printable ASCII is `\uXXXX` escaped.
    #[default]
    Latin1,
    /// UTF-8. On output only control characters are escaped.
    Utf8,
}

/// Reads a byte stream as ISO-8859-1.
pub(crate) struct Latin1Input<R: Read>(Bytes<BufReader<R>>);

impl<R: Read> Latin1Input<R> {
    /// Wraps `reader` in a buffer.
    pub(crate) fn new(reader: R) -> Self {
        Self(BufReader::new(reader).bytes())
    }
}

impl<R: Read> CharacterInput for Latin1Input<R> {
    fn next_character(&mut self) -> Result<Option<char>, CharacterInputError> {
        match self.0.next() {
            None => Ok(None),
            Some(byte) => Ok(Some(char::from(byte?))),
        }
    }
}

/// Reads a byte stream as UTF-8, rejecting malformed sequences.
pub(crate) struct Utf8Input<R: Read>(Bytes<BufReader<R>>);

impl<R: Read> Utf8Input<R> {
    /// Wraps `reader` in a buffer.
    pub(crate) fn new(reader: R) -> Self {
        Self(BufReader::new(reader).bytes())
    }

    /// Next byte, or `None` at the end of the stream.
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        self.0.next().transpose()
    }
}

impl<R: Read> CharacterInput for Utf8Input<R> {
    fn next_character(&mut self) -> Result<Option<char>, CharacterInputError> {
        let mut buf = [0u8; 4];
        buf[0] = match self.next_byte()? {
            None => return Ok(None),
            Some(b) => b,
        };

        let len = match buf[0] {
            0x00..=0x7F => return Ok(Some(char::from(buf[0]))),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(CharacterInputError::InvalidInput),
        };

        for slot in buf.iter_mut().take(len).skip(1) {
            *slot = self
                .next_byte()?
                .ok_or(CharacterInputError::UnexpectedEof)?;
        }

        std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(CharacterInputError::InvalidInput)
    }
}

/// Writes characters as ISO-8859-1 bytes.
///
/// Only printable ASCII is reported as writable, which keeps files readable by any
/// java version regardless of the platform charset.
pub(crate) struct Latin1Output<W: Write>(BufWriter<W>);

impl<W: Write> Latin1Output<W> {
    /// Wraps `writer` in a buffer.
    pub(crate) fn new(writer: W) -> Self {
        Self(BufWriter::new(writer))
    }
}

impl<W: Write> CharacterOutput for Latin1Output<W> {
    type Error = io::Error;

    fn write(&mut self, data: char) -> io::Result<()> {
        let byte = u8::try_from(u32::from(data)).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{data:?} cannot be represented in ISO-8859-1"),
            )
        })?;
        self.0.write_all(&[byte])
    }

    fn can_write(&self, data: char) -> bool {
        data == '\r' || data == '\n' || (' '..='~').contains(&data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Writes characters as UTF-8 bytes.
pub(crate) struct Utf8Output<W: Write>(BufWriter<W>);

impl<W: Write> Utf8Output<W> {
    /// Wraps `writer` in a buffer.
    pub(crate) fn new(writer: W) -> Self {
        Self(BufWriter::new(writer))
    }
}

impl<W: Write> CharacterOutput for Utf8Output<W> {
    type Error = io::Error;

    fn write(&mut self, data: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.0.write_all(data.encode_utf8(&mut buf).as_bytes())
    }

    fn can_write(&self, _: char) -> bool {
        true
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
