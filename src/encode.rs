//! The `.properties` encoder.

use std::convert::Infallible;
use std::io::{self, Write};

use crate::charset::{Latin1Output, Utf8Output};
use crate::{Charset, Element};

/// Character sink of the encoder.
pub trait CharacterOutput {
    /// Failure of the underlying sink.
    type Error;

    /// Write a single character to the character output
    ///
    /// # Errors
    /// IO Errors
    fn write(&mut self, data: char) -> Result<(), Self::Error>;

    /// Determines if a character can be written as is. If not, it is written as `\uXXXX`.
    ///
    /// This function is not consulted for control characters, for the characters of an
    /// escape sequence or for the line ending.
    fn can_write(&self, data: char) -> bool;

    /// Called once after the last character was written.
    ///
    /// # Errors
    /// IO Errors
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Strings only receive ASCII, everything else is escaped.
impl CharacterOutput for String {
    type Error = Infallible;

    fn write(&mut self, data: char) -> Result<(), Infallible> {
        self.push(data);
        Ok(())
    }

    fn can_write(&self, data: char) -> bool {
        data.is_ascii()
    }
}

/// Line terminator written after every line.
#[derive(Debug, Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Settings for writing a document to a byte stream.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Default)]
pub struct StoreOptions {
    /// Code page of the written bytes.
    pub charset: Charset,
    /// Terminator of every written line.
    pub line_ending: LineEnding,
}

/// Emits the 6-character sequence (\uXXXX, XXXX being HEX) needed to escape a single char.
/// For characters that need 2 utf-16 code units (surrogates), it emits 12 characters.
fn escape_unicode<T: CharacterOutput>(target: &mut T, c: char) -> Result<(), T::Error> {
    static HEX: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
    ];

    let mut buf = [0; 2];
    for unit in c.encode_utf16(&mut buf).iter().copied() {
        target.write('\\')?;
        target.write('u')?;
        for shift in [12, 8, 4, 0] {
            target.write(HEX[usize::from((unit >> shift) & 0xF)])?;
        }
    }

    Ok(())
}

/// Writes a backslash followed by `marker`.
fn escape<T: CharacterOutput>(target: &mut T, marker: char) -> Result<(), T::Error> {
    target.write('\\')?;
    target.write(marker)
}

/// Writes the line terminator.
fn write_line_ending<T: CharacterOutput>(
    target: &mut T,
    line_ending: LineEnding,
) -> Result<(), T::Error> {
    for c in line_ending.as_str().chars() {
        target.write(c)?;
    }
    Ok(())
}

/// Writes every line of `comment` as its own comment line.
fn write_comment<T: CharacterOutput>(
    target: &mut T,
    comment: &str,
    line_ending: LineEnding,
) -> Result<(), T::Error> {
    let lines = comment
        .split("\r\n")
        .flat_map(|part| part.split(|c: char| c == '\r' || c == '\n'));

    for line in lines {
        if !line.starts_with('#') && !line.starts_with('!') {
            target.write('#')?;
        }

        for c in line.chars() {
            if !c.is_control() && target.can_write(c) {
                target.write(c)?;
                continue;
            }

            //The reader does not decode comments, but this beats writing a '?' placeholder.
            escape_unicode(target, c)?;
        }

        write_line_ending(target, line_ending)?;
    }

    Ok(())
}

/// Writes a key (`is_key`) or a value with every character escaped that the reader would
/// otherwise interpret.
fn write_escaped<T: CharacterOutput>(
    target: &mut T,
    text: &str,
    is_key: bool,
) -> Result<(), T::Error> {
    let mut leading = true;

    for c in text.chars() {
        match c {
            ' ' => {
                if is_key || leading {
                    target.write('\\')?;
                }
                target.write(' ')?;
                continue;
            }
            '\t' => escape(target, 't')?,
            '\n' => escape(target, 'n')?,
            '\r' => escape(target, 'r')?,
            '\x0C' => escape(target, 'f')?,
            '=' | ':' | '#' | '!' | '\\' => escape(target, c)?,
            _ if !c.is_control() && target.can_write(c) => target.write(c)?,
            _ => escape_unicode(target, c)?,
        }

        leading = false;
    }

    Ok(())
}

/// Serialize a set of elements into a .properties document into some sort of character-based output.
/// The escaping/charset depends on the implementation of the `CharacterOutput`.
///
/// Every entry becomes one `key=value` line; comments are written with a leading `#`
/// unless they already start with `#` or `!`; blank lines are skipped.
///
/// Types typically used as the `source`:
/// * `&PropertyTable`
/// * `Vec<(String, String)>` (or its reference/slice)
/// * `Vec<Element>` (or its reference/slice)
///
/// # Errors
/// Propagated from the `CharacterOutput`
///
/// # Example
/// ```rust
/// use jproperties::LineEnding;
///
/// let props = vec![("some key", "some=value"), ("another_key", "another_value")];
///
/// let mut output = String::new();
/// jproperties::write(&props, &mut output, LineEnding::Lf).unwrap();
///
/// assert_eq!("some\\ key=some\\=value\nanother_key=another_value\n", &output);
/// ```
pub fn write<T: CharacterOutput, I: Into<Element>>(
    source: impl IntoIterator<Item = I>,
    target: &mut T,
    line_ending: LineEnding,
) -> Result<(), T::Error> {
    for element in source {
        match element.into() {
            Element::BlankLine => {}
            Element::Comment(comment) => write_comment(target, &comment, line_ending)?,
            Element::Entry(key, value) => {
                write_escaped(target, &key, true)?;
                target.write('=')?;
                write_escaped(target, &value, false)?;
                write_line_ending(target, line_ending)?;
            }
        }
    }

    target.flush()
}

/// Serialize a set of elements into a byte-based output.
///
/// With [`Charset::Latin1`] every character outside printable US-ASCII is `\uXXXX`
/// escaped, so the output can be read by `java.util.Properties#load(InputStream)` and
/// resource bundles of any java version. With [`Charset::Utf8`] only control characters
/// are escaped, which suits `Properties#load(Reader)` and java 9+ resource bundles.
///
/// Output is buffered and flushed before returning.
///
/// # Errors
/// Propagated from the writer.
pub fn write_bytes<I: Into<Element>>(
    source: impl IntoIterator<Item = I>,
    target: impl Write,
    options: &StoreOptions,
) -> io::Result<()> {
    match options.charset {
        Charset::Latin1 => write(source, &mut Latin1Output::new(target), options.line_ending),
        Charset::Utf8 => write(source, &mut Utf8Output::new(target), options.line_ending),
    }
}

/// Serialize a set of elements into a new string. Non-ASCII characters are escaped.
#[must_use]
pub fn write_to_string<I: Into<Element>>(
    source: impl IntoIterator<Item = I>,
    line_ending: LineEnding,
) -> String {
    let mut output = String::new();
    match write(source, &mut output, line_ending) {
        Ok(()) => output,
        Err(never) => match never {},
    }
}
