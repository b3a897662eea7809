//! The `.properties` decoder.
//!
//! Input is consumed one character at a time by an explicit state machine. Continuation
//! lines are joined, comments are recognised and escape sequences are decoded in the same
//! pass, so a logical line is never buffered as a whole.

use std::fmt::{Display, Formatter};
use std::io::{self, Read};
use std::mem;

use log::{debug, trace};

use crate::charset::{Latin1Input, Utf8Input};
use crate::{Charset, Element, PropertiesError, Result};

/// Failure reported by a [`CharacterInput`].
#[derive(Debug)]
pub enum CharacterInputError {
    /// The input ended in the middle of a multi-byte character.
    UnexpectedEof,
    /// The input is not valid in its encoding.
    InvalidInput,
    /// The underlying reader failed.
    Io(io::Error),
}

impl From<io::Error> for CharacterInputError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Character source of the decoder.
pub trait CharacterInput {
    /// Read the next character from some input source
    ///
    /// # Return values
    /// 1. Ok(None) to signal EOF.
    /// 2. Ok(Some) to give the next to the parser.
    /// 3. Err is passed on to the caller.
    ///
    /// # Errors
    /// Decoding or I/O errors of the source.
    fn next_character(&mut self) -> std::result::Result<Option<char>, CharacterInputError>;
}

impl<T: Iterator<Item = char>> CharacterInput for T {
    fn next_character(&mut self) -> std::result::Result<Option<char>, CharacterInputError> {
        Ok(self.next())
    }
}

/// Receives the elements of a `.properties` document in order.
pub trait PropertyHandler {
    /// Return `false` to stop parsing after this element.
    fn handle(&mut self, position: &Position, element: Element) -> bool;
}

impl<T: FnMut(&Position, Element) -> bool> PropertyHandler for T {
    fn handle(&mut self, position: &Position, element: Element) -> bool {
        self(position, element)
    }
}

/// Collects every element, comments and blank lines included.
#[derive(Default, Debug)]
struct DocHandler(Vec<Element>);

impl PropertyHandler for DocHandler {
    fn handle(&mut self, _: &Position, element: Element) -> bool {
        self.0.push(element);
        true
    }
}

/// Collects key/value pairs, duplicates included.
#[derive(Default, Debug)]
struct VecHandler(Vec<(String, String)>);

impl PropertyHandler for VecHandler {
    fn handle(&mut self, _: &Position, element: Element) -> bool {
        if let Element::Entry(key, value) = element {
            self.0.push((key, value));
        }
        true
    }
}

/// Location of the decoder in its input.
#[derive(Debug, Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Characters consumed since the start of the input.
    pub character_total: u64,
    /// Characters consumed on the current physical line.
    pub character_in_line: u64,
    /// Zero based physical line number.
    pub line: u64,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line + 1, self.character_in_line)
    }
}

impl Position {
    /// Called after a line terminator has been processed.
    fn next_line(&mut self) {
        self.line += 1;
        self.character_in_line = 0;
    }

    /// Called after a char has been read.
    fn next_char(&mut self) {
        self.character_in_line += 1;
        self.character_total += 1;
    }
}

/// Which half of an entry is being decoded.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
enum Field {
    /// Before the separator.
    Key,
    /// After the separator.
    Value,
}

impl Field {
    /// The plain scanning state of this field.
    const fn resume(self) -> State {
        match self {
            Self::Key => State::Key,
            Self::Value => State::Value,
        }
    }
}

/// Decoder states.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
enum State {
    /// Start of a logical line, skipping whitespace.
    LineStart,
    /// Just read `\r`, a `\n` may follow.
    CarriageReturn,
    /// Inside a comment line.
    Comment,
    /// Reading key characters.
    Key,
    /// Whitespace ended the key, one `=` or `:` may still follow.
    KeyWhitespace,
    /// Skipping whitespace before the value.
    BeginValue,
    /// Reading value characters.
    Value,
    /// Read a backslash, an escaped character lands in the field.
    Escape(Field),
    /// Read a backslash followed by `\r`, a `\n` may follow.
    EscapeCarriageReturn,
    /// Skipping leading whitespace of a continuation line.
    Continuation,
    /// Reading the digits of `\uXXXX`.
    Unicode(Field),
    /// Read a backslash between the digits of `\uXXXX`, only a line break may follow.
    HexBackslash,
    /// Got a high surrogate, expecting the `\` of its low half.
    SurrogateBackslash(Field, u16),
    /// Got a high surrogate and `\`, expecting `u`.
    SurrogateU(Field, u16),
    /// Reading the digits of the low surrogate.
    LowSurrogate(Field, u16),
}

/// What to do with the current character after a state transition.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
enum Flow {
    /// Consumed, read the next one.
    Next,
    /// Feed the same character to the new state.
    Retry,
    /// The handler asked to stop.
    Stop,
}

/// Accumulates the four hex digits of a `\uXXXX` escape.
#[derive(Debug, Default, Clone, Copy)]
struct HexDigits {
    /// Digits read so far.
    value: u16,
    /// Number of digits read so far.
    count: u8,
}

impl HexDigits {
    /// Adds one digit and returns the code unit once all four are in.
    #[allow(clippy::cast_possible_truncation)] // a hex digit is below 16
    fn push(&mut self, digit: u32) -> Option<u16> {
        self.value = (self.value << 4) | digit as u16;
        self.count += 1;
        if self.count < 4 {
            return None;
        }

        let unit = self.value;
        *self = Self::default();
        Some(unit)
    }
}

/// Per-call decoder state.
struct Decoder<'h, H: PropertyHandler> {
    /// Receiver of the decoded elements.
    handler: &'h mut H,
    /// Current input position.
    position: Position,
    /// Current state.
    state: State,
    /// State to return to after a continuation line.
    resume: State,
    /// Key of the pending entry, or the text of the pending comment.
    key: String,
    /// Value of the pending entry.
    value: String,
    /// Pending `\uXXXX` digits.
    hex: HexDigits,
}

impl<'h, H: PropertyHandler> Decoder<'h, H> {
    /// Fresh decoder at the start of the input.
    fn new(handler: &'h mut H) -> Self {
        Self {
            handler,
            position: Position::default(),
            state: State::LineStart,
            resume: State::LineStart,
            key: String::new(),
            value: String::new(),
            hex: HexDigits::default(),
        }
    }

    /// Hands `element` to the handler.
    fn emit(&mut self, element: Element) -> Flow {
        if self.handler.handle(&self.position, element) {
            Flow::Next
        } else {
            Flow::Stop
        }
    }

    /// Moves the pending key and value out as an entry.
    fn take_entry(&mut self) -> Element {
        let key = mem::take(&mut self.key);
        let value = mem::take(&mut self.value);
        trace!("{}: {key:?} = {value:?}", self.position);
        Element::Entry(key, value)
    }

    /// Emits `element` for a physical line ended by `terminator`.
    fn end_line(&mut self, terminator: char, element: Element) -> Flow {
        let flow = self.emit(element);
        if terminator == '\r' {
            self.state = State::CarriageReturn;
        } else {
            self.position.next_line();
            self.state = State::LineStart;
        }
        flow
    }

    /// Appends a decoded character and returns to plain scanning of `field`.
    fn push(&mut self, field: Field, c: char) -> Flow {
        match field {
            Field::Key => self.key.push(c),
            Field::Value => self.value.push(c),
        }
        self.state = field.resume();
        Flow::Next
    }

    /// Enters `Escape(field)` from `from`, which a continuation returns to.
    fn backslash(&mut self, from: State, field: Field) -> Flow {
        self.resume = from;
        self.state = State::Escape(field);
        Flow::Next
    }

    /// A backslash was followed by the line terminator `terminator`. The next line
    /// continues in `resume` once its leading whitespace is skipped.
    fn continue_line(&mut self, terminator: char, resume: State) -> Flow {
        self.resume = resume;
        if terminator == '\r' {
            self.state = State::EscapeCarriageReturn;
        } else {
            self.position.next_line();
            self.state = State::Continuation;
        }
        Flow::Next
    }

    /// Feeds one digit of a `\uXXXX` escape.
    fn hex_digit(&mut self, c: char) -> Result<Option<u16>> {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| PropertiesError::MalformedUnicodeEscape {
                position: self.position,
                found: c,
            })?;
        Ok(self.hex.push(digit))
    }

    /// Processes one character in the current state.
    #[allow(clippy::too_many_lines)]
    fn step(&mut self, c: char) -> Result<Flow> {
        let flow = match self.state {
            State::LineStart => match c {
                ' ' | '\t' | '\x0C' => Flow::Next,
                '#' | '!' => {
                    self.state = State::Comment;
                    Flow::Retry
                }
                '\r' | '\n' => self.end_line(c, Element::BlankLine),
                _ => {
                    self.state = State::Key;
                    Flow::Retry
                }
            },
            State::CarriageReturn => {
                self.position.next_line();
                self.state = State::LineStart;
                if c == '\n' {
                    Flow::Next
                } else {
                    Flow::Retry
                }
            }
            State::Comment => match c {
                '\r' | '\n' => {
                    let text = mem::take(&mut self.key);
                    self.end_line(c, Element::Comment(text))
                }
                _ => {
                    self.key.push(c);
                    Flow::Next
                }
            },
            State::Key => match c {
                '\r' | '\n' => {
                    let entry = self.take_entry();
                    self.end_line(c, entry)
                }
                ' ' | '\t' | '\x0C' => {
                    self.state = State::KeyWhitespace;
                    Flow::Next
                }
                '=' | ':' => {
                    self.state = State::BeginValue;
                    Flow::Next
                }
                '\\' => self.backslash(State::Key, Field::Key),
                _ => {
                    self.key.push(c);
                    Flow::Next
                }
            },
            State::KeyWhitespace => match c {
                ' ' | '\t' | '\x0C' => Flow::Next,
                '\\' => self.backslash(State::KeyWhitespace, Field::Value),
                '=' | ':' => {
                    self.state = State::BeginValue;
                    Flow::Next
                }
                _ => {
                    self.state = State::BeginValue;
                    Flow::Retry
                }
            },
            State::BeginValue => match c {
                ' ' | '\t' | '\x0C' => Flow::Next,
                '\\' => self.backslash(State::BeginValue, Field::Value),
                _ => {
                    self.state = State::Value;
                    Flow::Retry
                }
            },
            State::Value => match c {
                '\r' | '\n' => {
                    let entry = self.take_entry();
                    self.end_line(c, entry)
                }
                '\\' => self.backslash(State::Value, Field::Value),
                _ => {
                    self.value.push(c);
                    Flow::Next
                }
            },
            State::Escape(field) => match c {
                'u' => {
                    self.state = State::Unicode(field);
                    Flow::Next
                }
                't' => self.push(field, '\t'),
                'n' => self.push(field, '\n'),
                'r' => self.push(field, '\r'),
                'f' => self.push(field, '\x0C'),
                '\r' | '\n' => {
                    let resume = self.resume;
                    self.continue_line(c, resume)
                }
                _ => {
                    if !matches!(c, '=' | ':' | '#' | '!' | '\\' | ' ') {
                        trace!("{}: unknown escape \\{c}, kept as {c:?}", self.position);
                    }
                    self.push(field, c)
                }
            },
            State::EscapeCarriageReturn => {
                self.position.next_line();
                self.state = State::Continuation;
                if c == '\n' {
                    Flow::Next
                } else {
                    Flow::Retry
                }
            }
            State::Continuation => match c {
                ' ' | '\t' | '\x0C' => Flow::Next,
                _ => {
                    self.state = self.resume;
                    Flow::Retry
                }
            },
            State::Unicode(field) if c == '\\' => {
                self.resume = State::Unicode(field);
                self.state = State::HexBackslash;
                Flow::Next
            }
            State::LowSurrogate(field, high) if c == '\\' => {
                self.resume = State::LowSurrogate(field, high);
                self.state = State::HexBackslash;
                Flow::Next
            }
            State::HexBackslash => match c {
                '\r' | '\n' => {
                    let resume = self.resume;
                    self.continue_line(c, resume)
                }
                _ => {
                    return Err(PropertiesError::MalformedUnicodeEscape {
                        position: self.position,
                        found: '\\',
                    })
                }
            },
            State::Unicode(field) => match self.hex_digit(c)? {
                None => Flow::Next,
                Some(high @ 0xD800..=0xDBFF) => {
                    self.state = State::SurrogateBackslash(field, high);
                    Flow::Next
                }
                Some(unit) => match char::from_u32(u32::from(unit)) {
                    Some(decoded) => self.push(field, decoded),
                    None => {
                        return Err(PropertiesError::UnpairedSurrogate {
                            position: self.position,
                            value: unit,
                        })
                    }
                },
            },
            State::SurrogateBackslash(field, high) => {
                if c != '\\' {
                    return Err(PropertiesError::UnpairedSurrogate {
                        position: self.position,
                        value: high,
                    });
                }
                self.state = State::SurrogateU(field, high);
                Flow::Next
            }
            State::SurrogateU(field, high) => {
                if c == '\r' || c == '\n' {
                    return Ok(self.continue_line(c, State::SurrogateBackslash(field, high)));
                }
                if c != 'u' {
                    return Err(PropertiesError::UnpairedSurrogate {
                        position: self.position,
                        value: high,
                    });
                }
                self.state = State::LowSurrogate(field, high);
                Flow::Next
            }
            State::LowSurrogate(field, high) => match self.hex_digit(c)? {
                None => Flow::Next,
                Some(low) => match char::decode_utf16([high, low]).next() {
                    Some(Ok(decoded)) => self.push(field, decoded),
                    _ => {
                        return Err(PropertiesError::InvalidSurrogatePair {
                            position: self.position,
                            high,
                            low,
                        })
                    }
                },
            },
        };

        Ok(flow)
    }

    /// Flushes whatever is pending once the input is exhausted.
    fn finish(mut self) -> Result<Position> {
        if matches!(self.state, State::EscapeCarriageReturn | State::Continuation) {
            self.state = self.resume;
        }

        match self.state {
            State::LineStart | State::CarriageReturn => {
                self.emit(Element::BlankLine);
            }
            State::Comment => {
                let text = mem::take(&mut self.key);
                self.emit(Element::Comment(text));
            }
            State::Escape(_) => {
                debug!("{}: trailing backslash at end of input dropped", self.position);
                let entry = self.take_entry();
                self.emit(entry);
            }
            State::Key
            | State::KeyWhitespace
            | State::BeginValue
            | State::Value
            | State::EscapeCarriageReturn
            | State::Continuation => {
                let entry = self.take_entry();
                self.emit(entry);
            }
            State::Unicode(_) | State::LowSurrogate(..) | State::HexBackslash => {
                return Err(PropertiesError::TruncatedUnicodeEscape {
                    position: self.position,
                })
            }
            State::SurrogateBackslash(_, high) | State::SurrogateU(_, high) => {
                return Err(PropertiesError::UnpairedSurrogate {
                    position: self.position,
                    value: high,
                })
            }
        }

        Ok(self.position)
    }
}

/// Low-level parsing function.
/// Parses a .properties document from a character-based input and invokes the handler
/// for each element in document order.
///
/// Returns the position at which parsing ended.
///
/// # Errors
/// * if the character input errors.
/// * if a `\uXXXX` escape sequence is malformed.
///
/// # Example
/// ```rust
/// use jproperties::{Element, Position};
///
/// let mut seen = Vec::new();
/// let mut handler = |_: &Position, element: Element| {
///     seen.push(element);
///     true
/// };
/// jproperties::parse(&mut "#beepbop\nkey=value".chars(), &mut handler).expect("Syntax error");
///
/// assert_eq!(seen[0], Element::Comment("#beepbop".to_string()));
/// assert_eq!(seen[1], Element::Entry("key".to_string(), "value".to_string()));
/// ```
pub fn parse(
    input: &mut impl CharacterInput,
    handler: &mut impl PropertyHandler,
) -> Result<Position> {
    let mut decoder = Decoder::new(handler);

    loop {
        let c = match input.next_character() {
            Ok(Some(c)) => c,
            Ok(None) => return decoder.finish(),
            Err(CharacterInputError::UnexpectedEof) => {
                return Err(PropertiesError::UnexpectedEof(decoder.position))
            }
            Err(CharacterInputError::InvalidInput) => {
                return Err(PropertiesError::InvalidInput(decoder.position))
            }
            Err(CharacterInputError::Io(e)) => {
                debug!("{}: read failed: {e}", decoder.position);
                return Err(e.into());
            }
        };

        decoder.position.next_char();

        loop {
            match decoder.step(c)? {
                Flow::Next => break,
                Flow::Retry => {}
                Flow::Stop => return Ok(decoder.position),
            }
        }
    }
}

/// Helper trait for Into<char> conversion that also supports &char.
/// Bytes convert as ISO-8859-1.
pub trait IntoChar {
    /// Converts to a char.
    fn into_char(self) -> char;
}

impl IntoChar for char {
    fn into_char(self) -> char {
        self
    }
}

impl IntoChar for &char {
    fn into_char(self) -> char {
        *self
    }
}

impl IntoChar for u8 {
    fn into_char(self) -> char {
        self.into()
    }
}

impl IntoChar for &u8 {
    fn into_char(self) -> char {
        (*self).into()
    }
}

/// Parse the str as a properties document.
///
/// # Errors
/// If a `\uXXXX` escape sequence is malformed.
pub fn parse_str(text: impl AsRef<str>, handler: &mut impl PropertyHandler) -> Result<Position> {
    parse(&mut text.as_ref().chars(), handler)
}

/// Parse the chars as a properties document.
///
/// # Common parameters for 'source':
/// * `Vec<u8>` - ISO-8859-1 - or its ref/slice
/// * `Vec<char>` - or its ref/slice
///
/// # Errors
/// If a `\uXXXX` escape sequence is malformed.
pub fn parse_chars<T: IntoChar>(
    source: impl IntoIterator<Item = T>,
    handler: &mut impl PropertyHandler,
) -> Result<Position> {
    let mut input = source.into_iter().map(IntoChar::into_char);
    parse(&mut input, handler)
}

/// Read a byte stream, decode it with `charset` and parse it as a properties document.
///
/// The reader is buffered internally and read until it reports end of input.
///
/// # Errors
/// * if the reader fails.
/// * if the bytes are not valid in `charset`.
/// * if a `\uXXXX` escape sequence is malformed.
pub fn parse_reader(
    reader: impl Read,
    charset: Charset,
    handler: &mut impl PropertyHandler,
) -> Result<Position> {
    match charset {
        Charset::Latin1 => parse(&mut Latin1Input::new(reader), handler),
        Charset::Utf8 => parse(&mut Utf8Input::new(reader), handler),
    }
}

/// Decode `bytes` with `charset` and parse them as a properties document.
///
/// # Errors
/// * if the bytes are not valid in `charset`.
/// * if a `\uXXXX` escape sequence is malformed.
pub fn parse_bytes(
    bytes: impl AsRef<[u8]>,
    charset: Charset,
    handler: &mut impl PropertyHandler,
) -> Result<Position> {
    let bytes = bytes.as_ref();
    match charset {
        Charset::Latin1 => parse_chars(bytes, handler),
        Charset::Utf8 => parse(&mut Utf8Input::new(bytes), handler),
    }
}

/// Parse the str into its key/value pairs, in document order and with duplicates.
///
/// # Errors
/// If a `\uXXXX` escape sequence is malformed.
pub fn parse_str_to_vec(text: impl AsRef<str>) -> Result<Vec<(String, String)>> {
    let mut result = VecHandler::default();
    parse_str(text, &mut result)?;
    Ok(result.0)
}

/// Parse the str into all of its elements, comments and blank lines included.
///
/// # Errors
/// If a `\uXXXX` escape sequence is malformed.
pub fn parse_str_to_doc(text: impl AsRef<str>) -> Result<Vec<Element>> {
    let mut result = DocHandler::default();
    parse_str(text, &mut result)?;
    Ok(result.0)
}
