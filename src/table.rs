//! [`PropertyTable`], the ordered key/value container filled by `load` and written by `store`.

use std::io::{self, Read, Write};
use std::ops::Index;

use indexmap::IndexMap;
use log::debug;

use crate::decode::{self, PropertyHandler};
use crate::encode::{self, LineEnding, StoreOptions};
use crate::{Charset, Element, Position, PropertiesError, Result};

/// Values longer than this are cut short by [`PropertyTable::list`].
const LIST_VALUE_WIDTH: usize = 40;

/// An insertion ordered map from property names to values, with an optional table of
/// defaults consulted by [`get_property`](Self::get_property).
///
/// Equality ignores order: two tables are equal when they hold the same keys with the same
/// values (and equal defaults).
///
/// # Example
/// ```rust
/// use jproperties::PropertyTable;
///
/// let mut props = PropertyTable::new();
/// props.load_str("greeting = hello\\u0020world\n# comment\nname:jprop").unwrap();
///
/// assert_eq!(props.get_property("greeting"), Some("hello world"));
/// assert_eq!(props.get_property_or("missing", "fallback"), "fallback");
/// assert_eq!(props.store_to_string(None), "greeting=hello world\nname=jprop\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    /// Own properties in insertion order.
    entries: IndexMap<String, String>,
    /// Fallback for lookups of missing keys.
    defaults: Option<Box<PropertyTable>>,
}

impl PropertyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table that falls back to `defaults` for missing keys.
    #[must_use]
    pub fn with_defaults(defaults: Self) -> Self {
        Self {
            entries: IndexMap::new(),
            defaults: Some(Box::new(defaults)),
        }
    }

    #[must_use]
    pub fn defaults(&self) -> Option<&Self> {
        self.defaults.as_deref()
    }

    /// Reads properties from an ISO-8859-1 byte stream, like `Properties#load(InputStream)`.
    ///
    /// Loading is additive: existing entries stay, entries with the same key are replaced.
    /// If an error occurs, the entries before the offending line have already been added.
    ///
    /// # Errors
    /// * if the reader fails.
    /// * if a `\uXXXX` escape sequence is malformed.
    pub fn load(&mut self, reader: impl Read) -> Result<()> {
        self.load_with(reader, Charset::Latin1)
    }

    /// Reads properties from a byte stream in the given charset.
    ///
    /// # Errors
    /// * if the reader fails.
    /// * if the bytes are not valid in `charset`.
    /// * if a `\uXXXX` escape sequence is malformed.
    pub fn load_with(&mut self, reader: impl Read, charset: Charset) -> Result<()> {
        let before = self.len();
        let end = decode::parse_reader(reader, charset, self)?;
        self.loaded(before, end);
        Ok(())
    }

    /// Reads properties from text that is already decoded.
    ///
    /// # Errors
    /// If a `\uXXXX` escape sequence is malformed.
    pub fn load_str(&mut self, text: impl AsRef<str>) -> Result<()> {
        let before = self.len();
        let end = decode::parse_str(text, self)?;
        self.loaded(before, end);
        Ok(())
    }

    /// Reads properties from an in-memory byte buffer.
    ///
    /// # Errors
    /// * if the bytes are not valid in `charset`.
    /// * if a `\uXXXX` escape sequence is malformed.
    pub fn load_bytes(&mut self, bytes: impl AsRef<[u8]>, charset: Charset) -> Result<()> {
        let before = self.len();
        let end = decode::parse_bytes(bytes, charset, self)?;
        self.loaded(before, end);
        Ok(())
    }

    /// Logs the outcome of a load.
    fn loaded(&self, before: usize, end: Position) {
        debug!(
            "loaded properties up to {end}: {} total, {} new",
            self.len(),
            self.len() - before
        );
    }

    /// Writes all own properties to an ISO-8859-1 byte stream, like
    /// `Properties#store(OutputStream, String)`, preceded by `header` as a comment.
    ///
    /// The writer is not closed; it is flushed once everything was written.
    ///
    /// # Errors
    /// If the writer fails.
    pub fn store(&self, writer: impl Write, header: Option<&str>) -> Result<()> {
        self.store_with(writer, header, &StoreOptions::default())
    }

    /// Writes all own properties with explicit charset and line ending.
    ///
    /// # Errors
    /// If the writer fails.
    pub fn store_with(
        &self,
        writer: impl Write,
        header: Option<&str>,
        options: &StoreOptions,
    ) -> Result<()> {
        debug!(
            "storing {} properties as {:?} with {:?} line endings",
            self.len(),
            options.charset,
            options.line_ending
        );
        encode::write_bytes(self.elements(header), writer, options)?;
        Ok(())
    }

    /// Renders all own properties as text. Non-ASCII characters are `\uXXXX` escaped.
    #[must_use]
    pub fn store_to_string(&self, header: Option<&str>) -> String {
        encode::write_to_string(self.elements(header), LineEnding::Lf)
    }

    /// The header comment followed by every entry.
    fn elements<'a>(&'a self, header: Option<&str>) -> impl Iterator<Item = Element> + 'a {
        header
            .map(|comment| Element::Comment(comment.to_owned()))
            .into_iter()
            .chain(
                self.iter()
                    .map(|(key, value)| Element::Entry(key.to_owned(), value.to_owned())),
            )
    }

    /// Looks `key` up in this table, then in the defaults.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(value) => Some(value),
            None => self.defaults.as_deref()?.get_property(key),
        }
    }

    /// Like [`get_property`](Self::get_property), with `default` for missing keys.
    #[must_use]
    pub fn get_property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_property(key).unwrap_or(default)
    }

    /// Sets `key` to `value` and returns the value it replaced.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.insert(key, value)
    }

    /// Own value of `key`. The defaults are not consulted.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Own value of `key`.
    ///
    /// # Errors
    /// [`PropertiesError::MissingKey`] if the key is not in this table.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| PropertiesError::MissingKey(key.to_owned()))
    }

    /// A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all own entries. The defaults are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(String::as_str)
    }

    /// Own keys followed by the keys only present in the defaults.
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys().collect();
        if let Some(defaults) = self.defaults() {
            for name in defaults.property_names() {
                if !self.contains_key(name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Prints every property, defaults included, in the format of `Properties#list`.
    /// Values longer than 40 characters are cut to 37 followed by `...`.
    ///
    /// # Errors
    /// If the writer fails.
    pub fn list(&self, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "-- listing properties --")?;
        for name in self.property_names() {
            let value = self.get_property(name).unwrap_or_default();
            if value.chars().count() > LIST_VALUE_WIDTH {
                let head: String = value.chars().take(LIST_VALUE_WIDTH - 3).collect();
                writeln!(out, "{name}={head}...")?;
            } else {
                writeln!(out, "{name}={value}")?;
            }
        }
        out.flush()
    }
}

impl PropertyHandler for PropertyTable {
    fn handle(&mut self, _: &Position, element: Element) -> bool {
        if let Element::Entry(key, value) = element {
            self.entries.insert(key, value);
        }
        true
    }
}

/// Strict lookup.
///
/// # Panics
/// If the key is not in this table, like indexing a `HashMap`. Use
/// [`PropertyTable::require`] for a recoverable error.
impl Index<&str> for PropertyTable {
    type Output = String;

    fn index(&self, key: &str) -> &String {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("no property named {key:?}"),
        }
    }
}

/// Iterator over the own entries of a [`PropertyTable`] in insertion order.
#[derive(Debug, Clone)]
pub struct Iter<'a>(indexmap::map::Iter<'a, String, String>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a PropertyTable {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyTable {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
