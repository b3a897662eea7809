//! # jproperties
//! Reader and writer for java `.properties` files that behaves like `java.util.Properties`.
//!
//! * [`PropertyTable`] is the `Properties` equivalent: an insertion ordered map with
//!   `load`/`store`, `get_property`/`set_property` and an optional table of defaults.
//! * [`parse`] and friends expose the decoder as a stream of [`Element`]s for callers that
//!   need comments, duplicates or their own container.
//! * [`write`] and friends expose the encoder for any iterator of elements or pairs.
//!
//! Byte streams are ISO-8859-1 unless [`Charset::Utf8`] is requested, exactly like
//! `Properties#load(InputStream)` and `Properties#store(OutputStream, String)`.
//!
//! ```rust
//! use jproperties::PropertyTable;
//!
//! let source = "# settings\nhost = example.org\nport:8080\npath=/a\\\n      /b\n";
//!
//! let mut props = PropertyTable::new();
//! props.load(source.as_bytes()).expect("Syntax error");
//!
//! assert_eq!(props.get_property("host"), Some("example.org"));
//! assert_eq!(props.get_property("port"), Some("8080"));
//! assert_eq!(props.get_property("path"), Some("/a/b"));
//!
//! let mut out = Vec::new();
//! props.store(&mut out, Some("written back")).expect("I/O error");
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "#written back\nhost=example.org\nport=8080\npath=/a/b\n"
//! );
//! ```
#![deny(
    clippy::correctness,
    clippy::perf,
    clippy::complexity,
    clippy::style,
    clippy::nursery,
    clippy::pedantic,
    clippy::clone_on_ref_ptr,
    clippy::decimal_literal_representation,
    clippy::float_cmp_const,
    clippy::missing_docs_in_private_items,
    clippy::multiple_inherent_impl,
    clippy::unwrap_used,
    clippy::used_underscore_binding
)]

mod charset;
mod decode;
mod encode;
mod error;
mod table;

pub use charset::Charset;
pub use decode::{
    parse, parse_bytes, parse_chars, parse_reader, parse_str, parse_str_to_doc,
    parse_str_to_vec, CharacterInput, CharacterInputError, IntoChar, Position, PropertyHandler,
};
pub use encode::{write, write_bytes, write_to_string, CharacterOutput, LineEnding, StoreOptions};
pub use error::{PropertiesError, Result};
pub use table::{Iter, PropertyTable};

/// Element in a .properties file
#[derive(Debug, Eq, PartialEq, Clone, PartialOrd, Ord, Hash)]
pub enum Element {
    /// A line holding nothing but whitespace.
    BlankLine,
    /// A comment line, including its leading `#` or `!`.
    Comment(String),
    /// A decoded key and value.
    Entry(String, String),
}

/// useful for iter over `Vec<(String, String)>` or `HashMap<String, String>` or its refs.
impl<K: ToString, V: ToString> From<(K, V)> for Element {
    fn from(value: (K, V)) -> Self {
        Self::Entry(value.0.to_string(), value.1.to_string())
    }
}

impl<K: ToString, V: ToString> From<&(K, V)> for Element {
    fn from(value: &(K, V)) -> Self {
        Self::Entry(value.0.to_string(), value.1.to_string())
    }
}

/// useful for iter over `&Vec<Element>`
impl From<&Self> for Element {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}
