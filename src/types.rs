//! Core types used throughout the project.

use std::fmt;

use thiserror::Error;

/// Default separator between record fields in a key path.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// A single step into a composite value.
///
/// Records are addressed by [`Key::Field`] and sequences by [`Key::Index`], but either form
/// reaches either kind of composite: a numeric field addresses a sequence element and an index
/// addresses the record field spelled by its decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Field(String),
    Index(usize),
}

impl Key {
    /// Returns the key as a sequence index, if it can be one.
    ///
    /// Only the canonical decimal form counts, so `"1"` addresses element 1 while `"01"` and
    /// `"+1"` address nothing.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Field(name) => parse_index(name),
            Self::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Field(name.clone())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&Self> for Key {
    fn from(key: &Self) -> Self {
        key.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Errors raised while parsing a key path string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyPathError {
    #[error("The key separator cannot be empty")]
    EmptySeparator,
    #[error("Empty segment in key path '{path}'")]
    EmptySegment { path: String },
    #[error("Invalid index '{index}' in key path '{path}'")]
    InvalidIndex { path: String, index: String },
    #[error("Unclosed '[' in key path '{path}'")]
    UnclosedBracket { path: String },
    #[error("Unexpected '{rest}' after index in key path '{path}'")]
    TrailingCharacters { path: String, rest: String },
}

/// A path from the root of a tree to one of its fields.
///
/// The textual form joins fields with a separator and writes sequence indices in brackets,
/// e.g. `menu.items[0].label`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    /// Empty for the root.
    keys: Vec<Key>,
}

impl KeyPath {
    /// The empty path, addressing the root itself.
    #[must_use]
    pub const fn root() -> Self {
        Self { keys: Vec::new() }
    }

    /// Parses a key path such as `section.items[2].label`.
    ///
    /// # Examples
    /// ```
    /// use t9n::types::{Key, KeyPath};
    ///
    /// let path = KeyPath::parse("menu.items[1]", ".").unwrap();
    /// assert_eq!(path.keys(), &[Key::from("menu"), Key::from("items"), Key::Index(1)]);
    /// assert_eq!(path.to_string(), "menu.items[1]");
    /// ```
    ///
    /// # Errors
    /// Returns [`KeyPathError`] for an empty separator, an empty segment, or a malformed index.
    pub fn parse(path: &str, separator: &str) -> Result<Self, KeyPathError> {
        if separator.is_empty() {
            return Err(KeyPathError::EmptySeparator);
        }
        if path.is_empty() {
            return Ok(Self::root());
        }

        let mut keys = Vec::new();
        for segment in path.split(separator) {
            parse_segment(path, segment, &mut keys)?;
        }
        Ok(Self { keys })
    }

    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns a new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl Into<Key>) -> Self {
        let mut keys = self.keys.clone();
        keys.push(key.into());
        Self { keys }
    }

    /// Formats the path with a custom field separator.
    #[must_use]
    pub fn to_string_with(&self, separator: &str) -> String {
        let mut out = String::new();
        for key in &self.keys {
            match key {
                Key::Field(name) => {
                    if !out.is_empty() {
                        out.push_str(separator);
                    }
                    out.push_str(name);
                }
                Key::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(DEFAULT_KEY_SEPARATOR))
    }
}

impl<K: Into<Key>> FromIterator<K> for KeyPath {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self { keys: iter.into_iter().map(Into::into).collect() }
    }
}

/// Parses `text` as an index if it is written exactly as `usize` would print it.
fn parse_index(text: &str) -> Option<usize> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    canonical.then(|| text.parse().ok()).flatten()
}

/// Parses one separator-delimited segment (`name`, `name[0]`, `[0][1]`) into `keys`.
fn parse_segment(path: &str, segment: &str, keys: &mut Vec<Key>) -> Result<(), KeyPathError> {
    let (name, mut rest) = segment.find('[').map_or((segment, ""), |at| segment.split_at(at));

    if name.is_empty() && rest.is_empty() {
        return Err(KeyPathError::EmptySegment { path: path.to_string() });
    }
    if !name.is_empty() {
        keys.push(Key::Field(name.to_string()));
    }

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(KeyPathError::TrailingCharacters {
                path: path.to_string(),
                rest: rest.to_string(),
            });
        };
        let Some(close) = inner.find(']') else {
            return Err(KeyPathError::UnclosedBracket { path: path.to_string() });
        };
        let (digits, after) = inner.split_at(close);
        let index = parse_index(digits).ok_or_else(|| KeyPathError::InvalidIndex {
            path: path.to_string(),
            index: digits.to_string(),
        })?;
        keys.push(Key::Index(index));
        rest = after.get(1..).unwrap_or_default();
    }

    Ok(())
}
