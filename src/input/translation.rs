//! Translation dictionary input definitions

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::value::Value;

/// Separator between the language and region parts of a tag.
const TAG_SEPARATOR: char = '-';

/// A language tag split into language and optional region.
///
/// Parsing normalizes the tag: the language is lowercased and the region uppercased,
/// so `Sv-se` and `SV-SE` both become `sv-SE`. Only `-` separates the parts: `en_US` is a
/// single language named `en_us`, which dictionary lookup still matches case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    /// Lowercased language part.
    language: String,
    /// Uppercased region part, if the tag had a non-empty one.
    region: Option<String>,
}

impl LanguageTag {
    /// Splits `tag` at its first separator.
    ///
    /// Everything after the separator is the region, so `zh-hant-tw` has language `zh` and
    /// region `HANT-TW`.
    ///
    /// # Examples
    /// ```
    /// use t9n::input::translation::LanguageTag;
    ///
    /// let tag = LanguageTag::parse("Sv-Se");
    /// assert_eq!(tag.language(), "sv");
    /// assert_eq!(tag.region(), Some("SE"));
    /// assert_eq!(tag.lookup_tags(), vec!["sv".to_string(), "sv-SE".to_string()]);
    /// ```
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.to_lowercase();
        let (language, region) =
            normalized.split_once(TAG_SEPARATOR).unwrap_or((normalized.as_str(), ""));

        Self {
            language: language.to_string(),
            region: (!region.is_empty()).then(|| region.to_uppercase()),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Dictionary keys to consult, in increasing priority: the bare language, then
    /// `language-REGION` when a region is present.
    #[must_use]
    pub fn lookup_tags(&self) -> Vec<String> {
        let mut tags = vec![self.language.clone()];
        if self.region.is_some() {
            tags.push(self.to_string());
        }
        tags
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{region}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for LanguageTag {
    type Err = Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(tag))
    }
}

/// Translations keyed by language tag.
///
/// An entry may be present without a translation (`null` in JSON); it behaves exactly like a
/// missing entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    /// Translations by tag as given, in insertion order.
    entries: IndexMap<String, Option<Value>>,
}

impl Translations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, translation: impl Into<Option<Value>>) {
        self.entries.insert(tag.into(), translation.into());
    }

    /// Builder form of [`Translations::insert`].
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, translation: impl Into<Option<Value>>) -> Self {
        self.insert(tag, translation);
        self
    }

    /// Looks up the translation for `tag`.
    ///
    /// An exact match wins; otherwise the first entry whose tag matches ignoring ASCII case
    /// is used.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Value> {
        let entry = self.entries.get(tag).or_else(|| {
            self.entries
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(tag))
                .map(|(_, translation)| translation)
        });
        entry.and_then(Option::as_ref)
    }

    /// Tags in insertion order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Option<Value>>> FromIterator<(K, V)> for Translations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(tag, translation)| (tag.into(), translation.into()))
                .collect(),
        }
    }
}
