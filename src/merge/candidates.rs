//! Candidate chains: the base translation followed by its overrides.

use std::sync::Arc;

use crate::input::translation::{
    LanguageTag,
    Translations,
};
use crate::value::{
    NULL,
    Value,
};

/// Which dictionary entries to overlay on the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Languages {
    /// One tag, expanded into `[language, language-REGION]`.
    Tag(String),
    /// Exact tags, in increasing priority.
    Tags(Vec<String>),
}

impl From<&str> for Languages {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl From<String> for Languages {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl From<Vec<String>> for Languages {
    fn from(tags: Vec<String>) -> Self {
        Self::Tags(tags)
    }
}

impl From<&[&str]> for Languages {
    fn from(tags: &[&str]) -> Self {
        Self::Tags(tags.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Languages {
    fn from(tags: [&str; N]) -> Self {
        Self::Tags(tags.iter().map(ToString::to_string).collect())
    }
}

/// The base translation followed by overrides in strictly increasing priority.
///
/// The chain is immutable once built. Empty slots (unknown tags, `None` overrides) are kept as
/// the fallthrough marker so that positions still line up with the requested order.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateChain {
    /// Base first.
    candidates: Arc<[Value]>,
}

impl CandidateChain {
    /// `[base, ...overrides]`.
    #[must_use]
    pub fn from_overrides<I>(base: Value, overrides: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let candidates: Vec<Value> =
            std::iter::once(base).chain(overrides.into_iter().map(Into::into)).collect();
        Self { candidates: candidates.into() }
    }

    /// `[base, ...tags.map(|tag| translations[tag])]`.
    #[must_use]
    pub fn from_tags<S: AsRef<str>>(
        base: Value,
        translations: &Translations,
        tags: &[S],
    ) -> Self {
        Self::from_overrides(base, tags.iter().map(|tag| lookup(translations, tag.as_ref())))
    }

    /// Expands `tag` into its language and `language-REGION` lookups.
    #[must_use]
    pub fn from_tag(base: Value, translations: &Translations, tag: &str) -> Self {
        let lookups = LanguageTag::parse(tag).lookup_tags();
        tracing::trace!("Expanded language tag {tag:?} into {lookups:?}");
        Self::from_tags(base, translations, lookups.as_slice())
    }

    #[must_use]
    pub fn from_languages(base: Value, translations: &Translations, languages: &Languages) -> Self {
        match languages {
            Languages::Tag(tag) => Self::from_tag(base, translations, tag),
            Languages::Tags(tags) => Self::from_tags(base, translations, tags.as_slice()),
        }
    }

    /// The base translation.
    #[must_use]
    pub fn base(&self) -> &Value {
        self.candidates.first().unwrap_or(&NULL)
    }

    /// Overrides, lowest priority first.
    #[must_use]
    pub fn overrides(&self) -> &[Value] {
        self.candidates.get(1..).unwrap_or_default()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Hands the candidates over to a root view.
    pub(super) fn into_shared(self) -> Arc<[Value]> {
        self.candidates
    }
}

/// Reads one dictionary slot; a missing tag becomes an empty slot.
fn lookup(translations: &Translations, tag: &str) -> Value {
    translations.get(tag).cloned().unwrap_or_else(|| {
        tracing::debug!("No translation for language tag {tag:?}");
        Value::Null
    })
}
