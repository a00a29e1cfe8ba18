//! Lazily merged translation views.
//!
//! A base translation defines every key that exists. Overrides are layered on top in increasing
//! priority, and each field read through a [`MergedView`] takes the value of the
//! highest-priority candidate that defines it, recursing into records and sequences element by
//! element.

/// Candidate chain construction
mod candidates;
/// Active translation tracking for callables
mod interpolation;
/// Merged views and field resolution
mod view;

pub use candidates::{
    CandidateChain,
    Languages,
};
pub use interpolation::{
    CurrentView,
    Interpolated,
    current,
    has_active_translation,
};
pub use view::{
    MergedView,
    Resolved,
};

use crate::input::translation::Translations;
use crate::value::Value;

/// Merges `base` with explicit overrides, given in increasing priority.
///
/// `None` overrides are skipped like any other override that defines nothing.
///
/// ```
/// use t9n::{record, translated, Value};
///
/// let base = record! { "k1" => "v1", "k2" => "v2", "k3" => "v3" };
/// let merged = translated(base, [
///     record! { "k2" => "1v1", "k3" => "1v2" },
///     record! { "k3" => "2v2" },
///     record! { "k3" => Value::Null },
/// ]);
///
/// assert_eq!(merged.get("k1").unwrap().as_str(), Some("v1"));
/// assert_eq!(merged.get("k2").unwrap().as_str(), Some("1v1"));
/// assert_eq!(merged.get("k3").unwrap().as_str(), Some("2v2"));
/// ```
#[must_use]
pub fn translated<I>(base: Value, overrides: I) -> MergedView
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    MergedView::new(CandidateChain::from_overrides(base, overrides))
}

/// Merges `base` with dictionary entries picked by `languages`.
///
/// A single tag such as `"sv-SE"` overlays `sv` and then `sv-SE`; a list of tags overlays
/// exactly those entries in the given order. Unknown tags are skipped.
#[must_use]
pub fn translated_in(
    base: Value,
    translations: &Translations,
    languages: impl Into<Languages>,
) -> MergedView {
    MergedView::new(CandidateChain::from_languages(base, translations, &languages.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{
        text,
        translations_from_json,
        value_from_json,
    };

    fn base() -> Value {
        value_from_json(r#"{"color": "color", "greeting": "Hello", "bye": "Goodbye"}"#)
    }

    fn dictionary() -> Translations {
        translations_from_json(
            r#"{
                "sv": {"color": "färg", "greeting": "Hej"},
                "sv-SE": {"color": "färg (SE)"},
                "en-GB": {"color": "colour"},
                "en_US": {"color": "color (US)"},
                "de": null
            }"#,
        )
    }

    #[rstest]
    #[case::region_preferred("Sv-Se", "färg (SE)", "Hej")]
    #[case::language_only("Sv", "färg", "Hej")]
    #[case::underscore_kept_in_language("en_US", "color (US)", "Hello")]
    #[case::underscore_case_insensitive("EN_us", "color (US)", "Hello")]
    #[case::region_without_language("en-GB", "colour", "Hello")]
    #[case::empty_entry("de", "color", "Hello")]
    #[case::unknown("fi-FI", "color", "Hello")]
    fn test_translated_in_single_tag(
        #[case] tag: &str,
        #[case] color: &str,
        #[case] greeting: &str,
    ) {
        let merged = translated_in(base(), &dictionary(), tag);

        assert_eq!(text(merged.get("color")).as_deref(), Some(color));
        assert_eq!(text(merged.get("greeting")).as_deref(), Some(greeting));
        assert_eq!(text(merged.get("bye")).as_deref(), Some("Goodbye"));
    }

    #[googletest::test]
    fn test_translated_in_exact_tags() {
        let merged = translated_in(base(), &dictionary(), ["sv-SE", "en-GB"]);

        expect_that!(text(merged.get("color")), some(eq("colour")));
        expect_that!(text(merged.get("greeting")), some(eq("Hello")));
    }

    #[googletest::test]
    fn test_translated_skips_missing_overrides() {
        let merged = translated(base(), [None, Some(value_from_json(r#"{"bye": "Hejdå"}"#)), None]);

        expect_that!(merged.candidates().len(), eq(4));
        expect_that!(text(merged.get("bye")), some(eq("Hejdå")));
        expect_that!(text(merged.get("missing")), none());
    }
}
