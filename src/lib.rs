//! t9n
//!
//! Field-by-field merging of a base translation with partial, prioritized translations,
//! resolved lazily as fields are read.

pub mod config;
pub mod input;
pub mod merge;
#[cfg(test)]
mod test_utils;
pub mod types;
pub mod value;

pub use input::translation::{
    LanguageTag,
    Translations,
};
pub use merge::{
    CurrentView,
    Languages,
    MergedView,
    Resolved,
    current,
    translated,
    translated_in,
};
pub use types::{
    Key,
    KeyPath,
};
pub use value::{
    Call,
    Callable,
    Value,
};
