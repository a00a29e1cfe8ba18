//! Inputs handed to the merge: translation dictionaries and language tags.

pub mod translation;
