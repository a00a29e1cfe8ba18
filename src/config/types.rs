use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::merge::Languages;
use crate::types::DEFAULT_KEY_SEPARATOR;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "languages[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbers the errors one per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct T9nSettings {
    /// Separator between the fields of a key path, e.g. `"."` in `"gr.k4"`.
    pub key_separator: String,

    /// Single language tag, overlaid as `language` then `language-REGION`.
    ///
    /// Mutually exclusive with `languages`.
    pub language: Option<String>,

    /// Exact dictionary tags, lowest priority first.
    ///
    /// Mutually exclusive with `language`.
    pub languages: Option<Vec<String>>,
}

impl T9nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid separator
    /// - Both language selections set
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        } else if self.key_separator.contains(['[', ']']) {
            errors.push(ValidationError::new(
                "keySeparator",
                format!(
                    "The separator '{}' cannot contain brackets; they are reserved for indices like \"items[0]\"",
                    self.key_separator
                ),
            ));
        }

        if let Some(tag) = &self.language
            && tag.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "language",
                "The language tag cannot be empty. Example: \"sv-SE\", or remove this field",
            ));
        }

        for (index, tag) in self.languages.iter().flatten().enumerate() {
            if tag.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("languages[{index}]"),
                    "The language tag cannot be empty. Example: [\"sv\", \"sv-SE\"]",
                ));
            }
        }

        if self.language.is_some() && self.languages.is_some() {
            errors.push(ValidationError::new(
                "language/languages",
                "Cannot specify both 'language' and 'languages'. Please use only one",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The configured language selection, if any.
    #[must_use]
    pub fn languages(&self) -> Option<Languages> {
        self.languages
            .clone()
            .map(Languages::Tags)
            .or_else(|| self.language.clone().map(Languages::Tag))
    }
}

impl Default for T9nSettings {
    fn default() -> Self {
        Self { key_separator: DEFAULT_KEY_SEPARATOR.to_string(), language: None, languages: None }
    }
}
