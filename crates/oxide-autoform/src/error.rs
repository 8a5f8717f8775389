//! Error types for forms.

use std::collections::HashMap;
use thiserror::Error;

/// Key under which errors not tied to any field are stored.
pub const GLOBAL_ERRORS_KEY: &str = "_global";

/// Form-specific errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// The field to focus is not currently mounted.
    #[error("field is not focusable: {0}")]
    FocusUnavailable(String),

    /// The schema has no field with this key.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Invalid form configuration.
    #[error("invalid form configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Externally supplied error messages, keyed by field.
///
/// Messages under [`GLOBAL_ERRORS_KEY`] are not attributable to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FormErrors {
    /// Errors keyed by field name.
    pub errors: HashMap<String, Vec<String>>,
}

impl FormErrors {
    /// Creates a new empty FormErrors.
    pub fn new() -> Self {
        Self {
            errors: HashMap::new(),
        }
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Builder variant of [`FormErrors::add`].
    #[must_use]
    pub fn with(mut self, field: &str, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Adds an error that belongs to no field.
    pub fn add_global(&mut self, message: impl Into<String>) {
        self.add(GLOBAL_ERRORS_KEY, message);
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    /// Returns the number of keys with errors.
    pub fn len(&self) -> usize {
        self.errors.values().filter(|m| !m.is_empty()).count()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns the global errors.
    pub fn global(&self) -> Option<&Vec<String>> {
        self.errors.get(GLOBAL_ERRORS_KEY)
    }

    /// Iterates over field-keyed errors, skipping the global bucket.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .filter(|(key, _)| key.as_str() != GLOBAL_ERRORS_KEY)
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.errors.keys().collect();
        keys.sort();
        for field in keys {
            for message in &self.errors[field] {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
