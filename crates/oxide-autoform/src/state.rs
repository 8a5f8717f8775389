//! Live form state: values, validation errors, dirty/touched flags and
//! submission status.
//!
//! The form controller only talks to this layer through [`FormAdapter`].
//! [`FormState`] is the in-memory implementation used by default; it runs a
//! [`Resolver`] according to the configured [`ValidationMode`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{FormError, Result};
use crate::validation::Resolver;
use crate::value::{FieldValue, FormValues};

/// When fields are validated before the first submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnBlur,
    OnChange,
    OnTouched,
    All,
}

/// When fields are re-validated after the first submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReValidateMode {
    OnSubmit,
    OnBlur,
    #[default]
    OnChange,
}

/// Where a field error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Produced by the resolver.
    Validation,
    /// Written from externally supplied errors.
    Custom,
    /// Returned by the submit handler.
    Submit,
}

/// The current error of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: String,
}

/// Read/write contract between the form controller and a form-state
/// implementation.
pub trait FormAdapter {
    /// Marks `key` as rendered, which makes it focusable.
    fn register(&mut self, key: &str);

    /// Returns whether `key` has been registered.
    fn is_registered(&self, key: &str) -> bool;

    /// Returns the current error message of `key`.
    fn error(&self, key: &str) -> Option<&str>;

    /// Returns all current errors.
    fn errors(&self) -> HashMap<String, String>;

    /// Returns whether `key` differs from its default.
    fn is_dirty(&self, key: &str) -> bool;

    /// Returns whether `key` has been blurred at least once.
    fn is_touched(&self, key: &str) -> bool;

    /// Returns whether a submission is in flight.
    fn is_submitting(&self) -> bool;

    /// Returns whether at least one submit was attempted.
    fn is_submitted(&self) -> bool;

    /// Returns whether the current values pass validation.
    fn is_valid(&self) -> bool;

    /// Returns the current values.
    fn values(&self) -> &FormValues;

    /// Handles an input change.
    fn set_value(&mut self, key: &str, value: FieldValue);

    /// Handles a blur event.
    fn blur(&mut self, key: &str);

    /// Sets an error on `key`.
    fn set_field_error(&mut self, key: &str, kind: FieldErrorKind, message: String);

    /// Removes every error.
    fn clear_errors(&mut self);

    /// Moves focus to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FocusUnavailable`] when `key` is not registered.
    fn set_focus(&mut self, key: &str) -> Result<()>;

    /// Returns the focused field.
    fn focused(&self) -> Option<&str>;

    /// Replaces values and defaults, clearing errors and flags.
    fn reset(&mut self, values: FormValues);

    /// Validates everything for a submit, returning the parsed values on
    /// success. Errors replace the current ones.
    fn validate_all(&mut self) -> Option<FormValues>;

    /// Flags a submission as started or settled.
    fn set_submitting(&mut self, submitting: bool);
}

/// In-memory form state driven by a [`Resolver`].
pub struct FormState {
    resolver: Arc<dyn Resolver>,
    mode: ValidationMode,
    re_validate_mode: ReValidateMode,
    default_values: FormValues,
    values: FormValues,
    errors: HashMap<String, FieldError>,
    registered: HashSet<String>,
    dirty: HashSet<String>,
    touched: HashSet<String>,
    focused: Option<String>,
    submitting: bool,
    submit_count: usize,
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("mode", &self.mode)
            .field("re_validate_mode", &self.re_validate_mode)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("submitting", &self.submitting)
            .field("submit_count", &self.submit_count)
            .finish_non_exhaustive()
    }
}

impl FormState {
    /// Creates state seeded with `default_values`.
    pub fn new(resolver: Arc<dyn Resolver>, default_values: FormValues) -> Self {
        Self {
            resolver,
            mode: ValidationMode::default(),
            re_validate_mode: ReValidateMode::default(),
            values: default_values.clone(),
            default_values,
            errors: HashMap::new(),
            registered: HashSet::new(),
            dirty: HashSet::new(),
            touched: HashSet::new(),
            focused: None,
            submitting: false,
            submit_count: 0,
        }
    }

    /// Sets the validation modes.
    #[must_use]
    pub fn modes(mut self, mode: ValidationMode, re_validate_mode: ReValidateMode) -> Self {
        self.mode = mode;
        self.re_validate_mode = re_validate_mode;
        self
    }

    /// Returns the number of submit attempts.
    pub fn submit_count(&self) -> usize {
        self.submit_count
    }

    /// Returns the full error record of `key`.
    pub fn field_error(&self, key: &str) -> Option<&FieldError> {
        self.errors.get(key)
    }

    fn validate_on_change(&self, key: &str) -> bool {
        if self.mode == ValidationMode::All {
            return true;
        }
        if self.is_submitted() {
            return self.re_validate_mode == ReValidateMode::OnChange;
        }
        match self.mode {
            ValidationMode::OnChange => true,
            ValidationMode::OnTouched => self.touched.contains(key),
            _ => false,
        }
    }

    fn validate_on_blur(&self) -> bool {
        if self.mode == ValidationMode::All {
            return true;
        }
        if self.is_submitted() {
            return self.re_validate_mode == ReValidateMode::OnBlur;
        }
        matches!(self.mode, ValidationMode::OnBlur | ValidationMode::OnTouched)
    }

    fn validate_field(&mut self, key: &str) {
        let message = self.resolver.resolve(&self.values).err().and_then(|mut e| e.remove(key));
        trace!(field = key, error = ?message, "validated field");
        match message {
            Some(message) => {
                self.errors.insert(
                    key.to_string(),
                    FieldError {
                        kind: FieldErrorKind::Validation,
                        message,
                    },
                );
            }
            None => {
                self.errors.remove(key);
            }
        }
    }
}

impl FormAdapter for FormState {
    fn register(&mut self, key: &str) {
        self.registered.insert(key.to_string());
    }

    fn is_registered(&self, key: &str) -> bool {
        self.registered.contains(key)
    }

    fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(|e| e.message.as_str())
    }

    fn errors(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|(k, e)| (k.clone(), e.message.clone()))
            .collect()
    }

    fn is_dirty(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    fn is_touched(&self, key: &str) -> bool {
        self.touched.contains(key)
    }

    fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }

    fn is_valid(&self) -> bool {
        self.resolver.resolve(&self.values).is_ok()
    }

    fn values(&self) -> &FormValues {
        &self.values
    }

    fn set_value(&mut self, key: &str, value: FieldValue) {
        let pristine = self.default_values.get(key).map_or(value.is_blank(), |d| *d == value);
        if pristine {
            self.dirty.remove(key);
        } else {
            self.dirty.insert(key.to_string());
        }
        self.values.insert(key.to_string(), value);

        if self.validate_on_change(key) {
            self.validate_field(key);
        }
    }

    fn blur(&mut self, key: &str) {
        self.touched.insert(key.to_string());
        if self.focused.as_deref() == Some(key) {
            self.focused = None;
        }
        if self.validate_on_blur() {
            self.validate_field(key);
        }
    }

    fn set_field_error(&mut self, key: &str, kind: FieldErrorKind, message: String) {
        self.errors
            .insert(key.to_string(), FieldError { kind, message });
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn set_focus(&mut self, key: &str) -> Result<()> {
        if !self.registered.contains(key) {
            return Err(FormError::FocusUnavailable(key.to_string()));
        }
        self.focused = Some(key.to_string());
        Ok(())
    }

    fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    fn reset(&mut self, values: FormValues) {
        self.default_values = values.clone();
        self.values = values;
        self.errors.clear();
        self.dirty.clear();
        self.touched.clear();
        self.submit_count = 0;
    }

    fn validate_all(&mut self) -> Option<FormValues> {
        self.submit_count += 1;
        match self.resolver.resolve(&self.values) {
            Ok(parsed) => {
                self.errors.clear();
                Some(parsed)
            }
            Err(errors) => {
                self.errors = errors
                    .into_iter()
                    .map(|(key, message)| {
                        let error = FieldError {
                            kind: FieldErrorKind::Validation,
                            message,
                        };
                        (key, error)
                    })
                    .collect();
                None
            }
        }
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectSchema, SchemaNode};
    use crate::validation::SchemaResolver;

    fn state(mode: ValidationMode) -> FormState {
        let schema = ObjectSchema::new()
            .field("email", SchemaNode::string().email())
            .field("age", SchemaNode::number().optional());
        let defaults: FormValues = [("email".to_string(), FieldValue::text(""))]
            .into_iter()
            .collect();
        FormState::new(Arc::new(SchemaResolver::new(schema)), defaults)
            .modes(mode, ReValidateMode::OnChange)
    }

    #[test]
    fn test_on_submit_mode_waits_for_submit() {
        let mut state = state(ValidationMode::OnSubmit);
        state.set_value("email", FieldValue::text("nope"));
        state.blur("email");
        assert_eq!(state.error("email"), None);

        assert!(state.validate_all().is_none());
        assert_eq!(state.error("email"), Some("Enter a valid email address."));

        // re-validates on change once submitted
        state.set_value("email", FieldValue::text("ada@example.com"));
        assert_eq!(state.error("email"), None);
    }

    #[test]
    fn test_on_change_mode() {
        let mut state = state(ValidationMode::OnChange);
        state.set_value("email", FieldValue::text("nope"));
        assert!(state.error("email").is_some());
        assert!(!state.is_valid());
    }

    #[test]
    fn test_on_blur_mode() {
        let mut state = state(ValidationMode::OnBlur);
        state.set_value("email", FieldValue::text("nope"));
        assert!(state.error("email").is_none());
        state.blur("email");
        assert!(state.error("email").is_some());
        assert!(state.is_touched("email"));
    }

    #[test]
    fn test_on_touched_mode() {
        let mut state = state(ValidationMode::OnTouched);
        state.set_value("email", FieldValue::text("nope"));
        assert!(state.error("email").is_none());
        state.blur("email");
        state.set_value("email", FieldValue::text("still nope"));
        assert!(state.error("email").is_some());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut state = state(ValidationMode::OnSubmit);
        state.set_value("email", FieldValue::text("a"));
        assert!(state.is_dirty("email"));
        state.set_value("email", FieldValue::text(""));
        assert!(!state.is_dirty("email"));
        state.set_value("age", FieldValue::text(""));
        assert!(!state.is_dirty("age"));
    }

    #[test]
    fn test_focus_requires_registration() {
        let mut state = state(ValidationMode::OnSubmit);
        assert!(matches!(
            state.set_focus("email"),
            Err(FormError::FocusUnavailable(_))
        ));
        state.register("email");
        state.set_focus("email").unwrap();
        assert_eq!(state.focused(), Some("email"));
        state.blur("email");
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_reset_clears_errors_and_flags() {
        let mut state = state(ValidationMode::OnChange);
        state.set_value("email", FieldValue::text("nope"));
        state.set_field_error("age", FieldErrorKind::Custom, "bad".to_string());
        state.reset([("email".to_string(), FieldValue::text("x@y.io"))].into_iter().collect());

        assert!(state.errors().is_empty());
        assert!(!state.is_dirty("email"));
        assert_eq!(state.values()["email"], FieldValue::text("x@y.io"));
        assert!(!state.is_submitted());
    }
}
