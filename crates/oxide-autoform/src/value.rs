//! Form values and their coercion into form-compatible representations.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::field::FieldType;

/// Format used for date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value.
    Null,
    /// A boolean, as produced by checkboxes.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A calendar date.
    Date(NaiveDate),
    /// Free text.
    Text(String),
}

impl FieldValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns whether this value counts as "not provided".
    ///
    /// Empty text is treated like a missing value, the way browsers submit
    /// untouched inputs.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Returns the text form of the value, as it would be submitted by a browser.
    pub fn to_form_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Text(t) => t.clone(),
        }
    }

    /// Returns the inner text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_form_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Values keyed by field name.
pub type FormValues = HashMap<String, FieldValue>;

/// Converts a value into the representation a form control expects.
///
/// Implementations are keyed by [`FieldType`]; returning `None` means the
/// control starts empty.
pub trait Coerce: Send + Sync {
    /// Coerces `value` for a field of type `field_type`.
    fn coerce(&self, value: FieldValue, field_type: FieldType) -> Option<FieldValue>;
}

/// The built-in coercion.
///
/// Dates become `YYYY-MM-DD` text, numbers become their decimal text,
/// booleans stay booleans only on boolean fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCoercion;

impl Coerce for DefaultCoercion {
    fn coerce(&self, value: FieldValue, field_type: FieldType) -> Option<FieldValue> {
        match (value, field_type) {
            (FieldValue::Null, _) => None,
            (FieldValue::Bool(b), FieldType::Boolean) => Some(FieldValue::Bool(b)),
            (FieldValue::Text(t), FieldType::Boolean) => {
                Some(FieldValue::Bool(matches!(t.as_str(), "true" | "on" | "1")))
            }
            (FieldValue::Text(t), _) => Some(FieldValue::Text(t)),
            (other, _) => Some(FieldValue::Text(other.to_form_string())),
        }
    }
}

impl<F> Coerce for F
where
    F: Fn(FieldValue, FieldType) -> Option<FieldValue> + Send + Sync,
{
    fn coerce(&self, value: FieldValue, field_type: FieldType) -> Option<FieldValue> {
        self(value, field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_coerced_to_input_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let coerced = DefaultCoercion.coerce(FieldValue::Date(date), FieldType::Date);
        assert_eq!(coerced, Some(FieldValue::text("2024-03-09")));
    }

    #[test]
    fn test_number_coerced_to_text() {
        let coerced = DefaultCoercion.coerce(FieldValue::Number(42.0), FieldType::Number);
        assert_eq!(coerced, Some(FieldValue::text("42")));
    }

    #[test]
    fn test_null_coerces_to_nothing() {
        assert_eq!(DefaultCoercion.coerce(FieldValue::Null, FieldType::String), None);
    }

    #[test]
    fn test_boolean_text_on_boolean_field() {
        let coerced = DefaultCoercion.coerce(FieldValue::text("on"), FieldType::Boolean);
        assert_eq!(coerced, Some(FieldValue::Bool(true)));
        let coerced = DefaultCoercion.coerce(FieldValue::Bool(true), FieldType::String);
        assert_eq!(coerced, Some(FieldValue::text("true")));
    }

    #[test]
    fn test_is_blank() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::text("").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn test_untagged_json() {
        let value: FieldValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(value, FieldValue::Number(12.5));
        let value: FieldValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(value, FieldValue::text("hello"));
    }
}
