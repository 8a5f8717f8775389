//! Data-only form configuration loadable from JSON.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{FormErrors, Result};
use crate::field::FieldOption;
use crate::form::{FormProps, Method};
use crate::state::{ReValidateMode, ValidationMode};
use crate::value::FormValues;

/// The serializable subset of [`FormProps`].
///
/// Keys are camelCase, e.g. `hiddenFields` or `pendingButtonLabel`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    pub method: Option<Method>,
    pub action: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    pub mode: Option<ValidationMode>,
    pub re_validate_mode: Option<ReValidateMode>,
    pub labels: HashMap<String, String>,
    pub placeholders: HashMap<String, String>,
    pub options: HashMap<String, Vec<FieldOption>>,
    pub hidden_fields: Vec<String>,
    pub multiline: Vec<String>,
    pub radio: Vec<String>,
    pub auto_focus: Option<String>,
    pub errors: Option<FormErrors>,
    pub values: FormValues,
    pub button_label: Option<String>,
    pub pending_button_label: Option<String>,
}

impl FormConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FormProps {
    /// Creates props from a configuration, leaving everything it does not
    /// set at its default.
    pub fn from_config(config: FormConfig) -> Self {
        let defaults = Self::default();
        Self {
            method: config.method.unwrap_or(defaults.method),
            action: config.action,
            id: config.id,
            class: config.class,
            mode: config.mode.unwrap_or(defaults.mode),
            re_validate_mode: config.re_validate_mode.unwrap_or(defaults.re_validate_mode),
            labels: config.labels,
            placeholders: config.placeholders,
            options: config.options,
            hidden_fields: config.hidden_fields,
            multiline: config.multiline,
            radio: config.radio,
            auto_focus: config.auto_focus,
            errors: config.errors,
            values: config.values,
            button_label: config.button_label.unwrap_or(defaults.button_label),
            pending_button_label: config
                .pending_button_label
                .unwrap_or(defaults.pending_button_label),
            ..defaults
        }
    }
}
