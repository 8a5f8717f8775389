//! Field descriptors and the builder that derives them.
//!
//! A [`Field`] is the render-ready description of one schema key. It is
//! recomputed on every render pass from the schema, the live form state and
//! the form props, and is never mutated in place. Explicit per-placeholder
//! overrides are carried by [`FieldProps`] and applied with [`merge`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::form::FormProps;
use crate::label::infer_label;
use crate::schema::{introspect, ObjectSchema, TypeKind};
use crate::state::FormAdapter;
use crate::value::{FieldValue, FormValues};

/// The closed set of field types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl FieldType {
    /// Maps an introspected kind to a field type. Enumerations and unknown
    /// kinds render as strings.
    pub fn from_kind(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Number => Self::Number,
            TypeKind::Boolean => Self::Boolean,
            TypeKind::Date => Self::Date,
            TypeKind::String | TypeKind::Enum | TypeKind::Unknown => Self::String,
        }
    }

    /// Returns the HTML input type.
    pub fn input_type(self) -> &'static str {
        match self {
            Self::String => "text",
            Self::Number => "number",
            Self::Boolean => "checkbox",
            Self::Date => "date",
        }
    }
}

/// One entry of a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display name.
    pub name: String,
    /// Submitted value.
    pub value: String,
}

impl FieldOption {
    /// Creates an option.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The empty option offered by non-required fields.
    pub fn blank() -> Self {
        Self::new("", "")
    }
}

/// Render-ready description of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub dirty: bool,
    pub label: String,
    pub options: Option<Vec<FieldOption>>,
    pub errors: Option<Vec<String>>,
    pub auto_focus: bool,
    pub value: Option<FieldValue>,
    pub default_value: Option<FieldValue>,
    pub hidden: bool,
    pub multiline: bool,
    pub radio: bool,
    pub placeholder: Option<String>,
}

impl Field {
    /// Returns whether the field currently shows errors.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Explicit properties set on a Field placeholder.
///
/// Every property left as `None` falls back to the derived value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldProps {
    pub name: String,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub label: Option<String>,
    pub options: Option<Vec<FieldOption>>,
    pub errors: Option<Vec<String>>,
    pub auto_focus: Option<bool>,
    pub value: Option<FieldValue>,
    pub hidden: Option<bool>,
    pub multiline: Option<bool>,
    pub radio: Option<bool>,
    pub placeholder: Option<String>,
}

impl FieldProps {
    /// Creates props naming `name` with nothing overridden.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Overrides the field type.
    #[must_use]
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Overrides requiredness.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Overrides the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Overrides the options.
    #[must_use]
    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Overrides the errors.
    #[must_use]
    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Overrides auto-focus.
    #[must_use]
    pub fn auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = Some(auto_focus);
        self
    }

    /// Overrides the value. Also used as the initial value on mount.
    #[must_use]
    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Overrides the hidden flag.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    /// Overrides the multiline flag.
    #[must_use]
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = Some(multiline);
        self
    }

    /// Overrides the radio flag.
    #[must_use]
    pub fn radio(mut self, radio: bool) -> Self {
        self.radio = Some(radio);
        self
    }

    /// Overrides the placeholder.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

fn pick<T: Clone>(explicit: Option<&T>, derived: &T) -> T {
    explicit.unwrap_or(derived).clone()
}

/// Shallow merge of explicit properties over a derived descriptor.
///
/// Every property set in `explicit` wins. `name` always comes from `derived`.
pub fn merge(derived: &Field, explicit: &FieldProps) -> Field {
    Field {
        name: derived.name.clone(),
        field_type: pick(explicit.field_type.as_ref(), &derived.field_type),
        required: pick(explicit.required.as_ref(), &derived.required),
        dirty: derived.dirty,
        label: pick(explicit.label.as_ref(), &derived.label),
        options: explicit.options.clone().or_else(|| derived.options.clone()),
        errors: explicit.errors.clone().or_else(|| derived.errors.clone()),
        auto_focus: pick(explicit.auto_focus.as_ref(), &derived.auto_focus),
        value: explicit.value.clone().or_else(|| derived.value.clone()),
        default_value: derived.default_value.clone(),
        hidden: pick(explicit.hidden.as_ref(), &derived.hidden),
        multiline: pick(explicit.multiline.as_ref(), &derived.multiline),
        radio: pick(explicit.radio.as_ref(), &derived.radio),
        placeholder: explicit
            .placeholder
            .clone()
            .or_else(|| derived.placeholder.clone()),
    }
}

/// Computes the initial value of every key: explicit values first, then
/// schema defaults, coerced for the field type.
///
/// Each default producer runs at most once per call.
pub fn default_values(schema: &ObjectSchema, props: &FormProps) -> FormValues {
    let mut defaults = FormValues::new();
    for (key, node) in schema.shape() {
        let info = introspect(node);
        let field_type = FieldType::from_kind(info.type_kind);
        let raw = match props.values.get(key) {
            Some(value) if *value != FieldValue::Null => Some(value.clone()),
            _ => info.default_value.as_ref().map(|d| d.produce()),
        };
        if let Some(value) = raw.and_then(|v| props.coercion.coerce(v, field_type)) {
            defaults.insert(key.clone(), value);
        }
    }
    defaults
}

/// Everything needed to derive field descriptors for one render pass.
pub struct FieldContext<'a> {
    schema: &'a ObjectSchema,
    props: &'a FormProps,
    adapter: &'a dyn FormAdapter,
    default_values: FormValues,
    errors: HashMap<String, Vec<String>>,
    first_errored: Option<String>,
}

impl<'a> FieldContext<'a> {
    /// Prepares a render pass for a form whose external errors have not been
    /// injected into the adapter yet.
    ///
    /// A live validation message beats the externally supplied errors for
    /// the same key.
    pub fn new(
        schema: &'a ObjectSchema,
        props: &'a FormProps,
        adapter: &'a dyn FormAdapter,
    ) -> Self {
        Self::build(schema, props, adapter, true)
    }

    /// Prepares a render pass for a mounted form.
    ///
    /// External errors were injected on mount, so the adapter is the only
    /// source of field errors and a cleared error stays cleared.
    pub fn mounted(
        schema: &'a ObjectSchema,
        props: &'a FormProps,
        adapter: &'a dyn FormAdapter,
    ) -> Self {
        Self::build(schema, props, adapter, false)
    }

    fn build(
        schema: &'a ObjectSchema,
        props: &'a FormProps,
        adapter: &'a dyn FormAdapter,
        external: bool,
    ) -> Self {
        let mut errors = HashMap::new();
        for key in schema.keys() {
            let resolved = match adapter.error(key) {
                Some(message) => Some(vec![message.to_string()]),
                None if external => props
                    .errors
                    .as_ref()
                    .and_then(|e| e.get(key))
                    .filter(|messages| !messages.is_empty())
                    .cloned(),
                None => None,
            };
            if let Some(messages) = resolved {
                errors.insert(key.to_string(), messages);
            }
        }

        let first_errored = schema
            .keys()
            .find(|key| errors.contains_key(*key))
            .map(ToString::to_string);

        Self {
            schema,
            props,
            adapter,
            default_values: default_values(schema, props),
            errors,
            first_errored,
        }
    }

    /// Returns the first key, in schema order, carrying errors.
    pub fn first_errored(&self) -> Option<&str> {
        self.first_errored.as_deref()
    }

    /// Returns the resolved errors of every key.
    pub fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    /// Returns the initial values computed for this pass.
    pub fn default_values(&self) -> &FormValues {
        &self.default_values
    }

    /// Returns the schema.
    pub fn schema(&self) -> &ObjectSchema {
        self.schema
    }

    /// Returns the props.
    pub fn props(&self) -> &FormProps {
        self.props
    }

    /// Derives the descriptor for `key`, or `None` if the schema lacks it.
    pub fn build_field(&self, key: &str) -> Option<Field> {
        let node = self.schema.get(key)?;
        let info = introspect(node);
        let props = self.props;

        let required = !(info.optional || info.nullable);
        let field_type = FieldType::from_kind(info.type_kind);

        let options = props.options.get(key).cloned().or_else(|| {
            info.enum_values.as_ref().map(|values| {
                values
                    .iter()
                    .map(|v| FieldOption::new(infer_label(v), v.clone()))
                    .collect()
            })
        });
        let options = match options {
            Some(list) if !required => {
                Some(std::iter::once(FieldOption::blank()).chain(list).collect())
            }
            other => other,
        };

        let label = props
            .labels
            .get(key)
            .filter(|l| !l.is_empty())
            .cloned()
            .unwrap_or_else(|| infer_label(key));

        let default_value = self.default_values.get(key).cloned();
        let value = self
            .adapter
            .values()
            .get(key)
            .filter(|v| **v != FieldValue::Null)
            .and_then(|v| props.coercion.coerce(v.clone(), field_type))
            .or_else(|| default_value.clone());

        let auto_focus = match self.first_errored.as_deref() {
            Some(first) => first == key,
            None => props.auto_focus.as_deref() == Some(key),
        };

        Some(Field {
            name: key.to_string(),
            field_type,
            required,
            dirty: self.adapter.is_dirty(key),
            label,
            options,
            errors: self.errors.get(key).cloned(),
            auto_focus,
            value,
            default_value,
            hidden: props.hidden_fields.iter().any(|k| k == key),
            multiline: props.multiline.iter().any(|k| k == key),
            radio: props.radio.iter().any(|k| k == key),
            placeholder: props.placeholders.get(key).cloned(),
        })
    }

    /// Derives descriptors for every schema key, in schema order.
    pub fn build_all(&self) -> Vec<Field> {
        self.schema
            .keys()
            .filter_map(|key| self.build_field(key))
            .collect()
    }

    /// Decides the final auto-focus of a placeholder-customized field.
    ///
    /// While any field has errors, only the first errored field may be
    /// focused, and only its own override can switch that off. Otherwise the
    /// placeholder's override wins over the derived flag.
    pub fn auto_focus_for(&self, field: &Field, explicit: Option<bool>) -> bool {
        match self.first_errored.as_deref() {
            Some(first) => first == field.name && explicit.unwrap_or(true),
            None => explicit.unwrap_or(field.auto_focus),
        }
    }
}
