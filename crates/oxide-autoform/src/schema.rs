//! Declarative object schemas and their introspection.
//!
//! A form is described by an [`ObjectSchema`]: an ordered set of named
//! [`SchemaNode`]s. Leaves describe one field's primitive kind; wrapper nodes
//! add optionality, nullability, defaults and refinements. [`introspect`]
//! unwraps a node into the flat [`ShapeInfo`] the field builder consumes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::validation::{
    EmailValidator, MaxLengthValidator, MinLengthValidator, RangeValidator, UrlValidator,
    Validator,
};
use crate::value::{FieldValue, FormValues, DATE_FORMAT};

/// A lazily evaluated default value.
///
/// The thunk runs every time the default is needed, so time-dependent
/// defaults reflect evaluation time rather than schema-definition time.
#[derive(Clone)]
pub struct DefaultValue(Arc<dyn Fn() -> FieldValue + Send + Sync>);

impl DefaultValue {
    /// Wraps a constant value.
    pub fn constant(value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        Self(Arc::new(move || value.clone()))
    }

    /// Wraps a producer function.
    pub fn with(producer: impl Fn() -> FieldValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    /// Invokes the producer.
    pub fn produce(&self) -> FieldValue {
        (self.0)()
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultValue(..)")
    }
}

/// A validator attached to a schema node.
#[derive(Clone)]
pub struct Refinement(Arc<dyn Validator>);

impl Refinement {
    /// Returns the wrapped validator.
    pub fn validator(&self) -> &dyn Validator {
        self.0.as_ref()
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Refinement").field(&self.0.message()).finish()
    }
}

/// One node of a form schema.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Free text.
    String,
    /// A number.
    Number,
    /// A boolean.
    Boolean,
    /// A calendar date.
    Date,
    /// One of a fixed, ordered set of literals.
    Enum(Vec<String>),
    /// The inner node may be absent.
    Optional(Box<SchemaNode>),
    /// The inner node may be null.
    Nullable(Box<SchemaNode>),
    /// The inner node has a default.
    Default(Box<SchemaNode>, DefaultValue),
    /// The inner node carries an extra validator.
    Refined(Box<SchemaNode>, Refinement),
    /// A nested object.
    Object(ObjectSchema),
    /// A kind this crate does not know how to render.
    Unknown(String),
}

impl SchemaNode {
    /// Creates a string leaf.
    pub fn string() -> Self {
        Self::String
    }

    /// Creates a number leaf.
    pub fn number() -> Self {
        Self::Number
    }

    /// Creates a boolean leaf.
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// Creates a date leaf.
    pub fn date() -> Self {
        Self::Date
    }

    /// Creates an enumeration leaf.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Creates a leaf of an unsupported kind.
    pub fn unknown(kind: impl Into<String>) -> Self {
        Self::Unknown(kind.into())
    }

    /// Marks the node optional.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Marks the node nullable.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Sets a constant default.
    #[must_use]
    pub fn default(self, value: impl Into<FieldValue>) -> Self {
        Self::Default(Box::new(self), DefaultValue::constant(value))
    }

    /// Sets a lazily produced default.
    #[must_use]
    pub fn default_with(self, producer: impl Fn() -> FieldValue + Send + Sync + 'static) -> Self {
        Self::Default(Box::new(self), DefaultValue::with(producer))
    }

    /// Attaches a validator.
    #[must_use]
    pub fn refine(self, validator: impl Validator + 'static) -> Self {
        Self::Refined(Box::new(self), Refinement(Arc::new(validator)))
    }

    /// Requires at least `min` characters.
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.refine(MinLengthValidator::new(min))
    }

    /// Allows at most `max` characters.
    #[must_use]
    pub fn max_length(self, max: usize) -> Self {
        self.refine(MaxLengthValidator::new(max))
    }

    /// Requires an email address.
    #[must_use]
    pub fn email(self) -> Self {
        self.refine(EmailValidator)
    }

    /// Requires an http(s) URL.
    #[must_use]
    pub fn url(self) -> Self {
        self.refine(UrlValidator)
    }

    /// Bounds a numeric value.
    #[must_use]
    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.refine(RangeValidator::new(min, max))
    }
}

/// An ordered set of named schema nodes.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    shape: Vec<(String, SchemaNode)>,
}

impl ObjectSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. Re-adding an existing key replaces it in place.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, node: SchemaNode) -> Self {
        let key = key.into();
        match self.shape.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = node,
            None => self.shape.push((key, node)),
        }
        self
    }

    /// Returns the node for `key`.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.shape.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    /// Returns the keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.iter().map(|(k, _)| k.as_str())
    }

    /// Returns the `(key, node)` pairs in declaration order.
    pub fn shape(&self) -> &[(String, SchemaNode)] {
        &self.shape
    }

    /// Returns whether the schema declares `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Returns whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Converts submitted `application/x-www-form-urlencoded` pairs into
    /// typed values.
    ///
    /// Values that do not parse as their declared kind are kept as text so
    /// the resolver can report them. Unchecked checkboxes are absent from
    /// submissions and become `false`.
    pub fn parse_data(&self, data: &HashMap<String, String>) -> FormValues {
        let mut values = FormValues::new();
        for (key, node) in &self.shape {
            let info = introspect(node);
            let raw = data.get(key).map(String::as_str);
            let value = match (info.type_kind, raw) {
                (TypeKind::Boolean, None) => FieldValue::Bool(false),
                (TypeKind::Boolean, Some(raw)) => {
                    FieldValue::Bool(matches!(raw, "true" | "on" | "1"))
                }
                (_, None) => continue,
                (_, Some("")) if info.optional || info.nullable => FieldValue::Null,
                (TypeKind::Number, Some(raw)) => raw
                    .trim()
                    .parse::<f64>()
                    .map_or_else(|_| FieldValue::text(raw), FieldValue::Number),
                (TypeKind::Date, Some(raw)) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_or_else(|_| FieldValue::text(raw), FieldValue::Date),
                (_, Some(raw)) => FieldValue::text(raw),
            };
            values.insert(key.clone(), value);
        }
        values
    }
}

/// The primitive kind found under a node's wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    /// Unrecognized leaf kind. Rendered as a string field.
    Unknown,
}

/// Flattened information about one schema node.
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    pub type_kind: TypeKind,
    pub optional: bool,
    pub nullable: bool,
    pub enum_values: Option<Vec<String>>,
    /// Never evaluated by [`introspect`] itself.
    pub default_value: Option<DefaultValue>,
    pub refinements: Vec<Refinement>,
}

/// Unwraps optional/nullable/default/refinement wrappers and reports what
/// lies underneath.
///
/// Flags are OR-ed across the wrapper chain. When several defaults are
/// stacked, the outermost one wins.
pub fn introspect(node: &SchemaNode) -> ShapeInfo {
    let mut info = ShapeInfo {
        type_kind: TypeKind::Unknown,
        optional: false,
        nullable: false,
        enum_values: None,
        default_value: None,
        refinements: Vec::new(),
    };

    let mut current = node;
    loop {
        match current {
            SchemaNode::Optional(inner) => {
                info.optional = true;
                current = inner;
            }
            SchemaNode::Nullable(inner) => {
                info.nullable = true;
                current = inner;
            }
            SchemaNode::Default(inner, default) => {
                if info.default_value.is_none() {
                    info.default_value = Some(default.clone());
                }
                current = inner;
            }
            SchemaNode::Refined(inner, refinement) => {
                info.refinements.push(refinement.clone());
                current = inner;
            }
            SchemaNode::String => {
                info.type_kind = TypeKind::String;
                break;
            }
            SchemaNode::Number => {
                info.type_kind = TypeKind::Number;
                break;
            }
            SchemaNode::Boolean => {
                info.type_kind = TypeKind::Boolean;
                break;
            }
            SchemaNode::Date => {
                info.type_kind = TypeKind::Date;
                break;
            }
            SchemaNode::Enum(values) => {
                info.type_kind = TypeKind::Enum;
                info.enum_values = Some(values.clone());
                break;
            }
            SchemaNode::Object(_) | SchemaNode::Unknown(_) => break,
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_plain_leaf() {
        let info = introspect(&SchemaNode::string());
        assert_eq!(info.type_kind, TypeKind::String);
        assert!(!info.optional);
        assert!(!info.nullable);
        assert!(info.default_value.is_none());
    }

    #[test]
    fn test_wrapper_chain_flags() {
        let node = SchemaNode::number().nullable().default(3.0).optional();
        let info = introspect(&node);
        assert_eq!(info.type_kind, TypeKind::Number);
        assert!(info.optional);
        assert!(info.nullable);
        assert_eq!(
            info.default_value.map(|d| d.produce()),
            Some(FieldValue::Number(3.0))
        );
    }

    #[test]
    fn test_enum_values_in_order() {
        let info = introspect(&SchemaNode::enumeration(["draft", "published"]));
        assert_eq!(info.type_kind, TypeKind::Enum);
        assert_eq!(
            info.enum_values,
            Some(vec!["draft".to_string(), "published".to_string()])
        );
    }

    #[test]
    fn test_unknown_kind_does_not_fail() {
        let info = introspect(&SchemaNode::unknown("array").optional());
        assert_eq!(info.type_kind, TypeKind::Unknown);
        assert!(info.optional);
    }

    #[test]
    fn test_default_is_lazy() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let node = SchemaNode::string().default_with(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            FieldValue::text("now")
        });

        let info = introspect(&node);
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        let default = info.default_value.unwrap();
        default.produce();
        default.produce();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_refinements_collected() {
        let info = introspect(&SchemaNode::string().min_length(2).email());
        assert_eq!(info.type_kind, TypeKind::String);
        assert_eq!(info.refinements.len(), 2);
    }

    #[test]
    fn test_object_keys_keep_order_and_stay_unique() {
        let schema = ObjectSchema::new()
            .field("b", SchemaNode::string())
            .field("a", SchemaNode::number())
            .field("b", SchemaNode::boolean());
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(matches!(schema.get("b"), Some(SchemaNode::Boolean)));
    }

    #[test]
    fn test_parse_data() {
        let schema = ObjectSchema::new()
            .field("name", SchemaNode::string())
            .field("age", SchemaNode::number().optional())
            .field("born", SchemaNode::date())
            .field("agree", SchemaNode::boolean())
            .field("count", SchemaNode::number());

        let data: HashMap<String, String> = [
            ("name", "Ada"),
            ("age", ""),
            ("born", "1815-12-10"),
            ("count", "many"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let values = schema.parse_data(&data);
        assert_eq!(values["name"], FieldValue::text("Ada"));
        assert_eq!(values["age"], FieldValue::Null);
        assert_eq!(
            values["born"],
            FieldValue::Date(NaiveDate::from_ymd_opt(1815, 12, 10).unwrap())
        );
        assert_eq!(values["agree"], FieldValue::Bool(false));
        assert_eq!(values["count"], FieldValue::text("many"));
    }
}
