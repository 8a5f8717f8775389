//! Validation: the resolver that checks a whole form against its schema, and
//! the per-field refinement validators it runs.
//!
//! The form controller treats validation as opaque: anything implementing
//! [`Resolver`] can stand in for [`SchemaResolver`].

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::schema::{introspect, ObjectSchema, TypeKind};
use crate::value::{FieldValue, FormValues, DATE_FORMAT};

/// Checks submitted values and produces the parsed values handed to the
/// submit handler.
pub trait Resolver: Send + Sync {
    /// Returns the parsed values, or one error message per failing field.
    fn resolve(&self, values: &FormValues) -> Result<FormValues, HashMap<String, String>>;
}

/// Validates values against an [`ObjectSchema`].
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    schema: ObjectSchema,
}

impl SchemaResolver {
    /// Creates a resolver for `schema`.
    pub fn new(schema: ObjectSchema) -> Self {
        Self { schema }
    }

    fn parse_leaf(
        type_kind: TypeKind,
        enum_values: Option<&[String]>,
        value: &FieldValue,
    ) -> Result<FieldValue, String> {
        match (type_kind, value) {
            (TypeKind::Number, FieldValue::Number(n)) => Ok(FieldValue::Number(*n)),
            (TypeKind::Number, FieldValue::Text(t)) => t
                .trim()
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| "Expected number".to_string()),
            (TypeKind::Number, _) => Err("Expected number".to_string()),
            (TypeKind::Boolean, FieldValue::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (TypeKind::Boolean, FieldValue::Text(t)) => match t.as_str() {
                "true" | "on" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "off" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err("Expected boolean".to_string()),
            },
            (TypeKind::Boolean, _) => Err("Expected boolean".to_string()),
            (TypeKind::Date, FieldValue::Date(d)) => Ok(FieldValue::Date(*d)),
            (TypeKind::Date, FieldValue::Text(t)) => NaiveDate::parse_from_str(t, DATE_FORMAT)
                .map(FieldValue::Date)
                .map_err(|_| "Expected date".to_string()),
            (TypeKind::Date, _) => Err("Expected date".to_string()),
            (TypeKind::Enum, value) => {
                let text = value.to_form_string();
                if enum_values.is_some_and(|allowed| allowed.iter().any(|v| *v == text)) {
                    Ok(FieldValue::Text(text))
                } else {
                    Err("Invalid option".to_string())
                }
            }
            (TypeKind::String, value) => Ok(FieldValue::Text(value.to_form_string())),
            (TypeKind::Unknown, value) => Ok(value.clone()),
        }
    }
}

impl Resolver for SchemaResolver {
    fn resolve(&self, values: &FormValues) -> Result<FormValues, HashMap<String, String>> {
        let mut parsed = FormValues::new();
        let mut errors = HashMap::new();

        for (key, node) in self.schema.shape() {
            let info = introspect(node);
            let value = match values.get(key) {
                None if info.type_kind == TypeKind::Boolean => FieldValue::Bool(false),
                None => FieldValue::Null,
                Some(value) => value.clone(),
            };

            if value.is_blank() {
                if info.optional || info.nullable {
                    parsed.insert(key.clone(), FieldValue::Null);
                } else {
                    errors.insert(key.clone(), "Required".to_string());
                }
                continue;
            }

            let parsed_leaf =
                Self::parse_leaf(info.type_kind, info.enum_values.as_deref(), &value);
            let leaf = match parsed_leaf {
                Ok(leaf) => leaf,
                Err(message) => {
                    errors.insert(key.clone(), message);
                    continue;
                }
            };

            let refinement_error = info
                .refinements
                .iter()
                .find_map(|r| r.validator().validate(&leaf).err());

            match refinement_error {
                Some(message) => {
                    errors.insert(key.clone(), message);
                }
                None => {
                    parsed.insert(key.clone(), leaf);
                }
            }
        }

        if errors.is_empty() {
            Ok(parsed)
        } else {
            Err(errors)
        }
    }
}

impl<F> Resolver for F
where
    F: Fn(&FormValues) -> Result<FormValues, HashMap<String, String>> + Send + Sync,
{
    fn resolve(&self, values: &FormValues) -> Result<FormValues, HashMap<String, String>> {
        self(values)
    }
}

/// A refinement run on a value that already passed its type check.
pub trait Validator: Send + Sync {
    /// Validates a parsed value and returns an error message if invalid.
    fn validate(&self, value: &FieldValue) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Number of characters in the form representation of `value`.
fn char_count(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(text) => text.chars().count(),
        other => other.to_form_string().chars().count(),
    }
}

/// Rejects values longer than a number of characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if char_count(value) > self.max_length {
            return Err(self.message.clone());
        }
        Ok(())
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rejects values shorter than a number of characters.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
    message: String,
}

impl MinLengthValidator {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Ensure this value has at least {min_length} characters."),
        }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if char_count(value) < self.min_length {
            return Err(self.message.clone());
        }
        Ok(())
    }

    fn message(&self) -> &str {
        &self.message
    }
}

static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Accepts e-mail addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl Validator for EmailValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let text = value.to_form_string();
        if EMAIL_REGEX.as_ref().is_some_and(|re| re.is_match(&text)) {
            Ok(())
        } else {
            Err(self.message().to_string())
        }
    }

    fn message(&self) -> &str {
        "Enter a valid email address."
    }
}

/// Accepts absolute `http` and `https` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator;

impl Validator for UrlValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let text = value.to_form_string();
        let rest = text
            .strip_prefix("https://")
            .or_else(|| text.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(self.message().to_string()),
        }
    }

    fn message(&self) -> &str {
        "Enter a valid URL."
    }
}

/// Accepts values matching a pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if self.pattern.is_match(&value.to_form_string()) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Bounds a number, inclusively.
#[derive(Debug, Clone)]
pub struct RangeValidator {
    min: Option<f64>,
    max: Option<f64>,
    message: String,
}

impl RangeValidator {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
            (Some(min), None) => format!("Value must be at least {min}."),
            (None, Some(max)) => format!("Value must be at most {max}."),
            (None, None) => "Invalid value.".to_string(),
        };
        Self { min, max, message }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let number = match value {
            FieldValue::Number(n) => *n,
            other => other
                .to_form_string()
                .trim()
                .parse()
                .map_err(|_| "Enter a valid number.".to_string())?,
        };
        let below = self.min.is_some_and(|min| number < min);
        let above = self.max.is_some_and(|max| number > max);
        if below || above {
            return Err(self.message.clone());
        }
        Ok(())
    }

    fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::schema::SchemaNode;

    fn values(pairs: &[(&str, FieldValue)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn signup_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("email", SchemaNode::string().email())
            .field("age", SchemaNode::number().optional())
            .field("role", SchemaNode::enumeration(["user", "admin"]))
            .field("agree", SchemaNode::boolean())
    }

    #[test]
    fn test_resolver_parses_valid_values() {
        let resolver = SchemaResolver::new(signup_schema());
        let parsed = resolver
            .resolve(&values(&[
                ("email", FieldValue::text("ada@example.com")),
                ("age", FieldValue::text("36")),
                ("role", FieldValue::text("admin")),
            ]))
            .unwrap();

        assert_eq!(parsed["age"], FieldValue::Number(36.0));
        assert_eq!(parsed["agree"], FieldValue::Bool(false));
        assert_eq!(parsed["role"], FieldValue::text("admin"));
    }

    #[test]
    fn test_resolver_reports_one_message_per_field() {
        let resolver = SchemaResolver::new(signup_schema());
        let errors = resolver
            .resolve(&values(&[
                ("email", FieldValue::text("nope")),
                ("age", FieldValue::text("old")),
                ("role", FieldValue::text("root")),
            ]))
            .unwrap_err();

        assert_eq!(errors["email"], "Enter a valid email address.");
        assert_eq!(errors["age"], "Expected number");
        assert_eq!(errors["role"], "Invalid option");
        assert!(!errors.contains_key("agree"));
    }

    #[test]
    fn test_resolver_required_and_optional() {
        let resolver = SchemaResolver::new(signup_schema());
        let errors = resolver
            .resolve(&values(&[("age", FieldValue::text(""))]))
            .unwrap_err();
        assert_eq!(errors["email"], "Required");
        assert!(!errors.contains_key("age"));
    }

    #[test]
    fn test_resolver_date() {
        let schema = ObjectSchema::new().field("born", SchemaNode::date());
        let resolver = SchemaResolver::new(schema);
        assert!(resolver
            .resolve(&values(&[("born", FieldValue::text("2020-02-29"))]))
            .is_ok());
        let errors = resolver
            .resolve(&values(&[("born", FieldValue::text("29/02/2020"))]))
            .unwrap_err();
        assert_eq!(errors["born"], "Expected date");
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::text(value)
    }

    #[test]
    fn test_length_validators_count_characters() {
        let max = MaxLengthValidator::new(5);
        assert!(max.validate(&text("hello")).is_ok());
        assert!(max.validate(&text("héllo")).is_ok());
        assert!(max.validate(&text("hello world")).is_err());

        let min = MinLengthValidator::new(3);
        assert!(min.validate(&text("héé")).is_ok());
        assert_eq!(
            min.validate(&text("hi")),
            Err("Ensure this value has at least 3 characters.".to_string())
        );
    }

    #[test]
    fn test_email_validator() {
        let v = EmailValidator;
        assert!(v.validate(&text("user.name@domain.co.uk")).is_ok());
        assert!(v.validate(&text("invalid")).is_err());
        assert!(v.validate(&text("@example.com")).is_err());
    }

    #[test]
    fn test_url_validator() {
        let v = UrlValidator;
        assert!(v.validate(&text("https://example.com")).is_ok());
        assert!(v.validate(&text("http://example.com/path")).is_ok());
        assert!(v.validate(&text("https://")).is_err());
        assert!(v.validate(&text("example.com")).is_err());
    }

    #[test]
    fn test_regex_validator() {
        let v = RegexValidator::new(r"^[A-Z]{2}$", "Use a country code.").unwrap();
        assert!(v.validate(&text("BE")).is_ok());
        assert_eq!(
            v.validate(&text("Belgium")),
            Err("Use a country code.".to_string())
        );
        assert!(RegexValidator::new("(", "never").is_err());
    }

    #[test]
    fn test_range_validator_on_parsed_numbers() {
        let v = RangeValidator::new(Some(18.0), Some(120.0));
        assert!(v.validate(&FieldValue::Number(18.0)).is_ok());
        assert!(v.validate(&FieldValue::Number(120.0)).is_ok());
        assert_eq!(
            v.validate(&FieldValue::Number(17.5)),
            Err("Value must be between 18 and 120.".to_string())
        );
        assert!(v.validate(&text("30")).is_ok());
        assert!(v.validate(&text("old")).is_err());
    }

    #[test]
    fn test_refinements_run_after_type_check() {
        let schema = ObjectSchema::new()
            .field("age", SchemaNode::number().range(Some(18.0), None))
            .field("nick", SchemaNode::string().min_length(2).max_length(4));
        let resolver = SchemaResolver::new(schema);
        let errors = resolver
            .resolve(&values(&[("age", text("12")), ("nick", text("a"))]))
            .unwrap_err();
        assert_eq!(errors["age"], "Value must be at least 18.");
        assert_eq!(errors["nick"], "Ensure this value has at least 2 characters.");
    }
}
