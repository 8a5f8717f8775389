//! # oxide-autoform
//!
//! Schema-driven form generation.
//!
//! This crate provides:
//! - Schema builders and introspection (type, optionality, enum values, defaults)
//! - Field descriptors derived from the schema, live form state and props
//! - Label inference from field keys
//! - Placeholder-based customization of the form layout, down to the label,
//!   control and errors of a single field
//! - Global error aggregation for errors no visible field can show
//! - A form controller with mount, error injection and an async submit lifecycle
//! - Plain and Bootstrap 5 component sets
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_autoform::{Form, FormProps, ObjectSchema, SchemaNode};
//!
//! let schema = ObjectSchema::new()
//!     .field("email", SchemaNode::string().email())
//!     .field("firstName", SchemaNode::string())
//!     .field("age", SchemaNode::number().optional());
//!
//! let mut form = Form::new(schema, FormProps::new().action("/signup"));
//! form.mount();
//!
//! let html = form.to_html();
//! assert!(html.contains(r#"<label for="firstName">First name</label>"#));
//! assert!(html.contains(r#"<button type="submit">OK</button>"#));
//! ```
//!
//! ## Customizing the layout
//!
//! A children callback lays out the form body. Field, Errors and Button
//! placeholders are filled in from the schema; explicit properties set on a
//! placeholder win over derived ones.
//!
//! ```rust
//! use oxide_autoform::{
//!     Element, FieldProps, Form, FormHelpers, FormProps, Node, ObjectSchema, SchemaNode,
//! };
//!
//! let schema = ObjectSchema::new()
//!     .field("email", SchemaNode::string())
//!     .field("password", SchemaNode::string().min_length(8));
//!
//! let props = FormProps::new().children(|h: &FormHelpers<'_>| {
//!     Element::new("div")
//!         .attr("class", "row")
//!         .child(Node::field(FieldProps::new("email").label("E-mail")))
//!         .child(h.field("password"))
//!         .child(h.errors())
//!         .child(h.button())
//!         .into()
//! });
//!
//! let mut form = Form::new(schema, props);
//! form.mount();
//! let html = form.render().to_html();
//! assert!(html.starts_with(r#"<div class="row">"#));
//! assert!(html.contains(">E-mail</label>"));
//! ```
//!
//! ## Submitting
//!
//! ```rust
//! use oxide_autoform::{
//!     Form, FormProps, ObjectSchema, SchemaNode, SubmitErrors, SubmitOutcome, SubmitResult,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let schema = ObjectSchema::new().field("email", SchemaNode::string().email());
//! let props = FormProps::new().on_submit(|_values| async {
//!     let result: SubmitResult = Err(SubmitErrors::new().field("email", "Already taken"));
//!     result
//! });
//!
//! let mut form = Form::new(schema, props);
//! form.mount();
//! form.change("email", "ada@example.com").unwrap();
//!
//! assert_eq!(form.submit().await, SubmitOutcome::Rejected);
//! assert!(form.to_html().contains("Already taken"));
//! # }
//! ```

mod config;
mod error;
mod field;
mod form;
mod global_errors;
mod label;
mod node;
mod reconcile;
mod render;
mod schema;
mod state;
pub mod validation;
mod value;
pub mod widgets;

pub use config::FormConfig;
pub use error::{FormError, FormErrors, Result, GLOBAL_ERRORS_KEY};
pub use field::{default_values, merge, Field, FieldContext, FieldOption, FieldProps, FieldType};
pub use form::{
    ChildrenFn, Form, FormHelpers, FormProps, FormStatus, Method, Submission, SubmitErrors,
    SubmitHandler, SubmitOutcome, SubmitResult, FORM_ERROR,
};
pub use global_errors::aggregate_global_errors;
pub use label::infer_label;
pub use node::{
    html_escape, AttrValue, Attrs, Element, FieldNode, FieldPart, Node, Placeholder,
    PlaceholderKind,
};
pub use reconcile::{ButtonState, Reconciler};
pub use render::{
    control_attrs, errors_id, render_control, render_errors, render_label, render_part,
    DefaultRenderField, RenderField,
};
pub use schema::{
    introspect, DefaultValue, ObjectSchema, Refinement, SchemaNode, ShapeInfo, TypeKind,
};
pub use state::{FieldError, FieldErrorKind, FormAdapter, FormState, ReValidateMode, ValidationMode};
pub use validation::{Resolver, SchemaResolver};
pub use value::{Coerce, DefaultCoercion, FieldValue, FormValues, DATE_FORMAT};
pub use widgets::{Component, Components};
