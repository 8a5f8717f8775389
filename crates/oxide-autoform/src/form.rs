//! The form controller.
//!
//! [`Form`] ties a schema, its [`FormProps`] and a [`FormAdapter`] together:
//! it seeds the adapter on mount, injects external errors, drives the submit
//! lifecycle and renders the whole form through field derivation and
//! placeholder reconciliation.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use ironhtml::html;
use ironhtml::typed::Element as HtmlElement;
use ironhtml_elements::{Div, Form as HtmlForm};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FormError, FormErrors, Result};
use crate::field::{default_values, Field, FieldContext, FieldOption, FieldProps, FieldType};
use crate::global_errors::aggregate_global_errors;
use crate::node::{Attrs, FieldPart, Node};
use crate::reconcile::{ButtonState, Reconciler};
use crate::render::{DefaultRenderField, RenderField};
use crate::schema::{introspect, ObjectSchema};
use crate::state::{FieldErrorKind, FormAdapter, FormState, ReValidateMode, ValidationMode};
use crate::validation::SchemaResolver;
use crate::value::{Coerce, DefaultCoercion, FieldValue, FormValues};
use crate::widgets::Components;

/// Key under which a submit handler reports an error not tied to a field.
pub const FORM_ERROR: &str = "FORM_ERROR";

/// HTTP method of the form. Passed through to the markup unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by a submit handler, one message per key.
///
/// The message under [`FORM_ERROR`] belongs to the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmitErrors {
    pub errors: HashMap<String, String>,
}

impl SubmitErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.insert(key.into(), message.into());
        self
    }

    /// Sets the form-wide error.
    #[must_use]
    pub fn form(self, message: impl Into<String>) -> Self {
        self.field(FORM_ERROR, message)
    }

    /// Returns the form-wide error.
    pub fn global(&self) -> Option<&str> {
        self.errors.get(FORM_ERROR).map(String::as_str)
    }

    /// Iterates over field errors.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .filter(|(key, _)| key.as_str() != FORM_ERROR)
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }
}

/// What a submit handler eventually returns.
pub type SubmitResult = std::result::Result<(), SubmitErrors>;

/// Async submit handler.
pub type SubmitHandler = Arc<dyn Fn(FormValues) -> BoxFuture<'static, SubmitResult> + Send + Sync>;

/// Customization callback producing the form body.
pub type ChildrenFn = Arc<dyn Fn(&FormHelpers<'_>) -> Node + Send + Sync>;

/// Whether a submission is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
}

/// Result of starting a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Validation passed; hand these parsed values to the submit handler.
    Ready(FormValues),
    /// A submission is already in flight.
    Ignored,
    /// Validation failed.
    Invalid,
}

/// How a submit attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored,
    Invalid,
    Rejected,
    Success,
}

/// Everything configurable on a form.
#[derive(Clone)]
pub struct FormProps {
    pub method: Method,
    pub action: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    pub mode: ValidationMode,
    pub re_validate_mode: ReValidateMode,
    pub labels: HashMap<String, String>,
    pub placeholders: HashMap<String, String>,
    pub options: HashMap<String, Vec<FieldOption>>,
    pub hidden_fields: Vec<String>,
    pub multiline: Vec<String>,
    pub radio: Vec<String>,
    /// Field focused on first render when nothing has errors.
    pub auto_focus: Option<String>,
    /// Externally supplied errors.
    pub errors: Option<FormErrors>,
    /// Explicit initial values, winning over schema defaults.
    pub values: FormValues,
    pub button_label: String,
    pub pending_button_label: String,
    pub components: Components,
    pub render_field: Arc<dyn RenderField>,
    pub coercion: Arc<dyn Coerce>,
    /// Rendered before the form body.
    pub before_children: Option<Node>,
    pub on_submit: Option<SubmitHandler>,
    pub children: Option<ChildrenFn>,
}

impl Default for FormProps {
    fn default() -> Self {
        Self {
            method: Method::default(),
            action: None,
            id: None,
            class: None,
            mode: ValidationMode::default(),
            re_validate_mode: ReValidateMode::default(),
            labels: HashMap::new(),
            placeholders: HashMap::new(),
            options: HashMap::new(),
            hidden_fields: Vec::new(),
            multiline: Vec::new(),
            radio: Vec::new(),
            auto_focus: None,
            errors: None,
            values: FormValues::new(),
            button_label: "OK".to_string(),
            pending_button_label: "OK".to_string(),
            components: Components::default(),
            render_field: Arc::new(DefaultRenderField),
            coercion: Arc::new(DefaultCoercion),
            before_children: None,
            on_submit: None,
            children: None,
        }
    }
}

impl fmt::Debug for FormProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormProps")
            .field("method", &self.method)
            .field("action", &self.action)
            .field("mode", &self.mode)
            .field("re_validate_mode", &self.re_validate_mode)
            .field("hidden_fields", &self.hidden_fields)
            .field("auto_focus", &self.auto_focus)
            .field("errors", &self.errors)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl FormProps {
    /// Creates props with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the form action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the form element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the form element class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets when fields validate before the first submit.
    #[must_use]
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets when fields re-validate after the first submit.
    #[must_use]
    pub fn re_validate_mode(mut self, mode: ReValidateMode) -> Self {
        self.re_validate_mode = mode;
        self
    }

    /// Sets the label of a field.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(key.into(), label.into());
        self
    }

    /// Sets the placeholder of a field.
    #[must_use]
    pub fn placeholder(mut self, key: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), placeholder.into());
        self
    }

    /// Sets the options of a field.
    #[must_use]
    pub fn options(mut self, key: impl Into<String>, options: Vec<FieldOption>) -> Self {
        self.options.insert(key.into(), options);
        self
    }

    /// Marks fields as hidden.
    #[must_use]
    pub fn hidden_fields<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_fields.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Renders fields as multiline inputs.
    #[must_use]
    pub fn multiline<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multiline.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Renders option fields as radio groups.
    #[must_use]
    pub fn radio<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.radio.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Focuses `key` on first render when nothing has errors.
    #[must_use]
    pub fn auto_focus(mut self, key: impl Into<String>) -> Self {
        self.auto_focus = Some(key.into());
        self
    }

    /// Sets externally supplied errors.
    #[must_use]
    pub fn errors(mut self, errors: FormErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Sets an explicit initial value.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets explicit initial values.
    #[must_use]
    pub fn values(mut self, values: FormValues) -> Self {
        self.values.extend(values);
        self
    }

    /// Sets the submit button label.
    #[must_use]
    pub fn button_label(mut self, label: impl Into<String>) -> Self {
        self.button_label = label.into();
        self
    }

    /// Sets the submit button label shown while submitting.
    #[must_use]
    pub fn pending_button_label(mut self, label: impl Into<String>) -> Self {
        self.pending_button_label = label.into();
        self
    }

    /// Sets the component set.
    #[must_use]
    pub fn components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Sets the render-field strategy.
    #[must_use]
    pub fn render_field(mut self, strategy: impl RenderField + 'static) -> Self {
        self.render_field = Arc::new(strategy);
        self
    }

    /// Sets the value coercion.
    #[must_use]
    pub fn coercion(mut self, coercion: impl Coerce + 'static) -> Self {
        self.coercion = Arc::new(coercion);
        self
    }

    /// Sets content rendered before the form body.
    #[must_use]
    pub fn before_children(mut self, node: impl Into<Node>) -> Self {
        self.before_children = Some(node.into());
        self
    }

    /// Sets the submit handler.
    #[must_use]
    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SubmitResult> + Send + 'static,
    {
        let boxed: SubmitHandler = Arc::new(move |values| Box::pin(handler(values)));
        self.on_submit = Some(boxed);
        self
    }

    /// Sets the customization callback laying out the form body.
    #[must_use]
    pub fn children<F>(mut self, children: F) -> Self
    where
        F: Fn(&FormHelpers<'_>) -> Node + Send + Sync + 'static,
    {
        self.children = Some(Arc::new(children));
        self
    }
}

/// What a customization callback can see and build.
pub struct FormHelpers<'a> {
    ctx: &'a FieldContext<'a>,
    adapter: &'a dyn FormAdapter,
    components: &'a Components,
}

impl FormHelpers<'_> {
    /// A Field placeholder for `name`.
    pub fn field(&self, name: impl Into<String>) -> Node {
        Node::field(FieldProps::new(name))
    }

    /// The derived descriptor of `name`.
    pub fn describe(&self, name: &str) -> Option<Field> {
        self.ctx.build_field(name)
    }

    /// Derived descriptors of every field, in schema order.
    pub fn fields(&self) -> Vec<Field> {
        self.ctx.build_all()
    }

    /// The label of the enclosing Field placeholder.
    pub fn label(&self) -> Node {
        Node::part(FieldPart::Label)
    }

    /// The control of the enclosing Field placeholder.
    pub fn control(&self) -> Node {
        Node::part(FieldPart::Control)
    }

    /// The errors of the enclosing Field placeholder.
    pub fn field_errors(&self) -> Node {
        Node::part(FieldPart::Errors)
    }

    /// The global errors placeholder.
    pub fn errors(&self) -> Node {
        Node::errors()
    }

    /// A single error, rendered with the error component.
    pub fn error(&self, message: impl Into<String>) -> Node {
        self.components
            .error
            .render(Attrs::new(), vec![Node::Text(message.into())])
    }

    /// The submit button placeholder.
    pub fn button(&self) -> Node {
        Node::button()
    }

    /// The current values.
    pub fn values(&self) -> &FormValues {
        self.adapter.values()
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.adapter.is_submitting()
    }
}

/// A schema-driven form.
pub struct Form<A: FormAdapter = FormState> {
    schema: ObjectSchema,
    props: FormProps,
    adapter: A,
    mounted: bool,
    status: FormStatus,
    form_error: Option<String>,
}

impl<A: FormAdapter + fmt::Debug> fmt::Debug for Form<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("schema", &self.schema)
            .field("props", &self.props)
            .field("adapter", &self.adapter)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Form<FormState> {
    /// Creates a form validated by a [`SchemaResolver`] over `schema`.
    pub fn new(schema: ObjectSchema, props: FormProps) -> Self {
        let defaults = default_values(&schema, &props);
        let adapter = FormState::new(Arc::new(SchemaResolver::new(schema.clone())), defaults)
            .modes(props.mode, props.re_validate_mode);
        Self::with_adapter(schema, props, adapter)
    }
}

impl<A: FormAdapter> Form<A> {
    /// Creates a form over a custom adapter.
    pub fn with_adapter(schema: ObjectSchema, props: FormProps, adapter: A) -> Self {
        Self {
            schema,
            props,
            adapter,
            mounted: false,
            status: FormStatus::Idle,
            form_error: None,
        }
    }

    /// Returns the schema.
    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    /// Returns the props.
    pub fn props(&self) -> &FormProps {
        &self.props
    }

    /// Returns the adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Returns the adapter mutably.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Returns the submission status.
    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Returns the form-wide error of the last submit.
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Returns whether [`Form::mount`] ran.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// One-time setup: resets the adapter to the default values merged with
    /// values set on Field placeholders, registers the rendered fields and
    /// injects external errors. Later calls do nothing.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let mut values = default_values(&self.schema, &self.props);
        let mut rendered = Vec::new();
        {
            let ctx = FieldContext::new(&self.schema, &self.props, &self.adapter);
            let tree = self.build_tree(&ctx);
            tree.walk(&mut |node| {
                let Node::Field(field) = node else {
                    return;
                };
                let name = &field.props.name;
                let Some(schema_node) = self.schema.get(name) else {
                    return;
                };
                if let Some(value) = &field.props.value {
                    let field_type = FieldType::from_kind(introspect(schema_node).type_kind);
                    match self.props.coercion.coerce(value.clone(), field_type) {
                        Some(coerced) => values.insert(name.clone(), coerced),
                        None => values.remove(name),
                    };
                }
                rendered.push(name.clone());
            });
        }

        debug!(fields = rendered.len(), "mounting form");
        self.adapter.reset(values);
        for name in &rendered {
            self.adapter.register(name);
        }
        self.inject_errors();
    }

    /// Replaces the external errors. Injection re-runs only when they changed.
    pub fn set_errors(&mut self, errors: Option<FormErrors>) {
        if self.props.errors == errors {
            return;
        }
        self.props.errors = errors;
        if self.mounted {
            self.inject_errors();
        }
    }

    fn inject_errors(&mut self) {
        let Some(errors) = self.props.errors.clone() else {
            return;
        };
        let mut keys: Vec<&str> = errors.fields().map(|(key, _)| key).collect();
        keys.sort_unstable();

        debug!(fields = keys.len(), "injecting external errors");
        for key in keys {
            if let Some(messages) = errors.get(key).filter(|m| !m.is_empty()) {
                self.adapter
                    .set_field_error(key, FieldErrorKind::Custom, messages.join(", "));
            }
        }

        let first = self
            .schema
            .keys()
            .find(|key| errors.get(key).is_some_and(|m| !m.is_empty()))
            .map(ToString::to_string);
        if let Some(first) = first {
            self.focus(&first);
        }
    }

    fn focus(&mut self, key: &str) {
        if let Err(error) = self.adapter.set_focus(key) {
            debug!(%error, "focus skipped");
        }
    }

    fn focus_first_errored(&mut self) {
        let first = self
            .schema
            .keys()
            .find(|key| self.adapter.error(key).is_some())
            .map(ToString::to_string);
        if let Some(first) = first {
            self.focus(&first);
        }
    }

    /// Handles an input change.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if `key` is not in the schema.
    pub fn change(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<()> {
        if !self.schema.contains(key) {
            return Err(FormError::UnknownField(key.to_string()));
        }
        self.adapter.set_value(key, value.into());
        Ok(())
    }

    /// Handles a blur event.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if `key` is not in the schema.
    pub fn blur(&mut self, key: &str) -> Result<()> {
        if !self.schema.contains(key) {
            return Err(FormError::UnknownField(key.to_string()));
        }
        self.adapter.blur(key);
        Ok(())
    }

    /// Loads submitted `application/x-www-form-urlencoded` pairs as changes.
    pub fn load(&mut self, data: &HashMap<String, String>) {
        for (key, value) in self.schema.parse_data(data) {
            self.adapter.set_value(&key, value);
        }
    }

    /// Starts a submission: validates and, on success, flags the form as
    /// submitting. On failure the first errored field gets focus.
    pub fn begin_submit(&mut self) -> Submission {
        if self.status == FormStatus::Submitting {
            debug!("submit ignored while another is pending");
            return Submission::Ignored;
        }
        self.form_error = None;

        match self.adapter.validate_all() {
            Some(values) => {
                debug!("submitting form");
                self.status = FormStatus::Submitting;
                self.adapter.set_submitting(true);
                Submission::Ready(values)
            }
            None => {
                debug!(errors = self.adapter.errors().len(), "submit blocked by validation");
                self.focus_first_errored();
                Submission::Invalid
            }
        }
    }

    /// Settles a submission with the handler's result.
    ///
    /// Field errors are written into the adapter; the form-wide error is
    /// kept for the global error list.
    pub fn complete_submit(&mut self, result: SubmitResult) -> SubmitOutcome {
        self.status = FormStatus::Idle;
        self.adapter.set_submitting(false);

        match result {
            Ok(()) => {
                debug!("submit succeeded");
                SubmitOutcome::Success
            }
            Err(errors) => {
                debug!(errors = errors.errors.len(), "submit rejected");
                for (key, message) in errors.fields() {
                    self.adapter
                        .set_field_error(key, FieldErrorKind::Submit, message.to_string());
                }
                self.form_error = errors.global().map(ToString::to_string);
                self.focus_first_errored();
                SubmitOutcome::Rejected
            }
        }
    }

    /// Validates, awaits the submit handler and settles.
    ///
    /// Without a handler, a valid submit succeeds immediately.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let values = match self.begin_submit() {
            Submission::Ready(values) => values,
            Submission::Ignored => return SubmitOutcome::Ignored,
            Submission::Invalid => return SubmitOutcome::Invalid,
        };
        let result = match self.props.on_submit.clone() {
            Some(handler) => handler(values).await,
            None => Ok(()),
        };
        self.complete_submit(result)
    }

    fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting || self.adapter.is_submitting()
    }

    /// Whether the submit button is disabled.
    ///
    /// Modes that validate on change also disable it while the values are
    /// invalid.
    pub fn submit_disabled(&self) -> bool {
        match self.props.mode {
            ValidationMode::OnChange | ValidationMode::All => {
                self.is_submitting() || !self.adapter.is_valid()
            }
            _ => self.is_submitting(),
        }
    }

    /// The label the submit button shows now.
    pub fn button_label(&self) -> &str {
        if self.is_submitting() {
            &self.props.pending_button_label
        } else {
            &self.props.button_label
        }
    }

    fn collect_global_errors(&self, ctx: &FieldContext<'_>) -> Option<Vec<String>> {
        let explicit: Vec<String> = self
            .props
            .errors
            .as_ref()
            .and_then(FormErrors::global)
            .into_iter()
            .flatten()
            .chain(self.form_error.as_ref())
            .cloned()
            .collect();
        aggregate_global_errors(
            Some(explicit.as_slice()),
            &self.props.hidden_fields,
            ctx.errors(),
            &self.props.labels,
        )
    }

    /// The errors shown in the global error list.
    pub fn global_errors(&self) -> Option<Vec<String>> {
        self.collect_global_errors(&self.context())
    }

    /// Derived descriptors of every field, in schema order.
    pub fn fields(&self) -> Vec<Field> {
        self.context().build_all()
    }

    fn context(&self) -> FieldContext<'_> {
        if self.mounted {
            FieldContext::mounted(&self.schema, &self.props, &self.adapter)
        } else {
            FieldContext::new(&self.schema, &self.props, &self.adapter)
        }
    }

    fn build_tree(&self, ctx: &FieldContext<'_>) -> Node {
        let body = match &self.props.children {
            Some(children) => children(&FormHelpers {
                ctx,
                adapter: &self.adapter,
                components: &self.props.components,
            }),
            None => {
                let mut nodes: Vec<Node> = self
                    .schema
                    .keys()
                    .map(|key| Node::field(FieldProps::new(key)))
                    .collect();
                nodes.push(Node::errors());
                nodes.push(Node::button());
                Node::Fragment(nodes)
            }
        };
        match &self.props.before_children {
            Some(before) => Node::Fragment(vec![before.clone(), body]),
            None => body,
        }
    }

    /// Renders the form body.
    pub fn render(&self) -> Node {
        let ctx = self.context();
        let global = self.collect_global_errors(&ctx);
        let button = ButtonState {
            disabled: self.submit_disabled(),
            label: self.button_label().to_string(),
        };
        let reconciler = Reconciler::new(
            &ctx,
            global.as_deref(),
            button,
            self.props.render_field.as_ref(),
            &self.props.components,
        );
        let tree = self.build_tree(&ctx);
        reconciler.materialize(reconciler.reconcile(tree))
    }

    /// Renders the complete `<form>` element, with the body in a `<div>`.
    pub fn to_html(&self) -> String {
        let body = self.render().to_html();
        let action = self.props.action.as_deref().unwrap_or("");
        let method = self.props.method.as_str();

        let mut form: HtmlElement<HtmlForm> = html! {
            form.action(#action).method(#method)
        };
        if let Some(id) = &self.props.id {
            form = form.attr("id", id);
        }
        if let Some(class) = &self.props.class {
            form = form.attr("class", class);
        }
        form.child::<Div, _>(|d| d.raw(&body)).render()
    }
}
