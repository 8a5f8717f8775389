//! Rewriting of customization trees.
//!
//! A caller-supplied tree marks where fields, global errors and the submit
//! button go with placeholders. [`Reconciler::reconcile`] fills them from the
//! derived field descriptors and form status; [`Reconciler::materialize`]
//! then turns what is left into concrete nodes through the component set.

use tracing::{debug, warn};

use crate::field::{merge, Field, FieldContext};
use crate::node::{AttrValue, Attrs, FieldNode, Node, Placeholder};
use crate::render::{render_part, RenderField};
use crate::widgets::Components;

/// Submit button state injected into Button placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub disabled: bool,
    pub label: String,
}

/// One reconciliation pass.
pub struct Reconciler<'a> {
    ctx: &'a FieldContext<'a>,
    global_errors: Option<&'a [String]>,
    button: ButtonState,
    render_field: &'a dyn RenderField,
    components: &'a Components,
}

impl<'a> Reconciler<'a> {
    /// Creates a pass over the given descriptors and state.
    pub fn new(
        ctx: &'a FieldContext<'a>,
        global_errors: Option<&'a [String]>,
        button: ButtonState,
        render_field: &'a dyn RenderField,
        components: &'a Components,
    ) -> Self {
        Self {
            ctx,
            global_errors,
            button,
            render_field,
            components,
        }
    }

    /// Rewrites every placeholder in `node`, children first.
    ///
    /// Output produced for a placeholder is never traversed again.
    pub fn reconcile(&self, node: Node) -> Node {
        match node {
            Node::Field(field) => self.reconcile_field(field),
            Node::Errors(placeholder) => self.reconcile_errors(placeholder),
            Node::Button(placeholder) => self.reconcile_button(placeholder),
            Node::Fragment(children) => Node::Fragment(self.reconcile_children(children)),
            Node::Element(mut element) => {
                element.children = self.reconcile_children(element.children);
                Node::Element(element)
            }
            other @ (Node::Text(_) | Node::Raw(_) | Node::Part(_)) => other,
        }
    }

    fn reconcile_children(&self, children: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match self.reconcile(child) {
                Node::Fragment(inner) => out.extend(inner),
                node => out.push(node),
            }
        }
        out
    }

    fn reconcile_field(&self, field: FieldNode) -> Node {
        let FieldNode {
            props, children, ..
        } = field;
        let children = self.reconcile_children(children);

        let Some(derived) = self.ctx.build_field(&props.name) else {
            warn!(field = %props.name, "placeholder names a field missing from the schema");
            return Node::Field(FieldNode {
                props,
                children,
                resolved: None,
            });
        };

        let mut merged = merge(&derived, &props);
        merged.auto_focus = self.ctx.auto_focus_for(&derived, props.auto_focus);

        if children.is_empty() {
            return self.render_field.render_field(&merged, self.components);
        }
        let children = children
            .into_iter()
            .map(|child| self.fill_parts(child, &merged))
            .collect();
        Node::Field(FieldNode {
            props,
            children,
            resolved: Some(merged),
        })
    }

    /// Renders the parts of `field` found in `node`. Nested Field
    /// placeholders keep their own parts.
    fn fill_parts(&self, node: Node, field: &Field) -> Node {
        let fill = |children: Vec<Node>| -> Vec<Node> {
            children
                .into_iter()
                .map(|child| self.fill_parts(child, field))
                .collect()
        };
        match node {
            Node::Part(part) => render_part(field, part, self.components),
            Node::Fragment(children) => Node::Fragment(fill(children)),
            Node::Element(mut element) => {
                element.children = fill(element.children);
                Node::Element(element)
            }
            Node::Errors(mut placeholder) => {
                placeholder.children = fill(placeholder.children);
                Node::Errors(placeholder)
            }
            Node::Button(mut placeholder) => {
                placeholder.children = fill(placeholder.children);
                Node::Button(placeholder)
            }
            other @ (Node::Text(_) | Node::Raw(_) | Node::Field(_)) => other,
        }
    }

    fn reconcile_errors(&self, placeholder: Placeholder) -> Node {
        let Placeholder { mut attrs, children } = placeholder;
        let children = self.reconcile_children(children);
        if !attrs.contains("role") {
            attrs.set("role", "alert");
        }

        if !children.is_empty() {
            return Node::Errors(Placeholder { attrs, children });
        }

        match self.global_errors.filter(|errors| !errors.is_empty()) {
            Some(errors) => {
                let children = errors
                    .iter()
                    .map(|message| {
                        self.components
                            .error
                            .render(Attrs::new(), vec![Node::text(message)])
                            .keyed(message)
                    })
                    .collect();
                Node::Errors(Placeholder { attrs, children })
            }
            None => Node::empty(),
        }
    }

    fn reconcile_button(&self, placeholder: Placeholder) -> Node {
        let derived = Attrs::new().with("disabled", self.button.disabled);
        let attrs = Attrs::merge(&derived, &placeholder.attrs);
        let children = if placeholder.children.is_empty() {
            vec![Node::text(&self.button.label)]
        } else {
            self.reconcile_children(placeholder.children)
        };
        Node::Button(Placeholder { attrs, children })
    }

    /// Turns reconciled placeholders into concrete nodes.
    ///
    /// Field placeholders that never resolved render their content only.
    pub fn materialize(&self, node: Node) -> Node {
        match node {
            Node::Field(field) => {
                let children = self.materialize_children(field.children);
                match field.resolved {
                    Some(resolved) => self
                        .components
                        .field
                        .render(Attrs::new(), children)
                        .keyed(resolved.name),
                    None => Node::Fragment(children),
                }
            }
            Node::Errors(placeholder) => {
                let children = self.materialize_children(placeholder.children);
                self.components.global_errors.render(placeholder.attrs, children)
            }
            Node::Button(placeholder) => {
                let mut attrs = placeholder.attrs;
                if !attrs.contains("type") {
                    attrs.set("type", AttrValue::from("submit"));
                }
                let children = self.materialize_children(placeholder.children);
                self.components.button.render(attrs, children)
            }
            Node::Fragment(children) => Node::Fragment(self.materialize_children(children)),
            Node::Element(mut element) => {
                element.children = self.materialize_children(element.children);
                Node::Element(element)
            }
            Node::Part(part) => {
                debug!(?part, "field part outside a field placeholder");
                Node::empty()
            }
            other @ (Node::Text(_) | Node::Raw(_)) => other,
        }
    }

    fn materialize_children(&self, children: Vec<Node>) -> Vec<Node> {
        children
            .into_iter()
            .map(|child| self.materialize(child))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormErrors;
    use crate::field::{Field, FieldProps};
    use crate::form::FormProps;
    use crate::node::{Element, FieldPart};
    use crate::render::DefaultRenderField;
    use crate::schema::{ObjectSchema, SchemaNode};
    use crate::state::FormState;
    use crate::validation::SchemaResolver;
    use crate::value::FormValues;
    use std::sync::Arc;

    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("email", SchemaNode::string())
            .field("age", SchemaNode::number().optional())
    }

    fn state(schema: &ObjectSchema) -> FormState {
        FormState::new(
            Arc::new(SchemaResolver::new(schema.clone())),
            FormValues::new(),
        )
    }

    fn button() -> ButtonState {
        ButtonState {
            disabled: false,
            label: "OK".to_string(),
        }
    }

    fn names(field: &Field, _: &Components) -> Node {
        Node::text(format!("[{}:{}]", field.name, field.label))
    }

    #[test]
    fn test_field_placeholder_replaced_by_strategy() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let reconciler = Reconciler::new(&ctx, None, button(), &names, &components);

        let tree: Node = Element::new("section")
            .child(Node::Fragment(vec![Node::field(
                FieldProps::new("email").label("Mail"),
            )]))
            .child(Node::field(FieldProps::new("age")))
            .into();
        let out = reconciler.reconcile(tree);
        assert_eq!(out.to_html(), "<section>[email:Mail][age:Age]</section>");
    }

    #[test]
    fn test_field_with_children_keeps_content_and_resolves() {
        let schema = schema();
        let props = FormProps::default().errors(FormErrors::new().with("email", "taken"));
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let reconciler = Reconciler::new(&ctx, None, button(), &names, &components);

        let tree = Node::Field(
            FieldNode::new(FieldProps::new("email").required(false)).child("custom"),
        );
        let Node::Field(out) = reconciler.reconcile(tree) else {
            panic!("expected a resolved field placeholder");
        };
        let resolved = out.resolved.unwrap();
        assert!(!resolved.required);
        assert!(resolved.auto_focus);
        assert_eq!(resolved.errors, Some(vec!["taken".to_string()]));
        assert_eq!(out.children, vec![Node::text("custom")]);
    }

    #[test]
    fn test_field_parts_render_from_merged_descriptor() {
        let schema = schema();
        let props = FormProps::default().errors(FormErrors::new().with("email", "taken"));
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let reconciler = Reconciler::new(&ctx, None, button(), &names, &components);

        let tree = Node::Field(
            FieldNode::new(FieldProps::new("email").label("Work e-mail"))
                .child(Element::new("p").child(Node::part(FieldPart::Label)))
                .child(Node::part(FieldPart::Control))
                .child(Node::part(FieldPart::Errors)),
        );
        let out = reconciler.materialize(reconciler.reconcile(tree));
        assert_eq!(
            out.to_html(),
            concat!(
                r#"<div><p><label for="email">Work e-mail</label></p>"#,
                r#"<input aria-describedby="email-errors" aria-invalid="true" autofocus "#,
                r#"id="email" name="email" type="text">"#,
                r#"<div id="email-errors" role="alert"><div>taken</div></div></div>"#
            )
        );
    }

    #[test]
    fn test_stray_part_renders_nothing() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let reconciler = Reconciler::new(&ctx, None, button(), &names, &components);

        let tree = Node::part(FieldPart::Control);
        assert!(reconciler.materialize(reconciler.reconcile(tree)).is_empty());
    }

    #[test]
    fn test_unknown_field_passes_through() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let reconciler = Reconciler::new(&ctx, None, button(), &names, &components);

        let tree = Node::field(FieldProps::new("nope"));
        assert_eq!(reconciler.reconcile(tree.clone()), tree);
    }

    #[test]
    fn test_errors_placeholder() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let global = vec!["network down".to_string()];

        let empty = Reconciler::new(&ctx, None, button(), &DefaultRenderField, &components);
        assert!(empty.reconcile(Node::errors()).is_empty());

        let reconciler = Reconciler::new(
            &ctx,
            Some(global.as_slice()),
            button(),
            &DefaultRenderField,
            &components,
        );
        let out = reconciler.materialize(reconciler.reconcile(Node::errors()));
        assert_eq!(
            out.to_html(),
            r#"<div role="alert"><div>network down</div></div>"#
        );

        let custom = Node::Errors(Placeholder::new().child("mine"));
        let out = reconciler.materialize(reconciler.reconcile(custom));
        assert_eq!(out.to_html(), r#"<div role="alert">mine</div>"#);
    }

    #[test]
    fn test_button_placeholder() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let pending = ButtonState {
            disabled: true,
            label: "Saving...".to_string(),
        };
        let reconciler = Reconciler::new(&ctx, None, pending, &DefaultRenderField, &components);

        let out = reconciler.materialize(reconciler.reconcile(Node::button()));
        assert_eq!(
            out.to_html(),
            r#"<button disabled type="submit">Saving...</button>"#
        );

        let explicit = Node::Button(
            Placeholder::new()
                .attr("disabled", false)
                .attr("type", "button")
                .child("Go"),
        );
        let out = reconciler.materialize(reconciler.reconcile(explicit));
        assert_eq!(out.to_html(), r#"<button type="button">Go</button>"#);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let schema = schema();
        let props = FormProps::default();
        let state = state(&schema);
        let ctx = FieldContext::new(&schema, &props, &state);
        let components = Components::default();
        let global = vec!["oops".to_string()];
        let reconciler = Reconciler::new(
            &ctx,
            Some(global.as_slice()),
            button(),
            &DefaultRenderField,
            &components,
        );

        let tree: Node = vec![
            Node::field(FieldProps::new("email")),
            Node::Field(FieldNode::new(FieldProps::new("age")).child("x")),
            Node::errors(),
            Node::button(),
        ]
        .into();
        let once = reconciler.reconcile(tree);
        let twice = reconciler.reconcile(once.clone());
        assert_eq!(once, twice);
    }
}
