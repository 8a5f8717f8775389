//! The default strategy turning a [`Field`] into nodes.

use crate::field::{Field, FieldOption, FieldType};
use crate::node::{Attrs, Element, FieldPart, Node};
use crate::value::FieldValue;
use crate::widgets::Components;

/// Renders one field descriptor.
pub trait RenderField: Send + Sync {
    /// Renders `field` with the given component set.
    fn render_field(&self, field: &Field, components: &Components) -> Node;
}

impl<F> RenderField for F
where
    F: Fn(&Field, &Components) -> Node + Send + Sync,
{
    fn render_field(&self, field: &Field, components: &Components) -> Node {
        self(field, components)
    }
}

/// The built-in field layout: label, control, then errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderField;

impl RenderField for DefaultRenderField {
    fn render_field(&self, field: &Field, components: &Components) -> Node {
        if field.hidden {
            return render_control(field, components).keyed(&field.name);
        }

        let mut children = Vec::new();
        match (field.field_type, &field.options) {
            (FieldType::Boolean, _) => {
                let checkbox = render_control(field, components);
                let label = render_label(field, components);
                children.push(
                    components
                        .checkbox_wrapper
                        .render(Attrs::new(), vec![checkbox, label]),
                );
            }
            (_, Some(options)) if field.radio => {
                let mut group = vec![render_label(field, components)];
                group.extend(radio_inputs(field, options, components));
                children.push(components.radio_group.render(Attrs::new(), group));
            }
            _ => {
                children.push(render_label(field, components));
                children.push(render_control(field, components));
            }
        }
        if let Some(errors) = render_errors(field, components) {
            children.push(errors);
        }

        components
            .field
            .render(Attrs::new(), children)
            .keyed(&field.name)
    }
}

/// Renders the control of a field alone, without label or errors.
///
/// Radio fields render their group of choices.
pub fn render_control(field: &Field, components: &Components) -> Node {
    if field.hidden {
        let mut attrs = Attrs::new()
            .with("type", "hidden")
            .with("id", &field.name)
            .with("name", &field.name);
        if let Some(value) = &field.value {
            attrs.set("value", value.to_form_string());
        }
        return components.input.render(attrs, Vec::new());
    }

    match (field.field_type, &field.options) {
        (FieldType::Boolean, _) => components.checkbox.render(checkbox_attrs(field), Vec::new()),
        (_, Some(options)) if field.radio => components
            .radio_group
            .render(Attrs::new(), radio_inputs(field, options, components)),
        (_, Some(options)) => {
            let option_nodes = options.iter().map(|o| select_option(field, o)).collect();
            components.select.render(control_attrs(field), option_nodes)
        }
        _ if field.multiline => {
            let text = field.value.as_ref().map(FieldValue::to_form_string);
            let content = text.map(Node::Text).into_iter().collect();
            components.multiline.render(control_attrs(field), content)
        }
        _ => {
            let mut attrs = control_attrs(field);
            attrs.set("type", field.field_type.input_type());
            if let Some(value) = &field.value {
                attrs.set("value", value.to_form_string());
            }
            components.input.render(attrs, Vec::new())
        }
    }
}

/// Renders one part of a field. A field without errors has an empty
/// errors part.
pub fn render_part(field: &Field, part: FieldPart, components: &Components) -> Node {
    match part {
        FieldPart::Label => render_label(field, components),
        FieldPart::Control => render_control(field, components),
        FieldPart::Errors => render_errors(field, components).unwrap_or_else(Node::empty),
    }
}

/// Id of the element listing a field's errors.
pub fn errors_id(name: &str) -> String {
    format!("{name}-errors")
}

/// Attributes shared by every control of a field.
pub fn control_attrs(field: &Field) -> Attrs {
    let mut attrs = Attrs::new().with("id", &field.name).with("name", &field.name);
    if let Some(placeholder) = &field.placeholder {
        attrs.set("placeholder", placeholder);
    }
    if field.auto_focus {
        attrs.set("autofocus", true);
    }
    if field.has_errors() {
        attrs.set("aria-invalid", "true");
        attrs.set("aria-describedby", errors_id(&field.name));
    }
    attrs
}

/// Renders the label of a field.
pub fn render_label(field: &Field, components: &Components) -> Node {
    components.label.render(
        Attrs::new().with("for", &field.name),
        vec![Node::text(&field.label)],
    )
}

/// Renders the error list of a field, or `None` when it has no errors.
pub fn render_errors(field: &Field, components: &Components) -> Option<Node> {
    let errors = field.errors.as_ref().filter(|e| !e.is_empty())?;
    let items = errors
        .iter()
        .map(|message| {
            components
                .error
                .render(Attrs::new(), vec![Node::text(message)])
                .keyed(message)
        })
        .collect();
    let attrs = Attrs::new()
        .with("id", errors_id(&field.name))
        .with("role", "alert");
    Some(components.field_errors.render(attrs, items))
}

fn checkbox_attrs(field: &Field) -> Attrs {
    let mut attrs = control_attrs(field);
    attrs.set("type", "checkbox");
    attrs.set("value", "true");
    attrs.set("checked", field.value == Some(FieldValue::Bool(true)));
    attrs
}

fn is_current(field: &Field, option: &FieldOption) -> bool {
    field
        .value
        .as_ref()
        .is_some_and(|v| v.to_form_string() == option.value)
}

fn select_option(field: &Field, option: &FieldOption) -> Node {
    Element::new("option")
        .attr("value", &option.value)
        .attr("selected", is_current(field, option))
        .text(&option.name)
        .key(&option.value)
        .into()
}

fn radio_inputs(field: &Field, options: &[FieldOption], components: &Components) -> Vec<Node> {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let id = format!("{}-{}", field.name, option.value);
            let mut attrs = control_attrs(field);
            attrs.set("id", &id);
            attrs.set("type", "radio");
            attrs.set("value", &option.value);
            attrs.set("checked", is_current(field, option));
            if index > 0 {
                attrs.set("autofocus", false);
            }
            let radio = components.radio.render(attrs, Vec::new());
            let label = components
                .label
                .render(Attrs::new().with("for", id), vec![Node::text(&option.name)]);
            components
                .radio_wrapper
                .render(Attrs::new(), vec![radio, label])
                .keyed(&option.value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Field {
        Field {
            name: name.to_string(),
            field_type: FieldType::String,
            required: true,
            dirty: false,
            label: "Email".to_string(),
            options: None,
            errors: None,
            auto_focus: false,
            value: None,
            default_value: None,
            hidden: false,
            multiline: false,
            radio: false,
            placeholder: None,
        }
    }

    fn render(field: &Field) -> String {
        DefaultRenderField
            .render_field(field, &Components::default())
            .to_html()
    }

    #[test]
    fn test_text_input() {
        let mut f = field("email");
        f.placeholder = Some("you@example.com".to_string());
        f.value = Some(FieldValue::text("a@b.io"));
        assert_eq!(
            render(&f),
            concat!(
                r#"<div><label for="email">Email</label>"#,
                r#"<input id="email" name="email" placeholder="you@example.com" type="text" value="a@b.io">"#,
                "</div>"
            )
        );
    }

    #[test]
    fn test_errors_and_aria() {
        let mut f = field("email");
        f.errors = Some(vec!["Required".to_string(), "Too short".to_string()]);
        f.auto_focus = true;
        let html = render(&f);
        assert!(html.contains(r#"aria-describedby="email-errors""#));
        assert!(html.contains(r#"aria-invalid="true""#));
        assert!(html.contains(" autofocus "));
        assert!(html.contains(
            r#"<div id="email-errors" role="alert"><div>Required</div><div>Too short</div></div>"#
        ));
    }

    #[test]
    fn test_hidden_field_renders_only_input() {
        let mut f = field("token");
        f.hidden = true;
        f.value = Some(FieldValue::text("abc"));
        assert_eq!(
            render(&f),
            r#"<input id="token" name="token" type="hidden" value="abc">"#
        );
    }

    #[test]
    fn test_checkbox() {
        let mut f = field("terms");
        f.field_type = FieldType::Boolean;
        f.label = "Terms".to_string();
        f.value = Some(FieldValue::Bool(true));
        let html = render(&f);
        assert!(html.contains(
            r#"<input checked id="terms" name="terms" type="checkbox" value="true"><label for="terms">Terms</label>"#
        ));
    }

    #[test]
    fn test_select_marks_current_value() {
        let mut f = field("role");
        f.options = Some(vec![
            FieldOption::new("User", "user"),
            FieldOption::new("Admin", "admin"),
        ]);
        f.value = Some(FieldValue::text("admin"));
        let html = render(&f);
        assert!(html.contains(r#"<select id="role" name="role">"#));
        assert!(html.contains(r#"<option selected value="admin">Admin</option>"#));
        assert!(html.contains(r#"<option value="user">User</option>"#));
    }

    #[test]
    fn test_radio_group() {
        let mut f = field("plan");
        f.radio = true;
        f.options = Some(vec![
            FieldOption::new("Free", "free"),
            FieldOption::new("Pro", "pro"),
        ]);
        let html = render(&f);
        assert!(html.starts_with("<div><fieldset>"));
        assert!(html.contains(r#"<input id="plan-pro" name="plan" type="radio" value="pro">"#));
        assert!(html.contains(r#"<label for="plan-free">Free</label>"#));
    }

    #[test]
    fn test_multiline() {
        let mut f = field("bio");
        f.multiline = true;
        f.value = Some(FieldValue::text("<hi>"));
        assert!(render(&f).contains(r#"<textarea id="bio" name="bio">&lt;hi&gt;</textarea>"#));
    }

    #[test]
    fn test_hidden_field_uses_input_component() {
        let mut f = field("token");
        f.hidden = true;
        let components = Components::default().input(|attrs: Attrs, _: Vec<Node>| -> Node {
            Element::new("input").attrs(attrs.with("data-custom", "yes")).into()
        });
        let html = DefaultRenderField.render_field(&f, &components).to_html();
        assert_eq!(
            html,
            r#"<input data-custom="yes" id="token" name="token" type="hidden">"#
        );
    }

    #[test]
    fn test_parts() {
        let mut f = field("email");
        let components = Components::default();
        assert_eq!(
            render_part(&f, FieldPart::Label, &components).to_html(),
            r#"<label for="email">Email</label>"#
        );
        assert_eq!(
            render_part(&f, FieldPart::Control, &components).to_html(),
            r#"<input id="email" name="email" type="text">"#
        );
        assert!(render_part(&f, FieldPart::Errors, &components).is_empty());

        f.errors = Some(vec!["Required".to_string()]);
        assert_eq!(
            render_part(&f, FieldPart::Errors, &components).to_html(),
            r#"<div id="email-errors" role="alert"><div>Required</div></div>"#
        );
    }

    #[test]
    fn test_closure_strategy() {
        let strategy = |field: &Field, _: &Components| -> Node { Node::text(&field.name) };
        assert_eq!(
            strategy
                .render_field(&field("x"), &Components::default())
                .to_html(),
            "x"
        );
    }
}
