#![allow(dead_code)]

use oxide_autoform::{Form, FormProps, ObjectSchema, SchemaNode};

/// A signup form exercising every field type.
pub fn signup_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("email", SchemaNode::string().email())
        .field("firstName", SchemaNode::string().min_length(2))
        .field("birthday", SchemaNode::date().optional())
        .field("age", SchemaNode::number().range(Some(18.0), None).optional())
        .field("role", SchemaNode::enumeration(["user", "superAdmin"]))
        .field("plan", SchemaNode::enumeration(["free", "pro"]).nullable())
        .field("bio", SchemaNode::string().optional())
        .field("newsletter", SchemaNode::boolean().default(true))
        .field("csrfToken", SchemaNode::string().default("t0k3n"))
}

pub fn signup_props() -> FormProps {
    FormProps::new()
        .action("/signup")
        .hidden_fields(["csrfToken"])
        .multiline(["bio"])
        .radio(["plan"])
}

pub fn mounted(props: FormProps) -> Form {
    let mut form = Form::new(signup_schema(), props);
    form.mount();
    form
}

pub fn fill_valid(form: &mut Form) {
    form.change("email", "ada@example.com").unwrap();
    form.change("firstName", "Ada").unwrap();
    form.change("role", "superAdmin").unwrap();
}

/// Counts non-overlapping occurrences of `needle`.
pub fn count(html: &str, needle: &str) -> usize {
    html.matches(needle).count()
}
