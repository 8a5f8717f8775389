//! Signup Form Example
//!
//! Renders a signup form, submits invalid and then valid data, and prints the
//! markup after each step.
//! Run with: cargo run --example signup

use std::collections::HashMap;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_autoform::{
    Components, Element, FieldNode, FieldOption, FieldProps, Form, FormConfig, FormHelpers,
    FormProps, FormValues, Node, ObjectSchema, SchemaNode, SubmitErrors, SubmitResult,
};

const CONFIG: &str = r#"{
    "action": "/signup",
    "labels": {"email": "E-mail"},
    "placeholders": {"email": "you@example.com"},
    "hiddenFields": ["referrer"],
    "radio": ["plan"],
    "multiline": ["about"],
    "buttonLabel": "Create account",
    "pendingButtonLabel": "Creating account..."
}"#;

fn schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("email", SchemaNode::string().email())
        .field("displayName", SchemaNode::string().min_length(3).max_length(30))
        .field("birthday", SchemaNode::date().optional())
        .field("plan", SchemaNode::enumeration(["free", "pro", "team"]))
        .field("country", SchemaNode::string())
        .field("about", SchemaNode::string().optional())
        .field("acceptTerms", SchemaNode::boolean())
        .field("referrer", SchemaNode::string().default("homepage"))
}

async fn register(values: FormValues) -> SubmitResult {
    info!(?values, "registering");
    let email = values
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if email.ends_with("@example.com") {
        return Err(SubmitErrors::new()
            .field("email", "This address is already registered")
            .form("We could not create your account"));
    }
    Ok(())
}

fn layout(h: &FormHelpers<'_>) -> Node {
    Element::new("div")
        .attr("class", "row")
        .child(
            Element::new("div")
                .attr("class", "col-md-6")
                .child(h.field("email"))
                .child(h.field("displayName")),
        )
        .child(
            Element::new("div")
                .attr("class", "col-md-6")
                .child(h.field("birthday"))
                .child(Node::Field(
                    FieldNode::new(FieldProps::new("country").options(vec![
                        FieldOption::new("Belgium", "BE"),
                        FieldOption::new("France", "FR"),
                        FieldOption::new("Portugal", "PT"),
                    ]))
                    .child(h.label())
                    .child(
                        Element::new("div")
                            .attr("class", "input-group")
                            .child(Element::new("span").attr("class", "input-group-text").text("ISO"))
                            .child(h.control()),
                    )
                    .child(h.field_errors()),
                )),
        )
        .child(h.field("plan"))
        .child(h.field("about"))
        .child(h.field("acceptTerms"))
        .child(h.field("referrer"))
        .child(h.errors())
        .child(h.button())
        .into()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let props = FormProps::from_config(FormConfig::from_json(CONFIG)?)
        .components(Components::bootstrap())
        .before_children(Element::new("h2").text("Create your account"))
        .on_submit(register)
        .children(layout);

    let mut form = Form::new(schema(), props);
    form.mount();
    println!("{}\n", form.to_html());

    let outcome = form.submit().await;
    info!(?outcome, "submitted empty form");
    println!("{}\n", form.to_html());

    let data: HashMap<String, String> = [
        ("email", "ada@example.com"),
        ("displayName", "Ada"),
        ("plan", "pro"),
        ("country", "PT"),
        ("acceptTerms", "on"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    form.load(&data);
    let outcome = form.submit().await;
    info!(?outcome, "submitted taken address");
    println!("{}\n", form.to_html());

    form.change("email", "ada@lovelace.dev")?;
    let outcome = form.submit().await;
    info!(?outcome, "submitted fresh address");
    println!("{}", form.to_html());

    Ok(())
}
