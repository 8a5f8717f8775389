//! Renderable node tree.
//!
//! Customization callbacks build a [`Node`] tree in which Field, Errors and
//! Button placeholders mark where derived content goes. Inside a Field
//! placeholder, [`FieldPart`] nodes stand for the label, control and errors
//! of that field. Placeholders are distinguished by an explicit tag
//! ([`PlaceholderKind`]), never by identity.

use std::collections::BTreeMap;

use crate::field::{Field, FieldProps};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A string attribute.
    Str(String),
    /// A boolean attribute: present when `true`, omitted when `false`.
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered HTML attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Attributes by name.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Attrs {
    /// Creates new empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Gets a string attribute.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.attrs.get(key) {
            Some(AttrValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns whether the attribute is set, to any value.
    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Shallow merge: every attribute in `explicit` wins over `derived`.
    pub fn merge(derived: &Self, explicit: &Self) -> Self {
        let mut merged = derived.clone();
        for (key, value) in &explicit.attrs {
            merged.attrs.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Renders attributes as an HTML attribute string with a leading space
    /// per attribute.
    pub fn to_html(&self) -> String {
        self.attrs
            .iter()
            .filter_map(|(k, v)| match v {
                AttrValue::Str(s) => Some(format!(r#" {k}="{}""#, html_escape(s))),
                AttrValue::Bool(true) => Some(format!(" {k}")),
                AttrValue::Bool(false) => None,
            })
            .collect()
    }
}

/// Which placeholder, if any, a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Field,
    GlobalErrors,
    SubmitButton,
    FieldPart,
    Other,
}

/// A piece of the enclosing Field placeholder, rendered from its merged
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPart {
    Label,
    Control,
    Errors,
}

/// A concrete HTML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
    /// Identity among siblings.
    pub key: Option<String>,
}

impl Element {
    /// Creates an element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
            key: None,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Replaces all attributes.
    #[must_use]
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// Sets the sibling key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// A Field placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Properties set explicitly on the placeholder.
    pub props: FieldProps,
    /// Nested content laid out by the caller.
    pub children: Vec<Node>,
    /// The merged descriptor, once reconciled.
    pub resolved: Option<Field>,
}

impl FieldNode {
    /// Creates a placeholder for `props.name`.
    pub fn new(props: FieldProps) -> Self {
        Self {
            props,
            children: Vec::new(),
            resolved: None,
        }
    }

    /// Appends nested content.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// An Errors or Button placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholder {
    /// Attributes set explicitly on the placeholder.
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Placeholder {
    /// Creates an empty placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// A node of a renderable tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Escaped text.
    Text(String),
    /// Pre-rendered HTML, emitted verbatim.
    Raw(String),
    /// A grouping without an element of its own.
    Fragment(Vec<Node>),
    Element(Element),
    /// Field placeholder.
    Field(FieldNode),
    /// Global errors placeholder.
    Errors(Placeholder),
    /// Submit button placeholder.
    Button(Placeholder),
    /// Part of the enclosing Field placeholder.
    Part(FieldPart),
}

impl Node {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an empty node that renders nothing.
    pub fn empty() -> Self {
        Self::Fragment(Vec::new())
    }

    /// Creates a Field placeholder.
    pub fn field(props: FieldProps) -> Self {
        Self::Field(FieldNode::new(props))
    }

    /// Creates a global errors placeholder.
    pub fn errors() -> Self {
        Self::Errors(Placeholder::new())
    }

    /// Creates a submit button placeholder.
    pub fn button() -> Self {
        Self::Button(Placeholder::new())
    }

    /// Creates a part of the enclosing Field placeholder.
    pub fn part(part: FieldPart) -> Self {
        Self::Part(part)
    }

    /// Returns the placeholder kind of this node.
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            Self::Field(_) => PlaceholderKind::Field,
            Self::Errors(_) => PlaceholderKind::GlobalErrors,
            Self::Button(_) => PlaceholderKind::SubmitButton,
            Self::Part(_) => PlaceholderKind::FieldPart,
            _ => PlaceholderKind::Other,
        }
    }

    /// Returns whether the node renders nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fragment(children) => children.iter().all(Self::is_empty),
            _ => false,
        }
    }

    /// Sets the sibling key, if this is an element.
    #[must_use]
    pub fn keyed(self, key: impl Into<String>) -> Self {
        match self {
            Self::Element(element) => Self::Element(element.key(key)),
            other => other,
        }
    }

    /// Returns the direct children.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Text(_) | Self::Raw(_) | Self::Part(_) => &[],
            Self::Fragment(children) => children,
            Self::Element(element) => &element.children,
            Self::Field(field) => &field.children,
            Self::Errors(p) | Self::Button(p) => &p.children,
        }
    }

    /// Visits every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Serializes the tree to HTML.
    ///
    /// Placeholders that were never materialized render only their children.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&html_escape(text)),
            Self::Raw(html) => out.push_str(html),
            Self::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                out.push_str(&element.attrs.to_html());
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
            other => {
                for child in other.children() {
                    child.write_html(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<FieldNode> for Node {
    fn from(field: FieldNode) -> Self {
        Self::Field(field)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Self::Fragment(children)
    }
}
