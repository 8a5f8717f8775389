//! Bootstrap 5 components.

use super::Component;
use crate::node::{AttrValue, Attrs, Element, Node};

/// Renders an element carrying a fixed CSS class.
///
/// Classes passed in the attributes are appended. Form controls also get
/// `is-invalid` while they are marked `aria-invalid`.
#[derive(Debug, Clone)]
pub struct Classed {
    /// The HTML tag name.
    pub tag: &'static str,
    /// The base CSS class.
    pub class: &'static str,
    /// Whether to mirror `aria-invalid` as `is-invalid`.
    pub control: bool,
}

impl Classed {
    /// Creates a classed element.
    pub fn new(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class,
            control: false,
        }
    }

    /// Creates a classed form control.
    pub fn control(tag: &'static str, class: &'static str) -> Self {
        Self {
            control: true,
            ..Self::new(tag, class)
        }
    }
}

impl Component for Classed {
    fn render(&self, mut attrs: Attrs, children: Vec<Node>) -> Node {
        let mut class = self.class.to_string();
        if let Some(extra) = attrs.get_str("class") {
            class = format!("{class} {extra}");
        }
        let invalid = matches!(attrs.get("aria-invalid"), Some(AttrValue::Str(v)) if v == "true");
        if self.control && invalid {
            class.push_str(" is-invalid");
        }
        attrs.set("class", class);
        Element::new(self.tag).attrs(attrs).children(children).into()
    }
}
