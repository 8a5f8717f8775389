//! Replaceable components for every structural slot of a generated form.
//!
//! A [`Component`] receives the derived attributes and children of a slot and
//! returns the node to emit. The defaults render plain tags; swap any slot in
//! [`Components`] to change the markup without touching field derivation.

mod bootstrap;

pub use bootstrap::Classed;

use std::fmt;
use std::sync::Arc;

use crate::node::{Attrs, Element, Node};

/// A renderer for one structural slot.
pub trait Component: Send + Sync {
    /// Renders the slot.
    fn render(&self, attrs: Attrs, children: Vec<Node>) -> Node;
}

impl<F> Component for F
where
    F: Fn(Attrs, Vec<Node>) -> Node + Send + Sync,
{
    fn render(&self, attrs: Attrs, children: Vec<Node>) -> Node {
        self(attrs, children)
    }
}

/// Renders a plain element with the given tag name.
#[derive(Debug, Clone)]
pub struct Tag(pub &'static str);

impl Component for Tag {
    fn render(&self, attrs: Attrs, children: Vec<Node>) -> Node {
        Element::new(self.0).attrs(attrs).children(children).into()
    }
}

/// The full set of slot components used by a form.
#[derive(Clone)]
pub struct Components {
    pub field: Arc<dyn Component>,
    pub label: Arc<dyn Component>,
    pub input: Arc<dyn Component>,
    pub multiline: Arc<dyn Component>,
    pub select: Arc<dyn Component>,
    pub checkbox: Arc<dyn Component>,
    pub checkbox_wrapper: Arc<dyn Component>,
    pub radio: Arc<dyn Component>,
    pub radio_group: Arc<dyn Component>,
    pub radio_wrapper: Arc<dyn Component>,
    pub field_errors: Arc<dyn Component>,
    pub error: Arc<dyn Component>,
    pub global_errors: Arc<dyn Component>,
    pub button: Arc<dyn Component>,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            field: Arc::new(Tag("div")),
            label: Arc::new(Tag("label")),
            input: Arc::new(Tag("input")),
            multiline: Arc::new(Tag("textarea")),
            select: Arc::new(Tag("select")),
            checkbox: Arc::new(Tag("input")),
            checkbox_wrapper: Arc::new(Tag("div")),
            radio: Arc::new(Tag("input")),
            radio_group: Arc::new(Tag("fieldset")),
            radio_wrapper: Arc::new(Tag("div")),
            field_errors: Arc::new(Tag("div")),
            error: Arc::new(Tag("div")),
            global_errors: Arc::new(Tag("div")),
            button: Arc::new(Tag("button")),
        }
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Components").finish_non_exhaustive()
    }
}

impl Components {
    /// Creates the default tag-name components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap 5 styled components.
    pub fn bootstrap() -> Self {
        Self {
            field: Arc::new(Classed::new("div", "mb-3")),
            label: Arc::new(Classed::new("label", "form-label")),
            input: Arc::new(Classed::control("input", "form-control")),
            multiline: Arc::new(Classed::control("textarea", "form-control")),
            select: Arc::new(Classed::control("select", "form-select")),
            checkbox: Arc::new(Classed::control("input", "form-check-input")),
            checkbox_wrapper: Arc::new(Classed::new("div", "form-check")),
            radio: Arc::new(Classed::control("input", "form-check-input")),
            radio_group: Arc::new(Classed::new("fieldset", "mb-3")),
            radio_wrapper: Arc::new(Classed::new("div", "form-check")),
            field_errors: Arc::new(Classed::new("div", "invalid-feedback d-block")),
            error: Arc::new(Tag("div")),
            global_errors: Arc::new(Classed::new("div", "alert alert-danger")),
            button: Arc::new(Classed::new("button", "btn btn-primary")),
        }
    }

    /// Replaces the field wrapper component.
    #[must_use]
    pub fn field(mut self, component: impl Component + 'static) -> Self {
        self.field = Arc::new(component);
        self
    }

    /// Replaces the label component.
    #[must_use]
    pub fn label(mut self, component: impl Component + 'static) -> Self {
        self.label = Arc::new(component);
        self
    }

    /// Replaces the text input component.
    #[must_use]
    pub fn input(mut self, component: impl Component + 'static) -> Self {
        self.input = Arc::new(component);
        self
    }

    /// Replaces the multiline input component.
    #[must_use]
    pub fn multiline(mut self, component: impl Component + 'static) -> Self {
        self.multiline = Arc::new(component);
        self
    }

    /// Replaces the select component.
    #[must_use]
    pub fn select(mut self, component: impl Component + 'static) -> Self {
        self.select = Arc::new(component);
        self
    }

    /// Replaces the checkbox component.
    #[must_use]
    pub fn checkbox(mut self, component: impl Component + 'static) -> Self {
        self.checkbox = Arc::new(component);
        self
    }

    /// Replaces the checkbox wrapper component.
    #[must_use]
    pub fn checkbox_wrapper(mut self, component: impl Component + 'static) -> Self {
        self.checkbox_wrapper = Arc::new(component);
        self
    }

    /// Replaces the radio component.
    #[must_use]
    pub fn radio(mut self, component: impl Component + 'static) -> Self {
        self.radio = Arc::new(component);
        self
    }

    /// Replaces the radio group component.
    #[must_use]
    pub fn radio_group(mut self, component: impl Component + 'static) -> Self {
        self.radio_group = Arc::new(component);
        self
    }

    /// Replaces the radio wrapper component.
    #[must_use]
    pub fn radio_wrapper(mut self, component: impl Component + 'static) -> Self {
        self.radio_wrapper = Arc::new(component);
        self
    }

    /// Replaces the field errors component.
    #[must_use]
    pub fn field_errors(mut self, component: impl Component + 'static) -> Self {
        self.field_errors = Arc::new(component);
        self
    }

    /// Replaces the single error component.
    #[must_use]
    pub fn error(mut self, component: impl Component + 'static) -> Self {
        self.error = Arc::new(component);
        self
    }

    /// Replaces the global errors component.
    #[must_use]
    pub fn global_errors(mut self, component: impl Component + 'static) -> Self {
        self.global_errors = Arc::new(component);
        self
    }

    /// Replaces the button component.
    #[must_use]
    pub fn button(mut self, component: impl Component + 'static) -> Self {
        self.button = Arc::new(component);
        self
    }
}
